//! Core types shared by the grid, the fires and the driver

pub mod cell;
pub mod coord;
pub mod tree;
pub mod vec2;

pub use cell::CellState;
pub use coord::Coord;
pub use tree::{Tree, DEFAULT_BURN_DURATION};
pub use vec2::Vec2;

use serde::{Deserialize, Serialize};

/// Discrete simulation timestep.
pub type Timestep = u64;

/// Run-unique fire identifier.
///
/// Ids come from a monotonic counter owned by the forest and are never reused,
/// even after the fire has been retired into history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FireId(pub u64);

impl std::fmt::Display for FireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fire#{}", self.0)
    }
}
