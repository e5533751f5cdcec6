//! Tree metadata
//!
//! A `Tree` is created when a cell goes from EMPTY to TREE. It lives in the
//! [`crate::simulation::TreeRegistry`] until it ignites, at which point the
//! owning fire takes it over until the cell burns out.

use super::{Coord, Timestep};
use serde::{Deserialize, Serialize};

/// Number of rounds a tree burns unless configured otherwise
pub const DEFAULT_BURN_DURATION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub(crate) coordinates: Coord,
    pub(crate) planted_at: Timestep,
    pub(crate) ignited_at: Option<Timestep>,
    pub(crate) burn_duration: u32,
}

impl Tree {
    pub fn new(coordinates: Coord, planted_at: Timestep, burn_duration: u32) -> Self {
        Tree {
            coordinates,
            planted_at,
            ignited_at: None,
            burn_duration,
        }
    }

    pub fn coordinates(&self) -> Coord {
        self.coordinates
    }

    pub fn planted_at(&self) -> Timestep {
        self.planted_at
    }

    pub fn ignited_at(&self) -> Option<Timestep> {
        self.ignited_at
    }

    pub fn burn_duration(&self) -> u32 {
        self.burn_duration
    }

    pub(crate) fn ignite(&mut self, t: Timestep) {
        self.ignited_at = Some(t);
    }

    /// Whether this tree spreads fire in round `t`.
    ///
    /// A tree ignited at `i` spreads in rounds `i + 1 ..= i + burn_duration`.
    #[inline]
    pub fn spreads_at(&self, t: Timestep) -> bool {
        self.ignited_at
            .is_some_and(|i| t > i && t <= i + Timestep::from(self.burn_duration))
    }

    /// Whether this tree burns out at the end of round `t`
    #[inline]
    pub fn burns_out_at(&self, t: Timestep) -> bool {
        self.ignited_at
            .is_some_and(|i| t >= i + Timestep::from(self.burn_duration))
    }
}
