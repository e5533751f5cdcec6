//! Cell states of the forest grid

use serde::{Deserialize, Serialize};

/// State of a single grid cell.
///
/// The numeric codes are stable and are what [`crate::grid::GridSnapshot::codes`]
/// hands to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CellState {
    /// Bare ground, may be planted
    #[default]
    Empty = 0,
    /// Living tree
    Tree = 1,
    /// Tree owned by an active fire
    Burning = 2,
    /// Permanent water; never planted, ignited or crossed by fire
    Lake = 3,
}

impl CellState {
    /// Numeric code of this state
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Convert from a numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellState::Empty),
            1 => Some(CellState::Tree),
            2 => Some(CellState::Burning),
            3 => Some(CellState::Lake),
            _ => None,
        }
    }

    /// Whether a tree may be planted on this cell
    #[inline]
    pub const fn is_plantable(self) -> bool {
        matches!(self, CellState::Empty)
    }
}
