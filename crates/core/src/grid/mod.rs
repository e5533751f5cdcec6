//! Grid-based simulation modules

pub mod cell_grid;
pub mod lakes;

// Re-export main types
pub use cell_grid::*;
pub use lakes::{generate_lakes, LakeConfig, LakeSummary, DEFAULT_LAKE_COUNT};
