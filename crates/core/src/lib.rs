//! Forest-Fire Simulation Core Library
//!
//! A stochastic forest-fire cellular automaton for studying self-organized
//! criticality. Trees grow on a square grid, lightning ignites random cells,
//! fires spread to neighbouring trees and burnt cells become empty again.
//!
//! ## Features
//!
//! - Toroidal or bounded grids with 4- or 8-cell neighbourhoods
//! - Per-fire event tracking: fires never merge, ids are never reused
//! - Optional lake terrain and wind-biased spreading
//! - Seeded, per-instance randomness for reproducible runs
//! - Parallel ensembles of independent instances
//!
//! The engine only reports raw facts (fire sizes, spread-round durations,
//! live tree counts per timestep); fitting and plotting happen elsewhere.

// Core types and utilities
pub mod core_types;

pub mod grid;
pub mod physics;
pub mod simulation;

// Re-export core types
pub use core_types::{CellState, Coord, FireId, Timestep, Tree, Vec2};

pub use grid::{CellCensus, CellGrid, GridSnapshot, LakeConfig, Neighborhood, Topology};
pub use physics::WindConfig;
pub use simulation::{
    ConfigError, Ensemble, EnsembleReport, Fire, FireLengthEvent, FireRecord, FireStatus, Forest,
    ForestConfig, SimulationReport, StepOrder, StepOutcome, TreeRegistry,
};
