//! Physics modifiers applied to fire spread

pub mod wind;

pub use wind::{wind_multiplier, WindConfig};
