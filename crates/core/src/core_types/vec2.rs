//! Vector type alias for planar directions.

use nalgebra::Vector2;

/// 2D vector type for wind and spread directions.
///
/// This is a simple alias for `nalgebra::Vector2<f64>`, used for the wind
/// vector and the grid offset between a burning cell and its neighbour.
pub type Vec2 = Vector2<f64>;
