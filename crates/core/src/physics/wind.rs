//! Wind-biased fire spread
//!
//! Wind skews the per-neighbour ignition probability towards downwind cells.
//! The bias is driven by the dot product of the wind vector with the unit
//! grid step from the burning cell to its neighbour:
//!
//! - downwind (dot > 0): `1 + min(0.1 · dot, 0.5)`
//! - upwind (dot < 0): `max(1 − 0.1 · |dot|, 0.5)`
//! - crosswind (dot = 0): `1`
//!
//! so the baseline probability moves at most 50% in either direction.

use crate::core_types::Vec2;
use serde::{Deserialize, Serialize};

/// Multiplier change per unit of wind/direction alignment
pub const WIND_SENSITIVITY: f64 = 0.1;

/// Largest downwind boost (+50%)
pub const MAX_DOWNWIND_BOOST: f64 = 0.5;

/// Smallest upwind multiplier (50% of baseline)
pub const MIN_UPWIND_MULTIPLIER: f64 = 0.5;

fn enabled_by_default() -> bool {
    true
}

/// Wind settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindConfig {
    /// `(dx, dy)` in grid units; +x is increasing column, +y increasing row
    pub vector: Vec2,
    /// When false the vector is ignored entirely. A serialized wind block
    /// that omits it is enabled.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl Default for WindConfig {
    fn default() -> Self {
        WindConfig {
            vector: Vec2::zeros(),
            enabled: false,
        }
    }
}

impl WindConfig {
    pub fn new(dx: f64, dy: f64) -> Self {
        WindConfig {
            vector: Vec2::new(dx, dy),
            enabled: true,
        }
    }

    /// The vector if wind effects are on
    pub fn active_vector(&self) -> Option<Vec2> {
        self.enabled.then_some(self.vector)
    }
}

/// Ignition probability multiplier for spreading along `offset` under `wind`
pub fn wind_multiplier(wind: &Vec2, offset: (i32, i32)) -> f64 {
    let direction = Vec2::new(f64::from(offset.0), f64::from(offset.1));
    let dot = wind.dot(&direction);

    if dot > 0.0 {
        1.0 + (dot * WIND_SENSITIVITY).min(MAX_DOWNWIND_BOOST)
    } else if dot < 0.0 {
        (1.0 - dot.abs() * WIND_SENSITIVITY).max(MIN_UPWIND_MULTIPLIER)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_downwind_boost() {
        let wind = Vec2::new(2.0, 0.0);
        assert_relative_eq!(wind_multiplier(&wind, (1, 0)), 1.2);
    }

    #[test]
    fn test_downwind_boost_is_capped() {
        let wind = Vec2::new(30.0, 0.0);
        assert_relative_eq!(wind_multiplier(&wind, (1, 0)), 1.5);
    }

    #[test]
    fn test_upwind_reduction_is_floored() {
        let wind = Vec2::new(3.0, 0.0);
        assert_relative_eq!(wind_multiplier(&wind, (-1, 0)), 0.7);

        let gale = Vec2::new(50.0, 0.0);
        assert_relative_eq!(wind_multiplier(&gale, (-1, 0)), 0.5);
    }

    #[test]
    fn test_crosswind_is_neutral() {
        let wind = Vec2::new(0.0, 4.0);
        assert_eq!(wind_multiplier(&wind, (1, 0)), 1.0);
        assert_eq!(wind_multiplier(&wind, (-1, 0)), 1.0);
    }

    #[test]
    fn test_diagonal_step_combines_components() {
        let wind = Vec2::new(1.0, 1.0);
        assert_relative_eq!(wind_multiplier(&wind, (1, 1)), 1.2);
        assert_eq!(wind_multiplier(&wind, (1, -1)), 1.0);
    }

    #[test]
    fn test_enabled_defaults_on_when_omitted() {
        let wind: WindConfig = serde_json::from_str(r#"{ "vector": [0.0, -2.0] }"#).unwrap();
        assert!(wind.enabled);
        assert_eq!(wind.vector, Vec2::new(0.0, -2.0));

        let calm: WindConfig =
            serde_json::from_str(r#"{ "vector": [1.0, 1.0], "enabled": false }"#).unwrap();
        assert!(calm.active_vector().is_none());
    }

    #[test]
    fn test_disabled_wind_has_no_vector() {
        let mut wind = WindConfig::new(1.0, 0.0);
        assert!(wind.active_vector().is_some());
        wind.enabled = false;
        assert!(wind.active_vector().is_none());
    }
}
