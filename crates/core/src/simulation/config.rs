//! Simulation configuration
//!
//! A single [`ForestConfig`] drives every feature of the engine: lakes, wind,
//! the freeze-during-fire planting policy, topology and neighbourhood. It can
//! be built in code or loaded from JSON.

use crate::core_types::DEFAULT_BURN_DURATION;
use crate::grid::{LakeConfig, Neighborhood, Topology};
use crate::physics::WindConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Order of the lightning and planting phases within a timestep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOrder {
    /// Strike lightning, then plant
    #[default]
    LightningFirst,
    /// Plant, then strike lightning
    PlantingFirst,
}

/// Configuration of one forest (and of every instance in an ensemble)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Side length L of the square grid
    pub grid_size: usize,
    /// Lightning is attempted on every timestep divisible by this
    pub lightning_interval: u64,
    /// Per-neighbour, per-round ignition probability g (0-1)
    pub spread_probability: f64,
    /// Probability for diagonal neighbours in Moore mode; `None` uses g
    pub diagonal_spread_probability: Option<f64>,
    /// Rounds a burning cell stays alight
    pub burn_duration: u32,
    /// Skip planting while any fire is active
    pub freeze_time_during_fire: bool,
    pub topology: Topology,
    pub neighborhood: Neighborhood,
    /// Lake terrain; `None` disables lakes
    pub lakes: Option<LakeConfig>,
    pub wind: WindConfig,
    pub step_order: StepOrder,
    /// Number of timesteps in a run
    pub timesteps: u64,
    /// Number of independent instances in an ensemble
    pub instances: usize,
    /// Base RNG seed; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            grid_size: 100,
            lightning_interval: 50,
            spread_probability: 1.0,
            diagonal_spread_probability: None,
            burn_duration: DEFAULT_BURN_DURATION,
            freeze_time_during_fire: false,
            topology: Topology::Toroidal,
            neighborhood: Neighborhood::VonNeumann,
            lakes: None,
            wind: WindConfig::default(),
            step_order: StepOrder::LightningFirst,
            timesteps: 1000,
            instances: 1,
            seed: None,
        }
    }
}

impl ForestConfig {
    /// Default configuration with the given grid size, lightning interval
    /// and spread probability
    pub fn new(grid_size: usize, lightning_interval: u64, spread_probability: f64) -> Self {
        ForestConfig {
            grid_size,
            lightning_interval,
            spread_probability,
            ..Default::default()
        }
    }

    pub fn with_timesteps(mut self, timesteps: u64) -> Self {
        self.timesteps = timesteps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_lakes(mut self, lakes: LakeConfig) -> Self {
        self.lakes = Some(lakes);
        self
    }

    pub fn with_wind(mut self, wind: WindConfig) -> Self {
        self.wind = wind;
        self
    }

    pub fn with_freeze_time_during_fire(mut self, freeze: bool) -> Self {
        self.freeze_time_during_fire = freeze;
        self
    }

    pub fn with_instances(mut self, instances: usize) -> Self {
        self.instances = instances;
        self
    }

    /// Probability used for diagonal neighbours
    pub fn diagonal_probability(&self) -> f64 {
        self.diagonal_spread_probability.unwrap_or(self.spread_probability)
    }

    /// Check every option, failing on the first invalid one
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        if self.grid_size.checked_mul(self.grid_size).is_none() {
            return Err(ConfigError::GridTooLarge(self.grid_size));
        }
        if self.lightning_interval == 0 {
            return Err(ConfigError::InvalidLightningInterval(self.lightning_interval));
        }
        check_probability("spread_probability", self.spread_probability)?;
        if let Some(p) = self.diagonal_spread_probability {
            check_probability("diagonal_spread_probability", p)?;
        }
        if self.burn_duration == 0 {
            return Err(ConfigError::InvalidBurnDuration);
        }
        if let Some(lakes) = &self.lakes {
            check_probability("lakes.proportion", lakes.proportion)?;
            if lakes.lake_count == 0 {
                return Err(ConfigError::InvalidLakeCount);
            }
        }
        if !(self.wind.vector.x.is_finite() && self.wind.vector.y.is_finite()) {
            return Err(ConfigError::NonFiniteWind);
        }
        if self.instances == 0 {
            return Err(ConfigError::InvalidInstanceCount);
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Pretty JSON form of this configuration
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

/// Errors raised while building or loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size must be positive, got {0}")]
    InvalidGridSize(usize),
    #[error("grid size {0} is too large: {0}x{0} cells overflow the address space")]
    GridTooLarge(usize),
    #[error("lightning interval must be positive, got {0}")]
    InvalidLightningInterval(u64),
    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    #[error("burn duration must be at least one step")]
    InvalidBurnDuration,
    #[error("lake count must be positive when lakes are enabled")]
    InvalidLakeCount,
    #[error("wind vector components must be finite")]
    NonFiniteWind,
    #[error("instance count must be positive")]
    InvalidInstanceCount,
    #[error("failed to read config from {path:?}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ForestConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_grid() {
        let config = ForestConfig::new(0, 10, 0.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGridSize(0))
        ));
    }

    #[test]
    fn test_rejects_grid_with_overflowing_area() {
        let side = 1_usize << (usize::BITS / 2);
        let config = ForestConfig::new(side, 5, 0.5);
        assert!(matches!(config.validate(), Err(ConfigError::GridTooLarge(s)) if s == side));
        assert!(matches!(
            crate::simulation::Forest::with_seed(config, 1),
            Err(ConfigError::GridTooLarge(_))
        ));
    }

    #[test]
    fn test_huge_timestep_budget_builds() {
        let config = ForestConfig::new(10, 5, 0.5).with_timesteps(u64::MAX);
        assert!(config.validate().is_ok());

        let mut forest = crate::simulation::Forest::with_seed(config, 1).unwrap();
        forest.step();
        assert!(!forest.is_finished());
        assert_eq!(forest.trees_per_timestep().len(), 1);
    }

    #[test]
    fn test_rejects_zero_lightning_interval() {
        let config = ForestConfig::new(10, 0, 0.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLightningInterval(0))
        ));
    }

    #[test]
    fn test_rejects_bad_probabilities() {
        for g in [-0.1, 1.5, f64::NAN] {
            let config = ForestConfig::new(10, 10, g);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ProbabilityOutOfRange {
                    name: "spread_probability",
                    ..
                })
            ));
        }

        let config = ForestConfig::new(10, 10, 0.5).with_lakes(LakeConfig::new(2.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                name: "lakes.proportion",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_lake_count() {
        let config = ForestConfig::new(10, 10, 0.5).with_lakes(LakeConfig {
            proportion: 0.1,
            lake_count: 0,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLakeCount)
        ));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let err = ForestConfig::new(10, 10, 1.5).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "spread_probability must be within [0, 1], got 1.5"
        );
    }

    #[test]
    fn test_json_fills_defaults() {
        let config = ForestConfig::from_json_str(
            r#"{
                "grid_size": 50,
                "lightning_interval": 20,
                "lakes": { "proportion": 0.1 },
                "wind": { "vector": [1.0, -2.0], "enabled": true },
                "topology": "bounded"
            }"#,
        )
        .unwrap();

        assert_eq!(config.grid_size, 50);
        assert_eq!(config.lightning_interval, 20);
        assert_eq!(config.spread_probability, 1.0);
        assert_eq!(config.topology, Topology::Bounded);
        assert_eq!(config.lakes.unwrap().lake_count, 5);
        assert_eq!(config.wind.vector.y, -2.0);
        assert!(config.wind.enabled);
    }

    #[test]
    fn test_json_wind_without_flag_is_enabled() {
        let config =
            ForestConfig::from_json_str(r#"{ "wind": { "vector": [1.0, 0.0] } }"#).unwrap();
        assert!(config.wind.enabled);
        assert_eq!(config.wind.active_vector().map(|v| v.x), Some(1.0));

        let config = ForestConfig::from_json_str(r#"{ "grid_size": 12 }"#).unwrap();
        assert!(!config.wind.enabled);
    }

    #[test]
    fn test_json_validation_runs() {
        let result = ForestConfig::from_json_str(r#"{ "grid_size": 0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidGridSize(0))));

        let result = ForestConfig::from_json_str("not json");
        assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn test_save_and_load() {
        let config = ForestConfig::new(30, 7, 0.6)
            .with_seed(99)
            .with_lakes(LakeConfig::new(0.2));
        let path = std::env::temp_dir().join("forest_fire_config_test.json");

        fs::write(&path, config.to_json_string().unwrap()).unwrap();
        let loaded = ForestConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ForestConfig::load("/nonexistent/forest.json").unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
        assert!(err.to_string().contains("/nonexistent/forest.json"));
    }
}
