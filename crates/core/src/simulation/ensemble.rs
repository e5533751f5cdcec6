//! Independent simulation instances for statistical sampling
//!
//! Every instance owns its own RNG stream derived from the ensemble's base
//! seed, so instances run in parallel on the rayon pool and still produce
//! exactly what a sequential run would.

use crate::core_types::Timestep;
use crate::simulation::{
    ConfigError, FireLengthEvent, Forest, ForestConfig, SimulationReport,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Derive instance `index`'s seed from `base` (`SplitMix64` finaliser)
pub fn instance_seed(base: u64, index: usize) -> u64 {
    let mut z = base.wrapping_add((index as u64).wrapping_add(1).wrapping_mul(0x9E3779B97F4A7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// `config.instances` forests sharing one configuration
#[derive(Debug, Clone)]
pub struct Ensemble {
    config: ForestConfig,
    base_seed: u64,
}

impl Ensemble {
    pub fn new(config: ForestConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_seed = config.seed.unwrap_or_else(rand::random);
        Ok(Ensemble { config, base_seed })
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Build and run instance `index` to completion
    pub fn run_instance(&self, index: usize) -> Result<SimulationReport, ConfigError> {
        let seed = instance_seed(self.base_seed, index);
        let mut forest = Forest::with_seed(self.config.clone(), seed)?;
        forest.run();
        Ok(forest.report())
    }

    /// Run every instance on the rayon thread pool
    pub fn run(&self) -> Result<EnsembleReport, ConfigError> {
        let runs = (0..self.config.instances)
            .into_par_iter()
            .map(|index| self.run_instance(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.finish(runs))
    }

    /// Run every instance on the calling thread
    pub fn run_sequential(&self) -> Result<EnsembleReport, ConfigError> {
        let runs = (0..self.config.instances)
            .map(|index| self.run_instance(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.finish(runs))
    }

    fn finish(&self, runs: Vec<SimulationReport>) -> EnsembleReport {
        tracing::info!(
            instances = runs.len(),
            base_seed = self.base_seed,
            fires = runs.iter().map(SimulationReport::fire_count).sum::<usize>(),
            "Ensemble complete"
        );
        EnsembleReport {
            base_seed: self.base_seed,
            grid_size: self.config.grid_size,
            timesteps: self.config.timesteps,
            runs,
        }
    }
}

/// Reports of every instance, in instance order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleReport {
    pub base_seed: u64,
    pub grid_size: usize,
    pub timesteps: Timestep,
    pub runs: Vec<SimulationReport>,
}

impl EnsembleReport {
    pub fn instances(&self) -> usize {
        self.runs.len()
    }

    /// Final fire sizes of each instance
    pub fn fire_sizes(&self) -> Vec<&[usize]> {
        self.runs.iter().map(|r| r.fire_sizes.as_slice()).collect()
    }

    /// Spread-round durations of every fire in every instance
    pub fn all_fire_durations(&self) -> Vec<u32> {
        self.runs
            .iter()
            .flat_map(|r| r.fire_durations.values().copied())
            .collect()
    }

    /// Fire-length events of every instance, concatenated
    pub fn all_fire_length_events(&self) -> Vec<FireLengthEvent> {
        self.runs
            .iter()
            .flat_map(|r| r.fire_length_events.iter().copied())
            .collect()
    }

    /// Tree counts as one row per instance, one column per timestep
    pub fn tree_counts(&self) -> Vec<&[usize]> {
        self.runs.iter().map(|r| r.trees_per_timestep.as_slice()).collect()
    }

    /// Tree density at each timestep averaged over instances
    pub fn average_tree_densities(&self) -> Vec<f64> {
        let Some(len) = self.runs.iter().map(|r| r.trees_per_timestep.len()).min() else {
            return Vec::new();
        };
        let area = (self.grid_size * self.grid_size) as f64;
        let instances = self.runs.len() as f64;
        (0..len)
            .map(|t| {
                let total: usize = self.runs.iter().map(|r| r.trees_per_timestep[t]).sum();
                total as f64 / area / instances
            })
            .collect()
    }

    /// Mean fire size of each instance, 0 for instances without fires
    pub fn mean_fire_sizes(&self) -> Vec<f64> {
        self.runs.iter().map(SimulationReport::mean_fire_size).collect()
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
