//! Raw run statistics handed to analysis code
//!
//! The engine only records facts: final fire sizes, spread-round durations,
//! live tree counts per timestep, and when each fire went out. Fitting and
//! plotting belong to the consumer.

use crate::core_types::{Coord, FireId, Timestep};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Final statistics of a retired fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireRecord {
    pub id: FireId,
    pub origin: Coord,
    pub ignited_at: Timestep,
    pub extinguished_at: Timestep,
    /// Cells ever ignited, origin included
    pub size: usize,
    /// Rounds in which the fire reached at least one new cell
    pub spread_rounds: u32,
}

impl FireRecord {
    /// Timesteps between ignition and extinction
    pub fn lifetime(&self) -> Timestep {
        self.extinguished_at - self.ignited_at
    }
}

/// A fire's size keyed by when it went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireLengthEvent {
    pub extinguished_at: Timestep,
    pub size: usize,
}

/// Everything one run reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Seed the run's RNG started from
    pub seed: u64,
    pub grid_size: usize,
    /// Timesteps actually simulated
    pub timesteps: Timestep,
    pub lake_cells: usize,
    /// Final sizes in retirement order
    pub fire_sizes: Vec<usize>,
    /// Spread rounds per fire id
    pub fire_durations: BTreeMap<FireId, u32>,
    /// Live trees at the end of each timestep
    pub trees_per_timestep: Vec<usize>,
    pub fire_length_events: Vec<FireLengthEvent>,
    /// Fires still burning when the report was taken
    pub active_fires: usize,
}

impl SimulationReport {
    /// Number of fires that went out during the run
    pub fn fire_count(&self) -> usize {
        self.fire_sizes.len()
    }

    /// Mean final fire size, 0 when no fire went out
    pub fn mean_fire_size(&self) -> f64 {
        if self.fire_sizes.is_empty() {
            return 0.0;
        }
        self.fire_sizes.iter().sum::<usize>() as f64 / self.fire_sizes.len() as f64
    }

    /// Live tree count divided by the grid area, per timestep
    pub fn tree_densities(&self) -> Vec<f64> {
        let area = (self.grid_size * self.grid_size) as f64;
        self.trees_per_timestep
            .iter()
            .map(|&n| n as f64 / area)
            .collect()
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
