//! Forest-fire simulation driver
//!
//! `Forest` owns the grid, the tree registry, the active and retired fires and
//! the per-timestep statistics of one run. Every timestep runs the same
//! phases in a fixed order:
//!
//! 1. lightning (every `lightning_interval` steps) and planting, in the order
//!    given by [`StepOrder`]
//! 2. every active fire plans and applies one spread round, in id order
//! 3. extinguished fires are retired into history with their statistics
//! 4. the live tree count is appended to the density timeseries
//!
//! All randomness comes from the forest's own seeded RNG, so two forests with
//! the same configuration and seed evolve identically.

pub mod config;
pub mod ensemble;
pub mod fire;
pub mod registry;
pub mod report;

pub use config::{ConfigError, ForestConfig, StepOrder};
pub use ensemble::{Ensemble, EnsembleReport};
pub use fire::{Fire, FireStatus, SpreadRound, SpreadRules};
pub use registry::TreeRegistry;
pub use report::{FireLengthEvent, FireRecord, SimulationReport};

use crate::core_types::{CellState, Coord, FireId, Timestep};
use crate::grid::{generate_lakes, CellCensus, CellGrid, GridSnapshot};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Upper bound on the timeseries capacity reserved up front
const MAX_PRERESERVED_STEPS: u64 = 1 << 20;

/// What happened during one timestep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub timestep: Timestep,
    /// Fire started by lightning this step
    pub new_fire: Option<FireId>,
    /// Where a tree was planted, if one was
    pub planted: Option<Coord>,
    /// Cells newly set alight by spreading
    pub cells_ignited: usize,
    /// Cells that burnt out and became empty
    pub cells_burnt_out: usize,
    /// Fires retired into history
    pub fires_extinguished: usize,
}

/// One forest-fire simulation instance
#[derive(Debug, Clone)]
pub struct Forest {
    config: ForestConfig,
    rules: SpreadRules,
    grid: CellGrid,
    registry: TreeRegistry,

    // Fires
    active_fires: Vec<Fire>,
    history: Vec<Fire>,
    next_fire_id: u64,

    // Clock and randomness
    t: Timestep,
    seed: u64,
    rng: SmallRng,

    // Statistics
    lake_cells: usize,
    trees_per_timestep: Vec<usize>,
    fire_length_events: Vec<FireLengthEvent>,
    fire_durations: BTreeMap<FireId, u32>,
}

impl Forest {
    /// Build a forest, seeding from `config.seed` or from entropy
    pub fn new(config: ForestConfig) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, seed)
    }

    /// Build a forest whose RNG starts from `seed`, ignoring `config.seed`
    pub fn with_seed(config: ForestConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut grid = CellGrid::new(config.grid_size, config.topology, config.neighborhood);
        let lake_cells = match &config.lakes {
            Some(lakes) => generate_lakes(&mut grid, lakes, &mut rng).marked,
            None => 0,
        };

        tracing::debug!(
            grid_size = config.grid_size,
            lightning_interval = config.lightning_interval,
            spread_probability = config.spread_probability,
            lake_cells,
            seed,
            "Created forest"
        );

        Ok(Forest {
            rules: SpreadRules::from_config(&config),
            registry: TreeRegistry::new(config.burn_duration),
            grid,
            active_fires: Vec::new(),
            history: Vec::new(),
            next_fire_id: 0,
            t: 0,
            seed,
            rng,
            lake_cells,
            trees_per_timestep: Vec::with_capacity(
                config.timesteps.min(MAX_PRERESERVED_STEPS) as usize,
            ),
            fire_length_events: Vec::new(),
            fire_durations: BTreeMap::new(),
            config,
        })
    }

    /// Advance one timestep
    pub fn step(&mut self) -> StepOutcome {
        let mut outcome = StepOutcome {
            timestep: self.t,
            ..Default::default()
        };

        match self.config.step_order {
            StepOrder::LightningFirst => {
                outcome.new_fire = self.lightning_phase();
                outcome.planted = self.planting_phase();
            }
            StepOrder::PlantingFirst => {
                outcome.planted = self.planting_phase();
                outcome.new_fire = self.lightning_phase();
            }
        }

        self.fire_phase(&mut outcome);
        self.retire_extinguished(&mut outcome);
        self.trees_per_timestep.push(self.registry.len());

        tracing::trace!(
            t = self.t,
            trees = self.registry.len(),
            active_fires = self.active_fires.len(),
            ignited = outcome.cells_ignited,
            "Step complete"
        );
        self.t += 1;
        outcome
    }

    /// Step until the configured number of timesteps has run
    pub fn run(&mut self) {
        while !self.is_finished() {
            self.step();
        }
        tracing::info!(
            seed = self.seed,
            timesteps = self.t,
            fires = self.history.len(),
            trees = self.registry.len(),
            "Run complete"
        );
    }

    pub fn is_finished(&self) -> bool {
        self.t >= self.config.timesteps
    }

    fn lightning_phase(&mut self) -> Option<FireId> {
        if self.t % self.config.lightning_interval != 0 {
            return None;
        }
        let size = self.grid.size();
        let coord = Coord::new(
            self.rng.random_range(0..size),
            self.rng.random_range(0..size),
        );
        self.strike_lightning_at(coord)
    }

    fn planting_phase(&mut self) -> Option<Coord> {
        if self.config.freeze_time_during_fire && !self.active_fires.is_empty() {
            return None;
        }
        self.registry.plant(&mut self.grid, self.t, &mut self.rng)
    }

    /// Spread every active fire by one round
    fn fire_phase(&mut self, outcome: &mut StepOutcome) {
        let t = self.t;
        for fire in &mut self.active_fires {
            let round = fire.plan_round(&self.grid, &self.registry, &self.rules, t, &mut self.rng);
            outcome.cells_ignited += round.ignitions.len();
            outcome.cells_burnt_out += round.burnouts.len();
            fire.apply_round(round, &mut self.grid, &mut self.registry, t);
        }
    }

    /// Move extinguished fires into history and log their statistics
    fn retire_extinguished(&mut self, outcome: &mut StepOutcome) {
        if self.active_fires.iter().all(Fire::is_active) {
            return;
        }
        let (finished, active): (Vec<Fire>, Vec<Fire>) = std::mem::take(&mut self.active_fires)
            .into_iter()
            .partition(|fire| !fire.is_active());
        self.active_fires = active;

        for fire in finished {
            if let Some(record) = fire.record() {
                self.fire_length_events.push(FireLengthEvent {
                    extinguished_at: record.extinguished_at,
                    size: record.size,
                });
                self.fire_durations.insert(record.id, record.spread_rounds);
            }
            outcome.fires_extinguished += 1;
            self.history.push(fire);
        }
    }

    /// Strike `coord` with lightning now.
    ///
    /// Starts a new fire if the cell holds a living tree; otherwise nothing
    /// happens. The new fire first spreads in the next timestep.
    pub fn strike_lightning_at(&mut self, coord: Coord) -> Option<FireId> {
        if !self.grid.contains(coord) {
            return None;
        }
        let tree = self.registry.take(coord)?;
        self.grid.set(coord, CellState::Burning);

        let id = FireId(self.next_fire_id);
        self.next_fire_id += 1;
        self.active_fires.push(Fire::ignite(id, tree, self.t));

        tracing::debug!(fire = %id, t = self.t, origin = %coord, "Lightning ignited tree");
        Some(id)
    }

    /// Plant a tree at `coord` now if the cell is EMPTY
    pub fn plant_tree_at(&mut self, coord: Coord) -> bool {
        self.grid.contains(coord) && self.registry.plant_at(&mut self.grid, coord, self.t)
    }

    // Reporting

    /// Final sizes of all retired fires, in retirement order
    pub fn fire_sizes(&self) -> Vec<usize> {
        self.history.iter().map(Fire::size).collect()
    }

    /// Spread-round count of every retired fire
    pub fn fire_durations(&self) -> &BTreeMap<FireId, u32> {
        &self.fire_durations
    }

    /// Live tree count at the end of each completed timestep
    pub fn trees_per_timestep(&self) -> &[usize] {
        &self.trees_per_timestep
    }

    /// `(extinguished_at, size)` for every retired fire
    pub fn fire_length_events(&self) -> &[FireLengthEvent] {
        &self.fire_length_events
    }

    /// Final statistics of every retired fire
    pub fn fire_records(&self) -> Vec<FireRecord> {
        self.history.iter().filter_map(Fire::record).collect()
    }

    /// Copy of the grid as it stands now
    pub fn snapshot(&self) -> GridSnapshot {
        self.grid.snapshot(self.t)
    }

    /// Bundle the reporting accessors into one serializable value
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            seed: self.seed,
            grid_size: self.grid.size(),
            timesteps: self.t,
            lake_cells: self.lake_cells,
            fire_sizes: self.fire_sizes(),
            fire_durations: self.fire_durations.clone(),
            trees_per_timestep: self.trees_per_timestep.clone(),
            fire_length_events: self.fire_length_events.clone(),
            active_fires: self.active_fires.len(),
        }
    }

    // Accessors

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn trees(&self) -> &TreeRegistry {
        &self.registry
    }

    /// The next timestep to run
    pub fn timestep(&self) -> Timestep {
        self.t
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn active_fires(&self) -> &[Fire] {
        &self.active_fires
    }

    pub fn historical_fires(&self) -> &[Fire] {
        &self.history
    }

    /// Look up an active or retired fire
    pub fn fire(&self, id: FireId) -> Option<&Fire> {
        self.active_fires
            .iter()
            .chain(&self.history)
            .find(|fire| fire.id() == id)
    }

    pub fn live_tree_count(&self) -> usize {
        self.registry.len()
    }

    pub fn burning_cell_count(&self) -> usize {
        self.active_fires.iter().map(Fire::frontier_len).sum()
    }

    pub fn lake_cell_count(&self) -> usize {
        self.lake_cells
    }

    pub fn census(&self) -> CellCensus {
        self.grid.census()
    }
}
