//! Fire entities and the spread algorithm
//!
//! A [`Fire`] owns the trees it is currently burning (its frontier). Each
//! round is split in two:
//!
//! 1. [`Fire::plan_round`] reads the grid and the registry and decides which
//!    neighbours ignite and which frontier cells burn out. Nothing is mutated.
//! 2. [`Fire::apply_round`] moves ignited trees from the registry into the
//!    frontier, clears burnt-out cells and settles the fire's status.
//!
//! Fires never merge. A tree can only be claimed by one fire because claiming
//! removes it from the registry, and the driver applies each fire's round
//! before the next fire plans.

use crate::core_types::{CellState, Coord, FireId, Timestep, Tree, Vec2};
use crate::grid::{CellGrid, Neighbor};
use crate::physics::wind_multiplier;
use crate::simulation::{FireRecord, ForestConfig, TreeRegistry};
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};

/// Per-neighbour ignition policy for one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadRules {
    /// Probability for orthogonal neighbours
    pub orthogonal: f64,
    /// Probability for diagonal neighbours (Moore neighbourhood only)
    pub diagonal: f64,
    /// Wind vector when wind effects are enabled
    pub wind: Option<Vec2>,
}

impl SpreadRules {
    pub fn from_config(config: &ForestConfig) -> Self {
        SpreadRules {
            orthogonal: config.spread_probability,
            diagonal: config.diagonal_probability(),
            wind: config.wind.active_vector(),
        }
    }

    /// Constant probability `g` in every direction, no wind
    pub fn uniform(g: f64) -> Self {
        SpreadRules {
            orthogonal: g,
            diagonal: g,
            wind: None,
        }
    }

    /// Chance that a burning cell ignites the tree at `neighbor`
    pub fn ignition_probability(&self, neighbor: &Neighbor) -> f64 {
        let base = if neighbor.is_diagonal() {
            self.diagonal
        } else {
            self.orthogonal
        };
        match &self.wind {
            Some(wind) => (base * wind_multiplier(wind, neighbor.offset)).clamp(0.0, 1.0),
            None => base,
        }
    }
}

/// Changes one fire makes in one round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpreadRound {
    /// Trees catching fire, each listed once
    pub ignitions: Vec<Coord>,
    /// Frontier cells that burn out this round
    pub burnouts: Vec<Coord>,
}

impl SpreadRound {
    pub fn is_empty(&self) -> bool {
        self.ignitions.is_empty() && self.burnouts.is_empty()
    }
}

/// Fire lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireStatus {
    Active,
    Extinguished,
}

/// One ignition event and every cell it spreads to
#[derive(Debug, Clone)]
pub struct Fire {
    id: FireId,
    origin: Coord,
    ignited_at: Timestep,
    /// Currently burning cells
    burning: FxHashMap<Coord, Tree>,
    /// Every cell this fire ever ignited, origin first
    footprint: Vec<Coord>,
    spread_rounds: u32,
    extinguished_at: Option<Timestep>,
}

impl Fire {
    /// Start a fire from a single tree struck at `t`
    pub(crate) fn ignite(id: FireId, mut origin: Tree, t: Timestep) -> Self {
        origin.ignite(t);
        let coord = origin.coordinates();
        let mut burning = FxHashMap::default();
        burning.insert(coord, origin);
        Fire {
            id,
            origin: coord,
            ignited_at: t,
            burning,
            footprint: vec![coord],
            spread_rounds: 0,
            extinguished_at: None,
        }
    }

    pub fn id(&self) -> FireId {
        self.id
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn ignited_at(&self) -> Timestep {
        self.ignited_at
    }

    /// Cells ever ignited by this fire, including the origin
    pub fn size(&self) -> usize {
        self.footprint.len()
    }

    /// Rounds in which at least one new cell caught fire
    pub fn spread_rounds(&self) -> u32 {
        self.spread_rounds
    }

    pub fn extinguished_at(&self) -> Option<Timestep> {
        self.extinguished_at
    }

    pub fn is_active(&self) -> bool {
        self.extinguished_at.is_none()
    }

    pub fn status(&self) -> FireStatus {
        if self.is_active() {
            FireStatus::Active
        } else {
            FireStatus::Extinguished
        }
    }

    /// Number of cells currently burning
    pub fn frontier_len(&self) -> usize {
        self.burning.len()
    }

    pub fn is_burning(&self, coord: Coord) -> bool {
        self.burning.contains_key(&coord)
    }

    /// Currently burning cells in row-major order
    pub fn frontier(&self) -> Vec<Coord> {
        let mut cells: Vec<Coord> = self.burning.keys().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Every cell this fire has ignited, in ignition order
    pub fn footprint(&self) -> &[Coord] {
        &self.footprint
    }

    /// Decide this round's ignitions and burnouts without mutating anything.
    ///
    /// Only cells that were alight before round `t` spread. One uniform draw
    /// is taken per (burning cell, non-lake neighbour) pair.
    pub fn plan_round<R: Rng + ?Sized>(
        &self,
        grid: &CellGrid,
        registry: &TreeRegistry,
        rules: &SpreadRules,
        t: Timestep,
        rng: &mut R,
    ) -> SpreadRound {
        let mut round = SpreadRound::default();
        if !self.is_active() {
            return round;
        }
        let mut claimed: FxHashSet<Coord> = FxHashSet::default();

        for coord in self.frontier() {
            let tree = &self.burning[&coord];

            if tree.spreads_at(t) {
                for neighbor in grid.neighbors(coord) {
                    if grid.is_lake(neighbor.coord) {
                        continue;
                    }
                    let draw: f64 = rng.random();
                    if draw < rules.ignition_probability(&neighbor)
                        && registry.contains(neighbor.coord)
                        && claimed.insert(neighbor.coord)
                    {
                        round.ignitions.push(neighbor.coord);
                    }
                }
            }

            if tree.burns_out_at(t) {
                round.burnouts.push(coord);
            }
        }

        round
    }

    /// Apply a planned round, returning the fire's status afterwards.
    ///
    /// Ignited trees move from `registry` into the frontier and their cells
    /// become BURNING; burnt-out cells return to EMPTY. The fire is
    /// extinguished at `t` once the frontier is empty; this happens once.
    pub(crate) fn apply_round(
        &mut self,
        round: SpreadRound,
        grid: &mut CellGrid,
        registry: &mut TreeRegistry,
        t: Timestep,
    ) -> FireStatus {
        if !self.is_active() {
            return FireStatus::Extinguished;
        }

        let mut ignited = 0;
        for coord in round.ignitions {
            let Some(mut tree) = registry.take(coord) else {
                continue;
            };
            tree.ignite(t);
            grid.set(coord, CellState::Burning);
            self.burning.insert(coord, tree);
            self.footprint.push(coord);
            ignited += 1;
        }
        if ignited > 0 {
            self.spread_rounds += 1;
        }

        for coord in round.burnouts {
            if self.burning.remove(&coord).is_some() {
                grid.set(coord, CellState::Empty);
            }
        }

        if self.burning.is_empty() {
            self.extinguished_at = Some(t);
            tracing::debug!(
                fire = %self.id,
                t,
                size = self.size(),
                spread_rounds = self.spread_rounds,
                "Fire extinguished"
            );
            return FireStatus::Extinguished;
        }
        FireStatus::Active
    }

    /// Final statistics, available once the fire is out
    pub fn record(&self) -> Option<FireRecord> {
        let extinguished_at = self.extinguished_at?;
        Some(FireRecord {
            id: self.id,
            origin: self.origin,
            ignited_at: self.ignited_at,
            extinguished_at,
            size: self.size(),
            spread_rounds: self.spread_rounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Neighborhood, Topology};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct Scene {
        grid: CellGrid,
        registry: TreeRegistry,
        rng: SmallRng,
    }

    impl Scene {
        fn new(size: usize, topology: Topology) -> Self {
            Scene {
                grid: CellGrid::new(size, topology, Neighborhood::VonNeumann),
                registry: TreeRegistry::new(1),
                rng: SmallRng::seed_from_u64(42),
            }
        }

        fn plant(&mut self, cells: &[(usize, usize)]) {
            for &(x, y) in cells {
                assert!(self.registry.plant_at(&mut self.grid, Coord::new(x, y), 0));
            }
        }

        fn strike(&mut self, x: usize, y: usize, t: Timestep) -> Fire {
            let coord = Coord::new(x, y);
            let tree = self.registry.take(coord).unwrap();
            self.grid.set(coord, CellState::Burning);
            Fire::ignite(FireId(0), tree, t)
        }

        fn round(&mut self, fire: &mut Fire, rules: &SpreadRules, t: Timestep) -> FireStatus {
            let round = fire.plan_round(&self.grid, &self.registry, rules, t, &mut self.rng);
            fire.apply_round(round, &mut self.grid, &mut self.registry, t)
        }
    }

    #[test]
    fn test_origin_waits_one_round() {
        let mut scene = Scene::new(5, Topology::Toroidal);
        scene.plant(&[(2, 2), (2, 3)]);
        let fire = scene.strike(2, 2, 4);

        let round = fire.plan_round(
            &scene.grid,
            &scene.registry,
            &SpreadRules::uniform(1.0),
            4,
            &mut scene.rng,
        );
        assert!(round.is_empty());
    }

    #[test]
    fn test_certain_spread_burns_cross() {
        let mut scene = Scene::new(5, Topology::Toroidal);
        scene.plant(&[(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)]);
        let mut fire = scene.strike(2, 2, 0);
        let rules = SpreadRules::uniform(1.0);

        assert_eq!(scene.round(&mut fire, &rules, 1), FireStatus::Active);
        assert_eq!(fire.size(), 5);
        assert_eq!(fire.frontier_len(), 4);
        assert_eq!(scene.grid.get(Coord::new(2, 2)), CellState::Empty);
        assert_eq!(scene.grid.count(CellState::Burning), 4);
        assert!(scene.registry.is_empty());

        assert_eq!(scene.round(&mut fire, &rules, 2), FireStatus::Extinguished);
        assert_eq!(fire.extinguished_at(), Some(2));
        assert_eq!(fire.spread_rounds(), 1);
        assert_eq!(scene.grid.count(CellState::Burning), 0);
        assert_eq!(scene.grid.count(CellState::Empty), 25);
    }

    #[test]
    fn test_zero_probability_burns_origin_only() {
        let mut scene = Scene::new(5, Topology::Toroidal);
        scene.plant(&[(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)]);
        let mut fire = scene.strike(2, 2, 0);

        let status = scene.round(&mut fire, &SpreadRules::uniform(0.0), 1);

        assert_eq!(status, FireStatus::Extinguished);
        assert_eq!(fire.size(), 1);
        assert_eq!(fire.spread_rounds(), 0);
        assert_eq!(scene.registry.len(), 4);
    }

    #[test]
    fn test_shared_neighbor_ignites_once() {
        let mut scene = Scene::new(5, Topology::Bounded);
        // (1, 1) and (2, 2) both touch (2, 1) and (1, 2)
        scene.plant(&[(1, 1), (2, 1), (1, 2), (2, 2)]);
        let mut fire = scene.strike(1, 1, 0);
        let rules = SpreadRules::uniform(1.0);

        scene.round(&mut fire, &rules, 1);
        let round = fire.plan_round(&scene.grid, &scene.registry, &rules, 2, &mut scene.rng);

        assert_eq!(round.ignitions, vec![Coord::new(2, 2)]);
        fire.apply_round(round, &mut scene.grid, &mut scene.registry, 2);
        assert_eq!(fire.size(), 4);
        let mut footprint = fire.footprint().to_vec();
        footprint.sort_unstable();
        footprint.dedup();
        assert_eq!(footprint.len(), 4);
    }

    #[test]
    fn test_fire_does_not_cross_lake() {
        let mut scene = Scene::new(5, Topology::Bounded);
        scene.plant(&[(0, 0), (2, 0)]);
        scene.grid.mark_lake(Coord::new(1, 0));
        scene.plant(&[(0, 1)]);
        scene.grid.mark_lake(Coord::new(1, 1));
        let mut fire = scene.strike(0, 0, 0);
        let rules = SpreadRules::uniform(1.0);

        assert_eq!(scene.round(&mut fire, &rules, 1), FireStatus::Active);
        assert_eq!(scene.round(&mut fire, &rules, 2), FireStatus::Extinguished);

        assert_eq!(fire.size(), 2);
        assert!(scene.registry.contains(Coord::new(2, 0)));
        assert!(fire
            .footprint()
            .iter()
            .all(|&c| scene.grid.get(c) != CellState::Lake));
    }

    #[test]
    fn test_record_only_after_extinction() {
        let mut scene = Scene::new(3, Topology::Toroidal);
        scene.plant(&[(1, 1)]);
        let mut fire = scene.strike(1, 1, 5);
        assert!(fire.record().is_none());

        scene.round(&mut fire, &SpreadRules::uniform(1.0), 6);
        let record = fire.record().unwrap();
        assert_eq!(record.size, 1);
        assert_eq!(record.ignited_at, 5);
        assert_eq!(record.extinguished_at, 6);
        assert_eq!(record.lifetime(), 1);
    }

    #[test]
    fn test_wind_rules_clamp_probability() {
        let rules = SpreadRules {
            orthogonal: 0.9,
            diagonal: 0.9,
            wind: Some(Vec2::new(10.0, 0.0)),
        };
        let downwind = Neighbor {
            coord: Coord::new(1, 0),
            offset: (1, 0),
        };
        let upwind = Neighbor {
            coord: Coord::new(0, 0),
            offset: (-1, 0),
        };
        assert_eq!(rules.ignition_probability(&downwind), 1.0);
        assert!((rules.ignition_probability(&upwind) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_probability_applies_to_diagonals() {
        let rules = SpreadRules {
            orthogonal: 0.9,
            diagonal: 0.2,
            wind: None,
        };
        let diagonal = Neighbor {
            coord: Coord::new(1, 1),
            offset: (1, 1),
        };
        assert_eq!(rules.ignition_probability(&diagonal), 0.2);
    }
}
