//! Registry of living trees
//!
//! Holds the metadata of every TREE cell. When a tree ignites it is removed
//! from the registry and handed to the fire that burns it.

use crate::core_types::{CellState, Coord, Timestep, Tree};
use crate::grid::CellGrid;
use rand::Rng;
use rustc_hash::FxHashMap;

/// Random draws tried before scanning for an empty cell
const PLANT_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct TreeRegistry {
    trees: FxHashMap<Coord, Tree>,
    burn_duration: u32,
}

impl TreeRegistry {
    pub fn new(burn_duration: u32) -> Self {
        TreeRegistry {
            trees: FxHashMap::default(),
            burn_duration,
        }
    }

    /// Number of living trees
    #[inline]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    #[inline]
    pub fn contains(&self, coord: Coord) -> bool {
        self.trees.contains_key(&coord)
    }

    pub fn get(&self, coord: Coord) -> Option<&Tree> {
        self.trees.get(&coord)
    }

    /// Living trees in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &Tree> {
        self.trees.values()
    }

    /// Plant a tree on a uniformly random EMPTY cell.
    ///
    /// Tries a bounded number of random draws first, then picks uniformly
    /// among all EMPTY cells. Returns `None` without touching anything when
    /// no EMPTY cell is left.
    pub fn plant<R: Rng + ?Sized>(
        &mut self,
        grid: &mut CellGrid,
        t: Timestep,
        rng: &mut R,
    ) -> Option<Coord> {
        let size = grid.size();
        for _ in 0..PLANT_ATTEMPTS {
            let coord = Coord::new(rng.random_range(0..size), rng.random_range(0..size));
            if grid.get(coord).is_plantable() {
                self.plant_at(grid, coord, t);
                return Some(coord);
            }
        }

        let empty: Vec<Coord> = grid
            .iter()
            .filter(|(_, state)| state.is_plantable())
            .map(|(coord, _)| coord)
            .collect();
        if empty.is_empty() {
            tracing::trace!(t, "No empty cell left to plant");
            return None;
        }
        let coord = empty[rng.random_range(0..empty.len())];
        self.plant_at(grid, coord, t);
        Some(coord)
    }

    /// Plant a tree at `coord` if the cell is EMPTY
    pub fn plant_at(&mut self, grid: &mut CellGrid, coord: Coord, t: Timestep) -> bool {
        if !grid.get(coord).is_plantable() {
            return false;
        }
        grid.set(coord, CellState::Tree);
        self.trees.insert(coord, Tree::new(coord, t, self.burn_duration));
        true
    }

    /// Remove the tree at `coord`, transferring ownership to the caller
    pub(crate) fn take(&mut self, coord: Coord) -> Option<Tree> {
        self.trees.remove(&coord)
    }
}
