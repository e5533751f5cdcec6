//! 2D cell-state grid with toroidal or bounded topology
//!
//! Every coordinate holds exactly one [`CellState`]. LAKE cells are written
//! once during terrain initialisation and refuse all later writes.

use crate::core_types::{CellState, Coord, Timestep};
use serde::{Deserialize, Serialize};

/// Orthogonal offsets in up, down, left, right order
const VON_NEUMANN_OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Orthogonal offsets followed by the four diagonals
const MOORE_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Edge behaviour of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Neighbours wrap modulo the side length
    #[default]
    Toroidal,
    /// Cells past the edge do not exist (fixed sentinel border)
    Bounded,
}

/// Which cells count as adjacent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// 4 orthogonal neighbours
    #[default]
    VonNeumann,
    /// 4 orthogonal plus 4 diagonal neighbours
    Moore,
}

impl Neighborhood {
    fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Neighborhood::VonNeumann => &VON_NEUMANN_OFFSETS,
            Neighborhood::Moore => &MOORE_OFFSETS,
        }
    }
}

/// A neighbouring cell and the unit offset leading to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub coord: Coord,
    /// `(dx, dy)` step from the source cell, each in `-1..=1`
    pub offset: (i32, i32),
}

impl Neighbor {
    /// Whether the step is diagonal
    #[inline]
    pub fn is_diagonal(&self) -> bool {
        self.offset.0 != 0 && self.offset.1 != 0
    }
}

/// Number of cells in each state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCensus {
    pub empty: usize,
    pub trees: usize,
    pub burning: usize,
    pub lakes: usize,
}

impl CellCensus {
    pub fn total(&self) -> usize {
        self.empty + self.trees + self.burning + self.lakes
    }
}

/// Square grid of cell states
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellGrid {
    size: usize,
    topology: Topology,
    neighborhood: Neighborhood,
    /// Row-major: `[y * size + x]`
    cells: Vec<CellState>,
}

impl CellGrid {
    /// Create an all-EMPTY grid of `size × size` cells
    pub fn new(size: usize, topology: Topology, neighborhood: Neighborhood) -> Self {
        CellGrid {
            size,
            topology,
            neighborhood,
            cells: vec![CellState::Empty; size * size],
        }
    }

    /// Side length
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    #[inline]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.size && coord.y < self.size
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize {
        debug_assert!(self.contains(coord), "{coord} outside {0}x{0} grid", self.size);
        coord.y * self.size + coord.x
    }

    /// Coordinate of a row-major index
    #[inline]
    pub fn coord_of(&self, index: usize) -> Coord {
        Coord::new(index % self.size, index / self.size)
    }

    /// State at `coord`. Panics if `coord` is outside the grid.
    #[inline]
    pub fn get(&self, coord: Coord) -> CellState {
        self.cells[self.index(coord)]
    }

    /// Write `state` at `coord`.
    ///
    /// Returns `false` (and leaves the cell untouched) when the cell is a lake
    /// or when `state` is [`CellState::Lake`]; lakes are only created through
    /// [`CellGrid::mark_lake`].
    pub fn set(&mut self, coord: Coord, state: CellState) -> bool {
        let idx = self.index(coord);
        if self.cells[idx] == CellState::Lake || state == CellState::Lake {
            return false;
        }
        self.cells[idx] = state;
        true
    }

    /// Permanently mark `coord` as lake. Returns `false` if it already was one.
    pub(crate) fn mark_lake(&mut self, coord: Coord) -> bool {
        let idx = self.index(coord);
        if self.cells[idx] == CellState::Lake {
            return false;
        }
        self.cells[idx] = CellState::Lake;
        true
    }

    #[inline]
    pub fn is_lake(&self, coord: Coord) -> bool {
        self.get(coord) == CellState::Lake
    }

    /// Apply a unit step under the grid topology
    pub fn offset(&self, coord: Coord, (dx, dy): (i32, i32)) -> Option<Coord> {
        let n = self.size as i64;
        let x = coord.x as i64 + i64::from(dx);
        let y = coord.y as i64 + i64::from(dy);
        match self.topology {
            Topology::Toroidal => Some(Coord::new(
                x.rem_euclid(n) as usize,
                y.rem_euclid(n) as usize,
            )),
            Topology::Bounded => {
                if (0..n).contains(&x) && (0..n).contains(&y) {
                    Some(Coord::new(x as usize, y as usize))
                } else {
                    None
                }
            }
        }
    }

    /// Neighbours of `coord` under the configured neighbourhood and topology.
    ///
    /// Bounded grids omit neighbours past the edge. On very small toroidal
    /// grids the same coordinate can be reached through two offsets.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Neighbor> + '_ {
        self.neighborhood
            .offsets()
            .iter()
            .filter_map(move |&offset| {
                self.offset(coord, offset)
                    .map(|coord| Neighbor { coord, offset })
            })
    }

    /// Number of cells currently in `state`
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&s| s == state).count()
    }

    pub fn census(&self) -> CellCensus {
        let mut census = CellCensus::default();
        for state in &self.cells {
            match state {
                CellState::Empty => census.empty += 1,
                CellState::Tree => census.trees += 1,
                CellState::Burning => census.burning += 1,
                CellState::Lake => census.lakes += 1,
            }
        }
        census
    }

    /// Row-major view of all cells
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// All coordinates in row-major order together with their state
    pub fn iter(&self) -> impl Iterator<Item = (Coord, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, &state)| (self.coord_of(idx), state))
    }

    /// Owned copy of the grid at timestep `t`
    pub fn snapshot(&self, timestep: Timestep) -> GridSnapshot {
        GridSnapshot {
            size: self.size,
            timestep,
            cells: self.cells.clone(),
        }
    }
}

/// Immutable copy of the grid for renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub size: usize,
    pub timestep: Timestep,
    /// Row-major: `[y * size + x]`
    pub cells: Vec<CellState>,
}

impl GridSnapshot {
    pub fn get(&self, coord: Coord) -> CellState {
        self.cells[coord.y * self.size + coord.x]
    }

    /// Numeric state codes, row-major
    pub fn codes(&self) -> Vec<u8> {
        self.cells.iter().map(|s| s.code()).collect()
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&s| s == state).count()
    }
}
