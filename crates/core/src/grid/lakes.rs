//! Lake terrain generation
//!
//! Lakes are grown once, before any tree is planted, by self-avoiding random
//! walks from a handful of seed cells. Each lake aims for
//! `L² · proportion / lake_count` cells. A walk that traps itself (every
//! neighbour already water, or the edge of a bounded grid) hands the rest of
//! its quota to a row-major scan of the grid.

use crate::core_types::{CellState, Coord};
use crate::grid::CellGrid;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of lakes grown when not configured
pub const DEFAULT_LAKE_COUNT: usize = 5;

/// Attempts at drawing a dry seed cell before falling back to a scan
const SEED_ATTEMPTS: usize = 32;

fn default_lake_count() -> usize {
    DEFAULT_LAKE_COUNT
}

/// Lake terrain parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LakeConfig {
    /// Target fraction of the grid covered by water (0-1)
    pub proportion: f64,
    /// Number of separate lakes
    #[serde(default = "default_lake_count")]
    pub lake_count: usize,
}

impl LakeConfig {
    pub fn new(proportion: f64) -> Self {
        LakeConfig {
            proportion,
            lake_count: DEFAULT_LAKE_COUNT,
        }
    }

    /// Cells each lake tries to cover on a grid with `cell_count` cells
    pub fn cells_per_lake(&self, cell_count: usize) -> usize {
        if self.lake_count == 0 {
            return 0;
        }
        ((cell_count as f64 * self.proportion) / self.lake_count as f64).floor() as usize
    }
}

/// Outcome of lake generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LakeSummary {
    /// Lake cells marked in total
    pub marked: usize,
    /// Of those, cells placed by the fallback scan
    pub scan_filled: usize,
    /// Lakes whose walk got trapped before reaching the quota
    pub trapped_walks: usize,
}

/// Grow `config.lake_count` lakes on `grid`
pub fn generate_lakes<R: Rng + ?Sized>(
    grid: &mut CellGrid,
    config: &LakeConfig,
    rng: &mut R,
) -> LakeSummary {
    let target = config.cells_per_lake(grid.cell_count());
    let mut summary = LakeSummary::default();
    if target == 0 {
        return summary;
    }

    for lake in 0..config.lake_count {
        let walked = random_walk(grid, target, rng);
        summary.marked += walked;

        if walked < target {
            summary.trapped_walks += 1;
            let filled = scan_fill(grid, target - walked);
            summary.marked += filled;
            summary.scan_filled += filled;
            tracing::warn!(
                lake,
                walked,
                filled,
                target,
                "Lake walk trapped, filled remainder by grid scan"
            );
        }
    }

    tracing::debug!(
        lakes = config.lake_count,
        marked = summary.marked,
        scan_filled = summary.scan_filled,
        "Generated lakes"
    );
    summary
}

/// Self-avoiding walk marking up to `target` cells. Returns cells marked.
fn random_walk<R: Rng + ?Sized>(grid: &mut CellGrid, target: usize, rng: &mut R) -> usize {
    let Some(mut current) = pick_seed(grid, rng) else {
        return 0;
    };
    grid.mark_lake(current);
    let mut marked = 1;

    let mut candidates: Vec<Coord> = Vec::with_capacity(8);
    while marked < target {
        candidates.clear();
        candidates.extend(
            grid.neighbors(current)
                .map(|n| n.coord)
                .filter(|&c| !grid.is_lake(c)),
        );
        // Tiny toroidal grids can list one cell twice
        candidates.dedup();
        if candidates.is_empty() {
            break;
        }
        current = candidates[rng.random_range(0..candidates.len())];
        grid.mark_lake(current);
        marked += 1;
    }
    marked
}

/// Random dry cell, or the first dry cell in scan order if the draws keep
/// landing in water
fn pick_seed<R: Rng + ?Sized>(grid: &CellGrid, rng: &mut R) -> Option<Coord> {
    let size = grid.size();
    for _ in 0..SEED_ATTEMPTS {
        let coord = Coord::new(rng.random_range(0..size), rng.random_range(0..size));
        if !grid.is_lake(coord) {
            return Some(coord);
        }
    }
    grid.iter()
        .find(|&(_, state)| state != CellState::Lake)
        .map(|(coord, _)| coord)
}

/// Mark the first `quota` dry cells in row-major order
fn scan_fill(grid: &mut CellGrid, quota: usize) -> usize {
    let dry: Vec<Coord> = grid
        .iter()
        .filter(|&(_, state)| state != CellState::Lake)
        .map(|(coord, _)| coord)
        .take(quota)
        .collect();
    for &coord in &dry {
        grid.mark_lake(coord);
    }
    dry.len()
}
