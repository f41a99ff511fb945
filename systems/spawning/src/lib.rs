#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded spawning system that places obstacles, goals, and starting headings.
//!
//! Placement uses rejection sampling: uniformly random cells are drawn until one
//! satisfies the exclusion rules. Every placement is capped at a configurable
//! number of draws and reports [`PlacementExhausted`] instead of looping
//! forever on a crowded board.

use std::{collections::HashSet, fmt};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_pilot_core::{CellCoord, Direction, Goal, GridSize, ObstacleField};
use thiserror::Error;
use tracing::{debug, warn};

/// Default number of random draws allowed per placed cell.
pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 10_000;

/// Entity the spawner was trying to place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementKind {
    /// A static obstacle cell.
    Obstacle,
    /// The goal cell.
    Goal,
}

impl fmt::Display for PlacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Obstacle => write!(f, "obstacle"),
            Self::Goal => write!(f, "goal"),
        }
    }
}

/// Reported when rejection sampling runs out of attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("no free cell found for {kind} after {attempts} attempts ({placed} already placed)")]
pub struct PlacementExhausted {
    /// Entity that could not be placed.
    pub kind: PlacementKind,
    /// Number of random draws spent before giving up.
    pub attempts: u32,
    /// Number of entities of this kind placed before the failure.
    pub placed: usize,
}

/// Configuration parameters required to construct the spawner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    rng_seed: u64,
    max_attempts: u32,
}

impl Config {
    /// Creates a new configuration using the provided seed and retry cap.
    #[must_use]
    pub const fn new(rng_seed: u64, max_attempts: u32) -> Self {
        Self {
            rng_seed,
            max_attempts,
        }
    }
}

/// Seeded source of random placements.
#[derive(Clone, Debug)]
pub struct Spawner {
    rng: ChaCha8Rng,
    max_attempts: u32,
}

impl Spawner {
    /// Creates a new spawner using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            max_attempts: config.max_attempts,
        }
    }

    /// Uniformly random starting heading.
    pub fn random_heading(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }

    /// Places `count` obstacles avoiding `forbidden` and each other.
    ///
    /// A `count` larger than the free area fails once every free cell is taken
    /// and the retry cap runs out.
    pub fn generate_obstacles(
        &mut self,
        grid: GridSize,
        count: usize,
        forbidden: &HashSet<CellCoord>,
    ) -> Result<ObstacleField, PlacementExhausted> {
        let blocked = forbidden.iter().filter(|cell| grid.contains(**cell)).count() as u64;
        let free = usize::try_from(grid.area().saturating_sub(blocked)).unwrap_or(usize::MAX);
        let mut placed: Vec<CellCoord> = Vec::with_capacity(count.min(free));
        let mut taken: HashSet<CellCoord> = HashSet::with_capacity(count.min(free));

        while placed.len() < count {
            let cell = self
                .sample(grid, |cell| !forbidden.contains(&cell) && !taken.contains(&cell))
                .ok_or_else(|| self.exhausted(PlacementKind::Obstacle, placed.len()))?;
            let _ = taken.insert(cell);
            placed.push(cell);
        }

        debug!(count, "placed obstacles");
        Ok(ObstacleField::from_cells(placed))
    }

    /// Places a goal outside `occupied`, never reusing `previous`.
    pub fn spawn_goal(
        &mut self,
        grid: GridSize,
        occupied: &HashSet<CellCoord>,
        previous: Option<Goal>,
    ) -> Result<Goal, PlacementExhausted> {
        let previous = previous.map(|goal| goal.cell());
        let cell = self
            .sample(grid, |cell| !occupied.contains(&cell) && previous != Some(cell))
            .ok_or_else(|| self.exhausted(PlacementKind::Goal, 0))?;

        debug!(column = cell.column(), row = cell.row(), "goal spawned");
        Ok(Goal::at(cell))
    }

    fn sample<F>(&mut self, grid: GridSize, mut accept: F) -> Option<CellCoord>
    where
        F: FnMut(CellCoord) -> bool,
    {
        if grid.columns() == 0 || grid.rows() == 0 {
            return None;
        }

        for _ in 0..self.max_attempts {
            let cell = CellCoord::new(
                self.rng.gen_range(0..grid.columns()),
                self.rng.gen_range(0..grid.rows()),
            );
            if accept(cell) {
                return Some(cell);
            }
        }

        None
    }

    fn exhausted(&self, kind: PlacementKind, placed: usize) -> PlacementExhausted {
        warn!(%kind, attempts = self.max_attempts, placed, "placement retry cap reached");
        PlacementExhausted {
            kind,
            attempts: self.max_attempts,
            placed,
        }
    }
}
