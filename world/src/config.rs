//! Episode configuration shared by the world and its adapters.

use serde::{Deserialize, Serialize};
use snake_pilot_core::GridSize;
use snake_pilot_system_spawning::DEFAULT_PLACEMENT_ATTEMPTS;

const DEFAULT_OBSTACLE_COUNT: usize = 5;
const DEFAULT_SPAWN_SAFETY_RADIUS: u32 = 2;
const DEFAULT_SEED: u64 = 0x5eed_0f_5a4e;

/// Parameters used to set up every episode of a world.
///
/// Missing fields fall back to their defaults when deserialised, so partial
/// configuration files are accepted. Unknown fields are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Dimensions of the lattice.
    pub grid: GridSize,
    /// Number of obstacles placed per episode.
    pub obstacle_count: usize,
    /// Chebyshev radius around the spawn cell kept free of obstacles.
    pub spawn_safety_radius: u32,
    /// Random draws allowed per placement before giving up.
    pub placement_attempts: u32,
    /// Seed for every random choice made by the world.
    pub seed: u64,
}

impl WorldConfig {
    /// Creates a configuration with the provided grid, obstacle count, and seed.
    #[must_use]
    pub const fn new(grid: GridSize, obstacle_count: usize, seed: u64) -> Self {
        Self {
            grid,
            obstacle_count,
            spawn_safety_radius: DEFAULT_SPAWN_SAFETY_RADIUS,
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
            seed,
        }
    }

    /// Returns a copy with a different spawn safety radius.
    #[must_use]
    pub const fn with_spawn_safety_radius(mut self, radius: u32) -> Self {
        self.spawn_safety_radius = radius;
        self
    }

    /// Returns a copy with a different placement retry cap.
    #[must_use]
    pub const fn with_placement_attempts(mut self, attempts: u32) -> Self {
        self.placement_attempts = attempts;
        self
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(GridSize::default(), DEFAULT_OBSTACLE_COUNT, DEFAULT_SEED)
    }
}
