#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Snake Pilot engine.
//!
//! This crate defines the grid vocabulary and the message surface that
//! connects adapters, the authoritative world, and pure systems. Adapters
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing what happened during the tick.

use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};

/// Tick rate used while the score is zero.
pub const BASE_TICK_RATE: u32 = 10;

/// Upper bound applied to the tick rate regardless of score.
pub const MAX_TICK_RATE: u32 = 30;

/// Number of points required to raise the tick rate by one.
pub const POINTS_PER_SPEEDUP: u32 = 5;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Queues a manual turn that is applied on the next tick.
    Turn {
        /// Heading requested by the player.
        direction: Direction,
    },
    /// Flips the autopilot flag and discards any planned path.
    ToggleAutopilot,
    /// Reinitialises the agent, obstacles, goal, and plan together.
    Restart,
    /// Advances the simulation by one discrete step.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Announces that the autopilot flag changed.
    AutopilotToggled {
        /// Whether the autopilot is active after the toggle.
        enabled: bool,
    },
    /// Confirms that a fresh episode was set up.
    EpisodeReset,
    /// Reports the decision taken by the autopilot during a tick.
    Steered {
        /// Branch of the autopilot state machine that produced the intent.
        mode: SteeringMode,
        /// Heading requested by the autopilot, if any.
        direction: Option<Direction>,
    },
    /// Confirms that the agent's heading changed before moving.
    HeadingChanged {
        /// Heading in effect for the upcoming move.
        heading: Direction,
    },
    /// Confirms that the agent's head moved between two cells.
    AgentAdvanced {
        /// Cell the head occupied before moving.
        from: CellCoord,
        /// Cell the head occupies after moving.
        to: CellCoord,
    },
    /// Confirms that the agent consumed the goal.
    GoalConsumed {
        /// Cell that held the consumed goal.
        cell: CellCoord,
        /// Score after consuming the goal.
        score: u32,
    },
    /// Confirms that a goal was placed on the grid.
    GoalSpawned {
        /// Cell that now holds the goal.
        cell: CellCoord,
    },
    /// Announces that the episode reached a terminal state.
    EpisodeEnded {
        /// Reason the episode ended.
        cause: EpisodeOverCause,
    },
}

/// Reason an episode terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeOverCause {
    /// The head moved onto one of the agent's own trailing segments.
    SelfCollision,
    /// The head moved onto a static obstacle.
    Obstacle,
    /// The goal was reached but no free cell was left for the next one.
    BoardFull,
}

/// Branch taken by the autopilot when producing an intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteeringMode {
    /// An existing planned path supplied the next step.
    Following,
    /// A new path was planned this tick and supplied the next step.
    Replanned,
    /// No path exists; a locally safe neighbour was chosen.
    SafetyStep,
    /// No path exists and every neighbour is blocked.
    Stuck,
}

/// Cardinal movement directions available to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in the fixed expansion order used for tie-breaking.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the direction pointing the other way along the same axis.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether `other` is the exact reversal of `self`.
    #[must_use]
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Unit step `(column, row)` travelled when moving in this direction.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Maps a unit step back onto its direction.
    ///
    /// Returns `None` for the zero step and for anything that is not a single
    /// orthogonal move.
    #[must_use]
    pub const fn from_delta(column: i64, row: i64) -> Option<Self> {
        match (column, row) {
            (0, -1) => Some(Self::Up),
            (0, 1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            _ => None,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates,
    /// ignoring wrap-around.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Dimensions of the toroidal lattice the agent moves on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a grid with explicit dimensions.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Creates an `n` by `n` grid.
    #[must_use]
    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Cell at the centre of the grid, rounding down on even extents.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        CellCoord::new(self.columns / 2, self.rows / 2)
    }

    /// Reports whether the cell lies inside the fixed grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Offsets a cell by an arbitrary delta using modular arithmetic.
    ///
    /// Returns `None` only for a degenerate grid with a zero extent.
    #[must_use]
    pub fn offset_wrapped(&self, cell: CellCoord, column: i64, row: i64) -> Option<CellCoord> {
        if self.columns == 0 || self.rows == 0 {
            return None;
        }

        let column = wrap_axis(cell.column(), column, self.columns);
        let row = wrap_axis(cell.row(), row, self.rows);
        Some(CellCoord::new(column, row))
    }

    /// Neighbouring cell one step away, wrapping across the grid edges.
    #[must_use]
    pub fn step_wrapped(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        let (column, row) = direction.delta();
        self.offset_wrapped(cell, column, row)
    }

    /// Neighbouring cell one step away, or `None` when it leaves the fixed bounds.
    #[must_use]
    pub fn step_bounded(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        let next = match direction {
            Direction::Up => CellCoord::new(cell.column(), cell.row().checked_sub(1)?),
            Direction::Down => CellCoord::new(cell.column(), cell.row().checked_add(1)?),
            Direction::Left => CellCoord::new(cell.column().checked_sub(1)?, cell.row()),
            Direction::Right => CellCoord::new(cell.column().checked_add(1)?, cell.row()),
        };

        self.contains(next).then_some(next)
    }

    /// The four wrap-around neighbours in [`Direction::ALL`] order.
    pub fn wrapped_neighbors(
        &self,
        cell: CellCoord,
    ) -> impl Iterator<Item = (Direction, CellCoord)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| Some((direction, self.step_wrapped(cell, direction)?)))
    }

    /// The in-bounds neighbours in [`Direction::ALL`] order, without wrapping.
    pub fn bounded_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step_bounded(cell, direction))
    }

    /// Direction that moves `from` onto the adjacent cell `to`.
    ///
    /// A raw delta spanning the whole extent along an axis is treated as a
    /// wrap across that edge, so stepping from column `N-1` to column `0`
    /// resolves to [`Direction::Right`]. Returns `None` when the cells are not
    /// single-step neighbours on the torus.
    #[must_use]
    pub fn direction_between(&self, from: CellCoord, to: CellCoord) -> Option<Direction> {
        let column = normalize_wrapped_delta(
            i64::from(to.column()) - i64::from(from.column()),
            self.columns,
        );
        let row = normalize_wrapped_delta(i64::from(to.row()) - i64::from(from.row()), self.rows);
        Direction::from_delta(column, row)
    }

    /// Every cell within `radius` Chebyshev steps of `cell`, wrapping across edges.
    ///
    /// The radius is clamped per axis to half the extent, past which the band
    /// already spans the whole axis.
    #[must_use]
    pub fn chebyshev_neighborhood(&self, cell: CellCoord, radius: u32) -> Vec<CellCoord> {
        let column_reach = i64::from(radius.min(self.columns / 2));
        let row_reach = i64::from(radius.min(self.rows / 2));
        let mut seen = HashSet::new();
        let mut cells = Vec::new();
        for row in -row_reach..=row_reach {
            for column in -column_reach..=column_reach {
                if let Some(neighbor) = self.offset_wrapped(cell, column, row) {
                    if seen.insert(neighbor) {
                        cells.push(neighbor);
                    }
                }
            }
        }
        cells
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::square(20)
    }
}

/// Canonical representation of the goal cell the agent is steering toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Goal {
    cell: CellCoord,
}

impl Goal {
    /// Creates a goal anchored at the provided cell coordinate.
    #[must_use]
    pub const fn at(cell: CellCoord) -> Self {
        Self { cell }
    }

    /// Returns the cell that defines the goal.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }
}

/// Fixed set of static blocked cells generated once per episode.
///
/// Cells keep their placement order so snapshots are deterministic, while
/// membership checks go through a hash set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObstacleField {
    cells: Vec<CellCoord>,
    lookup: HashSet<CellCoord>,
}

impl ObstacleField {
    /// Builds a field from the provided cells, dropping duplicates.
    #[must_use]
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut field = Self::default();
        for cell in cells {
            if field.lookup.insert(cell) {
                field.cells.push(cell);
            }
        }
        field
    }

    /// Reports whether the cell is blocked by an obstacle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.lookup.contains(&cell)
    }

    /// Obstacle cells in placement order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Iterator over the obstacle cells in placement order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Number of obstacles in the field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the field holds no obstacles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn wrap_axis(value: u32, delta: i64, extent: u32) -> u32 {
    let extent = i64::from(extent);
    let wrapped = (i64::from(value) + delta).rem_euclid(extent);
    // rem_euclid keeps the value inside 0..extent, which always fits in u32.
    u32::try_from(wrapped).unwrap_or(0)
}

fn normalize_wrapped_delta(delta: i64, extent: u32) -> i64 {
    let span = i64::from(extent) - 1;
    if span > 1 && delta == span {
        -1
    } else if span > 1 && delta == -span {
        1
    } else {
        delta
    }
}

/// Ticks per second the external clock should run at for the given score.
///
/// The rate starts at [`BASE_TICK_RATE`], rises by one every
/// [`POINTS_PER_SPEEDUP`] points, and saturates at [`MAX_TICK_RATE`].
#[must_use]
pub fn tick_rate(score: u32) -> u32 {
    BASE_TICK_RATE
        .saturating_add(score / POINTS_PER_SPEEDUP)
        .min(MAX_TICK_RATE)
}

/// Wall-clock interval between ticks for the given score.
#[must_use]
pub fn tick_interval(score: u32) -> Duration {
    Duration::from_secs(1) / tick_rate(score)
}
