#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autopilot system that turns breadth-first plans into per-tick headings.
//!
//! Each tick the autopilot either follows the next cell of its planned path,
//! plans a fresh path to the goal, or, when the goal is unreachable, falls
//! back to a one-step safety heuristic over the wrap-around neighbours.

use std::collections::{HashSet, VecDeque};

use snake_pilot_core::{CellCoord, Direction, Goal, GridSize, ObstacleField, SteeringMode};
use snake_pilot_system_pathfinding::Pathfinder;
use tracing::debug;

/// Remaining cells the autopilot intends to visit, excluding the current head.
///
/// An empty plan means there is no active route.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlannedPath {
    steps: VecDeque<CellCoord>,
}

impl PlannedPath {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether there is no active route.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of cells left to visit.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Iterator over the remaining cells in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.steps.iter().copied()
    }

    /// Drops the active route.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    fn replace(&mut self, steps: Vec<CellCoord>) {
        self.steps = steps.into();
    }

    fn pop_front(&mut self) -> Option<CellCoord> {
        self.steps.pop_front()
    }
}

/// Read-only view of the state the autopilot steers from.
#[derive(Clone, Copy, Debug)]
pub struct AutopilotView<'a> {
    /// Dimensions of the lattice.
    pub grid: GridSize,
    /// Agent body segments, head first.
    pub body: &'a VecDeque<CellCoord>,
    /// Heading the agent will move in unless turned.
    pub heading: Direction,
    /// Target body length of the agent.
    pub length: usize,
    /// Cell the autopilot is trying to reach.
    pub goal: Goal,
    /// Static blocked cells.
    pub obstacles: &'a ObstacleField,
}

impl AutopilotView<'_> {
    fn head(&self) -> Option<CellCoord> {
        self.body.front().copied()
    }
}

/// Intent produced by the autopilot for a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Steering {
    /// Branch of the state machine that produced the intent.
    pub mode: SteeringMode,
    /// Heading to request from the agent, if any.
    pub direction: Option<Direction>,
}

impl Steering {
    const fn new(mode: SteeringMode, direction: Option<Direction>) -> Self {
        Self { mode, direction }
    }
}

/// Autopilot controller that owns a reusable search workspace.
#[derive(Clone, Debug, Default)]
pub struct Autopilot {
    pathfinder: Pathfinder,
}

impl Autopilot {
    /// Creates a new autopilot with an empty search workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces this tick's heading, updating `plan` in place.
    ///
    /// A non-empty plan supplies the next step. Otherwise a new path is
    /// searched, treating every body segment except the tail and every
    /// obstacle as blocked; when found it is adopted and its first step used
    /// on the same tick. When no path exists the safety heuristic picks a
    /// neighbour instead.
    pub fn steer(&mut self, view: &AutopilotView<'_>, plan: &mut PlannedPath) -> Steering {
        let Some(head) = view.head() else {
            plan.clear();
            return Steering::new(SteeringMode::Stuck, None);
        };

        if let Some(next) = plan.pop_front() {
            if let Some(direction) = view.grid.direction_between(head, next) {
                return Steering::new(SteeringMode::Following, Some(direction));
            }

            debug!(
                column = next.column(),
                row = next.row(),
                "planned step no longer adjacent to head, replanning"
            );
            plan.clear();
        }

        let blocked = planning_obstacles(view);
        let path = self
            .pathfinder
            .find_path(view.grid, head, view.goal.cell(), |cell| {
                blocked.contains(&cell) || view.obstacles.contains(cell)
            });

        if !path.is_empty() {
            debug!(steps = path.len(), "adopted path to goal");
            plan.replace(path);
            let direction = plan
                .pop_front()
                .and_then(|next| view.grid.direction_between(head, next));
            return Steering::new(SteeringMode::Replanned, direction);
        }

        match safety_step(view) {
            Some(direction) => {
                debug!(?direction, "goal unreachable, taking safety step");
                Steering::new(SteeringMode::SafetyStep, Some(direction))
            }
            None => {
                debug!("goal unreachable and no safe neighbour");
                Steering::new(SteeringMode::Stuck, None)
            }
        }
    }
}

/// Local fallback used when no path to the goal exists.
///
/// Considers the four wrap-around neighbours, rejecting any that hold a body
/// segment or obstacle. The reversal of the current heading is dropped when
/// the agent is longer than one segment and another candidate remains. The
/// current heading wins when it is safe; otherwise the first remaining
/// candidate in up, down, left, right order is chosen.
#[must_use]
pub fn safety_step(view: &AutopilotView<'_>) -> Option<Direction> {
    let head = view.head()?;
    let mut candidates: Vec<Direction> = view
        .grid
        .wrapped_neighbors(head)
        .filter(|(_, cell)| !view.body.contains(cell) && !view.obstacles.contains(*cell))
        .map(|(direction, _)| direction)
        .collect();

    let reversal = view.heading.opposite();
    if view.length > 1 && candidates.iter().any(|direction| *direction != reversal) {
        candidates.retain(|direction| *direction != reversal);
    }

    if candidates.contains(&view.heading) {
        Some(view.heading)
    } else {
        candidates.first().copied()
    }
}

fn planning_obstacles(view: &AutopilotView<'_>) -> HashSet<CellCoord> {
    let keep = if view.length > 1 {
        view.body.len().saturating_sub(1)
    } else {
        view.body.len()
    };

    view.body.iter().take(keep).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(cells: &[(u32, u32)]) -> VecDeque<CellCoord> {
        cells
            .iter()
            .map(|&(column, row)| CellCoord::new(column, row))
            .collect()
    }

    #[test]
    fn planning_obstacles_release_the_tail() {
        let body = body(&[(2, 2), (2, 3), (2, 4)]);
        let obstacles = ObstacleField::default();
        let view = AutopilotView {
            grid: GridSize::square(5),
            body: &body,
            heading: Direction::Up,
            length: 3,
            goal: Goal::at(CellCoord::new(0, 0)),
            obstacles: &obstacles,
        };

        let blocked = planning_obstacles(&view);
        assert!(blocked.contains(&CellCoord::new(2, 2)));
        assert!(blocked.contains(&CellCoord::new(2, 3)));
        assert!(!blocked.contains(&CellCoord::new(2, 4)));
    }

    #[test]
    fn planning_obstacles_keep_single_segment() {
        let body = body(&[(1, 1)]);
        let obstacles = ObstacleField::default();
        let view = AutopilotView {
            grid: GridSize::square(5),
            body: &body,
            heading: Direction::Up,
            length: 1,
            goal: Goal::at(CellCoord::new(0, 0)),
            obstacles: &obstacles,
        };

        assert_eq!(planning_obstacles(&view).len(), 1);
    }

    #[test]
    fn plan_helpers_track_remaining_steps() {
        let mut plan = PlannedPath::new();
        plan.replace(vec![CellCoord::new(0, 1), CellCoord::new(0, 2)]);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.pop_front(), Some(CellCoord::new(0, 1)));
        assert_eq!(plan.iter().collect::<Vec<_>>(), vec![CellCoord::new(0, 2)]);
        plan.clear();
        assert!(plan.is_empty());
    }
}
