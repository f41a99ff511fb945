#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first path search over the fixed-bounds grid.
//!
//! The search ignores wrap-around: candidate cells must lie
//! inside the grid extent even though runtime movement is toroidal. Results
//! depend only on the start, target, grid dimensions, and blocked predicate.

use std::collections::VecDeque;

use snake_pilot_core::{CellCoord, GridSize};

/// Reusable breadth-first search workspace.
///
/// The buffers are recycled between calls to avoid reallocating on every
/// tick; no information leaks from one search into the next.
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    parents: Vec<Option<CellCoord>>,
    visited: Vec<bool>,
    queue: VecDeque<CellCoord>,
}

impl Pathfinder {
    /// Creates an empty search workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortest 4-connected path from `start` to `target`.
    ///
    /// The returned cells exclude `start` and end at `target`. Neighbours are
    /// expanded in up, down, left, right order so equal-length routes always
    /// resolve the same way. The start cell is never tested against
    /// `is_blocked`. An empty vector means the target is unreachable, lies out
    /// of bounds, or equals the start.
    pub fn find_path<F>(
        &mut self,
        grid: GridSize,
        start: CellCoord,
        target: CellCoord,
        mut is_blocked: F,
    ) -> Vec<CellCoord>
    where
        F: FnMut(CellCoord) -> bool,
    {
        if start == target || !grid.contains(start) || !grid.contains(target) {
            return Vec::new();
        }

        let Some(width) = usize::try_from(grid.columns()).ok() else {
            return Vec::new();
        };
        let Some(cell_count) = usize::try_from(grid.area()).ok() else {
            return Vec::new();
        };

        self.reset(cell_count);

        let Some(start_index) = index(width, start) else {
            return Vec::new();
        };
        self.visited[start_index] = true;
        self.queue.push_back(start);

        while let Some(cell) = self.queue.pop_front() {
            if cell == target {
                return self.reconstruct(width, start, target);
            }

            for neighbor in grid.bounded_neighbors(cell) {
                let Some(neighbor_index) = index(width, neighbor) else {
                    continue;
                };

                if self.visited[neighbor_index] || is_blocked(neighbor) {
                    continue;
                }

                self.visited[neighbor_index] = true;
                self.parents[neighbor_index] = Some(cell);
                self.queue.push_back(neighbor);
            }
        }

        Vec::new()
    }

    fn reset(&mut self, cell_count: usize) {
        self.queue.clear();
        if self.visited.len() != cell_count {
            self.visited = vec![false; cell_count];
            self.parents = vec![None; cell_count];
        } else {
            self.visited.fill(false);
            self.parents.fill(None);
        }
    }

    fn reconstruct(&self, width: usize, start: CellCoord, target: CellCoord) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut cursor = target;

        while cursor != start {
            path.push(cursor);
            let Some(parent) = index(width, cursor).and_then(|offset| self.parents[offset]) else {
                return Vec::new();
            };
            cursor = parent;
        }

        path.reverse();
        path
    }
}

/// Convenience wrapper that runs a single search with a fresh workspace.
pub fn find_path<F>(
    grid: GridSize,
    start: CellCoord,
    target: CellCoord,
    is_blocked: F,
) -> Vec<CellCoord>
where
    F: FnMut(CellCoord) -> bool,
{
    Pathfinder::new().find_path(grid, start, target, is_blocked)
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
