//! Agent state machine: heading, body segments, growth, and self-collision.

use std::collections::VecDeque;

use snake_pilot_core::{CellCoord, Direction, GridSize};

/// The snake controlled by the player or the autopilot.
///
/// The body is never empty and its head is always the front segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    body: VecDeque<CellCoord>,
    heading: Direction,
    length: usize,
    score: u32,
}

impl Agent {
    /// Creates a single-segment agent at `head`.
    #[must_use]
    pub fn spawn(head: CellCoord, heading: Direction) -> Self {
        Self {
            body: VecDeque::from([head]),
            heading,
            length: 1,
            score: 0,
        }
    }

    /// Creates an agent from explicit segments, head first.
    ///
    /// The length matches the number of segments and the score starts at
    /// zero. Returns `None` when `segments` is empty.
    #[must_use]
    pub fn from_segments<I>(segments: I, heading: Direction) -> Option<Self>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let body: VecDeque<CellCoord> = segments.into_iter().collect();
        if body.is_empty() {
            return None;
        }

        Some(Self {
            length: body.len(),
            body,
            heading,
            score: 0,
        })
    }

    /// Cell occupied by the head.
    #[must_use]
    pub fn head(&self) -> CellCoord {
        self.body[0]
    }

    /// Body segments, head first.
    #[must_use]
    pub fn body(&self) -> &VecDeque<CellCoord> {
        &self.body
    }

    /// Heading used by the next [`advance`](Self::advance).
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }

    /// Number of segments the body settles at.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Goals consumed so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Requests a new heading.
    ///
    /// Reversing onto the segment behind the head is refused while the agent
    /// is longer than one segment. Returns `true` when the heading changed.
    pub fn turn(&mut self, direction: Direction) -> bool {
        if self.length > 1 && self.heading.is_opposite(direction) {
            return false;
        }

        let changed = self.heading != direction;
        self.heading = direction;
        changed
    }

    /// Moves the head one cell along the heading, wrapping across edges.
    ///
    /// Returns `true` on self-collision, in which case nothing is mutated. The
    /// segment right behind the head is exempt from the check since the same
    /// move vacates it. The tail is trimmed whenever the body exceeds the
    /// current length, so growth shows up as one skipped trim.
    pub fn advance(&mut self, grid: GridSize) -> bool {
        let Some(new_head) = grid.step_wrapped(self.head(), self.heading) else {
            return false;
        };

        if self.body.iter().skip(2).any(|segment| *segment == new_head) {
            return true;
        }

        self.body.push_front(new_head);
        if self.body.len() > self.length {
            let _ = self.body.pop_back();
        }
        false
    }

    /// Lengthens the agent by one segment and scores a point.
    pub fn grow(&mut self) {
        self.length += 1;
        self.score += 1;
    }
}
