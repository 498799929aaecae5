use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::api::types::Symbol;

/// Cardinal navigation directions for grid cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Grid offset as (column, row), rows growing downward.
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        self.delta().y == 0
    }
}

/// Discrete input events the puzzles understand.
/// Key-down only: there is no release or analog input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuzzleInput {
    /// "Play symbol i" (sequence puzzle pads).
    Symbol(Symbol),
    /// Move a cursor one cell.
    Navigate(Direction),
    /// Select / trigger.
    Confirm,
    /// Abandon the puzzle.
    Cancel,
}

/// A queue of puzzle inputs.
/// The host writes events as they arrive; the runner hands them to the
/// dispatcher once per frame and then clears the queue.
pub struct InputQueue {
    events: Vec<PuzzleInput>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: PuzzleInput) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<PuzzleInput> {
        std::mem::take(&mut self.events)
    }

    /// Pending events, oldest first, without consuming them.
    pub fn as_slice(&self) -> &[PuzzleInput] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
