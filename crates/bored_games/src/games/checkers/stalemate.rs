//! Oscillation detection for checkers stalemates.

use derive_new::new;
use std::collections::VecDeque;
use tracing::debug;

/// Default number of repeated simple moves per player before a match
/// is called: three trips out and back each.
pub const DEFAULT_STALEMATE_THRESHOLD: usize = 6;

/// One simple move, origin and destination squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct TrackedMove {
    origin: u8,
    destination: u8,
}

impl TrackedMove {
    /// True when `other` walks this move straight back.
    fn reverses(&self, other: &TrackedMove) -> bool {
        self.origin == other.destination && self.destination == other.origin
    }
}

/// Watches recent simple moves for both players shuffling between the
/// same squares.
///
/// The window holds the last `2 * threshold` simple moves, one stream
/// for both players since turns alternate. A chained move clears the
/// window outright: a capture changes the material balance and no
/// oscillation survives it.
#[derive(Debug, Clone)]
pub struct StalemateReferee {
    window: VecDeque<TrackedMove>,
    capacity: usize,
}

impl StalemateReferee {
    /// Creates a referee calling stalemate after `threshold` repeated
    /// moves per player.
    pub fn new(threshold: usize) -> Self {
        let capacity = threshold * 2;
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Feeds one accepted move chain. Simple moves enter the window,
    /// evicting the oldest entry once it is full; chained moves clear
    /// the window.
    pub fn track_move(&mut self, moves: &[u8]) {
        if moves.len() != 2 {
            debug!(len = moves.len(), "chained move, oscillation window cleared");
            self.window.clear();
            return;
        }
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(TrackedMove::new(moves[0], moves[1]));
    }

    /// True when the window is full and every entry undoes the same
    /// player's previous move, i.e. reverses the entry two places
    /// before it.
    pub fn is_stalemate(&self) -> bool {
        if self.capacity == 0 || self.window.len() < self.capacity {
            return false;
        }
        (2..self.window.len()).all(|index| self.window[index].reverses(&self.window[index - 2]))
    }

    /// Forgets all history, for a fresh match on the same board.
    pub fn clear(&mut self) {
        self.window.clear();
    }
}

impl Default for StalemateReferee {
    fn default() -> Self {
        Self::new(DEFAULT_STALEMATE_THRESHOLD)
    }
}
