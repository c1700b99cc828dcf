//! Connection-game board: a flat grid of token slots with sequence detection.

use crate::Token;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Error raised for board access outside the configured grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Row or column lies outside the grid.
    #[display("slot ({row}, {column}) is outside a {rows}x{columns} board")]
    OutOfRange {
        /// Requested row.
        row: u8,
        /// Requested column.
        column: u8,
        /// Board height.
        rows: u8,
        /// Board width.
        columns: u8,
    },
    /// Sequence detection was asked about a cell nobody has played.
    #[display("slot ({row}, {column}) is vacant")]
    VacantSlot {
        /// Requested row.
        row: u8,
        /// Requested column.
        column: u8,
    },
}

/// Step directions across the grid. Row 0 is the bottom row, so "up"
/// adds a full row stride to the slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
    Up,
    Down,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::UpLeft => Direction::DownRight,
            Direction::UpRight => Direction::DownLeft,
            Direction::DownLeft => Direction::UpRight,
            Direction::DownRight => Direction::UpLeft,
        }
    }
}

/// One direction per axis is enough for sequence detection; the scan
/// covers the opposite direction itself.
const SCAN_DIRECTIONS: [Direction; 4] = [
    Direction::Left,
    Direction::DownLeft,
    Direction::Down,
    Direction::DownRight,
];

/// Rectangular board of token slots.
///
/// Slots are stored row-major with row 0 at the bottom: the cell at
/// (row, column) lives at index `row * columns + column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionBoard {
    slots: Vec<Token>,
    rows: u8,
    columns: u8,
    min_sequence_length: u8,
    played_count: usize,
}

impl ConnectionBoard {
    /// Creates an empty board. Dimensions must be at least 1x1 and the
    /// minimum sequence length at least 2.
    pub fn new(rows: u8, columns: u8, min_sequence_length: u8) -> Self {
        debug_assert!(rows > 0 && columns > 0 && min_sequence_length >= 2);
        Self {
            slots: vec![Token::Empty; rows as usize * columns as usize],
            rows,
            columns,
            min_sequence_length,
            played_count: 0,
        }
    }

    /// Board height.
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Board width.
    pub fn columns(&self) -> u8 {
        self.columns
    }

    /// Run length required to win on this board.
    pub fn min_sequence_length(&self) -> u8 {
        self.min_sequence_length
    }

    /// Number of non-vacant slots.
    pub fn played_count(&self) -> usize {
        self.played_count
    }

    /// All slots in index order.
    pub fn slots(&self) -> &[Token] {
        &self.slots
    }

    /// Wire view of the slots, one byte per cell.
    pub fn snapshot(&self) -> Vec<u8> {
        self.slots.iter().map(|&token| u8::from(token)).collect()
    }

    fn index(&self, row: u8, column: u8) -> Result<usize, BoardError> {
        if row >= self.rows || column >= self.columns {
            return Err(BoardError::OutOfRange {
                row,
                column,
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(row as usize * self.columns as usize + column as usize)
    }

    /// Token at the given cell.
    pub fn get(&self, row: u8, column: u8) -> Result<Token, BoardError> {
        Ok(self.slots[self.index(row, column)?])
    }

    /// Writes `token` at the given cell, keeping the played count equal
    /// to the number of non-vacant slots.
    pub fn set(&mut self, row: u8, column: u8, token: Token) -> Result<(), BoardError> {
        let index = self.index(row, column)?;
        let previous = self.slots[index];
        match (previous.is_empty(), token.is_empty()) {
            (true, false) => self.played_count += 1,
            (false, true) => self.played_count -= 1,
            _ => {}
        }
        self.slots[index] = token;
        Ok(())
    }

    /// True when the cell holds no token.
    pub fn is_vacant(&self, row: u8, column: u8) -> Result<bool, BoardError> {
        Ok(self.get(row, column)?.is_empty())
    }

    /// True when every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.played_count == self.slots.len()
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        self.slots.fill(Token::Empty);
        self.played_count = 0;
    }

    /// True when a run of at least the minimum sequence length passes
    /// through the given cell.
    ///
    /// For each axis the scan walks `min_sequence_length - 1` cells out
    /// (clamped at the edges), then sweeps back across up to
    /// `2 * min_sequence_length - 1` cells counting the longest
    /// contiguous run of the cell's token.
    #[instrument(skip(self))]
    pub fn has_sequence_through(&self, row: u8, column: u8) -> Result<bool, BoardError> {
        let origin = self.index(row, column)?;
        let target = self.slots[origin];
        if target.is_empty() {
            return Err(BoardError::VacantSlot { row, column });
        }
        let reach = self.min_sequence_length as usize - 1;
        let window = 2 * self.min_sequence_length as usize - 1;
        for direction in SCAN_DIRECTIONS {
            let start = self.walk(origin, direction, reach);
            let mut run = 0usize;
            let mut examined = 0usize;
            let mut cursor = Some(start);
            while let Some(slot) = cursor {
                if examined == window {
                    break;
                }
                examined += 1;
                run = if self.slots[slot] == target { run + 1 } else { 0 };
                if run >= self.min_sequence_length as usize {
                    return Ok(true);
                }
                cursor = self.step(slot, direction.opposite());
            }
        }
        Ok(false)
    }

    /// Neighbouring slot index one step away, `None` off the board.
    fn step(&self, index: usize, direction: Direction) -> Option<usize> {
        let columns = self.columns as usize;
        let can_left = index % columns > 0;
        let can_right = index % columns < columns - 1;
        let can_down = index >= columns;
        let can_up = index + columns < self.slots.len();
        match direction {
            Direction::Left => can_left.then(|| index - 1),
            Direction::Right => can_right.then(|| index + 1),
            Direction::Up => can_up.then(|| index + columns),
            Direction::Down => can_down.then(|| index - columns),
            Direction::UpLeft => (can_up && can_left).then(|| index + columns - 1),
            Direction::UpRight => (can_up && can_right).then(|| index + columns + 1),
            Direction::DownLeft => (can_down && can_left).then(|| index - columns - 1),
            Direction::DownRight => (can_down && can_right).then(|| index - columns + 1),
        }
    }

    /// Furthest slot reachable within `steps` moves in `direction`,
    /// stopping early at the board edge.
    fn walk(&self, index: usize, direction: Direction, steps: usize) -> usize {
        let mut current = index;
        for _ in 0..steps {
            match self.step(current, direction) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }
}
