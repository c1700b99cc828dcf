//! Checkers board state, move validation, and move application.
//!
//! Squares are indexed 0..64 with row 0 at the bottom. White opens on
//! rows 0..3 and advances toward row 7; black opens on rows 5..8 and
//! advances toward row 0. A move arrives as a chain of square indices,
//! origin first: two entries for a simple step, three or more for a
//! jump chain.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Side length of the board.
pub const BOARD_SIZE: u8 = 8;

/// Longest accepted move chain: an origin plus up to twelve jumps, one
/// per opposing piece on the board.
pub const MAX_MOVE_SET_LEN: usize = 13;

const SQUARE_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Standard opening squares for each side.
const WHITE_START: [u8; 12] = [0, 2, 4, 6, 9, 11, 13, 15, 16, 18, 20, 22];
const BLACK_START: [u8; 12] = [41, 43, 45, 47, 48, 50, 52, 54, 57, 59, 61, 63];

/// Wire-facing cell value, one byte per square in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Nobody's square.
    Empty,
    /// A white man.
    White,
    /// A crowned white piece.
    WhiteKing,
    /// A black man.
    Black,
    /// A crowned black piece.
    BlackKing,
}

impl Tile {
    /// Colour owning the tile, `None` when vacant.
    pub fn color(self) -> Option<Color> {
        match self {
            Tile::White | Tile::WhiteKing => Some(Color::White),
            Tile::Black | Tile::BlackKing => Some(Color::Black),
            Tile::Empty => None,
        }
    }

    /// True for crowned pieces, which may also move backward.
    pub fn is_king(self) -> bool {
        matches!(self, Tile::WhiteKing | Tile::BlackKing)
    }

    /// True when the tile holds a piece opposing `color`.
    pub fn is_opponent_of(self, color: Color) -> bool {
        self.color().is_some_and(|owner| owner != color)
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> Self {
        match tile {
            Tile::Empty => 0,
            Tile::White => 1,
            Tile::WhiteKing => 2,
            Tile::Black => 3,
            Tile::BlackKing => 4,
        }
    }
}

/// Piece colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Opens on the bottom rows, advances toward row 7.
    White,
    /// Opens on the top rows, advances toward row 0.
    Black,
}

impl Color {
    /// The opposing colour.
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row direction this colour's men advance in.
    fn forward(self) -> i16 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row on which this colour's men are crowned.
    fn promotion_row(self) -> i16 {
        match self {
            Color::White => i16::from(BOARD_SIZE) - 1,
            Color::Black => 0,
        }
    }

    fn king_tile(self) -> Tile {
        match self {
            Color::White => Tile::WhiteKing,
            Color::Black => Tile::BlackKing,
        }
    }
}

/// One piece: what it is and where it stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Piece {
    tile: Tile,
    square: u8,
}

/// Checkers board: per-colour piece lists with a derived tile view.
///
/// The tile array mirrors the piece lists at all times; every mutation
/// goes through helpers that keep the two in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckersBoard {
    #[serde(with = "tile_array")]
    tiles: [Tile; SQUARE_COUNT],
    white: Vec<Piece>,
    black: Vec<Piece>,
}

/// Serde plumbing for the tile array: serde's built-in array impls
/// stop at 32 elements, so the 64-square board spells out the same
/// fixed-length tuple format the derive would otherwise emit.
mod tile_array {
    use super::{SQUARE_COUNT, Tile};
    use serde::de::{Error, SeqAccess, Visitor};
    use serde::ser::SerializeTuple;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub(super) fn serialize<S>(
        tiles: &[Tile; SQUARE_COUNT],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(SQUARE_COUNT)?;
        for tile in tiles {
            tuple.serialize_element(tile)?;
        }
        tuple.end()
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<[Tile; SQUARE_COUNT], D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TileArrayVisitor;

        impl<'de> Visitor<'de> for TileArrayVisitor {
            type Value = [Tile; SQUARE_COUNT];

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an array of {SQUARE_COUNT} tiles")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut tiles = [Tile::Empty; SQUARE_COUNT];
                for (index, slot) in tiles.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| A::Error::invalid_length(index, &self))?;
                }
                Ok(tiles)
            }
        }

        deserializer.deserialize_tuple(SQUARE_COUNT, TileArrayVisitor)
    }
}

impl CheckersBoard {
    /// Creates a board with the standard opening layout.
    pub fn new() -> Self {
        let mut board = Self {
            tiles: [Tile::Empty; SQUARE_COUNT],
            white: Vec::with_capacity(WHITE_START.len()),
            black: Vec::with_capacity(BLACK_START.len()),
        };
        board.reset();
        board
    }

    /// Rebuilds a board from a tile view, e.g. a stored snapshot.
    pub fn from_tiles(tiles: [Tile; SQUARE_COUNT]) -> Self {
        let mut white = Vec::new();
        let mut black = Vec::new();
        for (index, &tile) in tiles.iter().enumerate() {
            let piece = Piece {
                tile,
                square: index as u8,
            };
            match tile.color() {
                Some(Color::White) => white.push(piece),
                Some(Color::Black) => black.push(piece),
                None => {}
            }
        }
        Self {
            tiles,
            white,
            black,
        }
    }

    /// Restores the standard opening layout.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.tiles = [Tile::Empty; SQUARE_COUNT];
        self.white.clear();
        self.black.clear();
        for &square in &WHITE_START {
            self.white.push(Piece {
                tile: Tile::White,
                square,
            });
            self.tiles[square as usize] = Tile::White;
        }
        for &square in &BLACK_START {
            self.black.push(Piece {
                tile: Tile::Black,
                square,
            });
            self.tiles[square as usize] = Tile::Black;
        }
    }

    /// Tile at a board square; out-of-range squares read as empty.
    pub fn tile(&self, square: u8) -> Tile {
        self.tiles
            .get(usize::from(square))
            .copied()
            .unwrap_or(Tile::Empty)
    }

    /// Wire view of the board, one byte per square.
    pub fn snapshot(&self) -> Vec<u8> {
        self.tiles.iter().map(|&tile| u8::from(tile)).collect()
    }

    /// Pieces the colour still owns.
    pub fn piece_count(&self, color: Color) -> usize {
        self.pieces(color).len()
    }

    /// Validates a whole move chain for the moving colour without
    /// touching the board.
    ///
    /// A chain passes when: it has two to [`MAX_MOVE_SET_LEN`] squares,
    /// all on the board; the origin holds one of the mover's pieces; it
    /// opens with a jump whenever any of the mover's pieces can capture;
    /// and every step lands on a vacant square along a diagonal of one
    /// (or, jumping an adjacent opponent, two) squares, forward unless
    /// the piece is crowned.
    #[instrument(skip(self))]
    pub fn is_move_set_valid(&self, moves: &[u8], mover: Color) -> bool {
        if moves.len() < 2 || moves.len() > MAX_MOVE_SET_LEN {
            debug!(len = moves.len(), "move chain length out of range");
            return false;
        }
        if moves.iter().any(|&square| usize::from(square) >= SQUARE_COUNT) {
            debug!("move chain leaves the board");
            return false;
        }
        if self.tile(moves[0]).is_opponent_of(mover) {
            debug!(origin = moves[0], "origin holds an opposing piece");
            return false;
        }
        if !Self::is_jump(moves[0], moves[1]) && self.any_capture_available(mover) {
            debug!("quiet move refused while a capture is available");
            return false;
        }
        let Some(piece) = self
            .pieces(mover)
            .iter()
            .find(|piece| piece.square == moves[0])
        else {
            debug!(origin = moves[0], "no piece at the move origin");
            return false;
        };
        let tile = piece.tile;
        moves
            .windows(2)
            .all(|step| self.step_is_legal(tile, step[0], step[1]))
    }

    /// Applies a validated move chain and reports whether the mover was
    /// crowned. Callers must validate with [`Self::is_move_set_valid`]
    /// first; the board trusts the chain.
    #[instrument(skip(self))]
    pub fn apply_move_set(&mut self, moves: &[u8], mover: Color) -> bool {
        for step in moves.windows(2) {
            if Self::is_jump(step[0], step[1]) {
                let mid_column = (Self::column(step[0]) + Self::column(step[1])) / 2;
                let mid_row = (Self::row(step[0]) + Self::row(step[1])) / 2;
                if let Some(captured) = Self::square_at(mid_column, mid_row) {
                    self.remove_piece(mover.opponent(), captured);
                }
            }
        }
        let origin = moves[0];
        let destination = moves[moves.len() - 1];
        self.relocate(mover, origin, destination)
    }

    /// True when the colour can still act: some piece has a vacant
    /// diagonal step or a capture open to it.
    pub fn has_remaining_moves(&self, color: Color) -> bool {
        self.pieces(color).iter().any(|piece| {
            let column = Self::column(piece.square);
            let row = Self::row(piece.square);
            for dy in Self::row_directions(piece.tile, color) {
                for dx in [-1, 1] {
                    if self.is_vacant(column + dx, row + dy) {
                        return true;
                    }
                }
            }
            self.piece_can_capture(piece)
        })
    }

    /// True when any piece of the colour can capture right now.
    pub fn any_capture_available(&self, color: Color) -> bool {
        self.pieces(color)
            .iter()
            .any(|piece| self.piece_can_capture(piece))
    }

    fn piece_can_capture(&self, piece: &Piece) -> bool {
        let Some(color) = piece.tile.color() else {
            return false;
        };
        let column = Self::column(piece.square);
        let row = Self::row(piece.square);
        for dy in Self::row_directions(piece.tile, color) {
            for dx in [-1, 1] {
                if self.tile_at(column + dx, row + dy).is_opponent_of(color)
                    && self.is_vacant(column + 2 * dx, row + 2 * dy)
                {
                    return true;
                }
            }
        }
        false
    }

    /// One legal step: vacant symmetric-diagonal destination, jumps
    /// clearing an adjacent opponent, men moving forward only.
    fn step_is_legal(&self, tile: Tile, origin: u8, destination: u8) -> bool {
        let Some(color) = tile.color() else {
            return false;
        };
        if self.tile(destination) != Tile::Empty {
            return false;
        }
        let dx = Self::column(destination) - Self::column(origin);
        let dy = Self::row(destination) - Self::row(origin);
        if dx == 0 || dx.abs() != dy.abs() || dx.abs() > 2 {
            return false;
        }
        if dx.abs() == 2 {
            let mid_column = Self::column(origin) + dx / 2;
            let mid_row = Self::row(origin) + dy / 2;
            if !self.tile_at(mid_column, mid_row).is_opponent_of(color) {
                return false;
            }
        }
        if !tile.is_king() && dy.signum() != color.forward() {
            return false;
        }
        true
    }

    /// Column distance over one marks a jump; simple steps and jumps
    /// are the only shapes validation lets through.
    fn is_jump(origin: u8, destination: u8) -> bool {
        (Self::column(origin) - Self::column(destination)).abs() > 1
    }

    fn row_directions(tile: Tile, color: Color) -> impl Iterator<Item = i16> {
        let forward = color.forward();
        let backward = if tile.is_king() { Some(-forward) } else { None };
        std::iter::once(forward).chain(backward)
    }

    fn remove_piece(&mut self, color: Color, square: u8) {
        let pieces = match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };
        match pieces.iter().position(|piece| piece.square == square) {
            Some(index) => {
                pieces.swap_remove(index);
                self.tiles[usize::from(square)] = Tile::Empty;
            }
            None => warn!(square, "no piece on the jumped square"),
        }
    }

    /// Moves a piece and crowns it when a man reaches the far row.
    fn relocate(&mut self, color: Color, origin: u8, destination: u8) -> bool {
        let pieces = match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };
        let Some(index) = pieces.iter().position(|piece| piece.square == origin) else {
            warn!(origin, "no piece at the move origin");
            return false;
        };
        let piece = &mut pieces[index];
        self.tiles[usize::from(origin)] = Tile::Empty;
        piece.square = destination;
        let mut crowned = false;
        if !piece.tile.is_king() && Self::row(destination) == color.promotion_row() {
            piece.tile = color.king_tile();
            crowned = true;
        }
        self.tiles[usize::from(destination)] = piece.tile;
        crowned
    }

    fn pieces(&self, color: Color) -> &[Piece] {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn column(square: u8) -> i16 {
        i16::from(square % BOARD_SIZE)
    }

    fn row(square: u8) -> i16 {
        i16::from(square / BOARD_SIZE)
    }

    fn square_at(column: i16, row: i16) -> Option<u8> {
        let side = i16::from(BOARD_SIZE);
        ((0..side).contains(&column) && (0..side).contains(&row))
            .then(|| (row * side + column) as u8)
    }

    fn tile_at(&self, column: i16, row: i16) -> Tile {
        match Self::square_at(column, row) {
            Some(square) => self.tiles[usize::from(square)],
            None => Tile::Empty,
        }
    }

    /// Off-board coordinates are not vacant.
    fn is_vacant(&self, column: i16, row: i16) -> bool {
        matches!(Self::square_at(column, row), Some(square) if self.tiles[usize::from(square)] == Tile::Empty)
    }
}

impl Default for CheckersBoard {
    fn default() -> Self {
        Self::new()
    }
}
