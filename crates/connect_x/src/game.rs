//! Connection-game engine: turn order, placement, forfeit, reset.

use crate::{ConnectionBoard, Token};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Error for engine operations invoked outside their defined domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// Connection games need at least two players.
    #[display("a connection game needs at least two players, got {player_count}")]
    NotEnoughPlayers {
        /// Requested player count.
        player_count: u8,
    },
    /// Forfeit resolution is defined for two-player games only.
    #[display("forfeit is undefined for a {player_count}-player game")]
    ForfeitUndefined {
        /// Player count of the running game.
        player_count: u8,
    },
}

/// Details of a refused placement. Nothing on the board changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidPlay {
    /// Token that tried to play.
    pub attempted: Token,
    /// Row the placement aimed at. A full-column gravity drop reports
    /// the board's row count here.
    pub row: u8,
    /// Column the placement aimed at.
    pub column: u8,
    /// Token already occupying the contested cell, if any.
    pub occupant: Token,
    /// True when the refusal was (also) a turn-order violation.
    pub out_of_turn: bool,
}

/// Result of a placement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayOutcome {
    /// The placement was refused; the board is untouched.
    Rejected(InvalidPlay),
    /// Token placed, game continues.
    Played {
        /// Row the token landed on.
        row: u8,
        /// Column the token landed on.
        column: u8,
        /// Player whose turn comes next.
        next_player: Token,
    },
    /// Token placed and the game is over.
    Ended {
        /// Row the token landed on.
        row: u8,
        /// Column the token landed on.
        column: u8,
        /// The placing player when the move completed a sequence,
        /// `None` when it merely filled the board.
        winner: Option<Token>,
    },
}

/// Report of a resolved forfeit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForfeitReport {
    /// The player awarded the win.
    pub winner: Token,
    /// First player of the follow-up game when the board was cleared.
    pub next_first_player: Option<Token>,
}

/// Turn-based connection game over a [`ConnectionBoard`].
///
/// Every mutation returns a plain value the caller can forward or act
/// on; the engine itself notifies nobody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionGame {
    board: ConnectionBoard,
    active_player: Token,
    is_active: bool,
    player_count: u8,
}

impl ConnectionGame {
    /// Creates a game on a fresh board. Player 1 moves first.
    #[instrument]
    pub fn new(
        rows: u8,
        columns: u8,
        min_sequence_length: u8,
        player_count: u8,
    ) -> Result<Self, GameError> {
        if player_count < 2 {
            return Err(GameError::NotEnoughPlayers { player_count });
        }
        info!(rows, columns, min_sequence_length, player_count, "new connection game");
        Ok(Self {
            board: ConnectionBoard::new(rows, columns, min_sequence_length),
            active_player: Token::Player(1),
            is_active: true,
            player_count,
        })
    }

    /// The board being played on.
    pub fn board(&self) -> &ConnectionBoard {
        &self.board
    }

    /// Player whose turn it is. Unchanged once the game ends.
    pub fn active_player(&self) -> Token {
        self.active_player
    }

    /// True while moves are still legal.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Number of participating players.
    pub fn player_count(&self) -> u8 {
        self.player_count
    }

    /// Wire view of the board for client resync.
    pub fn snapshot(&self) -> Vec<u8> {
        self.board.snapshot()
    }

    /// Places `token` at an exact cell.
    ///
    /// Refused without mutation when the game is over, it is not the
    /// token's turn, the cell is outside the board, or the cell is
    /// occupied. A winning sequence takes precedence over filling the
    /// board: a move that does both is a win.
    #[instrument(skip(self))]
    pub fn play_at(&mut self, token: Token, row: u8, column: u8) -> PlayOutcome {
        if !self.is_active {
            warn!(?token, "placement after game end");
            return PlayOutcome::Rejected(self.refusal(token, row, column));
        }
        if token != self.active_player {
            warn!(?token, active = ?self.active_player, "placement out of turn");
            return PlayOutcome::Rejected(self.refusal(token, row, column));
        }
        match self.board.is_vacant(row, column) {
            Ok(true) => {}
            Ok(false) => {
                warn!(row, column, "cell already occupied");
                return PlayOutcome::Rejected(self.refusal(token, row, column));
            }
            Err(error) => {
                warn!(%error, "placement outside the board");
                return PlayOutcome::Rejected(self.refusal(token, row, column));
            }
        }
        if self.board.set(row, column, token).is_err() {
            return PlayOutcome::Rejected(self.refusal(token, row, column));
        }
        let won = matches!(self.board.has_sequence_through(row, column), Ok(true));
        if won || self.board.is_full() {
            self.is_active = false;
            let winner = won.then_some(token);
            info!(?winner, row, column, "connection game over");
            return PlayOutcome::Ended { row, column, winner };
        }
        self.active_player = self.player_after(token);
        debug!(?token, row, column, next = ?self.active_player, "token placed");
        PlayOutcome::Played {
            row,
            column,
            next_player: self.active_player,
        }
    }

    /// Drops `token` into a column, landing on the lowest vacant row.
    ///
    /// A full or out-of-range column is refused without mutation, with
    /// the attempted row reported as the board's row count.
    #[instrument(skip(self))]
    pub fn play_gravity(&mut self, token: Token, column: u8) -> PlayOutcome {
        if column < self.board.columns() {
            for row in 0..self.board.rows() {
                if matches!(self.board.is_vacant(row, column), Ok(true)) {
                    return self.play_at(token, row, column);
                }
            }
        }
        warn!(?token, column, "no vacant slot in column");
        PlayOutcome::Rejected(InvalidPlay {
            attempted: token,
            row: self.board.rows(),
            column,
            occupant: Token::Empty,
            out_of_turn: token != self.active_player,
        })
    }

    /// Resolves a forfeit by `token`, defined for two-player games only.
    ///
    /// The other player wins and the game deactivates. With `clear_board`
    /// the board is reset immediately and the forfeiting player takes the
    /// first turn of the follow-up game.
    #[instrument(skip(self))]
    pub fn forfeit(&mut self, token: Token, clear_board: bool) -> Result<ForfeitReport, GameError> {
        if self.player_count != 2 {
            return Err(GameError::ForfeitUndefined {
                player_count: self.player_count,
            });
        }
        self.is_active = false;
        let winner = match token {
            Token::Player(1) => Token::Player(2),
            _ => Token::Player(1),
        };
        info!(forfeited = ?token, ?winner, "game forfeited");
        let next_first_player = clear_board.then(|| {
            self.reset(token);
            token
        });
        Ok(ForfeitReport {
            winner,
            next_first_player,
        })
    }

    /// Clears the board and starts a fresh game with `first_player` to
    /// move.
    #[instrument(skip(self))]
    pub fn reset(&mut self, first_player: Token) {
        self.board.clear();
        self.active_player = first_player;
        self.is_active = true;
        info!(?first_player, "board reset");
    }

    fn player_after(&self, token: Token) -> Token {
        match token {
            Token::Player(number) if number < self.player_count => Token::Player(number + 1),
            _ => Token::Player(1),
        }
    }

    fn refusal(&self, token: Token, row: u8, column: u8) -> InvalidPlay {
        InvalidPlay {
            attempted: token,
            row,
            column,
            occupant: self.board.get(row, column).unwrap_or(Token::Empty),
            out_of_turn: token != self.active_player,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> ConnectionGame {
        ConnectionGame::new(6, 7, 4, 2).unwrap()
    }

    #[test]
    fn test_rejects_single_player_game() {
        assert!(matches!(
            ConnectionGame::new(6, 7, 4, 1),
            Err(GameError::NotEnoughPlayers { player_count: 1 })
        ));
    }

    #[test]
    fn test_out_of_turn_rejected_without_mutation() {
        let mut game = game();
        let outcome = game.play_at(Token::Player(2), 0, 0);
        match outcome {
            PlayOutcome::Rejected(invalid) => {
                assert!(invalid.out_of_turn);
                assert_eq!(invalid.occupant, Token::Empty);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(game.board().played_count(), 0);
        assert_eq!(game.active_player(), Token::Player(1));
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut game = game();
        assert!(matches!(
            game.play_at(Token::Player(1), 0, 0),
            PlayOutcome::Played { .. }
        ));
        let outcome = game.play_at(Token::Player(2), 0, 0);
        match outcome {
            PlayOutcome::Rejected(invalid) => {
                assert_eq!(invalid.occupant, Token::Player(1));
                assert!(!invalid.out_of_turn);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_turn_cycles_and_wraps() {
        let mut game = ConnectionGame::new(6, 7, 4, 3).unwrap();
        assert!(matches!(
            game.play_at(Token::Player(1), 0, 0),
            PlayOutcome::Played { next_player: Token::Player(2), .. }
        ));
        assert!(matches!(
            game.play_at(Token::Player(2), 0, 1),
            PlayOutcome::Played { next_player: Token::Player(3), .. }
        ));
        assert!(matches!(
            game.play_at(Token::Player(3), 0, 2),
            PlayOutcome::Played { next_player: Token::Player(1), .. }
        ));
    }

    #[test]
    fn test_gravity_stacks_upward() {
        let mut game = game();
        assert!(matches!(
            game.play_gravity(Token::Player(1), 3),
            PlayOutcome::Played { row: 0, column: 3, .. }
        ));
        assert!(matches!(
            game.play_gravity(Token::Player(2), 3),
            PlayOutcome::Played { row: 1, column: 3, .. }
        ));
    }

    #[test]
    fn test_gravity_full_column_reports_row_count() {
        let mut game = ConnectionGame::new(2, 2, 2, 2).unwrap();
        // Fill column 0 without ending the game.
        assert!(matches!(
            game.play_gravity(Token::Player(1), 0),
            PlayOutcome::Played { .. }
        ));
        assert!(matches!(
            game.play_gravity(Token::Player(2), 0),
            PlayOutcome::Played { .. }
        ));
        let outcome = game.play_gravity(Token::Player(1), 0);
        match outcome {
            PlayOutcome::Rejected(invalid) => {
                assert_eq!(invalid.row, 2);
                assert_eq!(invalid.occupant, Token::Empty);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_win_takes_precedence_over_full_board() {
        // The ninth placement completes a column and fills the board at
        // the same time; it must count as a win, not a draw.
        let mut game = ConnectionGame::new(3, 3, 3, 2).unwrap();
        let moves = [
            (Token::Player(1), 0, 0),
            (Token::Player(2), 0, 1),
            (Token::Player(1), 0, 2),
            (Token::Player(2), 1, 0),
            (Token::Player(1), 1, 2),
            (Token::Player(2), 1, 1),
            (Token::Player(1), 2, 1),
            (Token::Player(2), 2, 0),
        ];
        for (token, row, column) in moves {
            assert!(matches!(
                game.play_at(token, row, column),
                PlayOutcome::Played { .. }
            ));
        }
        let outcome = game.play_at(Token::Player(1), 2, 2);
        assert!(matches!(
            outcome,
            PlayOutcome::Ended { winner: Some(Token::Player(1)), .. }
        ));
        assert!(game.board().is_full());
        assert!(!game.is_active());
    }

    #[test]
    fn test_game_deactivates_on_end() {
        let mut game = ConnectionGame::new(2, 2, 2, 2).unwrap();
        assert!(matches!(
            game.play_at(Token::Player(1), 0, 0),
            PlayOutcome::Played { .. }
        ));
        assert!(matches!(
            game.play_at(Token::Player(2), 0, 1),
            PlayOutcome::Played { .. }
        ));
        // Player 1's second token pairs vertically and ends the game.
        assert!(matches!(
            game.play_at(Token::Player(1), 1, 0),
            PlayOutcome::Ended { winner: Some(Token::Player(1)), .. }
        ));
        assert!(!game.is_active());
        assert_eq!(game.active_player(), Token::Player(1));
        // Nobody can keep playing after the end, the winner included.
        assert!(matches!(
            game.play_at(Token::Player(1), 1, 1),
            PlayOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_forfeit_awards_other_player() {
        let mut game = game();
        let report = game.forfeit(Token::Player(1), false).unwrap();
        assert_eq!(report.winner, Token::Player(2));
        assert_eq!(report.next_first_player, None);
        assert!(!game.is_active());
    }

    #[test]
    fn test_forfeit_with_clear_hands_first_turn_to_forfeiter() {
        let mut game = game();
        assert!(matches!(
            game.play_at(Token::Player(1), 0, 0),
            PlayOutcome::Played { .. }
        ));
        let report = game.forfeit(Token::Player(2), true).unwrap();
        assert_eq!(report.winner, Token::Player(1));
        assert_eq!(report.next_first_player, Some(Token::Player(2)));
        assert!(game.is_active());
        assert_eq!(game.board().played_count(), 0);
        assert_eq!(game.active_player(), Token::Player(2));
    }

    #[test]
    fn test_forfeit_undefined_beyond_two_players() {
        let mut game = ConnectionGame::new(6, 7, 4, 3).unwrap();
        assert!(matches!(
            game.forfeit(Token::Player(1), false),
            Err(GameError::ForfeitUndefined { player_count: 3 })
        ));
    }
}
