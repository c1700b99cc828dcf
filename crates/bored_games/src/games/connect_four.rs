//! Connect Four: gravity drops on the connection engine, wrapped in
//! the shared session lifecycle.

use super::ActionReport;
use crate::{GameEvent, GameKind, MatchId, MatchSession, Player, ServiceError};
use connect_x::{ConnectionGame, PlayOutcome, Token};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const BOARD_ROWS: u8 = 6;
const BOARD_COLUMNS: u8 = 7;
const WINNING_LENGTH: u8 = 4;

/// A Connect Four match session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectFourMatch {
    session: MatchSession,
    game: ConnectionGame,
}

impl ConnectFourMatch {
    pub(crate) fn new(match_id: MatchId, players: Vec<Player>) -> Result<Self, ServiceError> {
        let seats = players.len() as u8;
        let game = ConnectionGame::new(BOARD_ROWS, BOARD_COLUMNS, WINNING_LENGTH, seats)
            .map_err(|_| ServiceError::WrongPlayerCount {
                kind: GameKind::ConnectFour,
                required: 2,
                proposed: seats,
            })?;
        let session = MatchSession::new(match_id, GameKind::ConnectFour, seats, players);
        Ok(Self { session, game })
    }

    pub(crate) fn session(&self) -> &MatchSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut MatchSession {
        &mut self.session
    }

    /// Wire view of the board.
    pub(crate) fn board_snapshot(&self) -> Vec<u8> {
        self.game.snapshot()
    }

    /// Seat number holding the turn.
    pub(crate) fn active_player_number(&self) -> u8 {
        u8::from(self.game.active_player())
    }

    /// Drops a token into a column for the named player.
    ///
    /// Refusals of any kind come back as a single
    /// [`GameEvent::InvalidPlay`] carrying the authoritative board, so
    /// a confused client can fall back in line.
    #[instrument(skip(self))]
    pub(crate) fn place_token(
        &mut self,
        username: &str,
        column: u8,
    ) -> Result<ActionReport, ServiceError> {
        let player = self.session.player(username)?;
        let number = player.number();
        if !self.session.match_is_active() {
            return Ok(ActionReport::events(self.rejection()));
        }
        let outcome = self.game.play_gravity(Token::Player(number), column);
        let events = match outcome {
            PlayOutcome::Rejected(_) => self.rejection(),
            PlayOutcome::Played { row, column, next_player } => {
                self.session.note_turn(username);
                vec![GameEvent::TokenPlayed {
                    player_number: number,
                    row,
                    column,
                    next_player_number: Some(u8::from(next_player)),
                }]
            }
            PlayOutcome::Ended { row, column, winner } => {
                self.session.note_turn(username);
                self.session.attach_replay(self.game.snapshot());
                let winner_number = winner.map(u8::from);
                match winner_number {
                    Some(_) => self.session.end_match_victory(username),
                    None => self.session.end_match_stalemate(),
                }
                vec![
                    GameEvent::TokenPlayed {
                        player_number: number,
                        row,
                        column,
                        next_player_number: None,
                    },
                    GameEvent::MatchEnded { winner_number },
                ]
            }
        };
        Ok(ActionReport::events(events))
    }

    /// Concedes the active match and opens a rematch offer in the same
    /// breath.
    #[instrument(skip(self))]
    pub(crate) fn forfeit_and_rematch(
        &mut self,
        username: &str,
    ) -> Result<ActionReport, ServiceError> {
        let player = self.session.player(username)?;
        let number = player.number();
        if !self.session.match_is_active() {
            return Err(ServiceError::NoActiveMatch);
        }
        self.session.record_forfeit(username);
        let mut events = vec![GameEvent::PlayerForfeited {
            username: username.to_owned(),
            player_number: number,
            is_timeout: false,
        }];
        if self.session.contender_count() < 2 {
            // Two-player matches always resolve here; the engine names
            // the survivor for the closing display.
            let winner_number = match self.game.forfeit(Token::Player(number), false) {
                Ok(report) => Some(u8::from(report.winner)),
                Err(_) => self.session.sole_contender().map(Player::number),
            };
            self.session.attach_replay(self.game.snapshot());
            self.session.end_match_incomplete();
            events.push(GameEvent::MatchEnded { winner_number });
            let vote = self.session.cast_rematch_vote(username);
            events.push(super::rematch_event(vote, username));
        }
        Ok(ActionReport::events(events))
    }

    /// Clears the engine for a rematch; the offer's issuer moves first.
    pub(crate) fn reset_for_new_match(&mut self, first_player: u8) {
        self.game.reset(Token::Player(first_player));
    }

    fn rejection(&self) -> Vec<GameEvent> {
        vec![GameEvent::InvalidPlay {
            board: self.game.snapshot(),
            active_player_number: self.active_player_number(),
        }]
    }
}
