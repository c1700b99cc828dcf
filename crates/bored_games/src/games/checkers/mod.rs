//! Checkers: board rules, stalemate refereeing, and the match wrapper.

mod board;
mod stalemate;

pub use board::{BOARD_SIZE, CheckersBoard, Color, MAX_MOVE_SET_LEN, Tile};
pub use stalemate::{DEFAULT_STALEMATE_THRESHOLD, StalemateReferee, TrackedMove};

use super::ActionReport;
use crate::{GameEvent, GameKind, MatchId, MatchSession, Player, ServiceError};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const SEATS: u8 = 2;

/// A checkers match session. Seat 1 plays white, seat 2 plays black.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckersMatch {
    session: MatchSession,
    board: CheckersBoard,
    #[serde(skip)]
    referee: StalemateReferee,
    active_player: u8,
    tokens_played: bool,
}

impl CheckersMatch {
    pub(crate) fn new(match_id: MatchId, players: Vec<Player>) -> Result<Self, ServiceError> {
        let seats = players.len() as u8;
        if seats != SEATS {
            return Err(ServiceError::WrongPlayerCount {
                kind: GameKind::Checkers,
                required: SEATS,
                proposed: seats,
            });
        }
        let session = MatchSession::new(match_id, GameKind::Checkers, SEATS, players);
        Ok(Self {
            session,
            board: CheckersBoard::new(),
            referee: StalemateReferee::default(),
            active_player: 1,
            tokens_played: false,
        })
    }

    /// Restores a match around an in-progress board, e.g. one rebuilt
    /// from a stored snapshot. Players still re-signal readiness before
    /// play resumes.
    pub fn resume(
        match_id: MatchId,
        players: Vec<Player>,
        board: CheckersBoard,
        active_player: u8,
    ) -> Result<Self, ServiceError> {
        let mut resumed = Self::new(match_id, players)?;
        resumed.board = board;
        resumed.active_player = if active_player == 2 { 2 } else { 1 };
        resumed.tokens_played = true;
        Ok(resumed)
    }

    pub(crate) fn session(&self) -> &MatchSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut MatchSession {
        &mut self.session
    }

    /// Wire view of the board.
    pub(crate) fn board_snapshot(&self) -> Vec<u8> {
        self.board.snapshot()
    }

    /// Seat number holding the turn.
    pub(crate) fn active_player_number(&self) -> u8 {
        self.active_player
    }

    /// True once any move has been committed in the current match.
    pub(crate) fn tokens_played(&self) -> bool {
        self.tokens_played
    }

    /// Plays a move chain for the named player.
    ///
    /// The chain is validated as a whole; any refusal, including
    /// playing out of turn, comes back as a single
    /// [`GameEvent::InvalidPlay`] carrying the authoritative board.
    /// After an accepted move the match checks for victory first, then
    /// for a stalemate, in that order, so a move that both strands the
    /// opponent and completes an oscillation wins.
    #[instrument(skip(self))]
    pub(crate) fn play_move_set(
        &mut self,
        username: &str,
        moves: &[u8],
    ) -> Result<ActionReport, ServiceError> {
        let player = self.session.player(username)?;
        let number = player.number();
        if !self.session.match_is_active()
            || number != self.active_player
            || !self.board.is_move_set_valid(moves, Self::color_of(number))
        {
            return Ok(ActionReport::events(self.rejection()));
        }

        let mover = Self::color_of(number);
        let crowned = self.board.apply_move_set(moves, mover);
        let crowned_square = moves[moves.len() - 1];
        self.tokens_played = true;
        self.session.note_turn(username);
        self.referee.track_move(moves);

        let victory = !self.board.has_remaining_moves(mover.opponent());
        let stalemate = !victory && self.referee.is_stalemate();
        let next_player_number = if victory || stalemate {
            None
        } else {
            self.active_player = self.active_player % 2 + 1;
            Some(self.active_player)
        };

        let mut events = vec![GameEvent::MovePlayed {
            moves: moves.to_vec(),
            next_player_number,
        }];
        if crowned {
            events.push(GameEvent::TokenKinged {
                board_index: crowned_square,
            });
        }
        if victory {
            self.session.attach_replay(self.board.snapshot());
            self.session.end_match_victory(username);
            events.push(GameEvent::MatchEnded {
                winner_number: Some(number),
            });
        } else if stalemate {
            self.session.attach_replay(self.board.snapshot());
            self.session.end_match_stalemate();
            events.push(GameEvent::MatchEnded { winner_number: None });
        }
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
            let winner_number = self.session.sole_contender().map(Player::number);
            self.session.attach_replay(self.board.snapshot());
            self.session.end_match_incomplete();
            events.push(GameEvent::MatchEnded { winner_number });
            let vote = self.session.cast_rematch_vote(username);
            events.push(super::rematch_event(vote, username));
        }
        Ok(ActionReport::events(events))
    }

    /// Sets up the opening position again; the offer's issuer moves
    /// first.
    pub(crate) fn reset_for_new_match(&mut self, first_player: u8) {
        self.board.reset();
        self.referee.clear();
        self.active_player = if first_player == 2 { 2 } else { 1 };
        self.tokens_played = false;
    }

    fn color_of(number: u8) -> Color {
        if number == 1 { Color::White } else { Color::Black }
    }

    fn rejection(&self) -> Vec<GameEvent> {
        vec![GameEvent::InvalidPlay {
            board: self.board.snapshot(),
            active_player_number: self.active_player,
        }]
    }
}
