//! Match wrappers: per-game rules glued to the shared session core.

pub mod checkers;
mod connect_four;

pub use checkers::CheckersMatch;
pub use connect_four::ConnectFourMatch;

use crate::{
    GameEvent, GameKind, MatchId, MatchOutcome, MatchSession, Player, ServiceError,
    session::RematchVote,
};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// What one action produced: notifications for the transport plus,
/// when the action closed the whole session, the archived outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    /// Notifications to broadcast, in order.
    pub events: Vec<GameEvent>,
    /// Present once the session has ended; carries everything the
    /// statistics layer needs.
    pub session_end: Option<SessionEnd>,
}

impl ActionReport {
    pub(crate) fn events(events: Vec<GameEvent>) -> Self {
        Self {
            events,
            session_end: None,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::events(Vec::new())
    }
}

/// Closing summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnd {
    /// Kind of game the session played.
    pub kind: GameKind,
    /// One archived record per match, in play order.
    pub outcomes: Vec<MatchOutcome>,
}

/// Current state of a match, shaped for a (re)joining client.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct MatchSnapshot {
    /// Identifier the match is registered under.
    match_id: MatchId,
    /// Kind of game being played.
    kind: GameKind,
    /// Wire view of the board, one byte per cell.
    board: Vec<u8>,
    /// Seat number holding the turn.
    active_player_number: u8,
    /// True once play has begun.
    started: bool,
    /// True while a match is in progress.
    match_is_active: bool,
    /// Every seat, departed players included.
    players: Vec<Player>,
}

/// One running match of any supported game.
///
/// The shared flows live here: readiness, departures, and rematch
/// voting read the same for every game. Play actions dispatch to the
/// wrapped game, and actions a game does not define are refused with
/// [`ServiceError::UnsupportedAction`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameMatch {
    /// A Connect Four session.
    ConnectFour(ConnectFourMatch),
    /// A checkers session.
    Checkers(CheckersMatch),
}

impl GameMatch {
    /// Creates a Connect Four match awaiting readiness.
    pub fn connect_four(match_id: MatchId, players: Vec<Player>) -> Result<Self, ServiceError> {
        ConnectFourMatch::new(match_id, players).map(GameMatch::ConnectFour)
    }

    /// Creates a checkers match awaiting readiness.
    pub fn checkers(match_id: MatchId, players: Vec<Player>) -> Result<Self, ServiceError> {
        CheckersMatch::new(match_id, players).map(GameMatch::Checkers)
    }

    /// Kind of game being played.
    pub fn kind(&self) -> GameKind {
        match self {
            GameMatch::ConnectFour(_) => GameKind::ConnectFour,
            GameMatch::Checkers(_) => GameKind::Checkers,
        }
    }

    /// The session state shared by every game.
    pub fn session(&self) -> &MatchSession {
        match self {
            GameMatch::ConnectFour(inner) => inner.session(),
            GameMatch::Checkers(inner) => inner.session(),
        }
    }

    /// Current state for a (re)joining client.
    pub fn snapshot(&self) -> MatchSnapshot {
        let session = self.session();
        MatchSnapshot {
            match_id: session.match_id().to_owned(),
            kind: self.kind(),
            board: self.board_snapshot(),
            active_player_number: self.active_player_number(),
            started: session.started(),
            match_is_active: session.match_is_active(),
            players: session.players().to_vec(),
        }
    }

    /// Flags a player ready (or not). The last readiness of the round
    /// starts play.
    #[instrument(skip(self))]
    pub fn mark_ready(&mut self, username: &str, ready: bool) -> Result<ActionReport, ServiceError> {
        let number = self.session().player(username)?.number();
        let started = self.session_mut().mark_ready(username, ready)?;
        let mut events = Vec::new();
        if ready {
            events.push(GameEvent::PlayerConnected {
                username: username.to_owned(),
                player_number: number,
            });
        }
        if started {
            events.push(GameEvent::GameStarted);
        }
        Ok(ActionReport::events(events))
    }

    /// True when walking away now would concede the match.
    pub fn cannot_leave_without_forfeiting(&self) -> bool {
        match self {
            GameMatch::ConnectFour(inner) => inner.session().match_is_active(),
            GameMatch::Checkers(inner) => {
                inner.session().match_is_active() && inner.tokens_played()
            }
        }
    }

    /// Removes a player for good: records the forfeit their departure
    /// implies, ends the session when too few players or no ready
    /// players remain, and otherwise settles any rematch vote their
    /// absence completes.
    ///
    /// Departing twice is a no-op, which also makes a stale forfeit
    /// timer firing after a purposeful exit harmless.
    #[instrument(skip(self))]
    pub fn player_left(
        &mut self,
        username: &str,
        is_timeout: bool,
    ) -> Result<ActionReport, ServiceError> {
        let player = self.session().player(username)?;
        let number = player.number();
        if player.has_left() {
            return Ok(ActionReport::empty());
        }
        let must_forfeit = self.cannot_leave_without_forfeiting();
        self.session_mut().mark_left(username)?;

        let mut events = Vec::new();
        if !is_timeout {
            events.push(GameEvent::PlayerDisconnected {
                username: username.to_owned(),
                player_number: number,
                timeout_seconds: 0,
            });
        }
        if must_forfeit {
            self.session_mut().record_forfeit(username);
            events.push(GameEvent::PlayerForfeited {
                username: username.to_owned(),
                player_number: number,
                is_timeout,
            });
        }

        let session_ends = !self.session().enough_players_remain()
            || !self.session().has_remaining_ready_players();
        if session_ends {
            let outcomes = self.session_mut().conclude();
            events.push(GameEvent::SessionEnded);
            return Ok(ActionReport {
                events,
                session_end: Some(SessionEnd {
                    kind: self.kind(),
                    outcomes,
                }),
            });
        }

        let (mut extra, session_end) = self.complete_rematch_if_ready();
        events.append(&mut extra);
        Ok(ActionReport {
            events,
            session_end,
        })
    }

    /// Registers agreement to a rematch. The first call after a match
    /// ends opens the offer; once every remaining player has agreed,
    /// boards reset and a new match begins with the offer's issuer
    /// moving first.
    #[instrument(skip(self))]
    pub fn accept_rematch(&mut self, username: &str) -> Result<ActionReport, ServiceError> {
        self.session().player(username)?;
        if !self.session().started() || self.session().match_is_active() {
            return Err(ServiceError::RematchUnavailable);
        }
        let vote = self.session_mut().cast_rematch_vote(username);
        let mut events = vec![rematch_event(vote, username)];
        let (mut extra, session_end) = self.complete_rematch_if_ready();
        events.append(&mut extra);
        Ok(ActionReport {
            events,
            session_end,
        })
    }

    /// Drops a token for the named player (Connect Four only).
    pub fn place_token(&mut self, username: &str, column: u8) -> Result<ActionReport, ServiceError> {
        match self {
            GameMatch::ConnectFour(inner) => inner.place_token(username, column),
            GameMatch::Checkers(_) => Err(ServiceError::UnsupportedAction {
                kind: GameKind::Checkers,
            }),
        }
    }

    /// Plays a move chain for the named player (checkers only).
    pub fn play_move_set(
        &mut self,
        username: &str,
        moves: &[u8],
    ) -> Result<ActionReport, ServiceError> {
        match self {
            GameMatch::Checkers(inner) => inner.play_move_set(username, moves),
            GameMatch::ConnectFour(_) => Err(ServiceError::UnsupportedAction {
                kind: GameKind::ConnectFour,
            }),
        }
    }

    /// Concedes the active match and opens a rematch offer.
    pub fn forfeit_and_rematch(&mut self, username: &str) -> Result<ActionReport, ServiceError> {
        match self {
            GameMatch::ConnectFour(inner) => inner.forfeit_and_rematch(username),
            GameMatch::Checkers(inner) => inner.forfeit_and_rematch(username),
        }
    }

    fn complete_rematch_if_ready(&mut self) -> (Vec<GameEvent>, Option<SessionEnd>) {
        if !self.session().rematch_complete() {
            return (Vec::new(), None);
        }
        if self.session().enough_players_remain() {
            let first_player = self.session().rematch_issuer_number().unwrap_or(1);
            self.session_mut().start_new_match();
            self.reset_for_new_match(first_player);
            (
                vec![GameEvent::BoardReset {
                    next_player_number: first_player,
                }],
                None,
            )
        } else {
            let outcomes = self.session_mut().conclude();
            (
                vec![GameEvent::SessionEnded],
                Some(SessionEnd {
                    kind: self.kind(),
                    outcomes,
                }),
            )
        }
    }

    fn reset_for_new_match(&mut self, first_player: u8) {
        match self {
            GameMatch::ConnectFour(inner) => inner.reset_for_new_match(first_player),
            GameMatch::Checkers(inner) => inner.reset_for_new_match(first_player),
        }
    }

    fn board_snapshot(&self) -> Vec<u8> {
        match self {
            GameMatch::ConnectFour(inner) => inner.board_snapshot(),
            GameMatch::Checkers(inner) => inner.board_snapshot(),
        }
    }

    fn active_player_number(&self) -> u8 {
        match self {
            GameMatch::ConnectFour(inner) => inner.active_player_number(),
            GameMatch::Checkers(inner) => inner.active_player_number(),
        }
    }

    fn session_mut(&mut self) -> &mut MatchSession {
        match self {
            GameMatch::ConnectFour(inner) => inner.session_mut(),
            GameMatch::Checkers(inner) => inner.session_mut(),
        }
    }
}

pub(crate) fn rematch_event(vote: RematchVote, username: &str) -> GameEvent {
    match vote {
        RematchVote::Offered => GameEvent::RematchOffered {
            username: username.to_owned(),
        },
        RematchVote::Accepted => GameEvent::RematchAccepted {
            username: username.to_owned(),
        },
    }
}
