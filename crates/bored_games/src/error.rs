//! Protocol-misuse errors raised by the action surface.

use crate::GameKind;
use derive_more::{Display, Error};

/// Error for actions that cannot be applied as addressed.
///
/// Illegal plays are not errors: the match answers those with a
/// [`crate::GameEvent::InvalidPlay`] rejection so the offending client
/// can resynchronize. These variants cover callers addressing matches
/// or players that do not exist, or actions the addressed game cannot
/// accept at all.
#[derive(Debug, Clone, Display, Error)]
pub enum ServiceError {
    /// No match is registered under the given id.
    #[display("no match with id {match_id}")]
    MatchNotFound {
        /// The id that matched nothing.
        match_id: String,
    },
    /// The named player is not part of the addressed match.
    #[display("{username} is not part of this match")]
    UnknownPlayer {
        /// The username that matched no seat.
        username: String,
    },
    /// The action does not exist for the addressed game.
    #[display("{kind} does not support this action")]
    UnsupportedAction {
        /// Kind of the addressed game.
        kind: GameKind,
    },
    /// A rematch decision arrived with no finished match awaiting one.
    #[display("no finished match is awaiting a rematch decision")]
    RematchUnavailable,
    /// A forfeit arrived with no match in progress to concede.
    #[display("no match is in progress")]
    NoActiveMatch,
    /// Match creation with the wrong number of players.
    #[display("{kind} seats exactly {required} players, got {proposed}")]
    WrongPlayerCount {
        /// Kind of game requested.
        kind: GameKind,
        /// Seats the game defines.
        required: u8,
        /// Players actually proposed.
        proposed: u8,
    },
}
