//! Notifications the lifecycle layer hands to its transport.

use serde::{Deserialize, Serialize};

/// Notification raised by a match state transition.
///
/// Synchronous actions return these to the caller in broadcast order;
/// transitions driven by timers publish through an [`EventSink`]
/// instead. The transport decides how to fan them out, this layer only
/// decides what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A player connected, or reconnected, and signalled readiness.
    PlayerConnected {
        /// Who connected.
        username: String,
        /// Their seat number.
        player_number: u8,
    },
    /// A player's connection dropped or they departed.
    PlayerDisconnected {
        /// Who disconnected.
        username: String,
        /// Their seat number.
        player_number: u8,
        /// Seconds they have to return before forfeiting; zero when
        /// they are not coming back.
        timeout_seconds: u64,
    },
    /// A player forfeited the active match.
    PlayerForfeited {
        /// Who forfeited.
        username: String,
        /// Their seat number.
        player_number: u8,
        /// True when a reconnection window elapsed rather than the
        /// player conceding deliberately.
        is_timeout: bool,
    },
    /// Every player is ready; play begins.
    GameStarted,
    /// A token landed on a connection board.
    TokenPlayed {
        /// Seat number of the player who moved.
        player_number: u8,
        /// Row the token settled in.
        row: u8,
        /// Column the token settled in.
        column: u8,
        /// Seat number holding the next turn, absent when the match
        /// just ended.
        next_player_number: Option<u8>,
    },
    /// A checkers move chain was applied.
    MovePlayed {
        /// The accepted chain, origin square first.
        moves: Vec<u8>,
        /// Seat number holding the next turn, absent when the match
        /// just ended.
        next_player_number: Option<u8>,
    },
    /// A checkers piece was crowned.
    TokenKinged {
        /// Board square of the crowned piece.
        board_index: u8,
    },
    /// The match concluded.
    MatchEnded {
        /// Seat number of the winner, absent on a stalemate or draw.
        winner_number: Option<u8>,
    },
    /// A player proposed playing again.
    RematchOffered {
        /// Who proposed.
        username: String,
    },
    /// A player agreed to the proposed rematch.
    RematchAccepted {
        /// Who agreed.
        username: String,
    },
    /// Boards were cleared and a fresh match is underway.
    BoardReset {
        /// Seat number taking the first turn.
        next_player_number: u8,
    },
    /// The session is over; no further matches will be played.
    SessionEnded,
    /// A play was refused; the payload realigns the offending client.
    InvalidPlay {
        /// Authoritative board snapshot, one byte per cell.
        board: Vec<u8>,
        /// Seat number actually holding the turn.
        active_player_number: u8,
    },
}

/// Outbound channel for notifications raised outside any client call,
/// such as a forfeit timer firing.
pub trait EventSink: Send + Sync {
    /// Publishes one notification for the given match.
    fn publish(&self, match_id: &str, event: GameEvent);
}
