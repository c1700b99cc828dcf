//! Multiplayer board game sessions.
//!
//! This crate runs the server side of casual two-player board games:
//! Connect Four over the [`connect_x`] engine, and checkers with
//! compulsory captures and oscillation-based stalemate calls. Around
//! the rules it provides the whole match lifecycle: lobbies that form
//! matches from ready players, sessions with readiness and rematch
//! voting, forfeit timers for dropped connections, and per-match
//! outcome records that resolve into lifetime statistics.
//!
//! # Architecture
//!
//! - [`GameService`] is the front door. Transports call its actions
//!   and broadcast the [`GameEvent`]s that come back; timer-driven
//!   transitions publish through the [`EventSink`] instead.
//! - [`GameMatch`] wraps one running match of either game around the
//!   shared [`MatchSession`] state. Rules live with the game, the
//!   lifecycle lives in the session.
//! - [`GameRegistry`] owns live matches behind per-match locks;
//!   [`ForfeitScheduler`] runs the reconnection grace period.
//! - [`MatchOutcome`] records accumulate per match and fold into
//!   [`GameStatistic`] rows through a [`StatisticsSink`] when the
//!   session ends.
//!
//! # Example
//!
//! ```
//! use bored_games::{GameKind, GameMatch, Player};
//!
//! let players = vec![Player::new("ann", 1), Player::new("ben", 2)];
//! let mut game = GameMatch::connect_four("1".to_owned(), players)?;
//! game.mark_ready("ann", true)?;
//! game.mark_ready("ben", true)?;
//!
//! let report = game.place_token("ann", 3)?;
//! assert!(!report.events.is_empty());
//! assert_eq!(game.kind(), GameKind::ConnectFour);
//! # Ok::<(), bored_games::ServiceError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod events;
mod games;
mod info;
mod lobby;
mod outcome;
mod player;
mod registry;
mod service;
mod session;
mod stats;
mod timeout;

// Crate-level exports - errors and events
pub use error::ServiceError;
pub use events::{EventSink, GameEvent};

// Crate-level exports - the game catalog
pub use info::{CANONICAL_GAMES, GameInfo, GameKind};

// Crate-level exports - matches and rules
pub use games::checkers::{
    BOARD_SIZE, CheckersBoard, CheckersMatch, Color, DEFAULT_STALEMATE_THRESHOLD,
    MAX_MOVE_SET_LEN, StalemateReferee, Tile, TrackedMove,
};
pub use games::{ActionReport, ConnectFourMatch, GameMatch, MatchSnapshot, SessionEnd};

// Crate-level exports - lifecycle
pub use lobby::{GameLobby, PlayerCountSource};
pub use player::Player;
pub use registry::{GameRegistry, MatchHandle};
pub use service::GameService;
pub use session::{MatchId, MatchSession};
pub use timeout::{DEFAULT_FORFEIT_TIMEOUT, ForfeitScheduler};

// Crate-level exports - outcomes and statistics
pub use outcome::{MatchEnding, MatchOutcome};
pub use stats::{GameStatistic, MOVES_NOT_TRACKED, StatisticsSink, StatsMismatch};
