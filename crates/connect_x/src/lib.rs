//! Connection-game logic: boards, sequence detection, and turn order
//! for four-in-a-row style games.
//!
//! # Architecture
//!
//! - **Token**: cell values, `Empty` or a numbered player
//! - **Board**: flat row-major grid with a maintained played count and
//!   sequence detection through a just-played cell
//! - **Game**: turn enforcement, gravity drops, forfeit, reset
//!
//! The engine mutates only its own state and returns plain outcome
//! values; notifying players and keeping score belong to the caller.
//!
//! # Example
//!
//! ```
//! use connect_x::{ConnectionGame, PlayOutcome, Token};
//!
//! let mut game = ConnectionGame::new(6, 7, 4, 2).expect("two players");
//! match game.play_gravity(Token::Player(1), 3) {
//!     PlayOutcome::Played { row, column, .. } => {
//!         assert_eq!((row, column), (0, 3));
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod game;
mod token;

// Crate-level exports - Board geometry
pub use board::{BoardError, ConnectionBoard};

// Crate-level exports - Engine
pub use game::{ConnectionGame, ForfeitReport, GameError, InvalidPlay, PlayOutcome};

// Crate-level exports - Cell values
pub use token::Token;
