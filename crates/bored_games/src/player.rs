//! Players and their per-session state.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A participant in a match session.
///
/// The username is the identity: equality and hashing consider nothing
/// else, so two values with the same username are interchangeable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    username: String,
    number: u8,
    ready: bool,
    left: bool,
}

impl Player {
    /// Creates a player on a 1-based seat number, not yet ready.
    pub fn new(username: impl Into<String>, number: u8) -> Self {
        Self {
            username: username.into(),
            number,
            ready: false,
            left: false,
        }
    }

    /// Account name identifying the player (case-sensitive).
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Seat number within the match, 1-based and stable for the whole
    /// session.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// True while the player is connected and has signalled readiness.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// True once the player has departed the session for good.
    pub fn has_left(&self) -> bool {
        self.left
    }

    /// Guest accounts carry a `#` marker in the username.
    pub fn is_guest(&self) -> bool {
        self.username.contains('#')
    }

    pub(crate) fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub(crate) fn mark_left(&mut self) {
        self.left = true;
        self.ready = false;
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.username.hash(state);
    }
}
