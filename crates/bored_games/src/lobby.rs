//! Matchmaking lobbies: who is waiting, who is ready, and when a
//! match fills.

use crate::{GameInfo, GameKind};
use tracing::{debug, info, instrument};

/// Headcount query answered by the lobby layer. The service combines
/// it with the registry's count to report a game's population.
pub trait PlayerCountSource: Send + Sync {
    /// Players currently waiting to enter a match of the given kind.
    fn waiting_players(&self, kind: GameKind) -> usize;
}

/// One game's waiting room.
///
/// Players join in arrival order and flag readiness independently; the
/// moment enough are ready at once, the earliest-ready group leaves
/// the room together as a formed match.
#[derive(Debug, Clone)]
pub struct GameLobby {
    kind: GameKind,
    required_players: u8,
    waiting: Vec<String>,
    ready: Vec<String>,
}

impl GameLobby {
    /// Creates an empty lobby; the seat count comes from the catalog.
    pub fn new(kind: GameKind) -> Self {
        Self {
            kind,
            required_players: GameInfo::for_kind(kind).required_player_count(),
            waiting: Vec::new(),
            ready: Vec::new(),
        }
    }

    /// Kind of game this lobby fills matches for.
    pub fn kind(&self) -> GameKind {
        self.kind
    }

    /// Players currently in the room.
    pub fn player_count(&self) -> usize {
        self.waiting.len()
    }

    /// Adds a player to the room; joining twice is a no-op.
    #[instrument(skip(self))]
    pub fn add_player(&mut self, username: &str) {
        if !self.waiting.iter().any(|name| name == username) {
            self.waiting.push(username.to_owned());
            debug!(kind = %self.kind, username, "player joined lobby");
        }
    }

    /// Removes a player from the room. Returns true when the room is
    /// now empty, which is the caller's cue to tear the lobby down.
    #[instrument(skip(self))]
    pub fn remove_player(&mut self, username: &str) -> bool {
        self.waiting.retain(|name| name != username);
        self.ready.retain(|name| name != username);
        let empty = self.waiting.is_empty();
        if empty {
            debug!(kind = %self.kind, "lobby emptied");
        }
        empty
    }

    /// Flags readiness for a waiting player. When this readiness
    /// completes a group, the group is removed from the room and
    /// returned in readiness order, first-ready seated first.
    #[instrument(skip(self))]
    pub fn mark_ready(&mut self, username: &str, ready: bool) -> Option<Vec<String>> {
        if !self.waiting.iter().any(|name| name == username) {
            return None;
        }
        if !ready {
            self.ready.retain(|name| name != username);
            return None;
        }
        if !self.ready.iter().any(|name| name == username) {
            self.ready.push(username.to_owned());
        }
        if self.ready.len() < usize::from(self.required_players) {
            return None;
        }
        let matched: Vec<String> = self
            .ready
            .drain(..usize::from(self.required_players))
            .collect();
        for name in &matched {
            self.waiting.retain(|waiting| waiting != name);
        }
        info!(kind = %self.kind, players = ?matched, "lobby formed a match");
        Some(matched)
    }
}

impl PlayerCountSource for parking_lot::Mutex<GameLobby> {
    fn waiting_players(&self, kind: GameKind) -> usize {
        let lobby = self.lock();
        if lobby.kind() == kind {
            lobby.player_count()
        } else {
            0
        }
    }
}
