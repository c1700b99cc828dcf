//! The registry of live matches.

use crate::{GameInfo, GameKind, GameMatch, MatchId, Player, ServiceError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{info, instrument};

/// Shared handle to one live match; lock it to act on the match.
pub type MatchHandle = Arc<Mutex<GameMatch>>;

/// Owns every live match, keyed by a registry-assigned id.
///
/// Lock ordering: the registry lock is never held while a match lock
/// is taken, and vice versa. Lookups clone the handle out under the
/// registry lock and lock the match afterwards.
#[derive(Debug, Default)]
pub struct GameRegistry {
    matches: Mutex<HashMap<MatchId, MatchHandle>>,
    next_id: AtomicU32,
}

impl GameRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and registers a match of `kind` seating the given
    /// usernames, in order. Returns the new id and a handle.
    #[instrument(skip(self, usernames))]
    pub fn create(
        &self,
        kind: GameKind,
        usernames: &[String],
    ) -> Result<(MatchId, MatchHandle), ServiceError> {
        let info = GameInfo::for_kind(kind);
        if usernames.len() != usize::from(info.required_player_count()) {
            return Err(ServiceError::WrongPlayerCount {
                kind,
                required: info.required_player_count(),
                proposed: usernames.len() as u8,
            });
        }
        let players = usernames
            .iter()
            .enumerate()
            .map(|(seat, username)| Player::new(username.clone(), seat as u8 + 1))
            .collect();
        let match_id: MatchId = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let game_match = info.build(match_id.clone(), players)?;
        let handle = Arc::new(Mutex::new(game_match));
        self.matches.lock().insert(match_id.clone(), handle.clone());
        info!(%kind, match_id, "match registered");
        Ok((match_id, handle))
    }

    /// Handle to a live match, if it is still registered.
    pub fn get(&self, match_id: &str) -> Option<MatchHandle> {
        self.matches.lock().get(match_id).cloned()
    }

    /// Unregisters a match, usually because its session ended.
    pub fn remove(&self, match_id: &str) -> Option<MatchHandle> {
        let removed = self.matches.lock().remove(match_id);
        if removed.is_some() {
            info!(match_id, "match unregistered");
        }
        removed
    }

    /// Live matches currently registered.
    pub fn match_count(&self) -> usize {
        self.matches.lock().len()
    }

    /// Seated, non-departed players across all live matches of a kind.
    pub fn active_player_count(&self, kind: GameKind) -> usize {
        let handles: Vec<MatchHandle> = self.matches.lock().values().cloned().collect();
        handles
            .iter()
            .map(|handle| {
                let game_match = handle.lock();
                if game_match.kind() == kind {
                    game_match
                        .session()
                        .players()
                        .iter()
                        .filter(|player| !player.has_left())
                        .count()
                } else {
                    0
                }
            })
            .sum()
    }
}
