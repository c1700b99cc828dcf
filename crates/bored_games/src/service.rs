//! The action surface: one front door for transports to drive matches
//! through, with timers and collaborator sinks wired in.

use crate::{
    EventSink, ForfeitScheduler, GameEvent, GameKind, GameRegistry, MatchId, MatchSnapshot,
    PlayerCountSource, ServiceError, StatisticsSink,
    games::{ActionReport, SessionEnd},
    registry::MatchHandle,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

struct ServiceCore {
    registry: GameRegistry,
    scheduler: ForfeitScheduler,
    events: Arc<dyn EventSink>,
    stats: Arc<dyn StatisticsSink>,
    lobby_counts: Arc<dyn PlayerCountSource>,
}

/// Coordinates every live match: creation, actions, forfeit timers,
/// and the hand-off of finished sessions to the statistics sink.
///
/// Synchronous actions return the notifications to broadcast; the
/// timer path publishes through the [`EventSink`] instead, since no
/// caller is waiting. Cloning the service clones a handle to the same
/// state.
#[derive(Clone)]
pub struct GameService {
    core: Arc<ServiceCore>,
}

impl GameService {
    /// Creates a service with the default forfeit grace period.
    pub fn new(
        events: Arc<dyn EventSink>,
        stats: Arc<dyn StatisticsSink>,
        lobby_counts: Arc<dyn PlayerCountSource>,
    ) -> Self {
        Self::with_forfeit_timeout(events, stats, lobby_counts, crate::DEFAULT_FORFEIT_TIMEOUT)
    }

    /// Creates a service with a custom forfeit grace period.
    pub fn with_forfeit_timeout(
        events: Arc<dyn EventSink>,
        stats: Arc<dyn StatisticsSink>,
        lobby_counts: Arc<dyn PlayerCountSource>,
        forfeit_timeout: Duration,
    ) -> Self {
        Self {
            core: Arc::new(ServiceCore {
                registry: GameRegistry::new(),
                scheduler: ForfeitScheduler::new(forfeit_timeout),
                events,
                stats,
                lobby_counts,
            }),
        }
    }

    /// Builds and registers a match of `kind` seating the given
    /// usernames, in order.
    pub fn create_match(
        &self,
        kind: GameKind,
        usernames: &[String],
    ) -> Result<MatchId, ServiceError> {
        let (match_id, _) = self.core.registry.create(kind, usernames)?;
        Ok(match_id)
    }

    /// Players of a kind across its lobby and its live matches.
    pub fn player_population(&self, kind: GameKind) -> usize {
        self.core.lobby_counts.waiting_players(kind)
            + self.core.registry.active_player_count(kind)
    }

    /// Current state of a match for a (re)joining client.
    pub fn snapshot(&self, match_id: &str) -> Result<MatchSnapshot, ServiceError> {
        let handle = self.handle(match_id)?;
        let snapshot = handle.lock().snapshot();
        Ok(snapshot)
    }

    /// Flags a player ready (or not). Readiness cancels any forfeit
    /// timer running against the player, so a reconnect within the
    /// grace period costs nothing.
    #[instrument(skip(self))]
    pub fn mark_ready(
        &self,
        match_id: &str,
        username: &str,
        ready: bool,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        let handle = self.handle(match_id)?;
        let report = handle.lock().mark_ready(username, ready)?;
        if ready {
            self.core.scheduler.cancel(match_id, username);
        }
        self.settle(match_id, report)
    }

    /// Drops a token for the named player (Connect Four matches).
    #[instrument(skip(self))]
    pub fn place_token(
        &self,
        match_id: &str,
        username: &str,
        column: u8,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        let handle = self.handle(match_id)?;
        let report = handle.lock().place_token(username, column)?;
        self.settle(match_id, report)
    }

    /// Plays a move chain for the named player (checkers matches).
    #[instrument(skip(self))]
    pub fn play_move_set(
        &self,
        match_id: &str,
        username: &str,
        moves: &[u8],
    ) -> Result<Vec<GameEvent>, ServiceError> {
        let handle = self.handle(match_id)?;
        let report = handle.lock().play_move_set(username, moves)?;
        self.settle(match_id, report)
    }

    /// Concedes the active match for the named player and opens a
    /// rematch offer.
    #[instrument(skip(self))]
    pub fn forfeit_and_rematch(
        &self,
        match_id: &str,
        username: &str,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        let handle = self.handle(match_id)?;
        let report = handle.lock().forfeit_and_rematch(username)?;
        self.settle(match_id, report)
    }

    /// Registers agreement to a rematch.
    #[instrument(skip(self))]
    pub fn accept_rematch(
        &self,
        match_id: &str,
        username: &str,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        let handle = self.handle(match_id)?;
        let report = handle.lock().accept_rematch(username)?;
        self.settle(match_id, report)
    }

    /// Handles a dropped connection. A mid-match disconnect starts the
    /// forfeit clock; a lobby-phase one just clears readiness. When
    /// `is_timeout` is false the player is leaving on purpose and is
    /// removed immediately instead.
    #[instrument(skip(self))]
    pub fn player_disconnected(
        &self,
        match_id: &str,
        username: &str,
        is_timeout: bool,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        if !is_timeout {
            return self.player_left(match_id, username);
        }
        let handle = self.handle(match_id)?;
        let mut schedule = false;
        let report = {
            let mut game_match = handle.lock();
            let number = game_match.session().player(username)?.number();
            let must_forfeit = game_match.cannot_leave_without_forfeiting();
            game_match.mark_ready(username, false)?;
            if game_match.session().has_remaining_ready_players() {
                schedule = must_forfeit;
                ActionReport::events(vec![GameEvent::PlayerDisconnected {
                    username: username.to_owned(),
                    player_number: number,
                    timeout_seconds: self.core.scheduler.timeout().as_secs(),
                }])
            } else {
                // Nobody left at the table; close out right away.
                game_match.player_left(username, true)?
            }
        };
        if schedule {
            self.schedule_forfeit(match_id, username);
        }
        self.settle(match_id, report)
    }

    /// Removes a player for good, forfeiting on their behalf when a
    /// match is in progress.
    #[instrument(skip(self))]
    pub fn player_left(
        &self,
        match_id: &str,
        username: &str,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        let handle = self.handle(match_id)?;
        self.core.scheduler.cancel(match_id, username);
        let report = handle.lock().player_left(username, false)?;
        self.settle(match_id, report)
    }

    fn handle(&self, match_id: &str) -> Result<MatchHandle, ServiceError> {
        self.core
            .registry
            .get(match_id)
            .ok_or_else(|| ServiceError::MatchNotFound {
                match_id: match_id.to_owned(),
            })
    }

    /// Applies an action's aftermath: when the session ended, outcomes
    /// flow to the statistics sink and the match leaves the registry.
    fn settle(
        &self,
        match_id: &str,
        report: ActionReport,
    ) -> Result<Vec<GameEvent>, ServiceError> {
        if let Some(end) = report.session_end {
            ServiceCore::record_session_end(&self.core, match_id, &end);
        }
        Ok(report.events)
    }

    fn schedule_forfeit(&self, match_id: &str, username: &str) {
        let core = Arc::clone(&self.core);
        let id = match_id.to_owned();
        let user = username.to_owned();
        self.core.scheduler.start(match_id, username, move || {
            ServiceCore::expire_forfeit(&core, &id, &user);
        });
    }
}

impl ServiceCore {
    /// Runs when a forfeit clock elapses unclaimed. Everything is
    /// re-checked under the match lock; a player who rejoined, already
    /// left, or whose match is gone makes this a quiet no-op.
    fn expire_forfeit(core: &Arc<ServiceCore>, match_id: &str, username: &str) {
        let Some(handle) = core.registry.get(match_id) else {
            debug!(match_id, "match gone before forfeit timeout fired");
            return;
        };
        let report = {
            let mut game_match = handle.lock();
            let player = match game_match.session().player(username) {
                Ok(player) => player,
                Err(error) => {
                    warn!(match_id, username, %error, "stale forfeit timeout");
                    return;
                }
            };
            if player.has_left() || player.is_ready() {
                debug!(match_id, username, "forfeit timeout no longer applies");
                return;
            }
            match game_match.player_left(username, true) {
                Ok(report) => report,
                Err(error) => {
                    warn!(match_id, username, %error, "stale forfeit timeout");
                    return;
                }
            }
        };
        info!(match_id, username, "player forfeited by timeout");
        for event in report.events {
            core.events.publish(match_id, event);
        }
        if let Some(end) = report.session_end {
            Self::record_session_end(core, match_id, &end);
        }
    }

    fn record_session_end(core: &Arc<ServiceCore>, match_id: &str, end: &SessionEnd) {
        for outcome in &end.outcomes {
            core.stats.record_outcome(end.kind, outcome);
        }
        core.registry.remove(match_id);
        info!(match_id, outcomes = end.outcomes.len(), "session closed");
    }
}
