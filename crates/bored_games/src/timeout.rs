//! Cancellable forfeit timers for disconnected players.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default grace period before an absent player forfeits.
pub const DEFAULT_FORFEIT_TIMEOUT: Duration = Duration::from_secs(60);

type TimeoutKey = (String, String);

/// Schedules forfeits for disconnected players and lets rejoins cancel
/// them.
///
/// Expiry claims its key atomically before acting, so a timer that
/// loses the race against a cancel, or against an earlier timer for
/// the same key, does nothing. Repeated starts for the same key do not
/// extend the clock.
#[derive(Debug, Clone)]
pub struct ForfeitScheduler {
    pending: Arc<Mutex<HashSet<TimeoutKey>>>,
    timeout: Duration,
}

impl ForfeitScheduler {
    /// Creates a scheduler with the given grace period.
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashSet::new())),
            timeout,
        }
    }

    /// The configured grace period.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forfeits currently pending, mostly for diagnostics.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Starts the clock for one player in one match. When the grace
    /// period elapses without a cancel, `on_expiry` runs on a runtime
    /// worker. Requires a tokio runtime.
    #[instrument(skip(self, on_expiry))]
    pub fn start<F>(&self, match_id: &str, username: &str, on_expiry: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let key = (match_id.to_owned(), username.to_owned());
        self.pending.lock().insert(key.clone());
        info!(match_id, username, "forfeit timeout started");

        let pending = Arc::clone(&self.pending);
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let claimed = pending.lock().remove(&key);
            if claimed {
                debug!(
                    match_id = %key.0,
                    username = %key.1,
                    "forfeit timeout expired"
                );
                on_expiry();
            }
        });
    }

    /// Cancels a pending forfeit; cancelling one that is not pending
    /// is a no-op.
    #[instrument(skip(self))]
    pub fn cancel(&self, match_id: &str, username: &str) {
        let removed = self
            .pending
            .lock()
            .remove(&(match_id.to_owned(), username.to_owned()));
        if removed {
            info!(match_id, username, "forfeit timeout cancelled");
        }
    }
}

impl Default for ForfeitScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FORFEIT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_expiry_runs_the_action_once() {
        let scheduler = ForfeitScheduler::new(Duration::from_secs(60));
        let fired = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&fired);
        scheduler.start("1", "ann", move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(scheduler.pending_count(), 1);

        // The paused clock jumps forward once every task is parked.
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_wins_the_race() {
        let scheduler = ForfeitScheduler::new(Duration::from_secs(60));
        let fired = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&fired);
        scheduler.start("1", "ann", move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel("1", "ann");

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_do_not_collide() {
        let scheduler = ForfeitScheduler::new(Duration::from_secs(60));
        let fired = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&fired);
        scheduler.start("1", "ann", move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel("1", "ben");
        scheduler.cancel("2", "ann");

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
