//! Per-match outcome accounting.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::Display;

/// How a match concluded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
pub enum MatchEnding {
    /// No move was ever committed; the match effectively never happened.
    #[default]
    None,
    /// The match ended before reaching a verdict, by forfeit or
    /// abandonment.
    Incomplete,
    /// Play finished with no winner.
    Stalemate,
    /// A player won outright.
    Victory,
}

/// Accounting record for one match within a session.
///
/// A session plays one or more matches back to back; each gets its own
/// record, finalized when the match ends and archived when the next one
/// starts. Records that never saw a move keep [`MatchEnding::None`] and
/// are skipped by the statistics layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MatchOutcome {
    /// How the match concluded.
    end_state: MatchEnding,
    /// Usernames of the winners.
    winning_players: BTreeSet<String>,
    /// Usernames of the losers.
    losing_players: BTreeSet<String>,
    /// Usernames that forfeited, deliberately or by timeout.
    forfeiting_players: BTreeSet<String>,
    /// Committed turns per username.
    turn_counts: BTreeMap<String, u32>,
    /// Opaque replay payload, empty when none was captured.
    replay_blob: Vec<u8>,
}

impl MatchOutcome {
    /// Creates an empty record for a match that has not started.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when at least one move was committed.
    pub fn moves_were_played(&self) -> bool {
        !self.turn_counts.is_empty()
    }

    /// True when a replay payload was attached.
    pub fn has_replay_data(&self) -> bool {
        !self.replay_blob.is_empty()
    }

    /// Counts one committed turn for the player. The first turn of a
    /// match promotes the ending from `None` to `Incomplete`, so an
    /// abandoned-but-played match is never mistaken for one that never
    /// happened.
    pub(crate) fn note_turn(&mut self, username: &str) {
        *self.turn_counts.entry(username.to_owned()).or_insert(0) += 1;
        if self.end_state == MatchEnding::None {
            self.end_state = MatchEnding::Incomplete;
        }
    }

    /// Records a forfeiture. Returns false when the player had already
    /// forfeited this match.
    pub(crate) fn record_forfeit(&mut self, username: &str) -> bool {
        self.forfeiting_players.insert(username.to_owned())
    }

    pub(crate) fn attach_replay(&mut self, blob: Vec<u8>) {
        self.replay_blob = blob;
    }

    pub(crate) fn finalize_victory(&mut self, winner: &str, everyone: &[String]) {
        self.end_state = MatchEnding::Victory;
        self.winning_players.insert(winner.to_owned());
        for name in everyone {
            if name != winner {
                self.losing_players.insert(name.clone());
            }
        }
    }

    pub(crate) fn finalize_stalemate(&mut self, everyone: &[String]) {
        self.end_state = MatchEnding::Stalemate;
        for name in everyone {
            self.losing_players.insert(name.clone());
        }
    }

    /// Ends the match without a verdict: the remaining contenders all
    /// take a loss.
    pub(crate) fn mark_incomplete(&mut self, remaining: &[String]) {
        self.end_state = MatchEnding::Incomplete;
        for name in remaining {
            self.losing_players.insert(name.clone());
        }
    }

    /// Settles the record when the session ends mid-match. A record
    /// with moves is already `Incomplete` and gets its loser set topped
    /// up; a record that never saw a move stays `None`.
    pub(crate) fn close_unfinished(&mut self, remaining: &[String]) {
        if self.end_state == MatchEnding::Incomplete {
            for name in remaining {
                self.losing_players.insert(name.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_turn_promotes_ending() {
        let mut outcome = MatchOutcome::new();
        assert_eq!(*outcome.end_state(), MatchEnding::None);

        outcome.note_turn("casey");
        assert_eq!(*outcome.end_state(), MatchEnding::Incomplete);
        assert!(outcome.moves_were_played());
        assert_eq!(outcome.turn_counts().get("casey"), Some(&1));

        outcome.note_turn("casey");
        assert_eq!(outcome.turn_counts().get("casey"), Some(&2));
    }

    #[test]
    fn test_victory_splits_winners_and_losers() {
        let everyone = vec!["casey".to_owned(), "drew".to_owned()];
        let mut outcome = MatchOutcome::new();
        outcome.note_turn("casey");
        outcome.finalize_victory("casey", &everyone);

        assert_eq!(*outcome.end_state(), MatchEnding::Victory);
        assert!(outcome.winning_players().contains("casey"));
        assert!(outcome.losing_players().contains("drew"));
        assert!(!outcome.losing_players().contains("casey"));
    }

    #[test]
    fn test_untouched_match_stays_none_at_close() {
        let mut outcome = MatchOutcome::new();
        outcome.close_unfinished(&["casey".to_owned()]);
        assert_eq!(*outcome.end_state(), MatchEnding::None);
        assert!(outcome.losing_players().is_empty());
    }

    #[test]
    fn test_forfeit_is_recorded_once() {
        let mut outcome = MatchOutcome::new();
        assert!(outcome.record_forfeit("casey"));
        assert!(!outcome.record_forfeit("casey"));
        assert_eq!(outcome.forfeiting_players().len(), 1);
    }
}
