//! Lifetime per-player statistics and outcome application.

use crate::{GameKind, MatchEnding, MatchOutcome};
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Sentinel meaning turn counts were never tracked for this record.
pub const MOVES_NOT_TRACKED: i64 = -1;

/// Error merging records that describe different players or games.
#[derive(Debug, Clone, Display, Error)]
#[display("cannot merge statistics for {mine_username}/{mine_game} with {other_username}/{other_game}")]
pub struct StatsMismatch {
    /// Username on the receiving record.
    pub mine_username: String,
    /// Game on the receiving record.
    pub mine_game: GameKind,
    /// Username on the incoming record.
    pub other_username: String,
    /// Game on the incoming record.
    pub other_game: GameKind,
}

/// One player's lifetime results in one game.
///
/// Counters resolve from a finalized [`MatchOutcome`] via
/// [`Self::apply_outcome`]. `moves_played` starts at
/// [`MOVES_NOT_TRACKED`] and only becomes meaningful once a match with
/// tracked turns is applied, which keeps records from the era before
/// turn tracking distinguishable from genuinely zero-move records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct GameStatistic {
    username: String,
    game: GameKind,
    #[new(default)]
    play_count: u32,
    #[new(default)]
    wins: u32,
    #[new(default)]
    losses: u32,
    #[new(default)]
    stalemates: u32,
    #[new(default)]
    forfeitures: u32,
    #[new(default)]
    incomplete_count: u32,
    #[new(value = "MOVES_NOT_TRACKED")]
    moves_played: i64,
}

impl GameStatistic {
    /// Username the record belongs to.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Game the record covers.
    pub fn game(&self) -> GameKind {
        self.game
    }

    /// Matches counted into this record.
    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    /// Outright wins.
    pub fn wins(&self) -> u32 {
        self.wins
    }

    /// Outright losses, forfeit losses included.
    pub fn losses(&self) -> u32 {
        self.losses
    }

    /// Matches that ended with no winner.
    pub fn stalemates(&self) -> u32 {
        self.stalemates
    }

    /// Matches this player forfeited.
    pub fn forfeitures(&self) -> u32 {
        self.forfeitures
    }

    /// Matches abandoned without this player forfeiting.
    pub fn incomplete_count(&self) -> u32 {
        self.incomplete_count
    }

    /// Total committed turns, or [`MOVES_NOT_TRACKED`].
    pub fn moves_played(&self) -> i64 {
        self.moves_played
    }

    /// Folds one finalized outcome into the record.
    ///
    /// Outcomes that never saw a move ([`MatchEnding::None`]) are
    /// ignored entirely; they do not even bump the play count.
    pub fn apply_outcome(&mut self, outcome: &MatchOutcome) {
        match outcome.end_state() {
            MatchEnding::None => return,
            MatchEnding::Victory => {
                if outcome.winning_players().contains(self.username.as_str()) {
                    self.wins += 1;
                } else if outcome.losing_players().contains(self.username.as_str()) {
                    self.losses += 1;
                }
            }
            MatchEnding::Stalemate => self.stalemates += 1,
            MatchEnding::Incomplete => {
                if outcome.forfeiting_players().contains(self.username.as_str()) {
                    self.forfeitures += 1;
                } else {
                    self.incomplete_count += 1;
                }
            }
        }
        self.play_count += 1;
        if let Some(&turns) = outcome.turn_counts().get(self.username.as_str()) {
            self.add_moves(i64::from(turns));
        }
    }

    /// Adds another record for the same player and game, e.g. when
    /// buffered results flush into a stored row.
    pub fn merge(&mut self, other: &GameStatistic) -> Result<(), StatsMismatch> {
        if self.username != other.username || self.game != other.game {
            return Err(StatsMismatch {
                mine_username: self.username.clone(),
                mine_game: self.game,
                other_username: other.username.clone(),
                other_game: other.game,
            });
        }
        self.play_count += other.play_count;
        self.wins += other.wins;
        self.losses += other.losses;
        self.stalemates += other.stalemates;
        self.forfeitures += other.forfeitures;
        self.incomplete_count += other.incomplete_count;
        self.add_moves(other.moves_played);
        Ok(())
    }

    /// Re-keys the record to another account, used when a guest's
    /// results transfer onto the account they registered.
    pub fn into_account(self, username: impl Into<String>) -> GameStatistic {
        GameStatistic {
            username: username.into(),
            ..self
        }
    }

    fn add_moves(&mut self, turns: i64) {
        if turns > 0 {
            self.moves_played = if self.moves_played < 0 {
                turns
            } else {
                self.moves_played + turns
            };
        }
    }
}

/// Destination for finalized outcomes, called once per archived match
/// when a session ends.
pub trait StatisticsSink: Send + Sync {
    /// Records one finalized outcome for the given game.
    fn record_outcome(&self, game: GameKind, outcome: &MatchOutcome);
}
