//! Shared match session state.
//!
//! A session is the container a group of players inhabits from the
//! moment a match is arranged until everyone walks away. It owns the
//! roster, the started/active flags, rematch voting, and the outcome
//! records; the per-game wrappers own boards and rules and drive this
//! state through the `pub(crate)` transitions.

use crate::{GameKind, MatchOutcome, Player, ServiceError};
use serde::{Deserialize, Serialize};
use std::mem;
use tracing::{debug, info, instrument};

/// Registry-assigned identifier for one match session.
pub type MatchId = String;

/// Which way a rematch vote landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RematchVote {
    /// First vote of the round: this player opened the offer.
    Offered,
    /// A later vote agreeing to the open offer.
    Accepted,
}

/// Roster, flags, and outcome records for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSession {
    match_id: MatchId,
    kind: GameKind,
    required_players: u8,
    players: Vec<Player>,
    started: bool,
    match_is_active: bool,
    session_over: bool,
    rematch_issued: bool,
    rematch_issuer: Option<String>,
    rematch_accepted: Vec<String>,
    current_outcome: MatchOutcome,
    outcomes: Vec<MatchOutcome>,
}

impl MatchSession {
    /// Creates a session awaiting readiness from every listed player.
    pub fn new(
        match_id: MatchId,
        kind: GameKind,
        required_players: u8,
        players: Vec<Player>,
    ) -> Self {
        Self {
            match_id,
            kind,
            required_players,
            players,
            started: false,
            match_is_active: false,
            session_over: false,
            rematch_issued: false,
            rematch_issuer: None,
            rematch_accepted: Vec::new(),
            current_outcome: MatchOutcome::new(),
            outcomes: Vec::new(),
        }
    }

    /// Identifier the session was registered under.
    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// Kind of game the session plays.
    pub fn kind(&self) -> GameKind {
        self.kind
    }

    /// Every player ever seated, departed ones included.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// The seat holding `username`.
    pub fn player(&self, username: &str) -> Result<&Player, ServiceError> {
        self.players
            .iter()
            .find(|player| player.username() == username)
            .ok_or_else(|| ServiceError::UnknownPlayer {
                username: username.to_owned(),
            })
    }

    /// True once every player has been ready at the same time.
    pub fn started(&self) -> bool {
        self.started
    }

    /// True while a match is being played.
    pub fn match_is_active(&self) -> bool {
        self.match_is_active
    }

    /// True once the session has concluded for good.
    pub fn session_over(&self) -> bool {
        self.session_over
    }

    /// True while a rematch offer is open.
    pub fn rematch_issued(&self) -> bool {
        self.rematch_issued
    }

    /// The record being accumulated for the match in progress.
    pub fn current_outcome(&self) -> &MatchOutcome {
        &self.current_outcome
    }

    /// Records already archived for finished matches.
    pub fn archived_outcomes(&self) -> &[MatchOutcome] {
        &self.outcomes
    }

    /// Flags readiness for one player. Returns true exactly once, on
    /// the transition where the last player becomes ready and the
    /// first match starts.
    #[instrument(skip(self))]
    pub(crate) fn mark_ready(&mut self, username: &str, ready: bool) -> Result<bool, ServiceError> {
        self.player_mut(username)?.set_ready(ready);
        if ready && !self.started && self.players.iter().all(Player::is_ready) {
            self.started = true;
            self.match_is_active = true;
            info!(match_id = %self.match_id, "all players ready, match starting");
            return Ok(true);
        }
        Ok(false)
    }

    /// Marks a player as departed, clearing their readiness.
    pub(crate) fn mark_left(&mut self, username: &str) -> Result<(), ServiceError> {
        self.player_mut(username)?.mark_left();
        debug!(match_id = %self.match_id, username, "player left the session");
        Ok(())
    }

    /// True while anyone is still flagged ready.
    pub(crate) fn has_remaining_ready_players(&self) -> bool {
        self.players.iter().any(Player::is_ready)
    }

    /// True while enough players remain seated to play a match.
    pub(crate) fn enough_players_remain(&self) -> bool {
        self.remaining_players().count() >= usize::from(self.required_players)
    }

    /// Players who have not departed.
    pub(crate) fn remaining_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|player| !player.has_left())
    }

    /// Non-departed players who have not forfeited the current match.
    pub(crate) fn contender_count(&self) -> usize {
        self.remaining_players()
            .filter(|player| {
                !self
                    .current_outcome
                    .forfeiting_players()
                    .contains(player.username())
            })
            .count()
    }

    /// The only player still contending, if exactly one remains.
    pub(crate) fn sole_contender(&self) -> Option<&Player> {
        let mut contenders = self.remaining_players().filter(|player| {
            !self
                .current_outcome
                .forfeiting_players()
                .contains(player.username())
        });
        match (contenders.next(), contenders.next()) {
            (Some(player), None) => Some(player),
            _ => None,
        }
    }

    pub(crate) fn note_turn(&mut self, username: &str) {
        self.current_outcome.note_turn(username);
    }

    pub(crate) fn record_forfeit(&mut self, username: &str) -> bool {
        self.current_outcome.record_forfeit(username)
    }

    pub(crate) fn attach_replay(&mut self, blob: Vec<u8>) {
        self.current_outcome.attach_replay(blob);
    }

    /// Ends the current match with a winner.
    pub(crate) fn end_match_victory(&mut self, winner: &str) {
        self.match_is_active = false;
        let everyone = self.all_usernames();
        self.current_outcome.finalize_victory(winner, &everyone);
        info!(match_id = %self.match_id, winner, "match ended in victory");
    }

    /// Ends the current match with no winner.
    pub(crate) fn end_match_stalemate(&mut self) {
        self.match_is_active = false;
        let everyone = self.all_usernames();
        self.current_outcome.finalize_stalemate(&everyone);
        info!(match_id = %self.match_id, "match ended in stalemate");
    }

    /// Ends the current match without a verdict; remaining players all
    /// take the loss.
    pub(crate) fn end_match_incomplete(&mut self) {
        self.match_is_active = false;
        let remaining = self.remaining_usernames();
        self.current_outcome.mark_incomplete(&remaining);
        info!(match_id = %self.match_id, "match ended incomplete");
    }

    /// Registers a rematch vote. The first vote of a round opens the
    /// offer, every vote counts as that player's agreement, and voting
    /// twice is harmless.
    pub(crate) fn cast_rematch_vote(&mut self, username: &str) -> RematchVote {
        if !self.rematch_accepted.iter().any(|name| name == username) {
            self.rematch_accepted.push(username.to_owned());
        }
        if self.rematch_issued {
            RematchVote::Accepted
        } else {
            self.rematch_issued = true;
            self.rematch_issuer = Some(username.to_owned());
            info!(match_id = %self.match_id, username, "rematch offered");
            RematchVote::Offered
        }
    }

    /// True when an offer is open and every remaining player has
    /// agreed to it.
    pub(crate) fn rematch_complete(&self) -> bool {
        self.rematch_issued
            && self.remaining_players().all(|player| {
                self.rematch_accepted
                    .iter()
                    .any(|name| name == player.username())
            })
    }

    /// Seat number of the player who opened the current offer.
    pub(crate) fn rematch_issuer_number(&self) -> Option<u8> {
        let issuer = self.rematch_issuer.as_deref()?;
        self.players
            .iter()
            .find(|player| player.username() == issuer)
            .map(|player| player.number())
    }

    /// Archives the current record and starts tracking a fresh match.
    /// The rematch round resets with it.
    pub(crate) fn start_new_match(&mut self) {
        self.archive_current_outcome();
        self.match_is_active = true;
        self.rematch_issued = false;
        self.rematch_issuer = None;
        self.rematch_accepted.clear();
        info!(match_id = %self.match_id, "rematch starting");
    }

    /// Closes the session: settles and archives the in-flight record,
    /// then drains every archived outcome to the caller.
    #[instrument(skip(self))]
    pub(crate) fn conclude(&mut self) -> Vec<MatchOutcome> {
        self.match_is_active = false;
        self.session_over = true;
        let remaining = self.remaining_usernames();
        self.current_outcome.close_unfinished(&remaining);
        self.archive_current_outcome();
        info!(
            match_id = %self.match_id,
            outcomes = self.outcomes.len(),
            "session concluded"
        );
        mem::take(&mut self.outcomes)
    }

    fn archive_current_outcome(&mut self) {
        let finished = mem::take(&mut self.current_outcome);
        self.outcomes.push(finished);
    }

    fn all_usernames(&self) -> Vec<String> {
        self.players
            .iter()
            .map(|player| player.username().to_owned())
            .collect()
    }

    fn remaining_usernames(&self) -> Vec<String> {
        self.remaining_players()
            .map(|player| player.username().to_owned())
            .collect()
    }

    fn player_mut(&mut self, username: &str) -> Result<&mut Player, ServiceError> {
        self.players
            .iter_mut()
            .find(|player| player.username() == username)
            .ok_or_else(|| ServiceError::UnknownPlayer {
                username: username.to_owned(),
            })
    }
}
