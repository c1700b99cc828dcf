//! The catalog of supported games.

use crate::{GameMatch, MatchId, Player, ServiceError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The closed set of games the server hosts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum GameKind {
    /// Four in a row on a 7 by 6 board.
    #[strum(serialize = "Connect Four")]
    ConnectFour,
    /// Draughts on the standard 8 by 8 board.
    #[strum(serialize = "Checkers")]
    Checkers,
}

type Constructor = fn(MatchId, Vec<Player>) -> Result<GameMatch, ServiceError>;

/// Descriptive and constructive facts about one supported game.
#[derive(Debug, Clone, Copy)]
pub struct GameInfo {
    kind: GameKind,
    title: &'static str,
    route_id: &'static str,
    summary: &'static str,
    required_player_count: u8,
    constructor: Constructor,
}

/// Every game the server can host. New games are added here and
/// nowhere else; lobbies, registries, and routing all read this table.
pub const CANONICAL_GAMES: [GameInfo; 2] = [
    GameInfo {
        kind: GameKind::ConnectFour,
        title: "Connect Four",
        route_id: "Connect-Four",
        summary: "The classic four-in-a-row matching game.",
        required_player_count: 2,
        constructor: GameMatch::connect_four,
    },
    GameInfo {
        kind: GameKind::Checkers,
        title: "Checkers",
        route_id: "Checkers",
        summary: "Capture every opposing piece, or leave them nowhere to go.",
        required_player_count: 2,
        constructor: GameMatch::checkers,
    },
];

impl GameInfo {
    /// Catalog entry for a kind.
    pub fn for_kind(kind: GameKind) -> &'static GameInfo {
        match kind {
            GameKind::ConnectFour => &CANONICAL_GAMES[0],
            GameKind::Checkers => &CANONICAL_GAMES[1],
        }
    }

    /// Catalog entry matching a URL route id, if any.
    pub fn for_route_id(route_id: &str) -> Option<&'static GameInfo> {
        CANONICAL_GAMES.iter().find(|info| info.route_id == route_id)
    }

    /// Kind this entry describes.
    pub fn kind(&self) -> GameKind {
        self.kind
    }

    /// Human-readable name.
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Stable id used in URLs and hub routing.
    pub fn route_id(&self) -> &'static str {
        self.route_id
    }

    /// One-line pitch for listings.
    pub fn summary(&self) -> &'static str {
        self.summary
    }

    /// Seats a match of this game requires.
    pub fn required_player_count(&self) -> u8 {
        self.required_player_count
    }

    /// Builds a fresh match for the given roster.
    pub(crate) fn build(
        &self,
        match_id: MatchId,
        players: Vec<Player>,
    ) -> Result<GameMatch, ServiceError> {
        (self.constructor)(match_id, players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_catalog_is_keyed_consistently() {
        for info in &CANONICAL_GAMES {
            assert_eq!(GameInfo::for_kind(info.kind()).route_id(), info.route_id());
            let by_route = GameInfo::for_route_id(info.route_id());
            assert_eq!(by_route.map(GameInfo::kind), Some(info.kind()));
        }
        assert!(GameInfo::for_route_id("Tic-Tac-Toe").is_none());
    }

    #[test]
    fn test_kind_display_matches_titles() {
        assert_eq!(GameKind::ConnectFour.to_string(), "Connect Four");
        assert_eq!(
            GameKind::from_str("Checkers").ok(),
            Some(GameKind::Checkers)
        );
    }

    #[test]
    fn test_catalog_builds_playable_matches() {
        let info = GameInfo::for_kind(GameKind::ConnectFour);
        let players = vec![Player::new("ann", 1), Player::new("ben", 2)];
        let game_match = info.build("1".to_owned(), players).unwrap();
        assert_eq!(game_match.kind(), GameKind::ConnectFour);
        assert_eq!(game_match.session().players().len(), 2);
    }
}
