//! Checkers matches end to end: moves, refusals, crowning, and the
//! verdicts that close a match.

use bored_games::{
    CheckersBoard, CheckersMatch, GameEvent, GameKind, GameMatch, MatchEnding, Player,
    ServiceError, Tile,
};

fn roster() -> Vec<Player> {
    vec![Player::new("ann", 1), Player::new("ben", 2)]
}

fn started_match() -> GameMatch {
    let mut game = GameMatch::checkers("9".to_owned(), roster()).unwrap();
    game.mark_ready("ann", true).unwrap();
    game.mark_ready("ben", true).unwrap();
    game
}

fn resumed_match(tiles: [Tile; 64]) -> GameMatch {
    let board = CheckersBoard::from_tiles(tiles);
    let mut game = GameMatch::Checkers(
        CheckersMatch::resume("9".to_owned(), roster(), board, 1).unwrap(),
    );
    game.mark_ready("ann", true).unwrap();
    game.mark_ready("ben", true).unwrap();
    game
}

#[test]
fn test_moves_alternate_between_the_seats() {
    let mut game = started_match();

    let report = game.play_move_set("ann", &[18, 25]).unwrap();
    match report.events.as_slice() {
        [GameEvent::MovePlayed { moves, next_player_number }] => {
            assert_eq!(moves, &vec![18, 25]);
            assert_eq!(*next_player_number, Some(2));
        }
        other => panic!("expected a single MovePlayed, got {other:?}"),
    }

    let report = game.play_move_set("ben", &[41, 34]).unwrap();
    match report.events.as_slice() {
        [GameEvent::MovePlayed { next_player_number, .. }] => {
            assert_eq!(*next_player_number, Some(1));
        }
        other => panic!("expected a single MovePlayed, got {other:?}"),
    }
}

#[test]
fn test_refusals_resynchronize_the_client() {
    let mut game = started_match();
    let opening = game.snapshot().board().clone();

    // Out of turn, then a structurally broken chain in turn.
    for (player, moves) in [("ben", vec![41u8, 34]), ("ann", vec![18u8, 34])] {
        let report = game.play_move_set(player, &moves).unwrap();
        match report.events.as_slice() {
            [GameEvent::InvalidPlay { board, active_player_number }] => {
                assert_eq!(board, &opening);
                assert_eq!(*active_player_number, 1);
            }
            other => panic!("expected InvalidPlay, got {other:?}"),
        }
    }
    assert_eq!(game.snapshot().board(), &opening);
}

#[test]
fn test_moves_before_readiness_are_refused() {
    let mut game = GameMatch::checkers("9".to_owned(), roster()).unwrap();
    game.mark_ready("ann", true).unwrap();
    let report = game.play_move_set("ann", &[18, 25]).unwrap();
    assert!(matches!(
        report.events.as_slice(),
        [GameEvent::InvalidPlay { .. }]
    ));
}

#[test]
fn test_strangers_cannot_play() {
    let mut game = started_match();
    match game.play_move_set("zoe", &[18, 25]) {
        Err(ServiceError::UnknownPlayer { username }) => assert_eq!(username, "zoe"),
        other => panic!("expected UnknownPlayer, got {other:?}"),
    }
}

#[test]
fn test_token_drops_are_not_a_checkers_action() {
    let mut game = started_match();
    match game.place_token("ann", 3) {
        Err(ServiceError::UnsupportedAction { kind }) => assert_eq!(kind, GameKind::Checkers),
        other => panic!("expected UnsupportedAction, got {other:?}"),
    }
}

#[test]
fn test_crowning_is_announced_after_the_move() {
    let mut tiles = [Tile::Empty; 64];
    tiles[54] = Tile::White;
    tiles[41] = Tile::Black;
    let mut game = resumed_match(tiles);

    let report = game.play_move_set("ann", &[54, 63]).unwrap();
    match report.events.as_slice() {
        [
            GameEvent::MovePlayed { next_player_number, .. },
            GameEvent::TokenKinged { board_index },
        ] => {
            assert_eq!(*next_player_number, Some(2));
            assert_eq!(*board_index, 63);
        }
        other => panic!("expected MovePlayed then TokenKinged, got {other:?}"),
    }
    assert_eq!(game.snapshot().board()[63], 2);
}

#[test]
fn test_a_crowning_move_that_strands_the_opponent_wins() {
    let mut tiles = [Tile::Empty; 64];
    tiles[54] = Tile::White;
    // A black man on the bottom row has no forward square left.
    tiles[7] = Tile::Black;
    let mut game = resumed_match(tiles);

    let report = game.play_move_set("ann", &[54, 63]).unwrap();
    match report.events.as_slice() {
        [
            GameEvent::MovePlayed { next_player_number, .. },
            GameEvent::TokenKinged { board_index },
            GameEvent::MatchEnded { winner_number },
        ] => {
            assert_eq!(*next_player_number, None);
            assert_eq!(*board_index, 63);
            assert_eq!(*winner_number, Some(1));
        }
        other => panic!("expected a crowned winning move, got {other:?}"),
    }

    let outcome = game.session().current_outcome();
    assert_eq!(*outcome.end_state(), MatchEnding::Victory);
    assert!(outcome.winning_players().contains("ann"));
    assert!(outcome.losing_players().contains("ben"));

    // The match is over; further play only resynchronizes.
    let report = game.play_move_set("ben", &[7, 14]).unwrap();
    assert!(matches!(
        report.events.as_slice(),
        [GameEvent::InvalidPlay { .. }]
    ));
}

#[test]
fn test_capture_chains_report_the_full_chain() {
    let mut tiles = [Tile::Empty; 64];
    tiles[18] = Tile::White;
    tiles[25] = Tile::Black;
    tiles[41] = Tile::Black;
    tiles[61] = Tile::Black;
    let mut game = resumed_match(tiles);

    let report = game.play_move_set("ann", &[18, 32, 50]).unwrap();
    match report.events.as_slice() {
        [GameEvent::MovePlayed { moves, next_player_number }] => {
            assert_eq!(moves, &vec![18, 32, 50]);
            assert_eq!(*next_player_number, Some(2));
        }
        other => panic!("expected MovePlayed, got {other:?}"),
    }
    let board = game.snapshot().board().clone();
    assert_eq!(board[25], 0);
    assert_eq!(board[41], 0);
    assert_eq!(board[50], 1);
}

#[test]
fn test_oscillating_kings_draw_the_match() {
    let mut tiles = [Tile::Empty; 64];
    tiles[18] = Tile::WhiteKing;
    tiles[45] = Tile::BlackKing;
    let mut game = resumed_match(tiles);

    let shuffle = [
        ("ann", [18u8, 25]),
        ("ben", [45u8, 38]),
        ("ann", [25u8, 18]),
        ("ben", [38u8, 45]),
    ];
    for turn in 0..11 {
        let (player, moves) = &shuffle[turn % shuffle.len()];
        let report = game.play_move_set(player, moves).unwrap();
        assert!(
            !report
                .events
                .iter()
                .any(|event| matches!(event, GameEvent::MatchEnded { .. })),
            "match ended early on turn {turn}"
        );
    }

    let report = game.play_move_set("ben", &[38, 45]).unwrap();
    match report.events.as_slice() {
        [
            GameEvent::MovePlayed { next_player_number, .. },
            GameEvent::MatchEnded { winner_number },
        ] => {
            assert_eq!(*next_player_number, None);
            assert_eq!(*winner_number, None);
        }
        other => panic!("expected the shuffle to be called, got {other:?}"),
    }

    let outcome = game.session().current_outcome();
    assert_eq!(*outcome.end_state(), MatchEnding::Stalemate);
    assert!(outcome.losing_players().contains("ann"));
    assert!(outcome.losing_players().contains("ben"));
}
