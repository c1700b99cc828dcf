//! The service facade end to end: match orchestration, disconnect
//! grace periods, and the statistics hand-off when a session closes.

use bored_games::{
    EventSink, GameEvent, GameKind, GameLobby, GameService, GameStatistic, MatchEnding,
    MatchOutcome, PlayerCountSource, ServiceError, StatisticsSink,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<(String, GameEvent)>>,
}

impl RecordingSink {
    fn drain(&self) -> Vec<(String, GameEvent)> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, match_id: &str, event: GameEvent) {
        self.events.lock().push((match_id.to_owned(), event));
    }
}

#[derive(Default)]
struct RecordingStats {
    outcomes: Mutex<Vec<(GameKind, MatchOutcome)>>,
}

impl StatisticsSink for RecordingStats {
    fn record_outcome(&self, game: GameKind, outcome: &MatchOutcome) {
        self.outcomes.lock().push((game, outcome.clone()));
    }
}

struct EmptyLobby;

impl PlayerCountSource for EmptyLobby {
    fn waiting_players(&self, _kind: GameKind) -> usize {
        0
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("bored_games=debug")
        .with_test_writer()
        .try_init();
}

fn fixture() -> (GameService, Arc<RecordingSink>, Arc<RecordingStats>) {
    init_tracing();
    let sink = Arc::new(RecordingSink::default());
    let stats = Arc::new(RecordingStats::default());
    let service = GameService::new(sink.clone(), stats.clone(), Arc::new(EmptyLobby));
    (service, sink, stats)
}

fn roster() -> Vec<String> {
    vec!["ann".to_owned(), "ben".to_owned()]
}

/// Creates a Connect Four match and readies both seats.
fn started_match(service: &GameService) -> String {
    let match_id = service
        .create_match(GameKind::ConnectFour, &roster())
        .unwrap();
    service.mark_ready(&match_id, "ann", true).unwrap();
    service.mark_ready(&match_id, "ben", true).unwrap();
    match_id
}

#[test]
fn test_matches_are_created_and_played_through_the_service() {
    let (service, _, _) = fixture();
    let match_id = service
        .create_match(GameKind::ConnectFour, &roster())
        .unwrap();

    let snapshot = service.snapshot(&match_id).unwrap();
    assert_eq!(snapshot.board().len(), 6 * 7);
    assert!(!snapshot.started());

    service.mark_ready(&match_id, "ann", true).unwrap();
    let events = service.mark_ready(&match_id, "ben", true).unwrap();
    assert!(matches!(
        events.as_slice(),
        [GameEvent::PlayerConnected { .. }, GameEvent::GameStarted]
    ));

    let events = service.place_token(&match_id, "ann", 3).unwrap();
    assert!(matches!(
        events.as_slice(),
        [GameEvent::TokenPlayed { next_player_number: Some(2), .. }]
    ));
}

#[test]
fn test_checkers_moves_flow_through_the_service() {
    let (service, _, _) = fixture();
    let match_id = service
        .create_match(GameKind::Checkers, &roster())
        .unwrap();
    service.mark_ready(&match_id, "ann", true).unwrap();
    service.mark_ready(&match_id, "ben", true).unwrap();

    let events = service.play_move_set(&match_id, "ann", &[18, 25]).unwrap();
    assert!(matches!(
        events.as_slice(),
        [GameEvent::MovePlayed { next_player_number: Some(2), .. }]
    ));
}

#[test]
fn test_unknown_matches_are_refused() {
    let (service, _, _) = fixture();
    match service.snapshot("missing") {
        Err(ServiceError::MatchNotFound { match_id }) => assert_eq!(match_id, "missing"),
        other => panic!("expected MatchNotFound, got {other:?}"),
    }
}

#[test]
fn test_rosters_must_fill_every_seat() {
    let (service, _, _) = fixture();
    match service.create_match(GameKind::Checkers, &["ann".to_owned()]) {
        Err(ServiceError::WrongPlayerCount { required, proposed, .. }) => {
            assert_eq!(required, 2);
            assert_eq!(proposed, 1);
        }
        other => panic!("expected WrongPlayerCount, got {other:?}"),
    }
}

#[test]
fn test_population_spans_the_lobby_and_the_tables() {
    init_tracing();
    let lobby = Arc::new(Mutex::new(GameLobby::new(GameKind::ConnectFour)));
    {
        let mut lobby = lobby.lock();
        lobby.add_player("cam");
        lobby.add_player("dee");
        lobby.add_player("eli");
    }
    let service = GameService::new(
        Arc::new(RecordingSink::default()),
        Arc::new(RecordingStats::default()),
        lobby.clone(),
    );
    started_match(&service);

    assert_eq!(service.player_population(GameKind::ConnectFour), 5);
    assert_eq!(service.player_population(GameKind::Checkers), 0);
}

#[test]
fn test_finished_sessions_flow_to_the_statistics_sink() {
    let (service, _, stats) = fixture();
    let match_id = started_match(&service);

    for _ in 0..3 {
        service.place_token(&match_id, "ann", 3).unwrap();
        service.place_token(&match_id, "ben", 4).unwrap();
    }
    service.place_token(&match_id, "ann", 3).unwrap();

    let events = service.player_left(&match_id, "ben").unwrap();
    assert!(matches!(
        events.as_slice(),
        [GameEvent::PlayerDisconnected { .. }, GameEvent::SessionEnded]
    ));

    let recorded = stats.outcomes.lock();
    assert_eq!(recorded.len(), 1);
    let (kind, outcome) = &recorded[0];
    assert_eq!(*kind, GameKind::ConnectFour);
    assert_eq!(*outcome.end_state(), MatchEnding::Victory);
    assert!(outcome.winning_players().contains("ann"));
    drop(recorded);

    match service.snapshot(&match_id) {
        Err(ServiceError::MatchNotFound { .. }) => {}
        other => panic!("expected the match to be gone, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_a_dropped_connection_forfeits_after_the_grace_period() {
    let (service, sink, stats) = fixture();
    let match_id = started_match(&service);
    service.place_token(&match_id, "ann", 0).unwrap();

    let events = service
        .player_disconnected(&match_id, "ben", true)
        .unwrap();
    match events.as_slice() {
        [GameEvent::PlayerDisconnected { username, timeout_seconds, .. }] => {
            assert_eq!(username, "ben");
            assert_eq!(*timeout_seconds, 60);
        }
        other => panic!("expected the grace period to start, got {other:?}"),
    }
    assert!(sink.drain().is_empty());

    // The paused clock advances once the timer task is parked.
    tokio::time::sleep(Duration::from_secs(61)).await;

    let published = sink.drain();
    match published.as_slice() {
        [
            (first_id, GameEvent::PlayerForfeited { username, is_timeout, .. }),
            (second_id, GameEvent::SessionEnded),
        ] => {
            assert_eq!(first_id, &match_id);
            assert_eq!(second_id, &match_id);
            assert_eq!(username, "ben");
            assert!(*is_timeout);
        }
        other => panic!("expected a timeout forfeit, got {other:?}"),
    }

    let recorded = stats.outcomes.lock();
    assert_eq!(recorded.len(), 1);
    let (_, outcome) = &recorded[0];
    assert_eq!(*outcome.end_state(), MatchEnding::Incomplete);
    assert!(outcome.forfeiting_players().contains("ben"));
    drop(recorded);

    match service.place_token(&match_id, "ann", 1) {
        Err(ServiceError::MatchNotFound { .. }) => {}
        other => panic!("expected the match to be gone, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_rejoining_within_the_grace_period_cancels_the_forfeit() {
    let (service, sink, _) = fixture();
    let match_id = started_match(&service);
    service.place_token(&match_id, "ann", 0).unwrap();
    service
        .player_disconnected(&match_id, "ben", true)
        .unwrap();

    let events = service.mark_ready(&match_id, "ben", true).unwrap();
    assert!(matches!(
        events.as_slice(),
        [GameEvent::PlayerConnected { .. }]
    ));

    tokio::time::sleep(Duration::from_secs(120)).await;

    assert!(sink.drain().is_empty());
    let events = service.place_token(&match_id, "ben", 1).unwrap();
    assert!(matches!(
        events.as_slice(),
        [GameEvent::TokenPlayed { player_number: 2, .. }]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_a_purposeful_exit_beats_the_forfeit_clock() {
    let (service, sink, stats) = fixture();
    let match_id = started_match(&service);
    service.place_token(&match_id, "ann", 0).unwrap();
    service
        .player_disconnected(&match_id, "ben", true)
        .unwrap();

    let events = service.player_left(&match_id, "ben").unwrap();
    assert!(matches!(
        events.as_slice(),
        [
            GameEvent::PlayerDisconnected { .. },
            GameEvent::PlayerForfeited { .. },
            GameEvent::SessionEnded,
        ]
    ));
    assert_eq!(stats.outcomes.lock().len(), 1);

    // The armed clock was cancelled; nothing fires twice.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(sink.drain().is_empty());
    assert_eq!(stats.outcomes.lock().len(), 1);
}

#[test]
fn test_a_lobby_phase_disconnect_closes_an_unready_table() {
    let (service, _, stats) = fixture();
    let match_id = service
        .create_match(GameKind::ConnectFour, &roster())
        .unwrap();
    service.mark_ready(&match_id, "ann", true).unwrap();

    // Nobody is left waiting once ann drops, so the session just ends.
    let events = service
        .player_disconnected(&match_id, "ann", true)
        .unwrap();
    assert!(matches!(events.as_slice(), [GameEvent::SessionEnded]));

    let recorded = stats.outcomes.lock();
    assert_eq!(recorded.len(), 1);
    let (_, outcome) = &recorded[0];
    assert_eq!(*outcome.end_state(), MatchEnding::None);
    assert!(!outcome.moves_were_played());
    drop(recorded);

    // An outcome that never saw play leaves statistics untouched.
    let mut stat = GameStatistic::new("ann".to_owned(), GameKind::ConnectFour);
    stat.apply_outcome(&stats.outcomes.lock()[0].1);
    assert_eq!(stat.play_count(), 0);
}
