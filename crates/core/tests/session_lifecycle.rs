//! End-to-end run lifecycle: place fires, run to completion, save, replay.
//!
//! Set `RUST_LOG=fire_spread_core=debug` to see per-tick spread logs.

use fire_spread_core::simulation::{HistoricalRun, InMemoryRunStore, JsonFileRunStore, RunStore};
use fire_spread_core::{
    ClockState, LatLng, SessionPrompt, SimError, SimulationConfig, SimulationParameters,
    SimulationSession,
};
use rustc_hash::FxHashSet;
use serde_json::json;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const ORIGIN: LatLng = LatLng::new(-17.8, -61.5);

fn seeded_session(seed: u64) -> SimulationSession {
    let config = SimulationConfig {
        seed: Some(seed),
        ..Default::default()
    };
    SimulationSession::new(config).unwrap()
}

fn hot_dry_windy() -> SimulationParameters {
    SimulationParameters::new(45.0, 40.0, 38.0, 15.0, 1.0).unwrap()
}

#[test]
fn test_run_until_auto_stop() {
    let mut session = seeded_session(7);
    session.set_parameters(hot_dry_windy()).unwrap();
    let _ = session.add_fire(ORIGIN).unwrap();
    session.start().unwrap();

    let mut ticks = 0;
    while session.tick().is_some() {
        ticks += 1;
        let fires = session.fires().fires();
        let ids: FxHashSet<_> = fires.iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids.len(), fires.len(), "ids must be unique");
        assert!(fires.len() <= session.config().max_active_fires);
        for fire in fires {
            assert!(fire.history.len() <= session.config().max_history_points);
            assert!((0.0..360.0).contains(&*fire.direction));
        }
    }

    assert_eq!(ticks, 20);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, ClockState::AutoStopped);
    assert_eq!(snapshot.elapsed, 20);
    assert!(snapshot.is_auto_stop);
    assert_eq!(session.prompt(), Some(SessionPrompt::Save { completed: true }));
    assert_eq!(session.tick(), None);
}

#[test]
fn test_fires_leave_origin_under_hot_conditions() {
    let mut session = seeded_session(11);
    session.set_parameters(hot_dry_windy()).unwrap();
    let _ = session.add_fire(ORIGIN).unwrap();
    session.start().unwrap();
    let _ = session.tick();

    let snapshot = session.snapshot();
    assert!(snapshot.active_count >= 1);
    assert!(snapshot.fires.iter().all(|f| f.position != ORIGIN));
    assert!(snapshot.metrics.required_responders > 0);
}

#[test]
fn test_saved_run_replays_from_initial_fires() {
    let store = InMemoryRunStore::new();
    let mut session = seeded_session(3);
    session.set_parameters(hot_dry_windy()).unwrap();
    let _ = session.add_fire(ORIGIN).unwrap();
    let _ = session.add_fire(LatLng::new(-17.7, -61.4)).unwrap();
    session.start().unwrap();
    for _ in 0..5 {
        let _ = session.tick();
    }
    assert!(session.stop());
    let id = session.save_to(&store, Some(LatLng::new(-17.75, -61.45))).unwrap();

    let listing = store.recent(10).unwrap();
    assert_eq!(listing.len(), 1);
    let run = &listing[0];
    assert_eq!(run.id, id);
    assert_eq!(run.fire_count(), 2);
    assert_eq!(run.duration, Some(5));

    let mut replay = seeded_session(99);
    replay.repeat_run(run).unwrap();
    let snapshot = replay.snapshot();
    assert!(snapshot.is_replay);
    assert_eq!(snapshot.state, ClockState::Active);
    assert_eq!(snapshot.auto_stop_duration, 5);
    let positions: Vec<_> = snapshot.fires.iter().map(|f| f.position).collect();
    assert_eq!(positions, vec![ORIGIN, LatLng::new(-17.7, -61.4)]);
    assert_eq!(replay.params(), &hot_dry_windy());

    while replay.tick().is_some() {}
    assert_eq!(replay.clock().elapsed(), 5);
    assert_eq!(replay.prompt(), Some(SessionPrompt::Save { completed: true }));
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed| {
        let mut session = seeded_session(seed);
        session.set_parameters(hot_dry_windy()).unwrap();
        let _ = session.add_fire(ORIGIN).unwrap();
        session.start().unwrap();
        while session.tick().is_some() {}
        session.snapshot().fires
    };
    assert_eq!(run(5), run(5));
}

#[test]
fn test_malformed_history_leaves_session_untouched() {
    let mut session = seeded_session(1);
    let _ = session.add_fire(ORIGIN).unwrap();

    let broken = HistoricalRun::from_value(json!({
        "id": 4,
        "timestamp": "2024-08-14T12:00:00Z",
        "location": "San José de Chiquitos",
        "initialFires": [{"lat": -17.0, "lng": -61.0}],
    }))
    .unwrap();
    let err = session.repeat_run(&broken).unwrap_err();
    assert!(matches!(err, SimError::MalformedReplay(_)));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, ClockState::Idle);
    assert!(!snapshot.is_replay);
    assert_eq!(snapshot.fires.len(), 1);
    assert_eq!(snapshot.fires[0].position, ORIGIN);
}

#[test]
fn test_clear_after_run() {
    let mut session = seeded_session(2);
    let _ = session.add_fire(ORIGIN).unwrap();
    session.start().unwrap();
    let _ = session.tick();
    session.clear();

    assert!(matches!(session.start(), Err(SimError::NoFires)));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, ClockState::Idle);
    assert_eq!(snapshot.elapsed, 0);
    assert_eq!(snapshot.active_count, 0);
}

#[test]
fn test_file_store_lists_legacy_record_but_refuses_replay() {
    let path = std::env::temp_dir().join("fire_spread_lifecycle_legacy.json");
    let _ = std::fs::remove_file(&path);
    let store = JsonFileRunStore::new(&path);

    let mut session = seeded_session(8);
    let _ = session.add_fire(ORIGIN).unwrap();
    session.start().unwrap();
    let _ = session.tick();
    session.stop();
    let good = session.save_to(&store, None).unwrap();

    let mut entries: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    entries.push(json!({
        "id": 40,
        "timestamp": "2020-01-01T00:00:00Z",
        "location": "Concepción",
        "initialFires": {"lat": -17.8},
    }));
    std::fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();

    let listing = store.recent(10).unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].id, good);
    let legacy = &listing[1];
    assert_eq!(legacy.display_name(), "Concepción");

    let mut replay = seeded_session(9);
    let err = replay.repeat_run(legacy).unwrap_err();
    assert!(matches!(err, SimError::MalformedReplay(_)));
    assert_eq!(replay.snapshot().state, ClockState::Idle);
    replay.repeat_run(&listing[0]).unwrap();
    assert!(replay.is_active());

    let _ = std::fs::remove_file(path);
}
