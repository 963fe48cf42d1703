//! Headless round state machine tests.
//!
//! Covers:
//! - A fresh app starts in `Playing` with a full clock and zero score
//! - The countdown ticks once per second and ends the round exactly once
//! - Replay resets score, clock, and registry, and re-arms the spawner
//! - Replay requests during play are ignored
//! - The spawner produces batches while playing and stops once finished

mod common;

use arrow_burst::config::GameConfig;
use arrow_burst::registry::registry_counts;
use arrow_burst::round::{EndOfRoundGuard, ReplayRequested, RoundEnded, RoundState};
use arrow_burst::simulation::SimulationStats;
use arrow_burst::spawner::SpawnSchedule;
use bevy::prelude::*;
use common::*;

#[derive(Resource, Default)]
struct EndedLog(Vec<u32>);

fn log_round_ended(mut ended: MessageReader<RoundEnded>, mut log: ResMut<EndedLog>) {
    log.0.extend(ended.read().map(|e| e.score));
}

fn app_with_end_log(config: GameConfig) -> App {
    let mut app = app_with_config(config);
    app.init_resource::<EndedLog>()
        .add_systems(Update, log_round_ended);
    app
}

fn play_out_round(app: &mut App) {
    run_frames(app, 30 * FRAMES_PER_SECOND + 4);
}

/// The app boots straight into a fresh round.
#[test]
fn starts_playing_with_full_clock() {
    let app = quiet_app();
    assert_eq!(state(&app), RoundState::Playing);
    let round = round(&app);
    assert_eq!(round.score(), 0);
    assert_eq!(round.time_left(), 30);
}

/// One whole second of frames takes exactly one second off the clock.
#[test]
fn clock_ticks_once_per_second() {
    let mut app = quiet_app();
    run_frames(&mut app, FRAMES_PER_SECOND - 1);
    assert_eq!(round(&app).time_left(), 30);
    app.update();
    assert_eq!(round(&app).time_left(), 29);
    run_frames(&mut app, 19 * FRAMES_PER_SECOND);
    assert_eq!(round(&app).time_left(), 10);
}

/// Reaching zero moves to `Finished` and emits one end-of-round message with
/// the frozen score, no matter how long the game-over screen stays up.
#[test]
fn round_ends_exactly_once() {
    let mut app = app_with_end_log(GameConfig {
        spawn_batch_max: 0,
        ..Default::default()
    });
    for _ in 0..4 {
        app.world_mut()
            .resource_mut::<arrow_burst::round::Round>()
            .add_point();
    }

    play_out_round(&mut app);
    assert_eq!(state(&app), RoundState::Finished);
    assert_eq!(round(&app).time_left(), 0);
    assert!(!app.world().resource::<EndOfRoundGuard>().armed);

    run_frames(&mut app, 5 * FRAMES_PER_SECOND);
    assert_eq!(app.world().resource::<EndedLog>().0, vec![4]);
    assert_eq!(round(&app).score(), 4, "score is frozen after the round");
}

/// Replay starts a clean round and arms the spawner for an immediate batch.
#[test]
fn replay_resets_everything() {
    let mut app = app_with_end_log(GameConfig::default());
    app.world_mut()
        .resource_mut::<arrow_burst::round::Round>()
        .add_point();
    play_out_round(&mut app);
    assert_eq!(state(&app), RoundState::Finished);
    let batches_before = app.world().resource::<SimulationStats>().batches_spawned;

    app.world_mut().write_message(ReplayRequested);
    run_frames(&mut app, 2);

    assert_eq!(state(&app), RoundState::Playing);
    let round = round(&app);
    assert_eq!(round.score(), 0);
    assert_eq!(round.time_left(), 30);
    assert!(app.world().resource::<EndOfRoundGuard>().armed);
    assert!(app.world().resource::<SpawnSchedule>().is_armed());
    assert_eq!(
        app.world().resource::<SimulationStats>().batches_spawned,
        batches_before + 1,
        "first batch of the new round fires right away"
    );

    play_out_round(&mut app);
    assert_eq!(app.world().resource::<EndedLog>().0, vec![1, 0]);
}

/// Replay clears leftovers from the finished round.
#[test]
fn replay_clears_registry() {
    let mut app = quiet_app();
    place_target(&mut app, Vec2::new(800.0, 200.0), 20.0);
    set_state(&mut app, RoundState::Finished);
    assert_eq!(registry_counts(app.world_mut()).targets, 1);

    app.world_mut().write_message(ReplayRequested);
    run_frames(&mut app, 2);
    assert_eq!(registry_counts(app.world_mut()).total(), 0);
}

/// A replay request while a round is running changes nothing.
#[test]
fn replay_during_play_is_ignored() {
    let mut app = quiet_app();
    app.world_mut()
        .resource_mut::<arrow_burst::round::Round>()
        .add_point();
    run_frames(&mut app, FRAMES_PER_SECOND);

    app.world_mut().write_message(ReplayRequested);
    run_frames(&mut app, 2);
    assert_eq!(state(&app), RoundState::Playing);
    assert_eq!(round(&app).score(), 1);
    assert!(round(&app).time_left() < 30);
}

/// Batches keep coming while playing and stop once the round is over.
#[test]
fn spawner_runs_only_while_playing() {
    let mut app = app_with_config(GameConfig::default());
    assert_eq!(
        app.world().resource::<SimulationStats>().batches_spawned,
        1,
        "first batch fires on round start"
    );

    run_frames(&mut app, 3 * FRAMES_PER_SECOND);
    let stats = app.world().resource::<SimulationStats>().clone();
    assert!((3..=5).contains(&stats.batches_spawned), "{stats:?}");
    assert_eq!(
        registry_counts(app.world_mut()).targets as u32,
        stats.targets_spawned,
        "targets never move without physics, so none are culled"
    );

    set_state(&mut app, RoundState::Finished);
    let frozen = app.world().resource::<SimulationStats>().batches_spawned;
    run_frames(&mut app, 3 * FRAMES_PER_SECOND);
    assert_eq!(
        app.world().resource::<SimulationStats>().batches_spawned,
        frozen
    );
    assert!(!app.world().resource::<SpawnSchedule>().is_armed());
}
