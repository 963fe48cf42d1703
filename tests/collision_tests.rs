//! Headless hit-resolution tests.
//!
//! Covers:
//! - A contact between an arrow part and a target scores exactly one point,
//!   removes both bodies, and leaves an explosion plus fragments behind
//! - Duplicate contacts for the same pair (both parts, repeated frames) score once
//! - Contacts after the round has finished are ignored
//! - Non-scoring pairs (particle vs target) change nothing
//! - Fragments inherit the arrow's velocity from before the contact, not the
//!   rebound already written back by the physics step
//! - Teardown releases every entity and the pair-key set

mod common;

use arrow_burst::collision::CollisionDedup;
use arrow_burst::launcher::LaunchRequest;
use arrow_burst::registry::{registry_counts, FlightVelocity, Particle, ParticleKind};
use arrow_burst::round::RoundState;
use arrow_burst::simulation::{SimulationSession, SimulationStats, TeardownRequested};
use arrow_burst::spawner::SpawnSchedule;
use bevy::prelude::*;
use bevy_rapier2d::prelude::{CollisionEvent, Velocity};
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use common::*;

/// Launch one arrow at `point` and return its root entity.
fn launch_at(app: &mut App, point: Vec2) -> Entity {
    app.world_mut().write_message(LaunchRequest { point });
    app.update();
    let mut roots = projectiles(app);
    assert_eq!(roots.len(), 1, "exactly one arrow should be in flight");
    roots.remove(0)
}

fn contact(app: &mut App, a: Entity, b: Entity) {
    app.world_mut()
        .write_message(CollisionEvent::Started(a, b, CollisionEventFlags::empty()));
}

fn particle_count(app: &mut App) -> usize {
    entities_with::<Particle>(app).len()
}

/// A head-on hit scores, removes both bodies, and bursts into particles.
#[test]
fn arrow_hit_scores_and_bursts() {
    let mut app = quiet_app();
    let target = place_target(&mut app, Vec2::new(500.0, 50.0), 20.0);
    let arrow = launch_at(&mut app, Vec2::new(500.0, 50.0));
    let parts = parts_of(&mut app, arrow);
    assert_eq!(parts.len(), 2, "shaft and head colliders");

    contact(&mut app, parts[1], target);
    app.update();

    assert_eq!(round(&app).score(), 1);
    assert!(is_gone(&app, target), "hit target must be removed");
    assert!(is_gone(&app, arrow), "hit arrow must be removed");
    for part in parts {
        assert!(is_gone(&app, part), "arrow parts go with their arrow");
    }

    let particles = particle_count(&mut app);
    assert!(
        (21..=33).contains(&particles),
        "15-25 explosion + 6-8 fragment particles, got {particles}"
    );
    assert_eq!(app.world().resource::<SimulationStats>().hits, 1);
}

/// By the time a contact is read, the physics step has already bounced the
/// arrow.  Fragments must follow the arrow's flight, not the rebound.
#[test]
fn fragments_inherit_pre_contact_velocity() {
    let mut app = quiet_app();
    let target = place_target(&mut app, Vec2::new(600.0, 300.0), 20.0);
    let arrow = launch_at(&mut app, Vec2::new(600.0, 300.0));
    let parts = parts_of(&mut app, arrow);

    // 40 px/step to the right before the step, reversed after it.
    let flight = Vec2::new(2400.0, 0.0);
    app.world_mut()
        .entity_mut(arrow)
        .insert((FlightVelocity(flight), Velocity::linear(-flight)));

    contact(&mut app, parts[0], target);
    app.update();
    assert_eq!(round(&app).score(), 1);

    let world = app.world_mut();
    let fragments: Vec<Vec2> = world
        .query::<(&Particle, &Velocity)>()
        .iter(world)
        .filter(|(p, _)| p.kind == ParticleKind::Fragment)
        .map(|(_, v)| v.linvel)
        .collect();
    assert!((6..=8).contains(&fragments.len()));
    let mean = fragments.iter().copied().sum::<Vec2>() / fragments.len() as f32;
    // 0.3 * 2400 = 720 px/s inherited, jitter is at most 4 px/step = 240 px/s.
    assert!(mean.x > 400.0, "fragments follow the flight direction: {mean:?}");
    assert!(mean.y.abs() < 250.0, "{mean:?}");
}

/// The arrow's flight velocity starts at the launch velocity.
#[test]
fn flight_velocity_starts_at_launch() {
    let mut app = quiet_app();
    let arrow = launch_at(&mut app, Vec2::new(600.0, 300.0));
    let flight = app.world().get::<FlightVelocity>(arrow).expect("flight").0;
    let live = app.world().get::<Velocity>(arrow).expect("velocity").linvel;
    assert_eq!(flight, live);
    assert!((flight.length() - 15.0 * 60.0).abs() < 1e-2);
}

/// Target-first ordering resolves the same way as arrow-first.
#[test]
fn contact_order_does_not_matter() {
    let mut app = quiet_app();
    let target = place_target(&mut app, Vec2::new(700.0, 80.0), 15.0);
    let arrow = launch_at(&mut app, Vec2::new(700.0, 80.0));
    let parts = parts_of(&mut app, arrow);

    contact(&mut app, target, parts[0]);
    app.update();

    assert_eq!(round(&app).score(), 1);
    assert!(is_gone(&app, target));
}

/// Both parts touching the same target in one step, plus a repeat the next
/// frame, still count as one hit.
#[test]
fn duplicate_contacts_score_once() {
    let mut app = quiet_app();
    let target = place_target(&mut app, Vec2::new(600.0, 60.0), 25.0);
    let arrow = launch_at(&mut app, Vec2::new(600.0, 60.0));
    let parts = parts_of(&mut app, arrow);

    contact(&mut app, parts[0], target);
    contact(&mut app, parts[1], target);
    contact(&mut app, parts[0], target);
    app.update();
    assert_eq!(round(&app).score(), 1);

    contact(&mut app, parts[1], target);
    app.update();
    assert_eq!(round(&app).score(), 1, "stale contact for removed bodies");
}

/// One arrow clipping two targets in the same step only scores the first.
#[test]
fn one_arrow_resolves_one_target_per_step() {
    let mut app = quiet_app();
    let first = place_target(&mut app, Vec2::new(600.0, 60.0), 25.0);
    let second = place_target(&mut app, Vec2::new(640.0, 60.0), 25.0);
    let arrow = launch_at(&mut app, Vec2::new(620.0, 60.0));
    let parts = parts_of(&mut app, arrow);

    contact(&mut app, parts[1], first);
    contact(&mut app, parts[1], second);
    app.update();

    assert_eq!(round(&app).score(), 1);
    assert!(is_gone(&app, first));
    assert!(!is_gone(&app, second), "second target survives");
}

/// Contacts that do not pair an arrow with a target are ignored.
#[test]
fn non_scoring_contacts_are_ignored() {
    let mut app = quiet_app();
    let hit = place_target(&mut app, Vec2::new(500.0, 50.0), 20.0);
    let arrow = launch_at(&mut app, Vec2::new(500.0, 50.0));
    let parts = parts_of(&mut app, arrow);
    contact(&mut app, parts[0], hit);
    app.update();
    assert_eq!(round(&app).score(), 1);

    let bystander = place_target(&mut app, Vec2::new(900.0, 50.0), 20.0);
    let other = place_target(&mut app, Vec2::new(950.0, 50.0), 20.0);
    let particle = entities_with::<Particle>(&mut app)[0];
    contact(&mut app, particle, bystander);
    contact(&mut app, bystander, other);
    app.update();

    assert_eq!(round(&app).score(), 1);
    assert!(!is_gone(&app, bystander));
    assert!(!is_gone(&app, other));
}

/// Once the round is over, contacts neither score nor remove bodies.
#[test]
fn no_scoring_after_round_end() {
    let mut app = quiet_app();
    let target = place_target(&mut app, Vec2::new(500.0, 50.0), 20.0);
    let arrow = launch_at(&mut app, Vec2::new(500.0, 50.0));
    let parts = parts_of(&mut app, arrow);

    set_state(&mut app, RoundState::Finished);
    contact(&mut app, parts[0], target);
    app.update();

    assert_eq!(round(&app).score(), 0);
    assert!(!is_gone(&app, target));
    assert!(!is_gone(&app, arrow));
}

/// Clicks while the round is finished never turn into arrows, not even after
/// replay.
#[test]
fn clicks_after_round_end_do_not_launch() {
    let mut app = quiet_app();
    set_state(&mut app, RoundState::Finished);

    app.world_mut().write_message(LaunchRequest {
        point: Vec2::new(400.0, 100.0),
    });
    app.update();
    assert!(projectiles(&mut app).is_empty());

    app.world_mut()
        .write_message(arrow_burst::round::ReplayRequested);
    run_frames(&mut app, 2);
    assert_eq!(state(&app), RoundState::Playing);
    assert!(projectiles(&mut app).is_empty());
}

/// Teardown clears every registry entity and drops the pair-key set; later
/// contacts and requests are no-ops.
#[test]
fn teardown_releases_everything() {
    let mut app = quiet_app();
    let target = place_target(&mut app, Vec2::new(500.0, 50.0), 20.0);
    let arrow = launch_at(&mut app, Vec2::new(500.0, 50.0));
    let parts = parts_of(&mut app, arrow);
    contact(&mut app, parts[0], target);
    app.update();
    place_target(&mut app, Vec2::new(800.0, 50.0), 20.0);
    assert!(registry_counts(app.world_mut()).total() > 0);

    app.world_mut().write_message(TeardownRequested);
    app.update();

    assert!(!app.world().resource::<SimulationSession>().is_live());
    assert_eq!(registry_counts(app.world_mut()).total(), 0);
    assert!(!app.world().contains_resource::<CollisionDedup>());
    assert!(!app.world().resource::<SpawnSchedule>().is_armed());

    let time_left = round(&app).time_left();
    app.world_mut().write_message(TeardownRequested);
    app.world_mut().write_message(LaunchRequest {
        point: Vec2::new(400.0, 100.0),
    });
    run_frames(&mut app, 2 * FRAMES_PER_SECOND);
    assert_eq!(registry_counts(app.world_mut()).total(), 0);
    assert_eq!(round(&app).time_left(), time_left, "clock stops after teardown");
}
