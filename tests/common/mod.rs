//! Shared headless app builder for the integration tests.
//!
//! [`MinimalPlugins`] + [`StatesPlugin`] only: no window, no renderer, and no
//! Rapier step.  Contacts are injected as `CollisionEvent` messages and time
//! advances by a fixed 125 ms per `update()`.

#![allow(dead_code)]

use std::time::Duration;

use arrow_burst::config::GameConfig;
use arrow_burst::leaderboard::{Leaderboard, LeaderboardBackend, LeaderboardPlugin};
use arrow_burst::play_area::PlayArea;
use arrow_burst::registry::{Projectile, ProjectilePart, Target};
use arrow_burst::round::{Round, RoundState};
use arrow_burst::simulation::SimulationPlugin;
use arrow_burst::spawner::{spawn_target, TargetSpec};
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

/// Frame length used by every test app.
pub const FRAME_MS: u64 = 125;

/// Frames per simulated second.
pub const FRAMES_PER_SECOND: usize = (1000 / FRAME_MS) as usize;

/// Headless app with the given config, already settled into `Playing`.
pub fn app_with_config(config: GameConfig) -> App {
    build_app(config, None)
}

/// Like [`quiet_app`], with `backend` installed as the leaderboard.
pub fn app_with_backend(backend: impl LeaderboardBackend) -> App {
    build_app(
        GameConfig {
            spawn_batch_max: 0,
            ..Default::default()
        },
        Some(Leaderboard::new(backend)),
    )
}

fn build_app(config: GameConfig, leaderboard: Option<Leaderboard>) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
        FRAME_MS,
    )));
    app.insert_resource(config);
    app.insert_resource(PlayArea::new(1200.0, 680.0));
    if let Some(leaderboard) = leaderboard {
        app.insert_resource(leaderboard);
    }
    app.add_plugins((SimulationPlugin, LeaderboardPlugin));
    app.update();
    app
}

/// Headless app whose spawner never produces targets, so tests control every
/// entity in the world.
pub fn quiet_app() -> App {
    app_with_config(GameConfig {
        spawn_batch_max: 0,
        ..Default::default()
    })
}

pub fn state(app: &App) -> RoundState {
    *app.world().resource::<State<RoundState>>().get()
}

pub fn round(app: &App) -> Round {
    app.world().resource::<Round>().clone()
}

pub fn set_state(app: &mut App, next: RoundState) {
    app.world_mut()
        .resource_mut::<NextState<RoundState>>()
        .set(next);
    app.update();
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

/// Spawn a target exactly as the spawner would, at a known screen position.
pub fn place_target(app: &mut App, position: Vec2, radius: f32) -> Entity {
    let spec = TargetSpec {
        position,
        radius,
        color: arrow_burst::registry::Rgb::from_array([59, 130, 246]),
    };
    app.world_mut()
        .run_system_once(
            move |mut commands: Commands, area: Res<PlayArea>, config: Res<GameConfig>| {
                spawn_target(&mut commands, &spec, &area, &config)
            },
        )
        .expect("spawn target")
}

pub fn entities_with<T: Component>(app: &mut App) -> Vec<Entity> {
    let world = app.world_mut();
    world
        .query_filtered::<Entity, With<T>>()
        .iter(world)
        .collect()
}

pub fn targets(app: &mut App) -> Vec<Entity> {
    entities_with::<Target>(app)
}

pub fn projectiles(app: &mut App) -> Vec<Entity> {
    entities_with::<Projectile>(app)
}

/// Collider entities (shaft, head) belonging to `projectile`.
pub fn parts_of(app: &mut App, projectile: Entity) -> Vec<Entity> {
    let world = app.world_mut();
    world
        .query::<(Entity, &ProjectilePart)>()
        .iter(world)
        .filter(|(_, part)| part.projectile == projectile)
        .map(|(e, _)| e)
        .collect()
}

/// Teleport `entity` to a screen-space point.
pub fn move_to_screen(app: &mut App, entity: Entity, screen: Vec2) {
    let world_pos = app.world().resource::<PlayArea>().to_world(screen);
    let mut transform = app
        .world_mut()
        .get_mut::<Transform>(entity)
        .expect("entity has a transform");
    transform.translation.x = world_pos.x;
    transform.translation.y = world_pos.y;
}

pub fn is_gone(app: &App, entity: Entity) -> bool {
    app.world().get_entity(entity).is_err()
}
