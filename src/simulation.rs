//! Simulation plugin: session lifetime, run statistics, and the per-frame
//! system ordering.
//!
//! ## Frame order
//!
//! Every gameplay system lives in one of the chained [`SimSet`]s on `Update`:
//!
//! | Set         | Systems                                              |
//! |-------------|------------------------------------------------------|
//! | `Input`     | teardown, replay                                     |
//! | `Launch`    | `launch_projectile_system`                           |
//! | `Spawn`     | `spawn_targets_system`                               |
//! | `Resolve`   | `resolve_collisions_system`, `prune_dedup_system`    |
//! | `Sweep`     | target / particle / projectile sweeps                |
//! | `Countdown` | `countdown_system`                                   |
//!
//! Deferred commands are flushed between chained sets, so anything the
//! resolver despawns is already gone when the sweeper runs.  Rapier steps in
//! `PostUpdate`; its collision events are read on the next `Update`.
//!
//! The plugin needs no window or renderer, so headless tests add it to a
//! `MinimalPlugins` app and inject collision events by hand.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

use crate::collision::{prune_dedup_system, resolve_collisions_system, CollisionDedup};
use crate::config::GameConfig;
use crate::launcher::{launch_projectile_system, LaunchRequest};
use crate::play_area::PlayArea;
use crate::registry::EntityRegistry;
use crate::round::{
    begin_round, countdown_system, finish_round, replay_system, EndOfRoundGuard, ReplayRequested,
    Round, RoundEnded, RoundState,
};
use crate::spawner::{arm_spawner, spawn_targets_system, SpawnSchedule};
use crate::sweeper::{sweep_particles_system, sweep_projectiles_system, sweep_targets_system};

/// Whether the simulation is still running.  Cleared once by teardown and
/// never set again for the lifetime of the app.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSession {
    live: bool,
}

impl Default for SimulationSession {
    fn default() -> Self {
        Self { live: true }
    }
}

impl SimulationSession {
    #[inline]
    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn end(&mut self) {
        self.live = false;
    }
}

/// Request to tear the simulation down (window closing, host shutting down).
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct TeardownRequested;

/// Running totals since app start, for logs and diagnostics.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub batches_spawned: u32,
    pub targets_spawned: u32,
    pub projectiles_launched: u32,
    pub hits: u32,
    pub targets_culled: u32,
    pub projectiles_culled: u32,
    pub particles_expired: u32,
}

impl SimulationStats {
    pub fn record_batch(&mut self, targets: usize) {
        self.batches_spawned += 1;
        self.targets_spawned += targets as u32;
    }
}

/// Uniform sample from `[min, max)`; returns `min` for an empty range.
pub(crate) fn uniform(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Ordered phases of one frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Input,
    Launch,
    Spawn,
    Resolve,
    Sweep,
    Countdown,
}

/// Run condition: the session has not been torn down.
pub fn session_is_live(session: Res<SimulationSession>) -> bool {
    session.is_live()
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<GameConfig>() {
            app.init_resource::<GameConfig>();
        }

        app.init_state::<RoundState>()
            .init_resource::<SimulationSession>()
            .init_resource::<SimulationStats>()
            .init_resource::<PlayArea>()
            .init_resource::<Round>()
            .init_resource::<EndOfRoundGuard>()
            .init_resource::<SpawnSchedule>()
            .init_resource::<CollisionDedup>()
            .add_message::<CollisionEvent>()
            .add_message::<LaunchRequest>()
            .add_message::<ReplayRequested>()
            .add_message::<RoundEnded>()
            .add_message::<TeardownRequested>()
            .configure_sets(
                Update,
                (
                    SimSet::Input,
                    SimSet::Launch,
                    SimSet::Spawn,
                    SimSet::Resolve,
                    SimSet::Sweep,
                    SimSet::Countdown,
                )
                    .chain(),
            )
            .add_systems(
                OnEnter(RoundState::Playing),
                (begin_round, arm_spawner, reset_dedup).chain(),
            )
            .add_systems(OnEnter(RoundState::Finished), finish_round)
            .add_systems(
                Update,
                (
                    (teardown_system, replay_system)
                        .chain()
                        .in_set(SimSet::Input),
                    launch_projectile_system.in_set(SimSet::Launch),
                    spawn_targets_system.in_set(SimSet::Spawn),
                    (resolve_collisions_system, prune_dedup_system)
                        .chain()
                        .in_set(SimSet::Resolve),
                    (
                        sweep_targets_system,
                        sweep_particles_system,
                        sweep_projectiles_system,
                    )
                        .in_set(SimSet::Sweep)
                        .run_if(session_is_live),
                    countdown_system.in_set(SimSet::Countdown),
                ),
            );
    }
}

/// `OnEnter(Playing)`: forget pair keys from the previous round.
fn reset_dedup(dedup: Option<ResMut<CollisionDedup>>) {
    if let Some(mut dedup) = dedup {
        dedup.clear();
    }
}

/// Stop every moving part of the simulation and release the registry.
///
/// Idempotent: a second request after the session ended is ignored.
pub fn teardown_system(
    mut requests: MessageReader<TeardownRequested>,
    mut session: ResMut<SimulationSession>,
    mut schedule: ResMut<SpawnSchedule>,
    mut rapier: Query<&mut RapierConfiguration>,
    stats: Res<SimulationStats>,
    mut registry: EntityRegistry,
) {
    if requests.read().count() == 0 || !session.is_live() {
        return;
    }

    session.end();
    schedule.disarm();
    for mut cfg in rapier.iter_mut() {
        cfg.physics_pipeline_active = false;
    }
    let released = registry.clear();
    registry.commands().remove_resource::<CollisionDedup>();

    info!(
        "Simulation torn down: released {} entities ({} hits, {} launches over the session)",
        released.total(),
        stats.hits,
        stats.projectiles_launched
    );
}
