//! Target spawner: a self-rescheduling batch generator.
//!
//! [`SpawnSchedule`] holds the time left until the next batch.  When it runs
//! out, [`spawn_targets_system`] checks that the session is still live and the
//! round is still `Playing` **at fire time**; if either check fails the schedule
//! disarms itself instead of spawning.  Otherwise it creates 0–3 targets and
//! re-arms with a fresh random delay, including after an empty batch.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

use crate::config::GameConfig;
use crate::constants::TARGET_PALETTE;
use crate::play_area::PlayArea;
use crate::registry::{BodyLabel, Opacity, Rgb, Target};
use crate::round::RoundState;
use crate::simulation::{uniform, SimulationSession, SimulationStats};

/// Countdown to the next batch; `None` when the spawner is disarmed.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SpawnSchedule {
    pub remaining_ms: Option<f32>,
}

impl SpawnSchedule {
    pub fn is_armed(&self) -> bool {
        self.remaining_ms.is_some()
    }

    /// Arm so the first batch fires on the next tick.
    pub fn arm_now(&mut self) {
        self.remaining_ms = Some(0.0);
    }

    pub fn disarm(&mut self) {
        self.remaining_ms = None;
    }
}

/// Everything needed to create one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSpec {
    /// Screen-space centre.
    pub position: Vec2,
    pub radius: f32,
    pub color: Rgb,
}

/// Random delay before the next batch.
pub fn next_spawn_delay_ms(rng: &mut impl Rng, config: &GameConfig) -> f32 {
    uniform(rng, config.spawn_delay_min_ms, config.spawn_delay_max_ms)
}

/// Roll one batch of 0..=`spawn_batch_max` targets across the right half of
/// the play area.
pub fn plan_spawn_batch(
    rng: &mut impl Rng,
    area: &PlayArea,
    config: &GameConfig,
) -> Vec<TargetSpec> {
    let count = rng.gen_range(0..=config.spawn_batch_max);
    let right_half_start = area.width / 2.0;
    let span = (area.width - right_half_start - config.spawn_right_margin).max(0.0);

    (0..count)
        .map(|_| {
            let color = TARGET_PALETTE[rng.gen_range(0..TARGET_PALETTE.len())];
            TargetSpec {
                position: Vec2::new(right_half_start + rng.gen::<f32>() * span, config.spawn_y),
                radius: uniform(rng, config.target_radius_min, config.target_radius_max),
                color: Rgb::from_array(color),
            }
        })
        .collect()
}

/// Insert one target into the physics world and the registry.
pub fn spawn_target(
    commands: &mut Commands,
    spec: &TargetSpec,
    area: &PlayArea,
    config: &GameConfig,
) -> Entity {
    let world_pos = area.to_world(spec.position);
    commands
        .spawn((
            Target {
                radius: spec.radius,
                color: spec.color,
            },
            BodyLabel::Target,
            Opacity::default(),
            RigidBody::Dynamic,
            Collider::ball(spec.radius),
            Restitution::coefficient(config.target_restitution),
            Friction::coefficient(config.target_friction),
            Velocity::zero(),
            ActiveEvents::COLLISION_EVENTS,
            Transform::from_translation(world_pos.extend(0.0)),
            Visibility::default(),
        ))
        .id()
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// `OnEnter(Playing)`: arm the spawner so the first batch appears immediately.
pub fn arm_spawner(mut schedule: ResMut<SpawnSchedule>) {
    schedule.arm_now();
}

/// Count down to the next batch; on expiry, re-check liveness, spawn, re-arm.
#[allow(clippy::too_many_arguments)]
pub fn spawn_targets_system(
    mut commands: Commands,
    time: Res<Time>,
    session: Res<SimulationSession>,
    state: Res<State<RoundState>>,
    area: Res<PlayArea>,
    config: Res<GameConfig>,
    mut schedule: ResMut<SpawnSchedule>,
    mut stats: ResMut<SimulationStats>,
) {
    let Some(remaining) = schedule.remaining_ms.as_mut() else {
        return;
    };
    *remaining -= time.delta_secs() * 1000.0;
    if *remaining > 0.0 {
        return;
    }

    if !session.is_live() || *state.get() != RoundState::Playing {
        schedule.disarm();
        return;
    }

    let mut rng = rand::thread_rng();
    let batch = plan_spawn_batch(&mut rng, &area, &config);
    for spec in &batch {
        spawn_target(&mut commands, spec, &area, &config);
    }
    stats.record_batch(batch.len());

    schedule.remaining_ms = Some(next_spawn_delay_ms(&mut rng, &config));
}
