//! Lifecycle sweeper: per-frame fade, re-orientation, and culling.
//!
//! Three independent passes run every frame in both round states, so effects
//! launched just before the round ended still settle.  They stop only when
//! the session is torn down.
//!
//! | Pass        | Opacity                         | Removed when                 |
//! |-------------|---------------------------------|------------------------------|
//! | Targets     | `max(0, 1 - 0.8 * y / height)`  | `y > height + 50`            |
//! | Particles   | `max(0, 1 - age / 2000 ms)`     | opacity reaches 0            |
//! | Projectiles | none                            | > 100 px outside any edge    |
//!
//! Projectiles are also turned to face their velocity every frame, and their
//! [`FlightVelocity`] is refreshed before Rapier steps again.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::config::GameConfig;
use crate::particles::particle_opacity;
use crate::play_area::PlayArea;
use crate::registry::{FlightVelocity, Opacity, Particle, Projectile, Target};
use crate::simulation::SimulationStats;

/// Depth fade for a target at screen height `y`.
pub fn target_opacity(y: f32, height: f32, fade_depth: f32) -> f32 {
    if height <= 0.0 {
        return 0.0;
    }
    (1.0 - fade_depth * y / height).clamp(0.0, 1.0)
}

/// Whether a target has fallen past the bottom edge plus `margin`.
pub fn target_fell_out(y: f32, height: f32, margin: f32) -> bool {
    y > height + margin
}

/// World-space facing angle for a velocity, or `None` when at rest.
pub fn facing_angle(world_velocity: Vec2) -> Option<f32> {
    if world_velocity.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(world_velocity.y.atan2(world_velocity.x))
}

// ── Systems ───────────────────────────────────────────────────────────────────

pub fn sweep_targets_system(
    mut commands: Commands,
    area: Res<PlayArea>,
    config: Res<GameConfig>,
    mut stats: ResMut<SimulationStats>,
    mut targets: Query<(Entity, &Transform, &mut Opacity), With<Target>>,
) {
    for (entity, transform, mut opacity) in targets.iter_mut() {
        let y = area.to_screen(transform.translation.truncate()).y;
        if target_fell_out(y, area.height, config.target_cull_margin) {
            commands.entity(entity).try_despawn();
            stats.targets_culled += 1;
            continue;
        }
        let next = target_opacity(y, area.height, config.target_fade_depth);
        if opacity.0 != next {
            opacity.0 = next;
        }
    }
}

pub fn sweep_particles_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut stats: ResMut<SimulationStats>,
    mut particles: Query<(Entity, &Particle, &mut Opacity)>,
) {
    let now_ms = time.elapsed_secs() * 1000.0;
    for (entity, particle, mut opacity) in particles.iter_mut() {
        let next = particle_opacity(now_ms - particle.created_at_ms, config.particle_lifetime_ms);
        if next <= 0.0 {
            commands.entity(entity).try_despawn();
            stats.particles_expired += 1;
            continue;
        }
        if opacity.0 != next {
            opacity.0 = next;
        }
    }
}

#[allow(clippy::type_complexity)]
pub fn sweep_projectiles_system(
    mut commands: Commands,
    area: Res<PlayArea>,
    config: Res<GameConfig>,
    mut stats: ResMut<SimulationStats>,
    mut projectiles: Query<
        (
            Entity,
            &mut Transform,
            Option<&Velocity>,
            Option<&mut FlightVelocity>,
        ),
        With<Projectile>,
    >,
) {
    for (entity, mut transform, velocity, flight) in projectiles.iter_mut() {
        let screen = area.to_screen(transform.translation.truncate());
        if area.is_outside(screen, config.projectile_cull_margin) {
            commands.entity(entity).try_despawn();
            stats.projectiles_culled += 1;
            continue;
        }
        let Some(velocity) = velocity else {
            continue;
        };
        if let Some(mut flight) = flight {
            if flight.0 != velocity.linvel {
                flight.0 = velocity.linvel;
            }
        }
        if let Some(angle) = facing_angle(velocity.linvel) {
            transform.rotation = Quat::from_rotation_z(angle);
        }
    }
}
