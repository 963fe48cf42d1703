//! Hit effects: target explosions and arrow fragments.
//!
//! ## Design
//!
//! Particles are rigid bodies with their own collider, so they bounce off
//! targets and each other, but they never enable collision events and carry
//! [`BodyLabel::Particle`], so the resolver ignores them.
//!
//! Spawning is split into a pure planning step (`plan_explosion`,
//! `plan_fragments`) that rolls every random value in screen space, and
//! [`spawn_particle`], which only converts units and inserts components.  The
//! mesh is attached one frame later by the presentation layer, which keys off
//! `Added<Particle>`.
//!
//! | Kind        | Count  | Footprint                 | Colour        |
//! |-------------|--------|---------------------------|---------------|
//! | `Explosion` | 15–25  | circle, radius 3–8        | target colour |
//! | `Fragment`  | 6–8    | rectangle 8–20 × 2–4      | arrow gold    |

use std::f32::consts::TAU;

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

use crate::config::GameConfig;
use crate::constants::ARROW_COLOR;
use crate::play_area::PlayArea;
use crate::registry::{BodyLabel, Opacity, Particle, ParticleKind, Rgb};
use crate::simulation::uniform;

/// One particle, fully rolled, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpec {
    pub kind: ParticleKind,
    pub position: Vec2,
    /// Pixels per step.
    pub velocity: Vec2,
    /// Initial facing (radians, screen space).
    pub angle: f32,
    /// Radians per step, screen space.
    pub spin: f32,
    /// Circle radius in `x` (and `y`) for explosions; rectangle extents for
    /// fragments.
    pub size: Vec2,
    pub color: Rgb,
}

/// Opacity of a particle `age_ms` after creation.
///
/// Linear from 1 at birth to exactly 0 at `lifetime_ms`, and 0 from then on.
pub fn particle_opacity(age_ms: f32, lifetime_ms: f32) -> f32 {
    if lifetime_ms <= 0.0 || age_ms >= lifetime_ms {
        return 0.0;
    }
    (1.0 - age_ms.max(0.0) / lifetime_ms).clamp(0.0, 1.0)
}

/// Radial burst at `center` in the target's colour.
///
/// Particle `i` of `n` leaves at angle `2π·i/n` plus a small jitter so the
/// ring is evenly covered but never perfectly regular.
pub fn plan_explosion(
    rng: &mut impl Rng,
    center: Vec2,
    color: Rgb,
    config: &GameConfig,
) -> Vec<ParticleSpec> {
    let count = rng.gen_range(config.explosion_count_min..=config.explosion_count_max);
    (0..count)
        .map(|i| {
            let angle =
                TAU * i as f32 / count as f32 + uniform(rng, 0.0, config.explosion_angle_jitter);
            let speed = uniform(rng, config.explosion_speed_min, config.explosion_speed_max);
            let radius = uniform(rng, config.explosion_radius_min, config.explosion_radius_max);
            ParticleSpec {
                kind: ParticleKind::Explosion,
                position: center,
                velocity: Vec2::from_angle(angle) * speed,
                angle: 0.0,
                spin: 0.0,
                size: Vec2::splat(radius),
                color,
            }
        })
        .collect()
}

/// Gold splinters at `origin`, carrying part of the arrow's momentum.
///
/// `projectile_velocity` is the arrow's velocity before the hit, in pixels per
/// step (screen space).
pub fn plan_fragments(
    rng: &mut impl Rng,
    origin: Vec2,
    projectile_velocity: Vec2,
    config: &GameConfig,
) -> Vec<ParticleSpec> {
    let count = rng.gen_range(config.fragment_count_min..=config.fragment_count_max);
    let inherited = projectile_velocity * config.fragment_velocity_share;
    (0..count)
        .map(|_| {
            let jitter_dir = uniform(rng, 0.0, TAU);
            let jitter_speed = uniform(rng, config.fragment_jitter_min, config.fragment_jitter_max);
            ParticleSpec {
                kind: ParticleKind::Fragment,
                position: origin,
                velocity: inherited + Vec2::from_angle(jitter_dir) * jitter_speed,
                angle: uniform(rng, 0.0, TAU),
                spin: (rng.gen::<f32>() - 0.5) * config.fragment_spin_range,
                size: Vec2::new(
                    uniform(rng, config.fragment_length_min, config.fragment_length_max),
                    uniform(rng, config.fragment_width_min, config.fragment_width_max),
                ),
                color: Rgb::from_array(ARROW_COLOR),
            }
        })
        .collect()
}

/// Insert one particle into the physics world and the registry.
pub fn spawn_particle(
    commands: &mut Commands,
    spec: &ParticleSpec,
    now_ms: f32,
    area: &PlayArea,
    config: &GameConfig,
) -> Entity {
    let (collider, air_friction, restitution) = match spec.kind {
        ParticleKind::Explosion => (
            Collider::ball(spec.size.x),
            config.explosion_air_friction,
            config.explosion_restitution,
        ),
        ParticleKind::Fragment => (
            Collider::cuboid(spec.size.x / 2.0, spec.size.y / 2.0),
            config.fragment_air_friction,
            config.fragment_restitution,
        ),
    };

    // Screen angles run clockwise; world angles counter-clockwise.
    let world_angle = -spec.angle;
    let world_spin = -config.per_second(spec.spin);

    commands
        .spawn((
            Particle {
                kind: spec.kind,
                color: spec.color,
                created_at_ms: now_ms,
                size: spec.size,
            },
            BodyLabel::Particle,
            Opacity::default(),
            RigidBody::Dynamic,
            collider,
            Restitution::coefficient(restitution),
            Velocity {
                linvel: config.per_second(PlayArea::dir_to_world(spec.velocity)),
                angvel: world_spin,
            },
            Damping {
                linear_damping: config.air_friction_to_damping(air_friction),
                angular_damping: config.air_friction_to_damping(air_friction),
            },
            Transform::from_translation(area.to_world(spec.position).extend(0.9))
                .with_rotation(Quat::from_rotation_z(world_angle)),
            Visibility::default(),
        ))
        .id()
}

/// Roll and spawn a target explosion.  Returns the number of particles.
pub fn spawn_explosion_particles(
    commands: &mut Commands,
    rng: &mut impl Rng,
    center: Vec2,
    color: Rgb,
    now_ms: f32,
    area: &PlayArea,
    config: &GameConfig,
) -> usize {
    let specs = plan_explosion(rng, center, color, config);
    for spec in &specs {
        spawn_particle(commands, spec, now_ms, area, config);
    }
    specs.len()
}

/// Roll and spawn arrow fragments.  Returns the number of particles.
pub fn spawn_fragment_particles(
    commands: &mut Commands,
    rng: &mut impl Rng,
    origin: Vec2,
    projectile_velocity: Vec2,
    now_ms: f32,
    area: &PlayArea,
    config: &GameConfig,
) -> usize {
    let specs = plan_fragments(rng, origin, projectile_velocity, config);
    for spec in &specs {
        spawn_particle(commands, spec, now_ms, area, config);
    }
    specs.len()
}
