//! Entity registry: the three live entity kinds and their per-entity state.
//!
//! The ECS world is the arena and [`Entity`] is the index.  Every piece of
//! auxiliary state the game keeps about an entity (a target's colour, a
//! particle's birth time, a projectile part's owner) is a field on a component
//! attached to that entity, so despawning the entity releases all of it in one
//! step and nothing can outlive its owner.
//!
//! | Kind        | Component      | Created by          | Destroyed by                 |
//! |-------------|----------------|---------------------|------------------------------|
//! | Target      | [`Target`]     | `spawner`           | `collision` (hit), `sweeper` |
//! | Projectile  | [`Projectile`] | `launcher`          | `collision` (hit), `sweeper` |
//! | Particle    | [`Particle`]   | `collision`         | `sweeper` (faded out)        |

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// 8-bit sRGB colour without alpha; alpha is derived from [`Opacity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_array(c: [u8; 3]) -> Self {
        Self {
            r: c[0],
            g: c[1],
            b: c[2],
        }
    }

    /// Bevy colour with the given alpha in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Color {
        Color::srgba(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha.clamp(0.0, 1.0),
        )
    }
}

/// Label the collision resolver uses to interpret a contact.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLabel {
    Target,
    ProjectilePart,
    Particle,
}

/// Falling circle the player has to hit.
#[derive(Component, Debug, Clone, Copy)]
pub struct Target {
    pub radius: f32,
    pub color: Rgb,
}

/// Logical arrow.  Lives on the parent rigid body; its two colliders are
/// children tagged with [`ProjectilePart`].
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Projectile;

/// World-space velocity (px/s) of an arrow as of the last `Update`, before
/// Rapier's next step.  A contact is read one frame after Rapier has already
/// applied the rebound to [`Velocity`], so hits use this instead.
///
/// [`Velocity`]: bevy_rapier2d::prelude::Velocity
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightVelocity(pub Vec2);

/// One collider of a compound projectile, pointing back at its owner.
#[derive(Component, Debug, Clone, Copy)]
pub struct ProjectilePart {
    pub projectile: Entity,
}

/// Local-space polygon of a collider, used to build its fill mesh.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Outline(pub Vec<Vec2>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Round burst piece inheriting the target's colour.
    Explosion,
    /// Gold arrow splinter with spin.
    Fragment,
}

/// Short-lived visual piece produced by a hit.
#[derive(Component, Debug, Clone, Copy)]
pub struct Particle {
    pub kind: ParticleKind,
    pub color: Rgb,
    /// Game clock at creation (ms since app start).
    pub created_at_ms: f32,
    /// Width and height of the footprint; explosion particles use `x` as the
    /// radius and leave `y` equal to it.
    pub size: Vec2,
}

/// Display alpha in `[0, 1]`, recomputed every frame by the sweeper.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Opacity(pub f32);

impl Default for Opacity {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Number of live entities per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryCounts {
    pub targets: usize,
    pub projectiles: usize,
    pub particles: usize,
}

impl RegistryCounts {
    pub fn total(&self) -> usize {
        self.targets + self.projectiles + self.particles
    }
}

/// System parameter giving whole-registry access: counting and clearing.
#[derive(SystemParam)]
pub struct EntityRegistry<'w, 's> {
    commands: Commands<'w, 's>,
    targets: Query<'w, 's, Entity, With<Target>>,
    projectiles: Query<'w, 's, Entity, With<Projectile>>,
    particles: Query<'w, 's, Entity, With<Particle>>,
}

impl<'w, 's> EntityRegistry<'w, 's> {
    /// Command queue shared with the registry, for follow-up edits in the
    /// same system.
    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.commands
    }

    pub fn counts(&self) -> RegistryCounts {
        RegistryCounts {
            targets: self.targets.iter().count(),
            projectiles: self.projectiles.iter().count(),
            particles: self.particles.iter().count(),
        }
    }

    /// Despawn every live target, projectile (with its parts) and particle.
    ///
    /// Returns how many entities were queued for removal.
    pub fn clear(&mut self) -> RegistryCounts {
        let counts = self.counts();
        for entity in self
            .targets
            .iter()
            .chain(self.projectiles.iter())
            .chain(self.particles.iter())
        {
            self.commands.entity(entity).try_despawn();
        }
        counts
    }
}

/// Count live entities directly on a [`World`] (tests and diagnostics).
pub fn registry_counts(world: &mut World) -> RegistryCounts {
    RegistryCounts {
        targets: world
            .query_filtered::<Entity, With<Target>>()
            .iter(world)
            .count(),
        projectiles: world
            .query_filtered::<Entity, With<Projectile>>()
            .iter(world)
            .count(),
        particles: world
            .query_filtered::<Entity, With<Particle>>()
            .iter(world)
            .count(),
    }
}
