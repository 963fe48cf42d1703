//! Collision resolver: turns projectile/target contacts into score, particles,
//! and removals.
//!
//! Rapier can report one physical contact several times across adjacent
//! steps (and the two arrow parts can both touch the same target).  Every
//! scoring pair goes through [`CollisionDedup`] first: the first observation
//! of a `(projectile, target)` pair wins, later ones are dropped.  The key is
//! kept for a short grace window after the hit and then pruned by
//! [`prune_dedup_system`], which quietly does nothing once teardown has
//! removed the resource.
//!
//! Within a single pass, a projectile or target that has already been
//! consumed is skipped as well, so one arrow destroys at most one target.

use std::collections::{HashMap, HashSet};

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::config::GameConfig;
use crate::particles::{spawn_explosion_particles, spawn_fragment_particles};
use crate::play_area::PlayArea;
use crate::registry::{BodyLabel, FlightVelocity, Projectile, ProjectilePart, Target};
use crate::round::{Round, RoundState};
use crate::simulation::{SimulationSession, SimulationStats};

/// Identity of one projectile/target pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub projectile: Entity,
    pub target: Entity,
}

impl PairKey {
    pub fn new(projectile: Entity, target: Entity) -> Self {
        Self { projectile, target }
    }
}

/// Pair keys already scored, each with the game-clock time (ms) after which
/// it may be forgotten.
#[derive(Resource, Debug, Clone, Default)]
pub struct CollisionDedup {
    expiries: HashMap<PairKey, f32>,
}

impl CollisionDedup {
    /// Record `key` at `now_ms`.
    ///
    /// Returns `true` on first observation; `false` while the key is still
    /// held, including past its expiry until the next prune.
    pub fn observe(&mut self, key: PairKey, now_ms: f32, grace_ms: f32) -> bool {
        if self.expiries.contains_key(&key) {
            return false;
        }
        self.expiries.insert(key, now_ms + grace_ms);
        true
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.expiries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    /// Drop every key whose grace window has elapsed.  Returns how many.
    pub fn prune_expired(&mut self, now_ms: f32) -> usize {
        let before = self.expiries.len();
        self.expiries.retain(|_, expires_at| *expires_at > now_ms);
        before - self.expiries.len()
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }
}

/// Read access to everything a contact can touch.
#[derive(SystemParam)]
pub struct CollisionBodies<'w, 's> {
    labels: Query<'w, 's, &'static BodyLabel>,
    parts: Query<'w, 's, &'static ProjectilePart>,
    targets: Query<'w, 's, (&'static Target, &'static Transform)>,
    projectiles: Query<
        'w,
        's,
        (&'static Transform, Option<&'static FlightVelocity>),
        With<Projectile>,
    >,
}

impl CollisionBodies<'_, '_> {
    /// `(projectile, target)` if exactly one side is a projectile part and the
    /// other a target; `None` for every other pairing.
    pub fn classify(&self, a: Entity, b: Entity) -> Option<(Entity, Entity)> {
        let la = self.labels.get(a).ok()?;
        let lb = self.labels.get(b).ok()?;
        if !is_scoring_pair(*la, *lb) {
            return None;
        }
        let (part, target) = if *la == BodyLabel::ProjectilePart {
            (a, b)
        } else {
            (b, a)
        };
        let owner = self.parts.get(part).ok()?.projectile;
        Some((owner, target))
    }
}

/// Whether a contact between these labels can score, in either order.
pub fn is_scoring_pair(a: BodyLabel, b: BodyLabel) -> bool {
    matches!(
        (a, b),
        (BodyLabel::ProjectilePart, BodyLabel::Target)
            | (BodyLabel::Target, BodyLabel::ProjectilePart)
    )
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Resolve every contact reported since the last pass.
///
/// Events are always drained; outside `Playing` (or after teardown) they are
/// discarded without touching score or entities.
#[allow(clippy::too_many_arguments)]
pub fn resolve_collisions_system(
    mut commands: Commands,
    mut events: MessageReader<CollisionEvent>,
    time: Res<Time>,
    session: Res<SimulationSession>,
    state: Res<State<RoundState>>,
    area: Res<PlayArea>,
    config: Res<GameConfig>,
    mut round: ResMut<Round>,
    mut stats: ResMut<SimulationStats>,
    dedup: Option<ResMut<CollisionDedup>>,
    bodies: CollisionBodies,
) {
    let started: Vec<(Entity, Entity)> = events
        .read()
        .filter_map(|event| match event {
            CollisionEvent::Started(a, b, _) => Some((*a, *b)),
            CollisionEvent::Stopped(..) => None,
        })
        .collect();
    if started.is_empty() || !session.is_live() || *state.get() != RoundState::Playing {
        return;
    }
    let Some(mut dedup) = dedup else {
        return;
    };

    let now_ms = time.elapsed_secs() * 1000.0;
    let mut consumed: HashSet<Entity> = HashSet::new();
    let mut rng = rand::thread_rng();

    for (a, b) in started {
        let Some((projectile, target)) = bodies.classify(a, b) else {
            continue;
        };
        if consumed.contains(&projectile) || consumed.contains(&target) {
            continue;
        }
        let Ok((target_data, target_tf)) = bodies.targets.get(target) else {
            continue;
        };
        let Ok((projectile_tf, projectile_vel)) = bodies.projectiles.get(projectile) else {
            continue;
        };
        if !dedup.observe(PairKey::new(projectile, target), now_ms, config.dedup_grace_ms) {
            continue;
        }

        round.add_point();
        stats.hits += 1;

        let target_pos = area.to_screen(target_tf.translation.truncate());
        let projectile_pos = area.to_screen(projectile_tf.translation.truncate());
        // Pre-contact velocity, back in screen space per step.
        let projectile_v = projectile_vel
            .map(|v| config.per_step(PlayArea::dir_to_world(v.0)))
            .unwrap_or(Vec2::ZERO);

        let explosion = spawn_explosion_particles(
            &mut commands,
            &mut rng,
            target_pos,
            target_data.color,
            now_ms,
            &area,
            &config,
        );
        let fragments = spawn_fragment_particles(
            &mut commands,
            &mut rng,
            projectile_pos,
            projectile_v,
            now_ms,
            &area,
            &config,
        );

        commands.entity(projectile).try_despawn();
        commands.entity(target).try_despawn();
        consumed.insert(projectile);
        consumed.insert(target);

        debug!(
            "Hit at ({:.0}, {:.0}): score {}, {} explosion + {} fragment particles",
            target_pos.x,
            target_pos.y,
            round.score(),
            explosion,
            fragments
        );
    }
}

/// Forget pair keys whose grace window has passed.
pub fn prune_dedup_system(time: Res<Time>, dedup: Option<ResMut<CollisionDedup>>) {
    let Some(mut dedup) = dedup else {
        return;
    };
    if dedup.is_empty() {
        return;
    }
    dedup.prune_expired(time.elapsed_secs() * 1000.0);
}
