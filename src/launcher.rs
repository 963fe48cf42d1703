//! Input launcher: pointer activations become arrows fired from the
//! bottom-left corner.
//!
//! Pointer handling is split in two so the launch path can be driven without
//! a window: [`pointer_input_system`] turns mouse clicks and touch starts into
//! [`LaunchRequest`] messages, and [`launch_projectile_system`] consumes them.
//!
//! An arrow is one rigid body carrying [`Projectile`] with two child colliders
//! (shaft + head), each tagged [`ProjectilePart`] so a contact on either part
//! resolves to the same logical arrow.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_rapier2d::prelude::*;

use crate::config::GameConfig;
use crate::play_area::{launch_origin, sync_play_area_system, PlayArea};
use crate::registry::{BodyLabel, FlightVelocity, Outline, Projectile, ProjectilePart};
use crate::round::RoundState;
use crate::simulation::{SimSet, SimulationSession, SimulationStats};

/// A point in the play area was activated (screen space).
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct LaunchRequest {
    pub point: Vec2,
}

/// Resolved launch parameters, all in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchPlan {
    pub origin: Vec2,
    /// Pixels per step.
    pub velocity: Vec2,
    /// Facing angle (radians, screen space).
    pub angle: f32,
}

/// Aim from `origin` at `point` with the given speed.
///
/// Returns `None` for a zero-length aim vector: there is no direction to
/// normalise, so no arrow is created.
pub fn plan_launch(origin: Vec2, point: Vec2, speed: f32) -> Option<LaunchPlan> {
    let delta = point - origin;
    let distance = delta.length();
    if distance <= f32::EPSILON || !distance.is_finite() {
        return None;
    }
    let dir = delta / distance;
    Some(LaunchPlan {
        origin,
        velocity: dir * speed,
        angle: delta.y.atan2(delta.x),
    })
}

/// Shaft rectangle and head triangle in the arrow's local frame (+x forward).
pub fn arrow_outlines(config: &GameConfig) -> (Vec<Vec2>, Vec<Vec2>) {
    let half_len = config.shaft_length / 2.0;
    let half_w = config.shaft_width / 2.0;
    let head = config.head_size;
    let shaft = vec![
        Vec2::new(-half_len, -half_w),
        Vec2::new(half_len, -half_w),
        Vec2::new(half_len, half_w),
        Vec2::new(-half_len, half_w),
    ];
    let tip = vec![
        Vec2::new(half_len + head, 0.0),
        Vec2::new(half_len, head / 2.0),
        Vec2::new(half_len, -head / 2.0),
    ];
    (shaft, tip)
}

/// Insert a two-part arrow into the physics world and the registry.
pub fn spawn_projectile(
    commands: &mut Commands,
    plan: &LaunchPlan,
    area: &PlayArea,
    config: &GameConfig,
) -> Entity {
    let world_pos = area.to_world(plan.origin);
    let linvel = config.per_second(PlayArea::dir_to_world(plan.velocity));
    let world_angle = linvel.y.atan2(linvel.x);
    let (shaft, tip) = arrow_outlines(config);

    let projectile = commands
        .spawn((
            Projectile,
            FlightVelocity(linvel),
            RigidBody::Dynamic,
            Velocity {
                linvel,
                angvel: 0.0,
            },
            Damping {
                linear_damping: config.air_friction_to_damping(config.projectile_air_friction),
                angular_damping: 0.0,
            },
            Ccd::enabled(),
            Transform::from_translation(world_pos.extend(0.5))
                .with_rotation(Quat::from_rotation_z(world_angle)),
            Visibility::default(),
        ))
        .id();

    let half_len = config.shaft_length / 2.0;
    let half_w = config.shaft_width / 2.0;
    let part = |outline: Vec<Vec2>, collider: Collider| {
        (
            ProjectilePart { projectile },
            BodyLabel::ProjectilePart,
            collider,
            Restitution::coefficient(config.projectile_restitution),
            Friction::coefficient(config.projectile_friction),
            ActiveEvents::COLLISION_EVENTS,
            Outline(outline),
            Transform::default(),
            Visibility::default(),
        )
    };
    let head = Collider::triangle(tip[0], tip[1], tip[2]);
    commands.entity(projectile).with_children(|arrow| {
        arrow.spawn(part(shaft, Collider::cuboid(half_len, half_w)));
        arrow.spawn(part(tip, head));
    });

    projectile
}

/// Window-facing half of the launcher: reads the mouse and touch screen and
/// keeps [`PlayArea`] matched to the window.  Needs `DefaultPlugins`.
pub struct PointerInputPlugin;

impl Plugin for PointerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (sync_play_area_system, pointer_input_system)
                .chain()
                .in_set(SimSet::Input),
        );
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Convert left clicks and touch starts on the primary window into
/// [`LaunchRequest`]s.
pub fn pointer_input_system(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut requests: MessageWriter<LaunchRequest>,
) {
    if buttons.just_pressed(MouseButton::Left) {
        if let Some(point) = windows.single().ok().and_then(Window::cursor_position) {
            requests.write(LaunchRequest { point });
        }
    }
    for touch in touches.iter_just_pressed() {
        requests.write(LaunchRequest {
            point: touch.position(),
        });
    }
}

/// Launch one arrow per pending request while the round is playing.
#[allow(clippy::too_many_arguments)]
pub fn launch_projectile_system(
    mut commands: Commands,
    mut requests: MessageReader<LaunchRequest>,
    session: Res<SimulationSession>,
    state: Res<State<RoundState>>,
    area: Res<PlayArea>,
    config: Res<GameConfig>,
    mut stats: ResMut<SimulationStats>,
) {
    // Always drain so clicks made after the round ended never fire later.
    let pending: Vec<LaunchRequest> = requests.read().copied().collect();
    if !session.is_live() || *state.get() != RoundState::Playing {
        return;
    }

    let origin = launch_origin(&area, &config);
    for request in pending {
        let Some(plan) = plan_launch(origin, request.point, config.launch_speed) else {
            continue;
        };
        spawn_projectile(&mut commands, &plan, &area, &config);
        stats.projectiles_launched += 1;
    }
}
