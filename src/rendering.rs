//! Rendering: fill meshes for every registry entity, opacity sync, and the HUD.
//!
//! ## System Responsibilities
//!
//! | System                          | Schedule | Purpose                                   |
//! |---------------------------------|----------|-------------------------------------------|
//! | `setup_hud`                     | Startup  | Spawn the score / time text nodes         |
//! | `attach_target_mesh_system`     | Update   | Circle fill for new targets               |
//! | `attach_particle_mesh_system`   | Update   | Circle or bar fill for new particles      |
//! | `attach_projectile_mesh_system` | Update   | Shaft + head fills for new arrow parts    |
//! | `sync_opacity_system`           | Update   | Copy [`Opacity`] into material alpha      |
//! | `hud_display_system`            | Update   | Refresh score / time text                 |
//!
//! Spawn helpers only insert gameplay and physics components; meshes arrive one
//! frame later through `Added<T>` queries, which is imperceptible at 60 Hz.
//! Every target and particle gets its own [`ColorMaterial`] so its alpha can
//! fade independently; arrow parts share one gold material.

use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};

use crate::config::GameConfig;
use crate::constants::ARROW_COLOR;
use crate::registry::{Opacity, Outline, Particle, ParticleKind, ProjectilePart, Rgb, Target};
use crate::round::Round;
use crate::simulation::SimSet;

// ── Resources / markers ───────────────────────────────────────────────────────

/// Shared material for arrow parts (created once at startup).
#[derive(Resource)]
pub struct ArrowMaterial(pub Handle<ColorMaterial>);

/// Marker for the score text.
#[derive(Component)]
pub struct HudScoreText;

/// Marker for the countdown text.
#[derive(Component)]
pub struct HudTimeText;

fn score_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn time_color() -> Color {
    Color::srgb(0.90, 0.90, 0.95)
}
fn low_time_color() -> Color {
    Color::srgb(1.0, 0.25, 0.25)
}

/// Countdown colour: red once `time_left` is at or under the warning mark.
pub fn time_text_color(time_left: u32, warning_secs: u32) -> Color {
    if time_left <= warning_secs {
        low_time_color()
    } else {
        time_color()
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (init_arrow_material, setup_hud))
            .add_systems(
                Update,
                (
                    (
                        attach_target_mesh_system,
                        attach_particle_mesh_system,
                        attach_projectile_mesh_system,
                    ),
                    sync_opacity_system,
                    hud_display_system,
                )
                    .chain()
                    .after(SimSet::Countdown),
            );
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

fn init_arrow_material(mut commands: Commands, mut materials: ResMut<Assets<ColorMaterial>>) {
    let color = Rgb::from_array(ARROW_COLOR).with_alpha(1.0);
    let handle = materials.add(ColorMaterial::from_color(color));
    commands.insert_resource(ArrowMaterial(handle));
}

/// Spawn the top-left score and time read-outs.
pub fn setup_hud(mut commands: Commands, config: Res<GameConfig>) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(16.0),
            top: Val::Px(10.0),
            column_gap: Val::Px(32.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("Score: 0"),
                TextFont {
                    font_size: config.hud_font_size,
                    ..default()
                },
                TextColor(score_color()),
                HudScoreText,
            ));
            parent.spawn((
                Text::new(format!("Time: {}", config.round_duration_secs)),
                TextFont {
                    font_size: config.hud_font_size,
                    ..default()
                },
                TextColor(time_color()),
                HudTimeText,
            ));
        });
}

// ── Mesh attachment ───────────────────────────────────────────────────────────

pub fn attach_target_mesh_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    query: Query<(Entity, &Target, &Opacity), Added<Target>>,
) {
    for (entity, target, opacity) in query.iter() {
        let mesh = meshes.add(circle_mesh(target.radius, 32));
        let material = materials.add(ColorMaterial::from_color(
            target.color.with_alpha(opacity.0),
        ));
        commands
            .entity(entity)
            .insert((Mesh2d(mesh), MeshMaterial2d(material)));
    }
}

pub fn attach_particle_mesh_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    query: Query<(Entity, &Particle, &Opacity), Added<Particle>>,
) {
    for (entity, particle, opacity) in query.iter() {
        let mesh = match particle.kind {
            ParticleKind::Explosion => circle_mesh(particle.size.x, 10),
            ParticleKind::Fragment => {
                let half = particle.size / 2.0;
                filled_polygon_mesh(&[
                    Vec2::new(-half.x, -half.y),
                    Vec2::new(half.x, -half.y),
                    Vec2::new(half.x, half.y),
                    Vec2::new(-half.x, half.y),
                ])
            }
        };
        let material = materials.add(ColorMaterial::from_color(
            particle.color.with_alpha(opacity.0),
        ));
        commands
            .entity(entity)
            .insert((Mesh2d(meshes.add(mesh)), MeshMaterial2d(material)));
    }
}

pub fn attach_projectile_mesh_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    arrow_material: Res<ArrowMaterial>,
    query: Query<(Entity, &Outline), Added<ProjectilePart>>,
) {
    for (entity, outline) in query.iter() {
        if outline.0.len() < 3 {
            continue;
        }
        let mesh = meshes.add(filled_polygon_mesh(&outline.0));
        commands
            .entity(entity)
            .insert((Mesh2d(mesh), MeshMaterial2d(arrow_material.0.clone())));
    }
}

// ── Per-frame sync ────────────────────────────────────────────────────────────

/// Write the sweeper's opacity into each entity's own material.
#[allow(clippy::type_complexity)]
pub fn sync_opacity_system(
    mut materials: ResMut<Assets<ColorMaterial>>,
    query: Query<
        (
            &Opacity,
            &MeshMaterial2d<ColorMaterial>,
            Option<&Target>,
            Option<&Particle>,
        ),
        Changed<Opacity>,
    >,
) {
    for (opacity, material, target, particle) in query.iter() {
        let base = match (target, particle) {
            (Some(t), _) => t.color,
            (None, Some(p)) => p.color,
            (None, None) => continue,
        };
        if let Some(mat) = materials.get_mut(&material.0) {
            mat.color = base.with_alpha(opacity.0);
        }
    }
}

/// Refresh the score and countdown when the round changes.
pub fn hud_display_system(
    round: Res<Round>,
    config: Res<GameConfig>,
    mut score_text: Query<&mut Text, (With<HudScoreText>, Without<HudTimeText>)>,
    mut time_text: Query<(&mut Text, &mut TextColor), With<HudTimeText>>,
) {
    if !round.is_changed() {
        return;
    }
    for mut text in score_text.iter_mut() {
        *text = Text::new(format!("Score: {}", round.score()));
    }
    for (mut text, mut color) in time_text.iter_mut() {
        *text = Text::new(format!("Time: {}", round.time_left()));
        *color = TextColor(time_text_color(
            round.time_left(),
            config.low_time_warning_secs,
        ));
    }
}

// ── Mesh helpers ──────────────────────────────────────────────────────────────

/// Build a filled circle mesh approximated by an `n`-sided regular polygon.
///
/// Uses a triangle fan from the centre: `(0, i, i+1 mod n)`.
pub fn circle_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides.max(3) as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let (x, y) = (radius * angle.cos(), radius * angle.sin());
        positions.push([x, y, 0.0]);
        uvs.push([x / (2.0 * radius) + 0.5, y / (2.0 * radius) + 0.5]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..n as u32 {
        indices.extend_from_slice(&[0, i + 1, (i + 1) % n as u32 + 1]);
    }

    build_mesh(positions, uvs, indices)
}

/// Fan-triangulate a convex polygon (arrow parts, fragment bars).
pub fn filled_polygon_mesh(vertices: &[Vec2]) -> Mesh {
    let n = vertices.len();
    let positions: Vec<[f32; 3]> = vertices.iter().map(|v| [v.x, v.y, 0.0]).collect();
    let uvs: Vec<[f32; 2]> = vertices
        .iter()
        .map(|v| [(v.x / 40.0) + 0.5, (v.y / 40.0) + 0.5])
        .collect();

    let mut indices: Vec<u32> = Vec::with_capacity(n.saturating_sub(2) * 3);
    for i in 1..(n as u32).saturating_sub(1) {
        indices.extend_from_slice(&[0, i, i + 1]);
    }

    build_mesh(positions, uvs, indices)
}

fn build_mesh(positions: Vec<[f32; 3]>, uvs: Vec<[f32; 2]>, indices: Vec<u32>) -> Mesh {
    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_mesh_is_a_closed_fan() {
        let mesh = circle_mesh(10.0, 8);
        assert_eq!(mesh.count_vertices(), 9);
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("expected u32 indices");
        };
        assert_eq!(indices.len(), 24);
        assert_eq!(&indices[21..], &[0, 8, 1]);
    }

    #[test]
    fn triangle_outline_makes_one_triangle() {
        let mesh = filled_polygon_mesh(&[Vec2::ZERO, Vec2::X, Vec2::Y]);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(3));
    }

    #[test]
    fn time_turns_red_at_warning_mark() {
        assert_eq!(time_text_color(11, 10), time_color());
        assert_eq!(time_text_color(10, 10), low_time_color());
        assert_eq!(time_text_color(0, 10), low_time_color());
    }
}
