use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;

pub(super) fn play_again_bg() -> Color {
    Color::srgb(0.08, 0.36, 0.14)
}
pub(super) fn play_again_border() -> Color {
    Color::srgb(0.18, 0.72, 0.28)
}
pub(super) fn play_again_text() -> Color {
    Color::srgb(0.75, 1.0, 0.80)
}
pub(super) fn submit_bg() -> Color {
    Color::srgb(0.10, 0.18, 0.36)
}
pub(super) fn submit_border() -> Color {
    Color::srgb(0.22, 0.44, 0.78)
}
pub(super) fn submit_text() -> Color {
    Color::srgb(0.65, 0.80, 1.0)
}
pub(super) fn error_bg() -> Color {
    Color::srgb(0.28, 0.06, 0.06)
}
pub(super) fn error_border() -> Color {
    Color::srgb(0.60, 0.12, 0.12)
}
pub(super) fn error_text() -> Color {
    Color::srgb(1.0, 0.65, 0.65)
}
pub(super) fn title_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
pub(super) fn subtitle_color() -> Color {
    Color::srgb(0.55, 0.55, 0.65)
}
pub(super) fn hint_color() -> Color {
    Color::srgb(0.28, 0.28, 0.35)
}
pub(super) fn row_color() -> Color {
    Color::srgb(0.85, 0.85, 0.92)
}
pub(super) fn own_row_color() -> Color {
    Color::srgb(0.98, 0.75, 0.14)
}
/// Gold, silver, bronze for ranks 1-3 (zero-based `rank`).
pub(super) fn podium_color(rank: usize) -> Option<Color> {
    match rank {
        0 => Some(Color::srgb(1.0, 0.84, 0.30)),
        1 => Some(Color::srgb(0.78, 0.80, 0.86)),
        2 => Some(Color::srgb(0.84, 0.56, 0.34)),
        _ => None,
    }
}
pub(super) fn field_bg() -> Color {
    Color::srgb(0.04, 0.04, 0.08)
}

/// Spawn a fixed-height invisible spacer node.
pub(super) fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

/// Plain text node with the default font.
pub(super) fn label(text: impl Into<String>, size: f32, color: Color) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}
