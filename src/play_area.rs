//! Screen geometry shared by every gameplay system.
//!
//! Gameplay rules (spawn band, fade curve, culling margins, launch origin) are
//! written in **screen space**: origin at the top-left corner, y growing
//! downward, exactly what `Window::cursor_position` reports.  Rapier and the
//! renderer work in **world space**: origin at the window centre, y growing
//! upward.  [`PlayArea`] converts between the two.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::GameConfig;
use crate::constants::{DEFAULT_PLAY_HEIGHT, DEFAULT_PLAY_WIDTH};

/// Current play-area size in logical pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self::new(DEFAULT_PLAY_WIDTH, DEFAULT_PLAY_HEIGHT)
    }
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Screen point → world point.
    #[inline]
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x - self.width / 2.0, self.height / 2.0 - screen.y)
    }

    /// World point → screen point.
    #[inline]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.x + self.width / 2.0, self.height / 2.0 - world.y)
    }

    /// Screen-space direction → world-space direction (flips y).
    #[inline]
    pub fn dir_to_world(screen_dir: Vec2) -> Vec2 {
        Vec2::new(screen_dir.x, -screen_dir.y)
    }

    /// Fixed launch origin near the bottom-left corner (screen space).
    #[inline]
    pub fn launch_origin(&self, inset: f32) -> Vec2 {
        Vec2::new(inset, self.height - inset)
    }

    /// True when a screen point lies more than `margin` outside the screen on
    /// any side.
    pub fn is_outside(&self, screen: Vec2, margin: f32) -> bool {
        screen.x < -margin
            || screen.x > self.width + margin
            || screen.y < -margin
            || screen.y > self.height + margin
    }
}

/// Keep [`PlayArea`] in sync with the primary window (handles resizes).
pub fn sync_play_area_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut area: ResMut<PlayArea>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let (width, height) = (window.width(), window.height());
    if width > 0.0 && height > 0.0 && (area.width != width || area.height != height) {
        debug!("Play area resized to {width}x{height}");
        area.width = width;
        area.height = height;
    }
}

/// Launch origin for the current area and config, in screen space.
pub fn launch_origin(area: &PlayArea, config: &GameConfig) -> Vec2 {
    area.launch_origin(config.launch_origin_inset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_and_world_round_trip_corners() {
        let area = PlayArea::new(800.0, 600.0);
        assert_eq!(area.to_world(Vec2::new(0.0, 0.0)), Vec2::new(-400.0, 300.0));
        assert_eq!(area.to_world(Vec2::new(800.0, 600.0)), Vec2::new(400.0, -300.0));
        assert_eq!(area.to_screen(Vec2::ZERO), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn launch_origin_is_bottom_left() {
        let area = PlayArea::new(1000.0, 700.0);
        assert_eq!(area.launch_origin(50.0), Vec2::new(50.0, 650.0));
    }

    #[test]
    fn outside_respects_margin_on_every_side() {
        let area = PlayArea::new(100.0, 100.0);
        assert!(!area.is_outside(Vec2::new(-99.0, 50.0), 100.0));
        assert!(area.is_outside(Vec2::new(-101.0, 50.0), 100.0));
        assert!(area.is_outside(Vec2::new(201.0, 50.0), 100.0));
        assert!(area.is_outside(Vec2::new(50.0, -101.0), 100.0));
        assert!(area.is_outside(Vec2::new(50.0, 201.0), 100.0));
    }
}
