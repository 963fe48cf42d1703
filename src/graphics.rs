use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::config::GameConfig;

/// Setup camera for 2D rendering
pub fn setup_camera(mut commands: Commands) {
    // Default Camera2d maps one world unit to one logical pixel, centred.
    commands.spawn(Camera2d);
    info!("Camera spawned");
}

/// Point Rapier's gravity down the screen at the configured strength.
pub fn setup_physics(mut rapier: Query<&mut RapierConfiguration>, config: Res<GameConfig>) {
    for mut cfg in rapier.iter_mut() {
        cfg.gravity = Vec2::new(0.0, -config.gravity);
    }
}
