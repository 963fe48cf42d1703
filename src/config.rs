//! Runtime gameplay configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  While the app is built, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.launch_speed`, `config.particle_lifetime_ms`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::error::{validate_air_friction, validate_positive, validate_range, GameResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable gameplay configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Timing ───────────────────────────────────────────────────────────────
    pub steps_per_second: f32,
    pub round_duration_secs: u32,
    pub low_time_warning_secs: u32,

    // ── Play Area ────────────────────────────────────────────────────────────
    pub launch_origin_inset: f32,
    pub gravity: f32,

    // ── Spawner ──────────────────────────────────────────────────────────────
    pub spawn_delay_min_ms: f32,
    pub spawn_delay_max_ms: f32,
    pub spawn_batch_max: u32,
    pub spawn_y: f32,
    pub spawn_right_margin: f32,
    pub target_radius_min: f32,
    pub target_radius_max: f32,
    pub target_restitution: f32,
    pub target_friction: f32,
    pub target_cull_margin: f32,
    pub target_fade_depth: f32,

    // ── Projectile ───────────────────────────────────────────────────────────
    pub launch_speed: f32,
    pub shaft_length: f32,
    pub shaft_width: f32,
    pub head_size: f32,
    pub projectile_restitution: f32,
    pub projectile_friction: f32,
    pub projectile_air_friction: f32,
    pub projectile_cull_margin: f32,

    // ── Particles ────────────────────────────────────────────────────────────
    pub particle_lifetime_ms: f32,
    pub explosion_count_min: u32,
    pub explosion_count_max: u32,
    pub explosion_angle_jitter: f32,
    pub explosion_speed_min: f32,
    pub explosion_speed_max: f32,
    pub explosion_radius_min: f32,
    pub explosion_radius_max: f32,
    pub explosion_air_friction: f32,
    pub explosion_restitution: f32,
    pub fragment_count_min: u32,
    pub fragment_count_max: u32,
    pub fragment_velocity_share: f32,
    pub fragment_jitter_min: f32,
    pub fragment_jitter_max: f32,
    pub fragment_length_min: f32,
    pub fragment_length_max: f32,
    pub fragment_width_min: f32,
    pub fragment_width_max: f32,
    pub fragment_spin_range: f32,
    pub fragment_air_friction: f32,
    pub fragment_restitution: f32,

    // ── Collision bookkeeping ────────────────────────────────────────────────
    pub dedup_grace_ms: f32,

    // ── Leaderboard ──────────────────────────────────────────────────────────
    pub leaderboard_path: String,
    pub leaderboard_limit: usize,
    pub max_name_len: usize,

    // ── Rendering ────────────────────────────────────────────────────────────
    pub hud_font_size: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Timing
            steps_per_second: STEPS_PER_SECOND,
            round_duration_secs: ROUND_DURATION_SECS,
            low_time_warning_secs: LOW_TIME_WARNING_SECS,
            // Play Area
            launch_origin_inset: LAUNCH_ORIGIN_INSET,
            gravity: GRAVITY,
            // Spawner
            spawn_delay_min_ms: SPAWN_DELAY_MIN_MS,
            spawn_delay_max_ms: SPAWN_DELAY_MAX_MS,
            spawn_batch_max: SPAWN_BATCH_MAX,
            spawn_y: SPAWN_Y,
            spawn_right_margin: SPAWN_RIGHT_MARGIN,
            target_radius_min: TARGET_RADIUS_MIN,
            target_radius_max: TARGET_RADIUS_MAX,
            target_restitution: TARGET_RESTITUTION,
            target_friction: TARGET_FRICTION,
            target_cull_margin: TARGET_CULL_MARGIN,
            target_fade_depth: TARGET_FADE_DEPTH,
            // Projectile
            launch_speed: LAUNCH_SPEED,
            shaft_length: SHAFT_LENGTH,
            shaft_width: SHAFT_WIDTH,
            head_size: HEAD_SIZE,
            projectile_restitution: PROJECTILE_RESTITUTION,
            projectile_friction: PROJECTILE_FRICTION,
            projectile_air_friction: PROJECTILE_AIR_FRICTION,
            projectile_cull_margin: PROJECTILE_CULL_MARGIN,
            // Particles
            particle_lifetime_ms: PARTICLE_LIFETIME_MS,
            explosion_count_min: EXPLOSION_COUNT_MIN,
            explosion_count_max: EXPLOSION_COUNT_MAX,
            explosion_angle_jitter: EXPLOSION_ANGLE_JITTER,
            explosion_speed_min: EXPLOSION_SPEED_MIN,
            explosion_speed_max: EXPLOSION_SPEED_MAX,
            explosion_radius_min: EXPLOSION_RADIUS_MIN,
            explosion_radius_max: EXPLOSION_RADIUS_MAX,
            explosion_air_friction: EXPLOSION_AIR_FRICTION,
            explosion_restitution: EXPLOSION_RESTITUTION,
            fragment_count_min: FRAGMENT_COUNT_MIN,
            fragment_count_max: FRAGMENT_COUNT_MAX,
            fragment_velocity_share: FRAGMENT_VELOCITY_SHARE,
            fragment_jitter_min: FRAGMENT_JITTER_MIN,
            fragment_jitter_max: FRAGMENT_JITTER_MAX,
            fragment_length_min: FRAGMENT_LENGTH_MIN,
            fragment_length_max: FRAGMENT_LENGTH_MAX,
            fragment_width_min: FRAGMENT_WIDTH_MIN,
            fragment_width_max: FRAGMENT_WIDTH_MAX,
            fragment_spin_range: FRAGMENT_SPIN_RANGE,
            fragment_air_friction: FRAGMENT_AIR_FRICTION,
            fragment_restitution: FRAGMENT_RESTITUTION,
            // Collision bookkeeping
            dedup_grace_ms: DEDUP_GRACE_MS,
            // Leaderboard
            leaderboard_path: LEADERBOARD_PATH.to_string(),
            leaderboard_limit: LEADERBOARD_LIMIT,
            max_name_len: MAX_NAME_LEN,
            // Rendering
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

impl GameConfig {
    /// Convert a per-step quantity (pixels or radians / step) into a
    /// per-second one.
    #[inline]
    pub fn per_second<T: std::ops::Mul<f32, Output = T>>(&self, per_step: T) -> T {
        per_step * self.steps_per_second
    }

    /// Inverse of [`GameConfig::per_second`].
    #[inline]
    pub fn per_step<T: std::ops::Div<f32, Output = T>>(&self, per_second: T) -> T {
        per_second / self.steps_per_second
    }

    /// Convert a per-step air friction factor into Rapier linear damping.
    ///
    /// Air friction `f` scales velocity by `1 - f` every step, which is the
    /// same decay as continuous damping `-ln(1 - f) * steps_per_second`.
    #[inline]
    pub fn air_friction_to_damping(&self, air_friction: f32) -> f32 {
        -(1.0 - air_friction).ln() * self.steps_per_second
    }

    /// Check every value whose misconfiguration would break an invariant.
    pub fn validate(&self) -> GameResult<()> {
        validate_positive("steps_per_second", self.steps_per_second)?;
        validate_positive("round_duration_secs", self.round_duration_secs as f32)?;
        validate_range(
            "spawn_delay_ms",
            self.spawn_delay_min_ms,
            self.spawn_delay_max_ms,
        )?;
        validate_positive("spawn_delay_min_ms", self.spawn_delay_min_ms)?;
        validate_range(
            "target_radius",
            self.target_radius_min,
            self.target_radius_max,
        )?;
        validate_positive("launch_speed", self.launch_speed)?;
        validate_positive("particle_lifetime_ms", self.particle_lifetime_ms)?;
        validate_range(
            "explosion_count",
            self.explosion_count_min as f32,
            self.explosion_count_max as f32,
        )?;
        validate_range(
            "fragment_count",
            self.fragment_count_min as f32,
            self.fragment_count_max as f32,
        )?;
        validate_range(
            "explosion_speed",
            self.explosion_speed_min,
            self.explosion_speed_max,
        )?;
        validate_air_friction("projectile_air_friction", self.projectile_air_friction)?;
        validate_air_friction("explosion_air_friction", self.explosion_air_friction)?;
        validate_air_friction("fragment_air_friction", self.fragment_air_friction)?;
        validate_positive("dedup_grace_ms", self.dedup_grace_ms)?;
        Ok(())
    }
}

/// Parse a TOML document into a validated [`GameConfig`].
pub fn parse_game_config(contents: &str) -> Result<GameConfig, String> {
    let config: GameConfig = toml::from_str(contents).map_err(|e| e.to_string())?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Read `path` and return the config it describes.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are logged but do not abort the game.  A missing file is not an error.
///
/// Called while the app is being built (after `LogPlugin`), because the first
/// round starts before any `Startup` system runs.
pub fn load_game_config(path: &str) -> GameConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_game_config(&contents) {
            Ok(loaded) => {
                info!("Loaded game config from {path}");
                loaded
            }
            Err(e) => {
                warn!("Failed to load {path}: {e}; using defaults");
                GameConfig::default()
            }
        },
        Err(_) => {
            info!("No {path} found; using compiled defaults");
            GameConfig::default()
        }
    }
}
