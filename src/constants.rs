//! Centralised gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig::default`] mirrors every value below; override
//! any subset at runtime through `assets/game.toml`.
//!
//! ## Units
//!
//! Times are milliseconds.  Speeds marked "per step" are in screen pixels per
//! physics step and are multiplied by [`STEPS_PER_SECOND`] before they are
//! handed to Rapier, which integrates in units per second.

// ── Timing ────────────────────────────────────────────────────────────────────

/// Nominal physics step rate used to convert per-step speeds to per-second.
pub const STEPS_PER_SECOND: f32 = 60.0;

/// Length of one round in whole seconds.
pub const ROUND_DURATION_SECS: u32 = 30;

/// Seconds left at which the HUD timer turns red.
pub const LOW_TIME_WARNING_SECS: u32 = 10;

// ── Play Area ─────────────────────────────────────────────────────────────────

/// Fallback play-area width used until the primary window reports its size.
pub const DEFAULT_PLAY_WIDTH: f32 = 1200.0;

/// Fallback play-area height used until the primary window reports its size.
pub const DEFAULT_PLAY_HEIGHT: f32 = 680.0;

/// Distance of the launch origin from the left and bottom edges (pixels).
pub const LAUNCH_ORIGIN_INSET: f32 = 50.0;

/// Downward gravity applied by Rapier (pixels / s²).
///
/// Deliberately gentle so targets drift down the screen over several seconds.
pub const GRAVITY: f32 = 100.0;

// ── Spawner ───────────────────────────────────────────────────────────────────

/// Shortest delay between two target batches.
pub const SPAWN_DELAY_MIN_MS: f32 = 800.0;

/// Longest delay between two target batches.
pub const SPAWN_DELAY_MAX_MS: f32 = 1200.0;

/// Largest number of targets created by a single batch (inclusive).
pub const SPAWN_BATCH_MAX: u32 = 3;

/// Screen-space y at which targets appear.
pub const SPAWN_Y: f32 = 50.0;

/// Keeps spawned targets this far from the right edge.
pub const SPAWN_RIGHT_MARGIN: f32 = 50.0;

/// Target radius range.
pub const TARGET_RADIUS_MIN: f32 = 12.0;
pub const TARGET_RADIUS_MAX: f32 = 30.0;

pub const TARGET_RESTITUTION: f32 = 0.8;
pub const TARGET_FRICTION: f32 = 0.001;

/// Targets are culled once their screen y exceeds `height + TARGET_CULL_MARGIN`.
pub const TARGET_CULL_MARGIN: f32 = 50.0;

/// Fraction of opacity a target loses between the top and bottom of the screen.
pub const TARGET_FADE_DEPTH: f32 = 0.8;

/// Bright palette targets draw their colour from (sRGB, 0–255).
pub const TARGET_PALETTE: [[u8; 3]; 14] = [
    [0xef, 0x44, 0x44], // red
    [0xf9, 0x73, 0x16], // orange
    [0xea, 0xb3, 0x08], // yellow
    [0x84, 0xcc, 0x16], // lime
    [0x22, 0xc5, 0x5e], // green
    [0x14, 0xb8, 0xa6], // teal
    [0x06, 0xb6, 0xd4], // cyan
    [0x3b, 0x82, 0xf6], // blue
    [0x63, 0x66, 0xf1], // indigo
    [0x8b, 0x5c, 0xf6], // violet
    [0xa8, 0x55, 0xf7], // purple
    [0xd9, 0x46, 0xef], // fuchsia
    [0xec, 0x48, 0x99], // pink
    [0xf4, 0x3f, 0x5e], // rose
];

// ── Projectile ────────────────────────────────────────────────────────────────

/// Launch speed (pixels per step).
pub const LAUNCH_SPEED: f32 = 15.0;

pub const SHAFT_LENGTH: f32 = 30.0;
pub const SHAFT_WIDTH: f32 = 3.0;
pub const HEAD_SIZE: f32 = 10.0;

pub const PROJECTILE_RESTITUTION: f32 = 0.3;
pub const PROJECTILE_FRICTION: f32 = 0.001;

/// Per-step air friction; converted to Rapier linear damping.
pub const PROJECTILE_AIR_FRICTION: f32 = 0.01;

/// Projectiles are culled once they leave the screen by more than this.
pub const PROJECTILE_CULL_MARGIN: f32 = 100.0;

/// Gold used for arrows and arrow fragments.
pub const ARROW_COLOR: [u8; 3] = [251, 191, 36];

// ── Particles ─────────────────────────────────────────────────────────────────

/// Fixed particle lifetime; opacity reaches zero exactly at this age.
pub const PARTICLE_LIFETIME_MS: f32 = 2000.0;

/// Explosion particles per hit (inclusive range).
pub const EXPLOSION_COUNT_MIN: u32 = 15;
pub const EXPLOSION_COUNT_MAX: u32 = 25;

/// Extra random angle added to each evenly spread explosion direction (radians).
pub const EXPLOSION_ANGLE_JITTER: f32 = 0.5;

/// Explosion particle speed range (pixels per step).
pub const EXPLOSION_SPEED_MIN: f32 = 2.0;
pub const EXPLOSION_SPEED_MAX: f32 = 4.0;

pub const EXPLOSION_RADIUS_MIN: f32 = 3.0;
pub const EXPLOSION_RADIUS_MAX: f32 = 8.0;
pub const EXPLOSION_AIR_FRICTION: f32 = 0.02;
pub const EXPLOSION_RESTITUTION: f32 = 0.6;

/// Fragment particles per hit (inclusive range).
pub const FRAGMENT_COUNT_MIN: u32 = 6;
pub const FRAGMENT_COUNT_MAX: u32 = 8;

/// Share of the projectile's pre-hit velocity inherited by each fragment.
pub const FRAGMENT_VELOCITY_SHARE: f32 = 0.3;

/// Random jitter speed added to each fragment (pixels per step).
pub const FRAGMENT_JITTER_MIN: f32 = 1.0;
pub const FRAGMENT_JITTER_MAX: f32 = 4.0;

pub const FRAGMENT_LENGTH_MIN: f32 = 8.0;
pub const FRAGMENT_LENGTH_MAX: f32 = 20.0;
pub const FRAGMENT_WIDTH_MIN: f32 = 2.0;
pub const FRAGMENT_WIDTH_MAX: f32 = 4.0;

/// Full width of the random spin range (radians per step), centred on zero.
pub const FRAGMENT_SPIN_RANGE: f32 = 0.3;

pub const FRAGMENT_AIR_FRICTION: f32 = 0.03;
pub const FRAGMENT_RESTITUTION: f32 = 0.4;

// ── Collision bookkeeping ─────────────────────────────────────────────────────

/// How long a resolved projectile/target pair stays in the dedup set.
pub const DEDUP_GRACE_MS: f32 = 100.0;

// ── Leaderboard ───────────────────────────────────────────────────────────────

/// Maximum number of entries returned by a leaderboard query.
pub const LEADERBOARD_LIMIT: usize = 100;

/// Longest accepted player name (characters).
pub const MAX_NAME_LEN: usize = 30;

/// Config file read while the app is built.
pub const GAME_CONFIG_PATH: &str = "assets/game.toml";

/// Default on-disk leaderboard location.
pub const LEADERBOARD_PATH: &str = "saves/leaderboard.toml";

// ── Rendering ─────────────────────────────────────────────────────────────────

pub const HUD_FONT_SIZE: f32 = 36.0;
