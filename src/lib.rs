//! Arrow-burst arcade game library
//!
//! Falling targets, click-launched arrows, particle bursts on every hit, and a
//! 30 second round that ends on a leaderboard.  Physics is Rapier through
//! `bevy_rapier2d`; everything else is Bevy ECS systems.
//!
//! The gameplay core ([`simulation::SimulationPlugin`] and
//! [`leaderboard::LeaderboardPlugin`]) runs headless; window input and
//! rendering live in separate plugins added by the binary.

pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod graphics;
pub mod launcher;
pub mod leaderboard;
pub mod menu;
pub mod particles;
pub mod play_area;
pub mod registry;
pub mod rendering;
pub mod round;
pub mod simulation;
pub mod spawner;
pub mod sweeper;
