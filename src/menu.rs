//! Game-over overlay: final score, name entry, leaderboard, and replay.
//!
//! ## Systems (registered by `GameOverPlugin`)
//!
//! | System                      | Schedule                | Purpose                                 |
//! |-----------------------------|-------------------------|-----------------------------------------|
//! | `setup_game_over`           | `OnEnter(Finished)`     | Spawn the overlay                       |
//! | `cleanup_game_over`         | `OnExit(Finished)`      | Despawn the overlay                     |
//! | `name_input_system`         | `Update / in Finished`  | Type into the name buffer               |
//! | `game_over_button_system`   | `Update / in Finished`  | Submit, Play Again, dismiss error       |
//! | `refresh_game_over_system`  | `Update / in Finished`  | Mirror [`LeaderboardView`] into the UI  |
//!
//! The overlay never touches the backend itself; it only writes
//! [`SubmitScoreRequest`], [`DismissError`] and [`ReplayRequested`] and reads
//! back the view the leaderboard systems maintain.

use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;

use crate::config::GameConfig;
use crate::leaderboard::{DismissError, LeaderboardEntry, LeaderboardView, SubmitScoreRequest};
use crate::round::{ReplayRequested, RoundState};

mod common;
mod game_over;

use common::*;
pub use game_over::format_date;
use game_over::*;

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the overlay; the whole tree is despawned on `OnExit(Finished)`.
#[derive(Component)]
pub struct GameOverRoot;

/// Row holding the name field and the submit button; hidden after submitting.
#[derive(Component)]
pub struct NameEntryRow;

/// Text node echoing the name buffer.
#[derive(Component)]
pub struct NameInputText;

#[derive(Component)]
pub struct SubmitNameButton;

#[derive(Component)]
pub struct PlayAgainButton;

/// Clickable error banner; hidden while there is no error.
#[derive(Component)]
pub struct ErrorBanner;

#[derive(Component)]
pub struct ErrorBannerText;

/// Container the leaderboard rows are rebuilt into.
#[derive(Component)]
pub struct LeaderboardTable;

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct GameOverPlugin;

impl Plugin for GameOverPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(RoundState::Finished), setup_game_over)
            .add_systems(OnExit(RoundState::Finished), cleanup_game_over)
            .add_systems(
                Update,
                (
                    name_input_system,
                    game_over_button_system,
                    refresh_game_over_system,
                )
                    .chain()
                    .run_if(in_state(RoundState::Finished)),
            );
    }
}
