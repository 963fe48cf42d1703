//! Headless leaderboard flow tests.
//!
//! Covers:
//! - Round end opens name entry with the frozen score and loads the board
//! - A valid name is trimmed, stored, and highlighted; entry then closes
//! - Blank names and backend failures surface a player-facing error and keep
//!   name entry open; the error can be dismissed
//! - Submissions outside the game-over screen are ignored
//! - The file backend persists across instances and reports broken storage

mod common;

use std::sync::{Arc, Mutex};

use arrow_burst::error::{GameError, GameResult};
use arrow_burst::leaderboard::{
    DismissError, FileLeaderboard, LeaderboardBackend, LeaderboardEntry, LeaderboardView,
    ScoreSubmission, SubmitScoreRequest,
};
use arrow_burst::round::{ReplayRequested, Round, RoundState};
use bevy::prelude::*;
use common::*;

/// Backend that counts calls and can be switched into a failing mode.
#[derive(Clone, Default)]
struct ProbeBackend {
    calls: Arc<Mutex<usize>>,
    failing: bool,
}

impl ProbeBackend {
    fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    fn submit_calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl LeaderboardBackend for ProbeBackend {
    fn submit_score(&mut self, name: &str, score: u32) -> GameResult<ScoreSubmission> {
        *self.calls.lock().unwrap() += 1;
        if self.failing {
            return Err(GameError::storage("insert score", "connection refused"));
        }
        let mut table = arrow_burst::leaderboard::LeaderboardTable::default();
        Ok(table.insert(name, score, 0))
    }

    fn get_leaderboard(&self) -> GameResult<Vec<LeaderboardEntry>> {
        Ok(Vec::new())
    }
}

fn view(app: &App) -> LeaderboardView {
    app.world().resource::<LeaderboardView>().clone()
}

/// Score `points`, then jump to the game-over screen.
fn finish_with_score(app: &mut App, points: u32) {
    for _ in 0..points {
        app.world_mut().resource_mut::<Round>().add_point();
    }
    set_state(app, RoundState::Finished);
}

fn submit(app: &mut App, name: &str) {
    app.world_mut().write_message(SubmitScoreRequest {
        name: name.to_string(),
    });
    app.update();
}

/// Round end opens name entry with the frozen score.
#[test]
fn round_end_opens_name_entry() {
    let mut app = quiet_app();
    assert!(!view(&app).name_entry_open);

    finish_with_score(&mut app, 3);
    let view = view(&app);
    assert!(view.name_entry_open);
    assert_eq!(view.final_score, 3);
    assert!(view.error.is_none());
}

/// A trimmed name and the final score land on the board and get highlighted.
#[test]
fn valid_submission_appears_on_board() {
    let mut app = quiet_app();
    finish_with_score(&mut app, 7);
    submit(&mut app, "  Ada ");

    let view = view(&app);
    assert!(!view.name_entry_open, "name entry closes after a submit");
    assert!(view.error.is_none());
    let submitted = view.submitted.clone().expect("submission recorded");
    assert_eq!(submitted.user.name, "Ada");
    assert_eq!(submitted.record.score, 7);

    assert_eq!(view.entries.len(), 1);
    assert_eq!(view.entries[0].name, "Ada");
    assert_eq!(view.entries[0].score, 7);
    assert!(view.is_own_entry(&view.entries[0]));
}

/// A second submit for the same round is dropped.
#[test]
fn second_submission_is_ignored() {
    let mut app = quiet_app();
    finish_with_score(&mut app, 2);
    submit(&mut app, "Ada");
    submit(&mut app, "Grace");

    let view = view(&app);
    assert_eq!(view.entries.len(), 1);
    assert_eq!(view.entries[0].name, "Ada");
}

/// A blank name never reaches the backend and keeps entry open.
#[test]
fn blank_name_is_rejected() {
    let probe = ProbeBackend::default();
    let mut app = app_with_backend(probe.clone());
    finish_with_score(&mut app, 5);
    submit(&mut app, "   ");

    let view = view(&app);
    assert_eq!(view.error.as_deref(), Some("Please enter your name"));
    assert!(view.name_entry_open);
    assert_eq!(probe.submit_calls(), 0);
}

/// A failing backend shows a retryable error and keeps name entry open.
#[test]
fn backend_failure_keeps_entry_open() {
    let probe = ProbeBackend::failing();
    let mut app = app_with_backend(probe.clone());
    finish_with_score(&mut app, 5);
    submit(&mut app, "Ada");

    let current = view(&app);
    assert_eq!(probe.submit_calls(), 1);
    assert!(current.name_entry_open);
    assert!(current.submitted.is_none());
    let message = current.error.expect("error shown");
    assert!(message.contains("try again"), "{message}");

    app.world_mut().write_message(DismissError);
    app.update();
    assert!(view(&app).error.is_none());
    assert!(view(&app).name_entry_open, "player can retry");
}

/// Submissions during play never reach the backend.
#[test]
fn submission_during_play_is_ignored() {
    let probe = ProbeBackend::default();
    let mut app = app_with_backend(probe.clone());
    submit(&mut app, "Ada");
    assert_eq!(probe.submit_calls(), 0);
    assert!(view(&app).submitted.is_none());
}

/// Replay clears the previous game-over screen but keeps stored scores.
#[test]
fn replay_resets_view_but_not_board() {
    let mut app = quiet_app();
    finish_with_score(&mut app, 4);
    submit(&mut app, "Ada");

    app.world_mut().write_message(ReplayRequested);
    run_frames(&mut app, 2);
    assert_eq!(view(&app), LeaderboardView::default());

    finish_with_score(&mut app, 9);
    let view = view(&app);
    assert_eq!(view.final_score, 9);
    assert_eq!(view.entries.len(), 1, "earlier score is still listed");
}

/// Scores written by one file backend are read back by another.
#[test]
fn file_backend_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("leaderboard.toml");

    let mut first = FileLeaderboard::new(&path, 100);
    assert!(first.get_leaderboard().unwrap().is_empty(), "missing file is empty");
    first.submit_score("Ada", 7).unwrap();
    first.submit_score("Grace", 12).unwrap();

    let second = FileLeaderboard::new(&path, 100);
    let entries = second.get_leaderboard().unwrap();
    let ranked: Vec<(&str, u32)> = entries
        .iter()
        .map(|e| (e.name.as_str(), e.score))
        .collect();
    assert_eq!(ranked, vec![("Grace", 12), ("Ada", 7)]);
    assert!(!path.with_extension("toml.tmp").exists());
}

/// A corrupt board file is a storage error, not an empty board.
#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leaderboard.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    let mut board = FileLeaderboard::new(&path, 100);
    assert!(matches!(
        board.get_leaderboard(),
        Err(GameError::Storage { .. })
    ));
    assert!(matches!(
        board.submit_score("Ada", 1),
        Err(GameError::Storage { .. })
    ));
    let untouched = std::fs::read_to_string(&path).unwrap();
    assert_eq!(untouched, "this is = = not toml");
}

/// An unwritable location fails the submit with a storage error.
#[test]
fn unwritable_location_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    let mut board = FileLeaderboard::new(blocker.join("leaderboard.toml"), 100);
    let err = board.submit_score("Ada", 1).unwrap_err();
    assert!(matches!(err, GameError::Storage { .. }));
    assert!(err.player_message().contains("try again"));
}
