//! Leaderboard: persistence backends and the end-of-round submission flow.
//!
//! The game talks to storage only through [`LeaderboardBackend`]:
//!
//! * `submit_score(name, score)` creates a player record and a score record
//!   together, or neither.
//! * `get_leaderboard()` returns the top entries, best first.
//!
//! Two backends ship with the crate: [`InMemoryLeaderboard`] (tests, or a run
//! without a writable disk) and [`FileLeaderboard`], which keeps both tables
//! in one TOML file.
//!
//! ## Flow
//!
//! | Trigger                | Effect on [`LeaderboardView`]                         |
//! |------------------------|-------------------------------------------------------|
//! | [`RoundEnded`]         | name entry opens, board fetched                       |
//! | [`SubmitScoreRequest`] | validated, submitted, board refetched, entry closes   |
//! | submit failure         | `error` set, entry stays open for another try         |
//! | [`DismissError`]       | `error` cleared                                       |
//! | `OnEnter(Playing)`     | everything reset                                      |

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::constants::LEADERBOARD_LIMIT;
use crate::error::{GameError, GameResult};
use crate::round::{RoundEnded, RoundState};
use crate::simulation::SimSet;

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: u64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub id: u64,
    pub score: u32,
    pub user_id: u64,
    pub created_at_unix: u64,
}

/// What a successful submission created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub user: PlayerRecord,
    pub record: ScoreRecord,
}

/// One row of the ranked board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Score record id.
    pub id: u64,
    pub score: u32,
    pub name: String,
    pub created_at_unix: u64,
}

/// Persistence collaborator for scores.
pub trait LeaderboardBackend: Send + Sync + 'static {
    fn submit_score(&mut self, name: &str, score: u32) -> GameResult<ScoreSubmission>;
    fn get_leaderboard(&self) -> GameResult<Vec<LeaderboardEntry>>;
}

fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ── Shared table ─────────────────────────────────────────────────────────────

/// Users and scores, as stored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LeaderboardTable {
    pub next_id: u64,
    pub users: Vec<PlayerRecord>,
    pub scores: Vec<ScoreRecord>,
}

impl LeaderboardTable {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Add a player and their score.
    pub fn insert(&mut self, name: &str, score: u32, now_unix: u64) -> ScoreSubmission {
        let user = PlayerRecord {
            id: self.allocate_id(),
            name: name.to_string(),
        };
        let record = ScoreRecord {
            id: self.allocate_id(),
            score,
            user_id: user.id,
            created_at_unix: now_unix,
        };
        self.users.push(user.clone());
        self.scores.push(record.clone());
        ScoreSubmission { user, record }
    }

    /// Best `limit` scores joined with their player names.
    ///
    /// Highest score first; ties go to the older record.  Scores whose player
    /// is missing are skipped.
    pub fn ranked(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .scores
            .iter()
            .filter_map(|record| {
                let user = self.users.iter().find(|u| u.id == record.user_id)?;
                Some(LeaderboardEntry {
                    id: record.id,
                    score: record.score,
                    name: user.name.clone(),
                    created_at_unix: record.created_at_unix,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.created_at_unix.cmp(&b.created_at_unix))
                .then(a.id.cmp(&b.id))
        });
        entries.truncate(limit);
        entries
    }
}

// ── In-memory backend ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct InMemoryLeaderboard {
    table: LeaderboardTable,
    limit: usize,
}

impl Default for InMemoryLeaderboard {
    fn default() -> Self {
        Self::new(LEADERBOARD_LIMIT)
    }
}

impl InMemoryLeaderboard {
    pub fn new(limit: usize) -> Self {
        Self {
            table: LeaderboardTable::default(),
            limit,
        }
    }
}

impl LeaderboardBackend for InMemoryLeaderboard {
    fn submit_score(&mut self, name: &str, score: u32) -> GameResult<ScoreSubmission> {
        Ok(self.table.insert(name, score, current_unix_timestamp()))
    }

    fn get_leaderboard(&self) -> GameResult<Vec<LeaderboardEntry>> {
        Ok(self.table.ranked(self.limit))
    }
}

// ── File backend ─────────────────────────────────────────────────────────────

/// Both tables in one TOML file.  A missing file is an empty board.
#[derive(Debug, Clone)]
pub struct FileLeaderboard {
    path: PathBuf,
    limit: usize,
}

impl FileLeaderboard {
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    fn load(&self) -> GameResult<LeaderboardTable> {
        if !self.path.exists() {
            return Ok(LeaderboardTable::default());
        }
        let contents = fs::read_to_string(&self.path)
            .map_err(|err| GameError::storage("read leaderboard", err))?;
        toml::from_str(&contents).map_err(|err| GameError::storage("parse leaderboard", err))
    }

    /// Write via a sibling temp file so a failed write never leaves a
    /// half-written board behind.
    fn store(&self, table: &LeaderboardTable) -> GameResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| GameError::storage("create save dir", err))?;
        }
        let serialized = toml::to_string_pretty(table)
            .map_err(|err| GameError::storage("serialize leaderboard", err))?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, serialized).map_err(|err| GameError::storage("write leaderboard", err))?;
        fs::rename(&tmp, &self.path).map_err(|err| {
            let _ = fs::remove_file(&tmp);
            GameError::storage("replace leaderboard", err)
        })
    }
}

impl LeaderboardBackend for FileLeaderboard {
    fn submit_score(&mut self, name: &str, score: u32) -> GameResult<ScoreSubmission> {
        let mut table = self.load()?;
        let submission = table.insert(name, score, current_unix_timestamp());
        self.store(&table)?;
        Ok(submission)
    }

    fn get_leaderboard(&self) -> GameResult<Vec<LeaderboardEntry>> {
        Ok(self.load()?.ranked(self.limit))
    }
}

// ── Bevy side ────────────────────────────────────────────────────────────────

/// The installed backend.
#[derive(Resource)]
pub struct Leaderboard(pub Box<dyn LeaderboardBackend>);

impl Leaderboard {
    pub fn new(backend: impl LeaderboardBackend) -> Self {
        Self(Box::new(backend))
    }
}

/// Everything the game-over screen shows.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct LeaderboardView {
    pub final_score: u32,
    pub entries: Vec<LeaderboardEntry>,
    pub error: Option<String>,
    pub name_entry_open: bool,
    pub name_buffer: String,
    /// Set after a successful submit; the screen highlights this row.
    pub submitted: Option<ScoreSubmission>,
}

impl LeaderboardView {
    /// Append typed text, stopping at `max_len` characters.
    pub fn push_str(&mut self, text: &str, max_len: usize) {
        for c in text.chars().filter(|c| !c.is_control()) {
            if self.name_buffer.chars().count() >= max_len {
                break;
            }
            self.name_buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.name_buffer.pop();
    }

    pub fn is_own_entry(&self, entry: &LeaderboardEntry) -> bool {
        self.submitted
            .as_ref()
            .is_some_and(|s| s.record.id == entry.id)
    }
}

/// Player confirmed the typed name.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SubmitScoreRequest {
    pub name: String,
}

/// Player closed the error banner.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct DismissError;

/// Trim and check a typed name.
pub fn validate_player_name(raw: &str, max_len: usize) -> GameResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GameError::EmptyName);
    }
    Ok(trimmed.chars().take(max_len).collect())
}

pub struct LeaderboardPlugin;

impl Plugin for LeaderboardPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Leaderboard>() {
            app.insert_resource(Leaderboard::new(InMemoryLeaderboard::default()));
        }
        app.init_resource::<LeaderboardView>()
            .add_message::<RoundEnded>()
            .add_message::<SubmitScoreRequest>()
            .add_message::<DismissError>()
            .add_systems(OnEnter(RoundState::Playing), reset_leaderboard_view)
            .add_systems(
                Update,
                (
                    open_name_entry_system,
                    submit_score_system,
                    dismiss_error_system,
                )
                    .chain()
                    .after(SimSet::Countdown),
            );
    }
}

fn fetch_into(view: &mut LeaderboardView, leaderboard: Option<&Leaderboard>) {
    let result = leaderboard
        .ok_or(GameError::LeaderboardUnavailable)
        .and_then(|lb| lb.0.get_leaderboard());
    match result {
        Ok(entries) => {
            info!("Loaded {} leaderboard entries", entries.len());
            view.entries = entries;
        }
        Err(err) => {
            error!("Failed to load leaderboard: {err}");
            view.error = Some(err.player_message());
        }
    }
}

/// On round end: freeze the score, open name entry, fetch the board.
pub fn open_name_entry_system(
    mut ended: MessageReader<RoundEnded>,
    mut view: ResMut<LeaderboardView>,
    leaderboard: Option<Res<Leaderboard>>,
) {
    let Some(last) = ended.read().last().copied() else {
        return;
    };
    view.final_score = last.score;
    view.name_entry_open = true;
    view.submitted = None;
    view.error = None;
    fetch_into(&mut view, leaderboard.as_deref());
}

/// Validate and submit the typed name, then refresh the board.
pub fn submit_score_system(
    mut requests: MessageReader<SubmitScoreRequest>,
    state: Res<State<RoundState>>,
    config: Res<GameConfig>,
    mut view: ResMut<LeaderboardView>,
    leaderboard: Option<ResMut<Leaderboard>>,
) {
    let Some(request) = requests.read().last().cloned() else {
        return;
    };

    if *state.get() != RoundState::Finished || !view.name_entry_open {
        warn!("Ignoring score submission: {}", GameError::SubmissionClosed);
        return;
    }

    let name = match validate_player_name(&request.name, config.max_name_len) {
        Ok(name) => name,
        Err(err) => {
            view.error = Some(err.player_message());
            return;
        }
    };

    let Some(mut leaderboard) = leaderboard else {
        let err = GameError::LeaderboardUnavailable;
        error!("Failed to submit score: {err}");
        view.error = Some(err.player_message());
        return;
    };

    match leaderboard.0.submit_score(&name, view.final_score) {
        Ok(submission) => {
            info!(
                "Submitted score {} for '{}' (record {})",
                submission.record.score, submission.user.name, submission.record.id
            );
            view.submitted = Some(submission);
            view.name_entry_open = false;
            view.error = None;
            fetch_into(&mut view, Some(&*leaderboard));
        }
        Err(err) => {
            error!("Failed to submit score: {err}");
            view.error = Some(err.player_message());
        }
    }
}

pub fn dismiss_error_system(
    mut requests: MessageReader<DismissError>,
    mut view: ResMut<LeaderboardView>,
) {
    if requests.read().count() > 0 && view.error.is_some() {
        view.error = None;
    }
}

/// `OnEnter(Playing)`: forget everything from the previous game-over screen.
pub fn reset_leaderboard_view(mut view: ResMut<LeaderboardView>) {
    *view = LeaderboardView::default();
}
