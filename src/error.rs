//! Game-specific error types.
//!
//! Systems propagate failures through these types rather than panicking so a
//! broken leaderboard file or a bad config value degrades to a visible,
//! recoverable state instead of taking the game down.
//!
//! ## Usage
//!
//! ```rust
//! use arrow_burst::error::{GameError, GameResult};
//!
//! fn checked_name(raw: &str) -> GameResult<&str> {
//!     let name = raw.trim();
//!     if name.is_empty() {
//!         return Err(GameError::EmptyName);
//!     }
//!     Ok(name)
//! }
//! # assert!(checked_name("  ").is_err());
//! ```

use std::fmt;

/// Top-level error enum for the game.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// The player tried to submit a blank (or all-whitespace) name.
    EmptyName,

    /// A score submission arrived while no name-entry step was open, e.g. a
    /// second submit for the same round or a submit during play.
    SubmissionClosed,

    /// No leaderboard backend is installed in the app.
    LeaderboardUnavailable,

    /// Reading or writing leaderboard storage failed.
    Storage {
        /// Short description of the operation that failed (for logging).
        context: &'static str,
        /// Underlying error text.
        message: String,
    },

    /// Config value is outside its safe operating range.
    UnsafeConstant {
        /// Name of the config key (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl GameError {
    pub fn storage(context: &'static str, err: impl fmt::Display) -> Self {
        GameError::Storage {
            context,
            message: err.to_string(),
        }
    }

    /// Message shown to the player in the dismissable error banner.
    pub fn player_message(&self) -> String {
        match self {
            GameError::EmptyName => "Please enter your name".to_string(),
            GameError::SubmissionClosed => "This score has already been submitted".to_string(),
            GameError::LeaderboardUnavailable | GameError::Storage { .. } => {
                "Leaderboard unavailable. Please try again.".to_string()
            }
            GameError::UnsafeConstant { .. } => self.to_string(),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::EmptyName => write!(f, "player name is empty"),
            GameError::SubmissionClosed => {
                write!(f, "score submission is not open for this round")
            }
            GameError::LeaderboardUnavailable => write!(f, "no leaderboard backend installed"),
            GameError::Storage { context, message } => {
                write!(f, "leaderboard storage failed during '{}': {}", context, message)
            }
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> GameResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `min <= max` and both are non-negative.
pub fn validate_range(name: &'static str, min: f32, max: f32) -> GameResult<()> {
    if min >= 0.0 && min <= max {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value: min,
            safe_range: "0.0 ≤ min ≤ max",
        })
    }
}

/// Returns an error unless `value` is a per-step friction in `[0, 1)`.
pub fn validate_air_friction(name: &'static str, value: f32) -> GameResult<()> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0)",
        })
    }
}
