//! Round state machine: score, countdown, and the `Playing ⇄ Finished` cycle.
//!
//! ## States
//!
//! | State      | Entered by                         | Active systems                         |
//! |------------|------------------------------------|----------------------------------------|
//! | `Playing`  | app start, [`ReplayRequested`]     | spawner, launcher, resolver, countdown |
//! | `Finished` | countdown reaching zero            | name entry, leaderboard, replay        |
//!
//! The lifecycle sweeper runs in both states so in-flight effects settle after
//! the round ends.
//!
//! ## Transitions
//!
//! * `Playing → Finished` fires once when [`Round::advance_clock`] reports the
//!   final tick.  [`finish_round`] is additionally guarded by
//!   [`EndOfRoundGuard`] so re-entering the schedule can never emit a second
//!   [`RoundEnded`].
//! * `Finished → Playing` only through [`ReplayRequested`]; [`begin_round`]
//!   resets the score, the clock, the guard, and clears the registry.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::registry::EntityRegistry;
use crate::simulation::SimulationSession;

/// Round phase.  Every gameplay system is gated on this.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundState {
    /// Timer running; targets spawn and clicks launch arrows.
    #[default]
    Playing,
    /// Timer expired; score frozen and the leaderboard is shown.
    Finished,
}

/// Score and countdown of the live round.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Round {
    score: u32,
    time_left: u32,
    /// Fraction of the current second already elapsed.
    clock_secs: f32,
}

impl Default for Round {
    fn default() -> Self {
        Self::new(crate::constants::ROUND_DURATION_SECS)
    }
}

impl Round {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            score: 0,
            time_left: duration_secs,
            clock_secs: 0.0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn add_point(&mut self) {
        self.score = self.score.saturating_add(1);
    }

    /// Advance the countdown by `dt_secs`, decrementing `time_left` once per
    /// whole second elapsed.
    ///
    /// Returns `true` only on the call during which `time_left` reaches zero.
    /// Once at zero the clock no longer moves.
    pub fn advance_clock(&mut self, dt_secs: f32) -> bool {
        if self.time_left == 0 {
            return false;
        }
        self.clock_secs += dt_secs.max(0.0);
        while self.clock_secs >= 1.0 && self.time_left > 0 {
            self.clock_secs -= 1.0;
            self.time_left -= 1;
        }
        if self.time_left == 0 {
            self.clock_secs = 0.0;
            return true;
        }
        false
    }
}

/// One-shot latch for the end-of-round side effects.  Re-armed by replay.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfRoundGuard {
    pub armed: bool,
}

impl Default for EndOfRoundGuard {
    fn default() -> Self {
        Self { armed: true }
    }
}

/// Player asked to play again from the game-over screen.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ReplayRequested;

/// Emitted exactly once per round when it ends, carrying the frozen score.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEnded {
    pub score: u32,
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Tick the round clock while playing and request `Finished` on the last tick.
pub fn countdown_system(
    time: Res<Time>,
    session: Res<SimulationSession>,
    state: Res<State<RoundState>>,
    mut round: ResMut<Round>,
    mut next_state: ResMut<NextState<RoundState>>,
) {
    if !session.is_live() || *state.get() != RoundState::Playing {
        return;
    }
    if round.advance_clock(time.delta_secs()) {
        info!("Round over with score {}", round.score());
        next_state.set(RoundState::Finished);
    }
}

/// `OnEnter(Playing)`: start a fresh round.
///
/// Runs at app start and after every replay.
pub fn begin_round(
    config: Res<GameConfig>,
    mut round: ResMut<Round>,
    mut guard: ResMut<EndOfRoundGuard>,
    mut registry: EntityRegistry,
) {
    *round = Round::new(config.round_duration_secs);
    guard.armed = true;
    let cleared = registry.clear();
    if cleared.total() > 0 {
        debug!(
            "Cleared {} targets, {} projectiles, {} particles from previous round",
            cleared.targets, cleared.projectiles, cleared.particles
        );
    }
    info!("Round started ({}s)", config.round_duration_secs);
}

/// `OnEnter(Finished)`: fire the end-of-round side effects once.
pub fn finish_round(
    round: Res<Round>,
    mut guard: ResMut<EndOfRoundGuard>,
    mut ended: MessageWriter<RoundEnded>,
) {
    if !guard.armed {
        return;
    }
    guard.armed = false;
    ended.write(RoundEnded {
        score: round.score(),
    });
}

/// Honour replay requests, but only from `Finished`.
pub fn replay_system(
    mut requests: MessageReader<ReplayRequested>,
    state: Res<State<RoundState>>,
    mut next_state: ResMut<NextState<RoundState>>,
) {
    let wants_replay = requests.read().count() > 0;
    if wants_replay && *state.get() == RoundState::Finished {
        info!("Replay requested");
        next_state.set(RoundState::Playing);
    }
}
