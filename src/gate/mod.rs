//! Parental session gate
//!
//! A parent unlocks the dashboard with the PIN, picks a play duration and
//! starts the countdown. While it runs the child may use the menu; when it
//! reaches zero the gate expires and the host stops whatever is playing.
//! The child can also ask for a grown-up, which shows a small puzzle that
//! leads back to the dashboard when answered correctly.
//!
//! The gate has no clock of its own: the host calls [`SessionGate::tick_second`]
//! once per second and [`SessionGate::poll`] every frame.

pub mod countdown;
pub mod puzzle;

pub use countdown::{Countdown, GateEvent};
pub use puzzle::{Puzzle, PuzzleKind};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{ALLOWED_MINUTES, GATE_PIN, PUZZLE_CORRECT_DELAY_MS, PUZZLE_WRONG_DELAY_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Locked,
    ParentDashboard,
    TimeSelected { minutes: u32 },
    PlaySessionActive,
    PuzzleChallenge,
    TimeExpired,
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Locked => "locked",
            GateState::ParentDashboard => "dashboard",
            GateState::TimeSelected { .. } => "time-selected",
            GateState::PlaySessionActive => "playing",
            GateState::PuzzleChallenge => "puzzle",
            GateState::TimeExpired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("wrong PIN")]
    WrongPin,
    #[error("{0} minutes is not on the menu")]
    NotOffered(u32),
    #[error("not allowed while {0}")]
    WrongState(&'static str),
    #[error("an answer is already being checked")]
    AnswerPending,
}

/// Outcome of a puzzle answer, applied once its delay has passed
#[derive(Debug, Clone, Copy, PartialEq)]
struct Decision {
    correct: bool,
    due: f64,
}

pub struct SessionGate {
    state: GateState,
    countdown: Countdown,
    puzzle: Option<Puzzle>,
    pending: Option<Decision>,
    wrong_pins: u32,
    rng: Pcg32,
}

impl SessionGate {
    pub fn new(seed: u64) -> Self {
        Self {
            state: GateState::Locked,
            countdown: Countdown::default(),
            puzzle: None,
            pending: None,
            wrong_pins: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    fn set_state(&mut self, next: GateState) {
        if self.state != next {
            log::info!("gate: {} -> {}", self.state.as_str(), next.as_str());
        }
        self.state = next;
    }

    fn wrong_state(&self) -> GateError {
        GateError::WrongState(self.state.as_str())
    }

    /// Unlock the dashboard. Wrong PINs can be retried without limit.
    pub fn submit_pin(&mut self, pin: &str) -> Result<(), GateError> {
        if !matches!(self.state, GateState::Locked | GateState::TimeExpired) {
            return Err(self.wrong_state());
        }
        if pin.trim() != GATE_PIN {
            self.wrong_pins += 1;
            log::warn!("gate: wrong PIN ({} so far)", self.wrong_pins);
            return Err(GateError::WrongPin);
        }
        self.countdown.stop();
        self.set_state(GateState::ParentDashboard);
        Ok(())
    }

    pub fn select_minutes(&mut self, minutes: u32) -> Result<(), GateError> {
        if !matches!(
            self.state,
            GateState::ParentDashboard | GateState::TimeSelected { .. }
        ) {
            return Err(self.wrong_state());
        }
        if !ALLOWED_MINUTES.contains(&minutes) {
            return Err(GateError::NotOffered(minutes));
        }
        self.set_state(GateState::TimeSelected { minutes });
        Ok(())
    }

    pub fn start_play(&mut self) -> Result<(), GateError> {
        let GateState::TimeSelected { minutes } = self.state else {
            return Err(self.wrong_state());
        };
        self.countdown.start(minutes);
        self.set_state(GateState::PlaySessionActive);
        log::info!("gate: {minutes} minutes of play");
        Ok(())
    }

    /// Back to the PIN prompt from the dashboard
    pub fn lock(&mut self) -> Result<(), GateError> {
        if !matches!(
            self.state,
            GateState::ParentDashboard | GateState::TimeSelected { .. }
        ) {
            return Err(self.wrong_state());
        }
        self.set_state(GateState::Locked);
        Ok(())
    }

    /// Advance the countdown by one second. Runs during the puzzle too.
    pub fn tick_second(&mut self) -> Option<GateEvent> {
        if !self.is_play_time_active() {
            return None;
        }
        let event = self.countdown.tick();
        match event {
            Some(GateEvent::Expired) => {
                self.puzzle = None;
                self.pending = None;
                self.set_state(GateState::TimeExpired);
            }
            Some(GateEvent::Warning) => log::info!("gate: one minute left"),
            None => {}
        }
        event
    }

    pub fn ask_grown_up(&mut self) -> Result<&Puzzle, GateError> {
        if self.state != GateState::PlaySessionActive {
            return Err(self.wrong_state());
        }
        self.pending = None;
        let puzzle = Puzzle::generate_after(&mut self.rng, self.puzzle.as_ref());
        self.set_state(GateState::PuzzleChallenge);
        Ok(self.puzzle.insert(puzzle))
    }

    /// Submit a candidate. Returns whether it was right; the outcome is
    /// applied by [`poll`](Self::poll) once its delay has passed. Further
    /// answers are refused until then.
    pub fn answer(&mut self, value: u32, now: f64) -> Result<bool, GateError> {
        if self.state != GateState::PuzzleChallenge {
            return Err(self.wrong_state());
        }
        if self.pending.is_some() {
            return Err(GateError::AnswerPending);
        }
        let correct = self.puzzle.as_ref().is_some_and(|p| p.is_correct(value));
        let delay = if correct {
            PUZZLE_CORRECT_DELAY_MS
        } else {
            PUZZLE_WRONG_DELAY_MS
        };
        self.pending = Some(Decision {
            correct,
            due: now + delay,
        });
        Ok(correct)
    }

    /// Apply a pending puzzle decision once due. Returns true when something
    /// changed.
    pub fn poll(&mut self, now: f64) -> bool {
        let Some(decision) = self.pending else {
            return false;
        };
        if now < decision.due {
            return false;
        }
        self.pending = None;
        if decision.correct {
            self.countdown.stop();
            self.puzzle = None;
            self.set_state(GateState::ParentDashboard);
        } else {
            let next = Puzzle::generate_after(&mut self.rng, self.puzzle.as_ref());
            self.puzzle = Some(next);
            log::debug!("gate: new puzzle after a wrong answer");
        }
        true
    }

    /// Leave the puzzle and return to the menu
    pub fn cancel_puzzle(&mut self) -> Result<(), GateError> {
        if self.state != GateState::PuzzleChallenge {
            return Err(self.wrong_state());
        }
        if self.pending.is_some() {
            return Err(GateError::AnswerPending);
        }
        self.puzzle = None;
        self.set_state(GateState::PlaySessionActive);
        Ok(())
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    pub fn answers_enabled(&self) -> bool {
        self.state == GateState::PuzzleChallenge && self.pending.is_none()
    }

    /// Whether the last submitted answer was right, while it is pending
    pub fn pending_verdict(&self) -> Option<bool> {
        self.pending.map(|d| d.correct)
    }

    pub fn is_play_time_active(&self) -> bool {
        matches!(
            self.state,
            GateState::PlaySessionActive | GateState::PuzzleChallenge
        ) && self.countdown.is_running()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn display(&self) -> String {
        self.countdown.display()
    }

    pub fn is_warning(&self) -> bool {
        self.countdown.is_warning()
    }

    pub fn wrong_pins(&self) -> u32 {
        self.wrong_pins
    }
}
