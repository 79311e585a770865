//! Memory Constellations
//!
//! Simon-style memory game on a grid of stars. Each round appends one random
//! cell to the target sequence, plays the whole sequence back, then waits for
//! the player to repeat it. A wrong cell loses immediately; clearing the last
//! level wins.
//!
//! Playback is a chain of one-shot tasks (each step schedules the next), so it
//! can never run twice at once. Every task is stamped with the attempt it
//! belongs to; `reset` starts a new attempt and anything stamped with an old
//! one is ignored.

use serde::{Deserialize, Serialize};

use super::Outcome;
use super::rng::RandomSource;
use super::timer::{TimerHandle, Timers};
use crate::settings::SequenceTuning;

/// Phase of the memory game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencePhase {
    /// Briefing shown, nothing generated yet
    Ready,
    /// Playing the target sequence back
    Showing,
    /// Waiting for the player to repeat it
    Awaiting,
    /// Wrong cell submitted
    Lost,
    /// Final level cleared
    Won,
}

impl SequencePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SequencePhase::Lost | SequencePhase::Won)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceTimer {
    /// Highlight `target[index]`
    Step { attempt: u32, index: usize },
    /// Clear the highlight and open input
    Settle { attempt: u32 },
    /// Start the next round after a cleared one
    NextRound { attempt: u32 },
}

impl SequenceTimer {
    fn attempt(self) -> u32 {
        match self {
            SequenceTimer::Step { attempt, .. }
            | SequenceTimer::Settle { attempt }
            | SequenceTimer::NextRound { attempt } => attempt,
        }
    }
}

/// Memory constellation engine
#[derive(Debug, Clone)]
pub struct SequenceGame {
    tuning: SequenceTuning,
    phase: SequencePhase,
    target: Vec<usize>,
    input: Vec<usize>,
    level: u32,
    highlighted: Option<usize>,
    attempt: u32,
    timers: Timers<SequenceTimer>,
    pending: Option<TimerHandle>,
    reported: bool,
}

impl SequenceGame {
    pub fn new(tuning: SequenceTuning) -> Self {
        Self {
            tuning,
            phase: SequencePhase::Ready,
            target: Vec::new(),
            input: Vec::new(),
            level: 1,
            highlighted: None,
            attempt: 0,
            timers: Timers::new(),
            pending: None,
            reported: false,
        }
    }

    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    /// Current level, 1-based
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_level(&self) -> u32 {
        self.tuning.max_level
    }

    pub fn grid_cells(&self) -> usize {
        self.tuning.grid_cells
    }

    pub fn target(&self) -> &[usize] {
        &self.target
    }

    pub fn input(&self) -> &[usize] {
        &self.input
    }

    /// Cell lit during playback
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Number of resets so far; tasks stamped with an older value are stale
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn pending_tasks(&self) -> usize {
        self.timers.len()
    }

    /// True between a cleared round and the next playback
    pub fn between_rounds(&self) -> bool {
        self.phase == SequencePhase::Awaiting && self.input.len() == self.target.len()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            SequencePhase::Won => Some(Outcome::Success),
            SequencePhase::Lost => Some(Outcome::Failure),
            _ => None,
        }
    }

    /// Report the terminal outcome of the current attempt exactly once
    pub fn take_outcome(&mut self) -> Option<Outcome> {
        if self.reported {
            return None;
        }
        let outcome = self.outcome()?;
        self.reported = true;
        Some(outcome)
    }

    /// Generate the first cell and start playback. Only valid from `Ready`.
    pub fn begin(&mut self, rng: &mut dyn RandomSource) -> bool {
        if self.phase != SequencePhase::Ready {
            return false;
        }
        self.begin_round(rng);
        true
    }

    fn begin_round(&mut self, rng: &mut dyn RandomSource) {
        self.target.push(rng.below(self.tuning.grid_cells));
        self.input.clear();
        self.highlighted = None;
        self.phase = SequencePhase::Showing;
        self.pending = Some(self.timers.after(
            self.tuning.step_ms,
            SequenceTimer::Step {
                attempt: self.attempt,
                index: 0,
            },
        ));
        log::debug!("Memory round {} ({} cells)", self.level, self.target.len());
    }

    /// Submit a tapped cell. Ignored unless input is open.
    pub fn submit(&mut self, cell: usize) -> bool {
        if self.phase != SequencePhase::Awaiting
            || self.input.len() >= self.target.len()
            || cell >= self.tuning.grid_cells
        {
            return false;
        }
        self.input.push(cell);
        let k = self.input.len() - 1;

        if self.input[k] != self.target[k] {
            self.cancel_pending();
            self.phase = SequencePhase::Lost;
            log::info!("Memory sequence lost at level {} (position {})", self.level, k);
            return true;
        }

        if self.input.len() == self.target.len() {
            if self.level >= self.tuning.max_level {
                self.cancel_pending();
                self.phase = SequencePhase::Won;
                log::info!("Memory constellation charted at level {}", self.level);
            } else {
                self.pending = Some(self.timers.after(
                    self.tuning.next_round_ms,
                    SequenceTimer::NextRound {
                        attempt: self.attempt,
                    },
                ));
            }
        }
        true
    }

    /// Drop the current attempt and return to `Ready` at level 1
    pub fn reset(&mut self) {
        self.timers.clear();
        self.pending = None;
        self.attempt += 1;
        self.phase = SequencePhase::Ready;
        self.target.clear();
        self.input.clear();
        self.level = 1;
        self.highlighted = None;
        self.reported = false;
    }

    /// Advance virtual time by `dt_ms`, running every task that falls due
    pub fn advance(&mut self, dt_ms: u64, rng: &mut dyn RandomSource) -> Option<Outcome> {
        let until = self.timers.now().saturating_add(dt_ms);
        while let Some(timer) = self.timers.pop_due(until) {
            if timer.attempt() != self.attempt {
                continue;
            }
            match timer {
                SequenceTimer::Step { index, .. } => self.on_step(index),
                SequenceTimer::Settle { .. } => self.on_settle(),
                SequenceTimer::NextRound { .. } => self.on_next_round(rng),
            }
        }
        self.timers.settle(until);
        self.take_outcome()
    }

    fn on_step(&mut self, index: usize) {
        if self.phase != SequencePhase::Showing {
            return;
        }
        let Some(&cell) = self.target.get(index) else {
            return;
        };
        self.highlighted = Some(cell);
        let next = if index + 1 < self.target.len() {
            self.timers.after(
                self.tuning.step_ms,
                SequenceTimer::Step {
                    attempt: self.attempt,
                    index: index + 1,
                },
            )
        } else {
            self.timers.after(
                self.tuning.settle_ms,
                SequenceTimer::Settle {
                    attempt: self.attempt,
                },
            )
        };
        self.pending = Some(next);
    }

    fn on_settle(&mut self) {
        if self.phase != SequencePhase::Showing {
            return;
        }
        self.highlighted = None;
        self.pending = None;
        self.phase = SequencePhase::Awaiting;
    }

    fn on_next_round(&mut self, rng: &mut dyn RandomSource) {
        if !self.between_rounds() {
            return;
        }
        self.level += 1;
        self.begin_round(rng);
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timers.cancel(handle);
        }
    }
}
