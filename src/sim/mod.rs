//! Deterministic mini-game simulation
//!
//! All mini-game logic lives here. This module must be pure and deterministic:
//! - Virtual time only (hosts advance the clock explicitly)
//! - Injected randomness only
//! - Stable iteration order (by entity ID / registration order)
//! - No rendering or platform dependencies

pub mod reflex;
pub mod rng;
pub mod sequence;
pub mod timer;

pub use reflex::{Asteroid, ReflexGame, ReflexPhase};
pub use rng::{RandomSource, ScriptedRandom, SeededRandom};
pub use sequence::{SequenceGame, SequencePhase};
pub use timer::{TimerHandle, Timers};

use serde::{Deserialize, Serialize};

/// Terminal result of one mini-game attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure,
}
