//! Mind Galaxy - mission orchestration for a space-themed wellness game
//!
//! Core modules:
//! - `sim`: Deterministic mini-game engines (reflex asteroid field, memory constellation)
//! - `mission`: Mission descriptors, batches and name-based classification
//! - `content`: Contract with the external mission/message generator, with fallbacks
//! - `orchestrator`: Mission lifecycle, rewards and the galaxy map
//! - `star_map`: Append-only record of completed missions
//! - `settings`: Data-driven game tuning

pub mod content;
pub mod error;
pub mod mission;
pub mod orchestrator;
pub mod settings;
pub mod sim;
pub mod star_map;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use content::{ContentGenerator, ContentRequest, CoPilot, OfflineGenerator, PlayerProfile, Spaceship};
pub use error::{ProfileError, SessionError};
pub use mission::{Mission, MissionBatch, MissionKind};
pub use orchestrator::{Acceptance, MissionState, Orchestrator};
pub use settings::Settings;
pub use star_map::{Star, StarColor, StarMap};

/// Game configuration constants
pub mod consts {
    /// Reflex game length in seconds
    pub const REFLEX_DURATION_SECS: u32 = 15;
    /// Asteroid position/spawn tick (~60 Hz)
    pub const REFLEX_TICK_MS: u64 = 16;
    /// Countdown cadence
    pub const REFLEX_COUNTDOWN_MS: u64 = 1000;
    /// Chance of spawning one asteroid per tick
    pub const ASTEROID_SPAWN_CHANCE: f64 = 0.1;
    /// Asteroids enter just above the field (percent of field height)
    pub const ASTEROID_SPAWN_Y: f32 = -10.0;
    /// Asteroids at or below this are discarded
    pub const ASTEROID_DESPAWN_Y: f32 = 120.0;
    /// Asteroid size range in px: [min, min + span)
    pub const ASTEROID_MIN_SIZE: f32 = 20.0;
    pub const ASTEROID_SIZE_SPAN: f32 = 40.0;
    /// Fall speed range per tick: [min, min + span)
    pub const ASTEROID_MIN_SPEED: f32 = 0.1;
    pub const ASTEROID_SPEED_SPAN: f32 = 0.3;
    /// Score per destroyed asteroid
    pub const POINTS_PER_HIT: u32 = 10;

    /// Memory grid cell count (3x3)
    pub const GRID_CELLS: usize = 9;
    /// Rounds to win the memory game
    pub const MAX_LEVEL: u32 = 5;
    /// Delay between highlighted cells during playback
    pub const PLAYBACK_STEP_MS: u64 = 700;
    /// Hold after the last highlighted cell before input opens
    pub const PLAYBACK_SETTLE_MS: u64 = 500;
    /// Pause between a cleared round and the next playback
    pub const NEXT_ROUND_DELAY_MS: u64 = 1000;

    /// Mission batches never carry more than this many missions
    pub const MAX_SUGGESTED_MISSIONS: usize = 5;

    /// Stars are placed within [margin, 100 - margin] on both axes
    pub const STAR_MARGIN: f32 = 5.0;
    pub const STAR_MIN_SIZE: f32 = 1.0;
    pub const STAR_SIZE_SPAN: f32 = 3.0;
}
