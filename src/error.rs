//! Error types for Mind Galaxy
//!
//! Mini-game engines never fail: stale or out-of-phase input is ignored.
//! These errors cover caller-visible preconditions of the orchestrator and
//! profile creation.

use thiserror::Error;

/// Error raised when a player profile cannot be created
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Captain name must not be empty")]
    EmptyName,
}

/// Session-level precondition failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A mission is running or content is being fetched
    #[error("Session busy: {0}")]
    Busy(&'static str),

    #[error("No mission is active")]
    NoActiveMission,

    #[error("Mission '{0}' is not on offer")]
    UnknownMission(String),

    #[error("Mood log must not be empty")]
    EmptyMood,

    #[error("No content request is in flight")]
    NotAwaitingContent,

    #[error("Active mission has no reward to claim yet")]
    NotClaimable,
}

pub type Result<T> = std::result::Result<T, SessionError>;
