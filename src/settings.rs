//! Game tuning and generator settings
//!
//! Every field defaults to the constants in [`crate::consts`]; a JSON document
//! only needs to name the values it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Environment variable holding the content-generator API key
pub const API_KEY_VAR: &str = "API_KEY";
/// Environment variable holding a JSON settings override
pub const SETTINGS_VAR: &str = "MIND_GALAXY_SETTINGS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Asteroid field tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflexTuning {
    pub duration_secs: u32,
    pub tick_ms: u64,
    pub countdown_ms: u64,
    pub spawn_chance: f64,
    pub spawn_y: f32,
    pub despawn_y: f32,
    pub min_size: f32,
    pub size_span: f32,
    pub min_speed: f32,
    pub speed_span: f32,
    pub points_per_hit: u32,
}

impl Default for ReflexTuning {
    fn default() -> Self {
        Self {
            duration_secs: REFLEX_DURATION_SECS,
            tick_ms: REFLEX_TICK_MS,
            countdown_ms: REFLEX_COUNTDOWN_MS,
            spawn_chance: ASTEROID_SPAWN_CHANCE,
            spawn_y: ASTEROID_SPAWN_Y,
            despawn_y: ASTEROID_DESPAWN_Y,
            min_size: ASTEROID_MIN_SIZE,
            size_span: ASTEROID_SIZE_SPAN,
            min_speed: ASTEROID_MIN_SPEED,
            speed_span: ASTEROID_SPEED_SPAN,
            points_per_hit: POINTS_PER_HIT,
        }
    }
}

/// Memory constellation tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceTuning {
    pub grid_cells: usize,
    pub max_level: u32,
    pub step_ms: u64,
    pub settle_ms: u64,
    pub next_round_ms: u64,
}

impl Default for SequenceTuning {
    fn default() -> Self {
        Self {
            grid_cells: GRID_CELLS,
            max_level: MAX_LEVEL,
            step_ms: PLAYBACK_STEP_MS,
            settle_ms: PLAYBACK_SETTLE_MS,
            next_round_ms: NEXT_ROUND_DELAY_MS,
        }
    }
}

/// Content generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Whether the host holds credentials for the remote generator.
    /// The key itself never enters this crate.
    pub credentials_present: bool,
    pub model: String,
    pub temperature: f32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            credentials_present: false,
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.8,
        }
    }
}

/// All tunables for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub reflex: ReflexTuning,
    pub sequence: SequenceTuning,
    pub generator: GeneratorSettings,
}

impl Settings {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the engines cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.reflex.duration_secs == 0 {
            return Err(SettingsError::Invalid("reflex.duration_secs must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.reflex.spawn_chance) {
            return Err(SettingsError::Invalid(
                "reflex.spawn_chance must be within [0, 1]".into(),
            ));
        }
        if self.sequence.grid_cells == 0 {
            return Err(SettingsError::Invalid("sequence.grid_cells must be > 0".into()));
        }
        if self.sequence.max_level == 0 {
            return Err(SettingsError::Invalid("sequence.max_level must be > 0".into()));
        }
        Ok(())
    }

    /// Load settings from the process environment (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = match std::env::var(SETTINGS_VAR) {
            Ok(json) => {
                log::info!("Loading settings from {}", SETTINGS_VAR);
                Self::from_json(&json)?
            }
            Err(_) => Self::default(),
        };

        settings.generator.credentials_present = std::env::var(API_KEY_VAR)
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false);
        if !settings.generator.credentials_present {
            log::warn!("{} environment variable not set. Using the offline generator.", API_KEY_VAR);
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let settings = Settings::default();
        assert_eq!(settings.reflex.duration_secs, 15);
        assert_eq!(settings.reflex.points_per_hit, 10);
        assert_eq!(settings.sequence.grid_cells, 9);
        assert_eq!(settings.sequence.max_level, 5);
        assert_eq!(settings.sequence.step_ms, 700);
        assert!(!settings.generator.credentials_present);
    }

    #[test]
    fn test_partial_json_override() {
        let settings =
            Settings::from_json(r#"{ "sequence": { "max_level": 3 }, "generator": { "credentials_present": true } }"#)
                .unwrap();
        assert_eq!(settings.sequence.max_level, 3);
        assert_eq!(settings.sequence.grid_cells, GRID_CELLS);
        assert_eq!(settings.reflex, ReflexTuning::default());
        assert!(settings.generator.credentials_present);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Settings::from_json(r#"{ "sequence": { "grid_cells": 0 } }"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "reflex": { "spawn_chance": 1.5 } }"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(Settings::from_json("not json"), Err(SettingsError::Json(_))));
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let json = Settings::default().to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), Settings::default());
    }
}
