//! Contract with the external content generator
//!
//! The generator is an opaque request/response collaborator (a hosted
//! language model in production). This module shapes requests into prompts,
//! decodes the JSON replies and, whenever the call fails or returns garbage,
//! substitutes fixed fallback content so the mission flow never stalls.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::consts::MAX_SUGGESTED_MISSIONS;
use crate::error::ProfileError;
use crate::mission::{Mission, MissionBatch};
use crate::settings::GeneratorSettings;

/// Co-pilot line used when a mood-log request fails
pub const MOOD_FALLBACK_MESSAGE: &str = "We're experiencing some interference on the comms channel, Captain. Let's try recalibrating. Please try logging your mood again.";
/// Daily reward used when the request fails
pub const DAILY_REWARD_FALLBACK: &str = "Log-in confirmed. Welcome back, Captain! The cosmos awaits.";
/// Daily reward used when the reply lacks one
pub const DAILY_REWARD_DEFAULT: &str = "Welcome back, Captain! Your presence illuminates the cosmos.";

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Content generator unavailable")]
    Unavailable,

    #[error("Content generator error: {0}")]
    Remote(String),

    #[error("Malformed generator reply: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Spaceship {
    #[default]
    Starblazer,
    Nebulon,
    Quasar,
}

impl Spaceship {
    pub const ALL: [Spaceship; 3] = [Spaceship::Starblazer, Spaceship::Nebulon, Spaceship::Quasar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Spaceship::Starblazer => "Starblazer",
            Spaceship::Nebulon => "Nebulon",
            Spaceship::Quasar => "Quasar",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ship| ship.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Spaceship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoPilot {
    #[default]
    Robot,
    Droid,
    Alien,
}

impl CoPilot {
    pub const ALL: [CoPilot; 3] = [CoPilot::Robot, CoPilot::Droid, CoPilot::Alien];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoPilot::Robot => "Robot",
            CoPilot::Droid => "Droid",
            CoPilot::Alien => "Alien",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for CoPilot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The captain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub spaceship: Spaceship,
    #[serde(rename = "coPilot")]
    pub co_pilot: CoPilot,
}

impl PlayerProfile {
    pub fn new(name: &str, spaceship: Spaceship, co_pilot: CoPilot) -> Result<Self, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            spaceship,
            co_pilot,
        })
    }

    /// System instruction framing every request for this captain
    pub fn system_instruction(&self) -> String {
        format!(
            "You are a mission generator for a space-themed gamified wellness game called Mind Galaxy.\n\
             The player is Star Captain {name}, flying the spaceship {ship} with their {co_pilot} co-pilot.\n\
             Your tone must be playful, immersive, space-themed, and game-focused.\n\
             Your task is to generate 3-{max} playable missions based on the user's mood log.\n\
             Your entire response MUST be a single JSON object matching the provided schema. Do not output markdown.\n\
             Each mission has mission_name, objective, mechanics, reward and an optional co_pilot_message.\n\
             Mix positive psychology, creative expression, mind game and community missions, and often include \
             the playable \"Quick Reflex: Asteroid Field\" and \"Memory Constellations\" missions.",
            name = self.name,
            ship = self.spaceship,
            co_pilot = self.co_pilot,
            max = MAX_SUGGESTED_MISSIONS,
        )
    }
}

/// What the orchestrator asks the generator for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentRequest {
    Onboarding,
    DailyReward,
    MoodLog(String),
}

impl ContentRequest {
    pub fn label(&self) -> &'static str {
        match self {
            ContentRequest::Onboarding => "onboarding",
            ContentRequest::DailyReward => "daily reward",
            ContentRequest::MoodLog(_) => "mood log",
        }
    }

    /// Build the full prompt for the remote call
    pub fn prompt(&self, profile: &PlayerProfile, settings: &GeneratorSettings) -> ContentPrompt {
        let prompt = match self {
            ContentRequest::Onboarding => "Generate an onboarding_message for the player.".to_string(),
            ContentRequest::DailyReward => {
                "Generate a daily_reward for the player logging in.".to_string()
            }
            ContentRequest::MoodLog(mood) => format!(
                "The player's mood is: \"{mood}\".\n\
                 Generate suggested_missions, a co_pilot_message, distress_detected, and a support_hint if needed."
            ),
        };
        ContentPrompt {
            system_instruction: profile.system_instruction(),
            prompt,
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }
}

/// Everything a host needs to perform the remote call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPrompt {
    pub system_instruction: String,
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
}

/// Reply to a mood log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionReport {
    #[serde(default)]
    pub suggested_missions: Vec<Mission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_pilot_message: Option<String>,
    #[serde(default)]
    pub distress_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_hint: Option<String>,
}

impl MissionReport {
    /// Substitute used when the generator fails
    pub fn interference() -> Self {
        Self {
            suggested_missions: Vec::new(),
            co_pilot_message: Some(MOOD_FALLBACK_MESSAGE.to_string()),
            distress_detected: false,
            support_hint: None,
        }
    }

    pub fn batch(&self) -> MissionBatch {
        MissionBatch::new(self.suggested_missions.clone())
    }
}

#[derive(Debug, Deserialize)]
struct OnboardingReply {
    onboarding_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyRewardReply {
    daily_reward: Option<String>,
}

/// Decoded (or substituted) generator content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentResponse {
    Onboarding(String),
    DailyReward(String),
    Missions(MissionReport),
}

impl ContentResponse {
    /// Fixed content for a failed request
    pub fn fallback(request: &ContentRequest, profile: &PlayerProfile) -> Self {
        match request {
            ContentRequest::Onboarding => ContentResponse::Onboarding(format!(
                "Welcome aboard, Captain {}! Your co-pilot is calibrating systems. Your journey begins now.",
                profile.name
            )),
            ContentRequest::DailyReward => {
                ContentResponse::DailyReward(DAILY_REWARD_FALLBACK.to_string())
            }
            ContentRequest::MoodLog(_) => ContentResponse::Missions(MissionReport::interference()),
        }
    }

    /// Decode a raw JSON reply for `request`
    pub fn decode(
        request: &ContentRequest,
        profile: &PlayerProfile,
        raw: &str,
    ) -> Result<Self, GeneratorError> {
        let raw = raw.trim();
        Ok(match request {
            ContentRequest::Onboarding => {
                let reply: OnboardingReply = serde_json::from_str(raw)?;
                ContentResponse::Onboarding(reply.onboarding_message.unwrap_or_else(|| {
                    format!("Welcome aboard, Captain {}! Your journey begins now.", profile.name)
                }))
            }
            ContentRequest::DailyReward => {
                let reply: DailyRewardReply = serde_json::from_str(raw)?;
                ContentResponse::DailyReward(
                    reply
                        .daily_reward
                        .unwrap_or_else(|| DAILY_REWARD_DEFAULT.to_string()),
                )
            }
            ContentRequest::MoodLog(_) => {
                let mut report: MissionReport = serde_json::from_str(raw)?;
                report.suggested_missions.truncate(MAX_SUGGESTED_MISSIONS);
                ContentResponse::Missions(report)
            }
        })
    }

    /// Decode a reply, falling back to fixed content on any failure
    pub fn resolve(
        request: &ContentRequest,
        profile: &PlayerProfile,
        reply: Result<String, GeneratorError>,
    ) -> Self {
        match reply.and_then(|raw| Self::decode(request, profile, &raw)) {
            Ok(response) => response,
            Err(e) => {
                log::warn!("{} request failed, using fallback content: {}", request.label(), e);
                Self::fallback(request, profile)
            }
        }
    }
}

/// A synchronous content generator
pub trait ContentGenerator {
    /// Perform the request and return the raw JSON reply
    fn generate(
        &mut self,
        request: &ContentRequest,
        prompt: &ContentPrompt,
    ) -> Result<String, GeneratorError>;
}

/// Canned replies used when no generator credentials are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

impl OfflineGenerator {
    pub fn reply(request: &ContentRequest) -> serde_json::Value {
        match request {
            ContentRequest::Onboarding => json!({
                "onboarding_message": "Greetings, Captain! I am your co-pilot. The Starblazer is powered up and ready to explore the Mind Galaxy. Let's navigate the cosmos of your emotions together!"
            }),
            ContentRequest::DailyReward => json!({
                "daily_reward": "Welcome back, Captain! Your presence illuminates the cosmos. You've earned 10 Stardust! 'The journey of a thousand light-years begins with a single thought.'"
            }),
            ContentRequest::MoodLog(_) => json!({
                "co_pilot_message": "Acknowledged, Captain. Engine efficiency is low, matching your energy levels. A short mission could recharge our power cells and lift our spirits. Ready to plot a course?",
                "distress_detected": true,
                "support_hint": "The cosmos are vast and sometimes lonely. Remember, the Galactic Support Network is always open for a comms link if you need it.",
                "suggested_missions": [
                    {
                        "mission_name": "Memory Constellations",
                        "objective": "Memorize and repeat the light patterns to unlock a new star.",
                        "mechanics": "Watch the sequence of stars light up, then click them in the same order.",
                        "reward": "30 Stardust.",
                        "co_pilot_message": "Your focus is stellar, Captain!"
                    },
                    {
                        "mission_name": "Quick Reflex: Asteroid Field",
                        "objective": "Shoot the incoming 'stress' asteroids.",
                        "mechanics": "Tap on the moving asteroid graphics to blast them away.",
                        "reward": "25 Stardust.",
                        "co_pilot_message": "Nice shooting, Captain! Path is clear."
                    },
                    {
                        "mission_name": "Signal Boost",
                        "objective": "Send positive energy to another captain anonymously.",
                        "mechanics": "Press a button to send a wave of stardust out into the galaxy.",
                        "reward": "Good Karma Badge."
                    }
                ]
            }),
        }
    }
}

impl ContentGenerator for OfflineGenerator {
    fn generate(
        &mut self,
        request: &ContentRequest,
        _prompt: &ContentPrompt,
    ) -> Result<String, GeneratorError> {
        log::info!("Using offline reply for {} request", request.label());
        Ok(Self::reply(request).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> PlayerProfile {
        PlayerProfile::new("  Nova ", Spaceship::Quasar, CoPilot::Alien).unwrap()
    }

    #[test]
    fn test_profile_requires_name() {
        assert_eq!(profile().name, "Nova");
        assert_eq!(
            PlayerProfile::new("   ", Spaceship::Nebulon, CoPilot::Robot),
            Err(ProfileError::EmptyName)
        );
        assert_eq!(Spaceship::parse("nebulon"), Some(Spaceship::Nebulon));
        assert_eq!(CoPilot::parse("ALIEN"), Some(CoPilot::Alien));
        assert_eq!(CoPilot::parse("cat"), None);
    }

    #[test]
    fn test_prompt_mentions_captain_and_mood() {
        let prompt = ContentRequest::MoodLog("tired and stressed".into())
            .prompt(&profile(), &GeneratorSettings::default());
        assert!(prompt.system_instruction.contains("Star Captain Nova"));
        assert!(prompt.system_instruction.contains("Quasar"));
        assert!(prompt.system_instruction.contains("Alien co-pilot"));
        assert!(prompt.prompt.contains("\"tired and stressed\""));
        assert_eq!(prompt.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_mood_failure_uses_interference_fallback() {
        let request = ContentRequest::MoodLog("meh".into());
        let response = ContentResponse::resolve(&request, &profile(), Err(GeneratorError::Unavailable));
        let ContentResponse::Missions(report) = response else {
            panic!("expected missions");
        };
        assert_eq!(report.co_pilot_message.as_deref(), Some(MOOD_FALLBACK_MESSAGE));
        assert!(report.suggested_missions.is_empty());
        assert!(!report.distress_detected);
    }

    #[test]
    fn test_malformed_reply_falls_back() {
        let request = ContentRequest::DailyReward;
        let response = ContentResponse::resolve(&request, &profile(), Ok("```json nope".into()));
        assert_eq!(response, ContentResponse::DailyReward(DAILY_REWARD_FALLBACK.into()));

        let response = ContentResponse::resolve(
            &ContentRequest::Onboarding,
            &profile(),
            Err(GeneratorError::Remote("quota".into())),
        );
        assert_eq!(
            response,
            ContentResponse::Onboarding(
                "Welcome aboard, Captain Nova! Your co-pilot is calibrating systems. Your journey begins now."
                    .into()
            )
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let onboarding = ContentResponse::resolve(&ContentRequest::Onboarding, &profile(), Ok("{}".into()));
        assert_eq!(
            onboarding,
            ContentResponse::Onboarding("Welcome aboard, Captain Nova! Your journey begins now.".into())
        );
        let daily = ContentResponse::resolve(&ContentRequest::DailyReward, &profile(), Ok("{}".into()));
        assert_eq!(daily, ContentResponse::DailyReward(DAILY_REWARD_DEFAULT.into()));
    }

    #[test]
    fn test_mood_reply_is_capped() {
        let missions: Vec<_> = (0..7)
            .map(|i| json!({ "mission_name": format!("M{i}"), "objective": "o", "mechanics": "m", "reward": "r" }))
            .collect();
        let raw = json!({ "suggested_missions": missions, "co_pilot_message": "Go!" }).to_string();
        let response = ContentResponse::resolve(&ContentRequest::MoodLog("ok".into()), &profile(), Ok(raw));
        let ContentResponse::Missions(report) = response else {
            panic!("expected missions");
        };
        assert_eq!(report.suggested_missions.len(), MAX_SUGGESTED_MISSIONS);
        assert_eq!(report.co_pilot_message.as_deref(), Some("Go!"));
    }

    #[test]
    fn test_offline_replies_decode() {
        let mut generator = OfflineGenerator;
        let settings = GeneratorSettings::default();
        for request in [
            ContentRequest::Onboarding,
            ContentRequest::DailyReward,
            ContentRequest::MoodLog("low".into()),
        ] {
            let prompt = request.prompt(&profile(), &settings);
            let raw = generator.generate(&request, &prompt).unwrap();
            let response = ContentResponse::decode(&request, &profile(), &raw).unwrap();
            if let ContentResponse::Missions(report) = response {
                assert_eq!(report.suggested_missions.len(), 3);
                assert!(report.distress_detected);
                assert!(report.support_hint.is_some());
                assert_eq!(report.suggested_missions[2].completion_message, None);
            }
        }
    }
}
