//! Missions offered to the captain
//!
//! Missions are identified by name. The generator's wire format carries no
//! explicit kind, so playable missions are recognised from their names.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SUGGESTED_MISSIONS;

/// Name fragment routing a mission to the asteroid field
pub const ASTEROID_FIELD_MARKER: &str = "asteroid field";
/// Name fragment routing a mission to the memory game
pub const MEMORY_CONSTELLATION_MARKER: &str = "memory constellation";

/// A mission issued by the content generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    #[serde(rename = "mission_name")]
    pub name: String,
    pub objective: String,
    pub mechanics: String,
    pub reward: String,
    /// Co-pilot line shown when this mission is completed
    #[serde(rename = "co_pilot_message", default, skip_serializing_if = "Option::is_none")]
    pub completion_message: Option<String>,
}

impl Mission {
    pub fn new(
        name: impl Into<String>,
        objective: impl Into<String>,
        mechanics: impl Into<String>,
        reward: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            objective: objective.into(),
            mechanics: mechanics.into(),
            reward: reward.into(),
            completion_message: None,
        }
    }

    pub fn with_completion_message(mut self, message: impl Into<String>) -> Self {
        self.completion_message = Some(message.into());
        self
    }

    pub fn kind(&self) -> MissionKind {
        MissionKind::classify(&self.name)
    }
}

/// How a mission is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionKind {
    /// Quick Reflex: Asteroid Field
    AsteroidField,
    /// Memory Constellations
    MemoryConstellation,
    /// Anything else; completes as soon as it is accepted
    Narrative,
}

impl MissionKind {
    /// Case-insensitive substring match on the mission name
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains(ASTEROID_FIELD_MARKER) {
            MissionKind::AsteroidField
        } else if lower.contains(MEMORY_CONSTELLATION_MARKER) {
            MissionKind::MemoryConstellation
        } else {
            MissionKind::Narrative
        }
    }

    pub fn is_playable(self) -> bool {
        self != MissionKind::Narrative
    }
}

/// Missions currently on offer, in generator order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionBatch {
    missions: Vec<Mission>,
}

impl MissionBatch {
    pub fn new(missions: Vec<Mission>) -> Self {
        let mut batch = Self { missions };
        batch.missions.truncate(MAX_SUGGESTED_MISSIONS);
        batch
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mission> {
        self.missions.iter()
    }

    pub fn as_slice(&self) -> &[Mission] {
        &self.missions
    }

    pub fn find(&self, name: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.name == name)
    }

    /// Remove every mission with this name. Returns how many were removed.
    pub fn remove_by_name(&mut self, name: &str) -> usize {
        let before = self.missions.len();
        self.missions.retain(|m| m.name != name);
        before - self.missions.len()
    }
}

impl From<Vec<Mission>> for MissionBatch {
    fn from(missions: Vec<Mission>) -> Self {
        Self::new(missions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_name() {
        assert_eq!(
            MissionKind::classify("Quick Reflex: Asteroid Field"),
            MissionKind::AsteroidField
        );
        assert_eq!(
            MissionKind::classify("MEMORY CONSTELLATIONS"),
            MissionKind::MemoryConstellation
        );
        assert_eq!(MissionKind::classify("Signal Boost"), MissionKind::Narrative);
        // asteroid marker wins when both appear
        assert_eq!(
            MissionKind::classify("Asteroid Field of Memory Constellations"),
            MissionKind::AsteroidField
        );
        assert!(!MissionKind::Narrative.is_playable());
    }

    #[test]
    fn test_wire_names() {
        let json = r#"{
            "mission_name": "Signal Boost",
            "objective": "Send positive energy",
            "mechanics": "Press a button",
            "reward": "Good Karma Badge."
        }"#;
        let mission: Mission = serde_json::from_str(json).unwrap();
        assert_eq!(mission.name, "Signal Boost");
        assert_eq!(mission.completion_message, None);

        let with_message = mission.clone().with_completion_message("Signal sent!");
        let value = serde_json::to_value(&with_message).unwrap();
        assert_eq!(value["co_pilot_message"], "Signal sent!");
        assert_eq!(value["mission_name"], "Signal Boost");
    }

    #[test]
    fn test_batch_remove_by_name() {
        let mut batch = MissionBatch::new(vec![
            Mission::new("A", "o", "m", "r"),
            Mission::new("B", "o", "m", "r"),
        ]);
        assert_eq!(batch.remove_by_name("A"), 1);
        assert_eq!(batch.remove_by_name("A"), 0);
        assert_eq!(batch.len(), 1);
        assert!(batch.find("B").is_some());
    }

    #[test]
    fn test_batch_is_capped() {
        let missions = (0..8)
            .map(|i| Mission::new(format!("M{i}"), "o", "m", "r"))
            .collect::<Vec<_>>();
        let batch = MissionBatch::from(missions);
        assert_eq!(batch.len(), MAX_SUGGESTED_MISSIONS);
        assert_eq!(batch.as_slice()[4].name, "M4");
    }
}
