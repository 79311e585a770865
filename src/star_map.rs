//! Galaxy map of completed missions
//!
//! One star per completed mission. Stars are only ever appended.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::RandomSource;

/// Text shown instead of an empty map
pub const EMPTY_MAP_PLACEHOLDER: &str =
    "Your galaxy is waiting. Complete missions to discover new stars.";

/// Star tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarColor {
    #[serde(rename = "#FFFFFF")]
    White,
    #[serde(rename = "#add8e6")]
    LightBlue,
    #[serde(rename = "#f0e68c")]
    PaleYellow,
}

impl StarColor {
    pub const ALL: [StarColor; 3] = [StarColor::White, StarColor::LightBlue, StarColor::PaleYellow];

    pub fn as_hex(&self) -> &'static str {
        match self {
            StarColor::White => "#FFFFFF",
            StarColor::LightBlue => "#add8e6",
            StarColor::PaleYellow => "#f0e68c",
        }
    }
}

/// A charted star
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub id: u32,
    /// Position in map units, [0, 100] on both axes
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: StarColor,
    /// Name of the mission that earned it
    pub label: String,
}

/// What the map should present
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StarMapView<'a> {
    Placeholder(&'static str),
    Stars(&'a [Star]),
}

/// Append-only galaxy map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StarMap {
    stars: Vec<Star>,
    next_id: u32,
}

impl StarMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Chart a new star with random placement, size and tint
    pub fn chart(&mut self, label: impl Into<String>, rng: &mut dyn RandomSource) -> &Star {
        let span = 100.0 - 2.0 * STAR_MARGIN;
        let x = rng.unit() as f32 * span + STAR_MARGIN;
        let y = rng.unit() as f32 * span + STAR_MARGIN;
        let size = rng.unit() as f32 * STAR_SIZE_SPAN + STAR_MIN_SIZE;
        let color = StarColor::ALL[rng.below(StarColor::ALL.len())];

        self.next_id += 1;
        self.stars.push(Star {
            id: self.next_id,
            x,
            y,
            size,
            color,
            label: label.into(),
        });
        let star = &self.stars[self.stars.len() - 1];
        log::debug!(
            "Charted star {} '{}' at ({:.1}, {:.1}) {}",
            star.id,
            star.label,
            star.x,
            star.y,
            star.color.as_hex()
        );
        star
    }

    /// Rendering contract: never an empty canvas
    pub fn view(&self) -> StarMapView<'_> {
        if self.stars.is_empty() {
            StarMapView::Placeholder(EMPTY_MAP_PLACEHOLDER)
        } else {
            StarMapView::Stars(&self.stars)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ScriptedRandom, SeededRandom};

    #[test]
    fn test_empty_map_shows_placeholder() {
        let map = StarMap::new();
        assert_eq!(map.view(), StarMapView::Placeholder(EMPTY_MAP_PLACEHOLDER));
    }

    #[test]
    fn test_chart_placement_from_random_source() {
        let mut map = StarMap::new();
        let mut rng = ScriptedRandom::new([0.0, 0.5, 0.5, ScriptedRandom::index_sample(2, 3)]);
        let star = map.chart("Signal Boost", &mut rng).clone();
        assert_eq!(star.id, 1);
        assert!((star.x - 5.0).abs() < 1e-4);
        assert!((star.y - 50.0).abs() < 1e-4);
        assert!((star.size - 2.5).abs() < 1e-4);
        assert_eq!(star.color, StarColor::PaleYellow);
        assert_eq!(star.label, "Signal Boost");
        // tints travel as the hex the map paints
        let json = serde_json::to_value(&star).unwrap();
        assert_eq!(json["color"], StarColor::PaleYellow.as_hex());
        assert!(matches!(map.view(), StarMapView::Stars(s) if s.len() == 1));
    }

    #[test]
    fn test_stars_stay_in_bounds_with_unique_ids() {
        let mut map = StarMap::new();
        let mut rng = SeededRandom::new(3);
        for i in 0..200 {
            map.chart(format!("M{i}"), &mut rng);
        }
        assert_eq!(map.len(), 200);
        let mut ids: Vec<u32> = map.stars().iter().map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        for star in map.stars() {
            assert!((5.0..=95.0).contains(&star.x));
            assert!((5.0..=95.0).contains(&star.y));
            assert!((1.0..=4.0).contains(&star.size));
        }
    }
}
