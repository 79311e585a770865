//! Quick Reflex: Asteroid Field
//!
//! Asteroids fall through a 100x100 field; the player taps them for points
//! until the countdown runs out. Two independently-cadenced tasks drive the
//! game while `Playing`: a fast position/spawn tick and a one-second countdown.
//! Both are cancelled together when the game ends.

use serde::{Deserialize, Serialize};

use super::Outcome;
use super::rng::RandomSource;
use super::timer::{TimerHandle, Timers};
use crate::settings::ReflexTuning;

/// Current phase of the asteroid field. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReflexPhase {
    /// Briefing shown, waiting for start
    Ready,
    /// Asteroids falling, countdown running
    Playing,
    /// Countdown reached zero
    Over,
}

/// A falling asteroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    /// Horizontal position (percent of field width)
    pub x: f32,
    /// Vertical position (percent of field height, grows downward)
    pub y: f32,
    /// Rendered size in px
    pub size: f32,
    /// Fall per tick
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReflexTimer {
    Tick,
    Countdown,
}

/// Asteroid field engine
#[derive(Debug, Clone)]
pub struct ReflexGame {
    tuning: ReflexTuning,
    phase: ReflexPhase,
    /// Sorted by id (spawn order)
    asteroids: Vec<Asteroid>,
    score: u32,
    hits: u32,
    time_remaining: u32,
    timers: Timers<ReflexTimer>,
    tick_task: Option<TimerHandle>,
    countdown_task: Option<TimerHandle>,
    next_id: u32,
    reported: bool,
}

impl ReflexGame {
    pub fn new(tuning: ReflexTuning) -> Self {
        Self {
            tuning,
            phase: ReflexPhase::Ready,
            asteroids: Vec::new(),
            score: 0,
            hits: 0,
            time_remaining: tuning.duration_secs,
            timers: Timers::new(),
            tick_task: None,
            countdown_task: None,
            next_id: 1,
            reported: false,
        }
    }

    pub fn phase(&self) -> ReflexPhase {
        self.phase
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of asteroids destroyed this attempt
    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Seconds left on the countdown
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Virtual time elapsed since the engine was created (ms)
    pub fn clock_ms(&self) -> u64 {
        self.timers.now()
    }

    /// Number of scheduled tasks (zero whenever not `Playing`)
    pub fn pending_tasks(&self) -> usize {
        self.timers.len()
    }

    /// The asteroid field is always cleared once the countdown ends
    pub fn outcome(&self) -> Option<Outcome> {
        (self.phase == ReflexPhase::Over).then_some(Outcome::Success)
    }

    /// Report the terminal outcome exactly once
    pub fn take_outcome(&mut self) -> Option<Outcome> {
        if self.reported {
            return None;
        }
        let outcome = self.outcome()?;
        self.reported = true;
        Some(outcome)
    }

    /// Start the run. Returns false (and does nothing) unless `Ready`.
    pub fn start(&mut self) -> bool {
        if self.phase != ReflexPhase::Ready {
            return false;
        }
        self.score = 0;
        self.hits = 0;
        self.time_remaining = self.tuning.duration_secs;
        self.asteroids.clear();
        self.tick_task = Some(self.timers.every(self.tuning.tick_ms, ReflexTimer::Tick));
        self.countdown_task = Some(self.timers.every(self.tuning.countdown_ms, ReflexTimer::Countdown));
        self.phase = ReflexPhase::Playing;
        log::debug!("Asteroid field started ({}s)", self.time_remaining);
        true
    }

    /// Destroy an asteroid. Unknown or already-destroyed ids are ignored.
    pub fn hit(&mut self, id: u32) -> bool {
        if self.phase != ReflexPhase::Playing {
            return false;
        }
        let Some(idx) = self.asteroids.iter().position(|a| a.id == id) else {
            return false;
        };
        self.asteroids.remove(idx);
        self.hits += 1;
        self.score += self.tuning.points_per_hit;
        true
    }

    /// Advance virtual time by `dt_ms`, running every task that falls due
    pub fn advance(&mut self, dt_ms: u64, rng: &mut dyn RandomSource) -> Option<Outcome> {
        let until = self.timers.now().saturating_add(dt_ms);
        while let Some(timer) = self.timers.pop_due(until) {
            match timer {
                ReflexTimer::Tick => self.on_tick(rng),
                ReflexTimer::Countdown => self.on_countdown(),
            }
        }
        self.timers.settle(until);
        self.take_outcome()
    }

    fn on_tick(&mut self, rng: &mut dyn RandomSource) {
        if self.phase != ReflexPhase::Playing {
            return;
        }
        let despawn_y = self.tuning.despawn_y;
        for asteroid in &mut self.asteroids {
            asteroid.y += asteroid.speed;
        }
        self.asteroids.retain(|a| a.y < despawn_y);

        if rng.chance(self.tuning.spawn_chance) {
            self.spawn(rng);
        }
    }

    fn spawn(&mut self, rng: &mut dyn RandomSource) {
        let id = self.next_id;
        self.next_id += 1;
        let x = rng.unit() as f32 * 100.0;
        let size = rng.unit() as f32 * self.tuning.size_span + self.tuning.min_size;
        let speed = rng.unit() as f32 * self.tuning.speed_span + self.tuning.min_speed;
        self.asteroids.push(Asteroid {
            id,
            x,
            y: self.tuning.spawn_y,
            size,
            speed,
        });
    }

    fn on_countdown(&mut self) {
        if self.phase != ReflexPhase::Playing {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if let Some(handle) = self.tick_task.take() {
            self.timers.cancel(handle);
        }
        if let Some(handle) = self.countdown_task.take() {
            self.timers.cancel(handle);
        }
        self.phase = ReflexPhase::Over;
        log::info!(
            "Asteroid field over after {} ms: score {} ({} hits)",
            self.clock_ms(),
            self.score,
            self.hits
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::{ScriptedRandom, SeededRandom};
    use proptest::prelude::*;

    /// Script that always spawns: chance roll 0.0, then x/size/speed samples
    fn always_spawn() -> ScriptedRandom {
        ScriptedRandom::new([0.0, 0.5, 0.5, 0.5])
    }

    fn never_spawn() -> ScriptedRandom {
        ScriptedRandom::new([0.99])
    }

    #[test]
    fn test_start_only_from_ready() {
        let mut game = ReflexGame::new(ReflexTuning::default());
        assert_eq!(game.phase(), ReflexPhase::Ready);
        assert_eq!(game.pending_tasks(), 0);

        assert!(game.start());
        assert_eq!(game.phase(), ReflexPhase::Playing);
        assert_eq!(game.time_remaining(), 15);
        assert_eq!(game.score(), 0);
        assert_eq!(game.pending_tasks(), 2);

        assert!(!game.start());
        assert_eq!(game.pending_tasks(), 2);
    }

    #[test]
    fn test_ready_ignores_time_and_hits() {
        let mut game = ReflexGame::new(ReflexTuning::default());
        let mut rng = always_spawn();
        assert_eq!(game.advance(20_000, &mut rng), None);
        assert_eq!(game.phase(), ReflexPhase::Ready);
        assert!(game.asteroids().is_empty());
        assert!(!game.hit(1));
    }

    #[test]
    fn test_times_out_after_fifteen_seconds() {
        let mut game = ReflexGame::new(ReflexTuning::default());
        let mut rng = never_spawn();
        game.start();

        assert_eq!(game.advance(14_999, &mut rng), None);
        assert_eq!(game.phase(), ReflexPhase::Playing);
        assert_eq!(game.time_remaining(), 1);

        assert_eq!(game.advance(1, &mut rng), Some(Outcome::Success));
        assert_eq!(game.phase(), ReflexPhase::Over);
        assert_eq!(game.time_remaining(), 0);
        assert_eq!(game.score(), 0);
        // both tasks cancelled
        assert_eq!(game.pending_tasks(), 0);
        // outcome is reported once
        assert_eq!(game.advance(5_000, &mut rng), None);
        assert_eq!(game.outcome(), Some(Outcome::Success));
    }

    #[test]
    fn test_huge_time_step_saturates() {
        let mut game = ReflexGame::new(ReflexTuning::default());
        let mut rng = never_spawn();
        game.start();
        game.advance(1, &mut rng);
        assert_eq!(game.advance(u64::MAX, &mut rng), Some(Outcome::Success));
        assert_eq!(game.phase(), ReflexPhase::Over);
        assert_eq!(game.clock_ms(), u64::MAX);
        assert_eq!(game.pending_tasks(), 0);
        assert_eq!(game.advance(u64::MAX, &mut rng), None);
    }

    #[test]
    fn test_spawn_uses_random_source() {
        let mut game = ReflexGame::new(ReflexTuning::default());
        let mut rng = always_spawn();
        game.start();
        game.advance(16, &mut rng);

        assert_eq!(game.asteroids().len(), 1);
        let a = &game.asteroids()[0];
        assert_eq!(a.id, 1);
        assert!((a.x - 50.0).abs() < 1e-4);
        assert!((a.y - -10.0).abs() < 1e-4);
        assert!((a.size - 40.0).abs() < 1e-4);
        assert!((a.speed - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_asteroids_fall_and_despawn() {
        let mut game = ReflexGame::new(ReflexTuning::default());
        game.start();
        game.advance(16, &mut always_spawn());
        assert_eq!(game.asteroids().len(), 1);

        let mut rng = never_spawn();
        game.advance(16, &mut rng);
        assert!((game.asteroids()[0].y - (-10.0 + 0.25)).abs() < 1e-4);

        // 130 units at 0.25 per tick = 520 ticks; give it 530 ticks
        game.advance(16 * 530, &mut rng);
        assert!(game.asteroids().is_empty());
    }

    #[test]
    fn test_hit_scores_and_is_idempotent() {
        let mut game = ReflexGame::new(ReflexTuning::default());
        game.start();
        game.advance(32, &mut always_spawn());
        assert_eq!(game.asteroids().len(), 2);

        assert!(game.hit(1));
        assert_eq!(game.score(), 10);
        assert!(!game.hit(1));
        assert_eq!(game.score(), 10);
        assert!(!game.hit(99));
        assert_eq!(game.score(), 10);
        assert_eq!(game.asteroids().len(), 1);
        assert_eq!(game.asteroids()[0].id, 2);
    }

    #[test]
    fn test_hit_after_over_is_ignored() {
        let mut game = ReflexGame::new(ReflexTuning::default());
        game.start();
        let mut rng = always_spawn();
        game.advance(15_000, &mut rng);
        assert_eq!(game.phase(), ReflexPhase::Over);
        let remaining: Vec<u32> = game.asteroids().iter().map(|a| a.id).collect();
        assert!(!remaining.is_empty());
        assert!(!game.hit(remaining[0]));
        assert_eq!(game.score(), 0);
    }

    proptest! {
        #[test]
        fn prop_score_is_ten_per_successful_hit(
            seed in any::<u64>(),
            steps in prop::collection::vec((1u64..400, 0u32..40), 1..60),
        ) {
            let mut game = ReflexGame::new(ReflexTuning::default());
            let mut rng = SeededRandom::new(seed);
            game.start();
            let mut successes = 0;
            let mut last_phase = game.phase();
            for (dt, target) in steps {
                game.advance(dt, &mut rng);
                if game.hit(target) {
                    successes += 1;
                }
                // replaying the same hit never scores twice
                prop_assert!(!game.hit(target));
                prop_assert!(game.phase() >= last_phase);
                last_phase = game.phase();
                prop_assert_eq!(game.score(), 10 * successes);
            }
        }
    }
}
