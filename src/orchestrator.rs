//! Mission lifecycle
//!
//! The orchestrator owns everything that outlives a single mini-game attempt:
//! the missions on offer, the galaxy map, co-pilot messages and reward notices.
//! What the session is doing right now is a single [`MissionState`], so
//! fetching content and running a mini-game can never overlap.
//!
//! Mini-game engines never touch the map or the batch; they only report an
//! [`Outcome`], and `complete` applies the reward in one step.

use serde::Serialize;

use crate::content::{
    ContentGenerator, ContentPrompt, ContentRequest, ContentResponse, GeneratorError, MissionReport,
    PlayerProfile,
};
use crate::error::{Result, SessionError};
use crate::mission::{Mission, MissionBatch, MissionKind};
use crate::settings::Settings;
use crate::sim::{
    Asteroid, Outcome, RandomSource, ReflexGame, ReflexPhase, SequenceGame, SequencePhase,
};
use crate::star_map::{Star, StarMap, StarMapView};

/// A running mini-game engine
#[derive(Debug, Clone)]
pub enum MiniGame {
    Reflex(ReflexGame),
    Sequence(SequenceGame),
}

impl MiniGame {
    fn take_outcome(&mut self) -> Option<Outcome> {
        match self {
            MiniGame::Reflex(game) => game.take_outcome(),
            MiniGame::Sequence(game) => game.take_outcome(),
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            MiniGame::Reflex(game) => game.outcome(),
            MiniGame::Sequence(game) => game.outcome(),
        }
    }
}

/// The mission bound to a running mini-game
#[derive(Debug, Clone)]
pub struct ActiveMission {
    pub mission: Mission,
    pub game: MiniGame,
}

/// What the session is doing
#[derive(Debug, Clone, Default)]
pub enum MissionState {
    /// Dashboard: missions on offer, nothing running
    #[default]
    Idle,
    /// Waiting on the content generator
    AwaitingContent(ContentRequest),
    /// A mini-game is bound to a mission
    RunningMiniGame(Box<ActiveMission>),
}

/// Result of accepting a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// A mini-game is waiting in its `Ready` phase
    MiniGame(MissionKind),
    /// Narrative mission, completed on the spot
    Completed,
}

/// Asteroid field as seen by the UI
#[derive(Debug, Clone, Serialize)]
pub struct ReflexView<'a> {
    pub phase: ReflexPhase,
    pub asteroids: &'a [Asteroid],
    pub score: u32,
    pub time_remaining: u32,
}

/// Memory game as seen by the UI. The target sequence stays hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceView {
    pub phase: SequencePhase,
    pub level: u32,
    pub max_level: u32,
    pub grid_cells: usize,
    pub highlighted: Option<usize>,
    pub entered: usize,
}

/// Everything the UI renders in one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub state: &'static str,
    pub active_mission: Option<&'a Mission>,
    pub missions: &'a [Mission],
    pub stars: &'a [Star],
    pub map_placeholder: Option<&'static str>,
    pub onboarding_message: Option<&'a str>,
    pub daily_reward: Option<&'a str>,
    pub co_pilot_message: Option<&'a str>,
    pub support_hint: Option<&'a str>,
    pub reward_notice: Option<&'a str>,
    pub reflex: Option<ReflexView<'a>>,
    pub sequence: Option<SequenceView>,
}

/// Session orchestrator
pub struct Orchestrator {
    profile: PlayerProfile,
    settings: Settings,
    rng: Box<dyn RandomSource>,
    state: MissionState,
    batch: MissionBatch,
    star_map: StarMap,
    onboarding_message: Option<String>,
    daily_reward: Option<String>,
    co_pilot_message: Option<String>,
    distress_detected: bool,
    support_hint: Option<String>,
    reward_notice: Option<String>,
    completed: u32,
}

impl Orchestrator {
    pub fn new(profile: PlayerProfile, settings: Settings, rng: Box<dyn RandomSource>) -> Self {
        log::info!(
            "Captain {} boards the {} with a {} co-pilot",
            profile.name,
            profile.spaceship,
            profile.co_pilot
        );
        Self {
            profile,
            settings,
            rng,
            state: MissionState::Idle,
            batch: MissionBatch::default(),
            star_map: StarMap::new(),
            onboarding_message: None,
            daily_reward: None,
            co_pilot_message: None,
            distress_detected: false,
            support_hint: None,
            reward_notice: None,
            completed: 0,
        }
    }

    // --- accessors ---

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &MissionState {
        &self.state
    }

    pub fn missions(&self) -> &MissionBatch {
        &self.batch
    }

    pub fn star_map(&self) -> &StarMap {
        &self.star_map
    }

    pub fn active_mission(&self) -> Option<&ActiveMission> {
        match &self.state {
            MissionState::RunningMiniGame(active) => Some(&**active),
            _ => None,
        }
    }

    pub fn reflex(&self) -> Option<&ReflexGame> {
        match &self.active_mission()?.game {
            MiniGame::Reflex(game) => Some(game),
            MiniGame::Sequence(_) => None,
        }
    }

    pub fn sequence(&self) -> Option<&SequenceGame> {
        match &self.active_mission()?.game {
            MiniGame::Sequence(game) => Some(game),
            MiniGame::Reflex(_) => None,
        }
    }

    pub fn onboarding_message(&self) -> Option<&str> {
        self.onboarding_message.as_deref()
    }

    pub fn daily_reward(&self) -> Option<&str> {
        self.daily_reward.as_deref()
    }

    pub fn co_pilot_message(&self) -> Option<&str> {
        self.co_pilot_message.as_deref()
    }

    pub fn distress_detected(&self) -> bool {
        self.distress_detected
    }

    /// Support hint, shown only when distress was detected
    pub fn support_hint(&self) -> Option<&str> {
        if self.distress_detected {
            self.support_hint.as_deref()
        } else {
            None
        }
    }

    pub fn reward_notice(&self) -> Option<&str> {
        self.reward_notice.as_deref()
    }

    /// Missions completed this session
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn dismiss_reward_notice(&mut self) {
        self.reward_notice = None;
    }

    pub fn dismiss_daily_reward(&mut self) {
        self.daily_reward = None;
    }

    /// Render-ready view of the whole session
    pub fn snapshot(&self) -> Snapshot<'_> {
        let state = match self.state {
            MissionState::Idle => "idle",
            MissionState::AwaitingContent(_) => "awaiting_content",
            MissionState::RunningMiniGame(_) => "mini_game",
        };
        let map_placeholder = match self.star_map.view() {
            StarMapView::Placeholder(text) => Some(text),
            StarMapView::Stars(_) => None,
        };
        Snapshot {
            state,
            active_mission: self.active_mission().map(|a| &a.mission),
            missions: self.batch.as_slice(),
            stars: self.star_map.stars(),
            map_placeholder,
            onboarding_message: self.onboarding_message(),
            daily_reward: self.daily_reward(),
            co_pilot_message: self.co_pilot_message(),
            support_hint: self.support_hint(),
            reward_notice: self.reward_notice(),
            reflex: self.reflex().map(|game| ReflexView {
                phase: game.phase(),
                asteroids: game.asteroids(),
                score: game.score(),
                time_remaining: game.time_remaining(),
            }),
            sequence: self.sequence().map(|game| SequenceView {
                phase: game.phase(),
                level: game.level(),
                max_level: game.max_level(),
                grid_cells: game.grid_cells(),
                highlighted: game.highlighted(),
                entered: game.input().len(),
            }),
        }
    }

    // --- content generation ---

    /// Enter `AwaitingContent` and return the prompt for the remote call
    pub fn begin_request(&mut self, request: ContentRequest) -> Result<ContentPrompt> {
        self.ensure_idle()?;
        let request = match request {
            ContentRequest::MoodLog(mood) => {
                let mood = mood.trim();
                if mood.is_empty() {
                    return Err(SessionError::EmptyMood);
                }
                // a new mood log clears the previous report
                self.co_pilot_message = None;
                self.distress_detected = false;
                self.support_hint = None;
                self.batch = MissionBatch::default();
                ContentRequest::MoodLog(mood.to_string())
            }
            other => other,
        };
        let prompt = request.prompt(&self.profile, &self.settings.generator);
        log::info!("Requesting {} content", request.label());
        self.state = MissionState::AwaitingContent(request);
        Ok(prompt)
    }

    /// Apply the generator's reply (or failure) and return to `Idle`
    pub fn deliver(&mut self, reply: std::result::Result<String, GeneratorError>) -> Result<()> {
        let MissionState::AwaitingContent(request) = &self.state else {
            return Err(SessionError::NotAwaitingContent);
        };
        let response = ContentResponse::resolve(request, &self.profile, reply);
        self.state = MissionState::Idle;
        match response {
            ContentResponse::Onboarding(message) => self.onboarding_message = Some(message),
            ContentResponse::DailyReward(reward) => self.daily_reward = Some(reward),
            ContentResponse::Missions(report) => self.apply_report(report),
        }
        Ok(())
    }

    /// Run a whole request against a synchronous generator
    pub fn request_content(
        &mut self,
        generator: &mut dyn ContentGenerator,
        request: ContentRequest,
    ) -> Result<()> {
        let prompt = self.begin_request(request)?;
        let reply = match &self.state {
            MissionState::AwaitingContent(request) => generator.generate(request, &prompt),
            _ => Err(GeneratorError::Unavailable),
        };
        self.deliver(reply)
    }

    fn apply_report(&mut self, report: MissionReport) {
        let batch = report.batch();
        log::info!(
            "{} missions suggested{}",
            batch.len(),
            if report.distress_detected { " (distress detected)" } else { "" }
        );
        self.co_pilot_message = report.co_pilot_message;
        self.distress_detected = report.distress_detected;
        self.support_hint = report.support_hint;
        self.offer_missions(batch);
    }

    /// Replace the missions on offer
    pub fn offer_missions(&mut self, batch: MissionBatch) {
        self.batch = batch;
    }

    // --- mission lifecycle ---

    /// Accept a mission on offer by name
    pub fn accept(&mut self, name: &str) -> Result<Acceptance> {
        self.ensure_idle()?;
        let mission = self
            .batch
            .find(name)
            .cloned()
            .ok_or_else(|| SessionError::UnknownMission(name.to_string()))?;

        let game = match mission.kind() {
            MissionKind::AsteroidField => MiniGame::Reflex(ReflexGame::new(self.settings.reflex)),
            MissionKind::MemoryConstellation => {
                MiniGame::Sequence(SequenceGame::new(self.settings.sequence))
            }
            MissionKind::Narrative => {
                log::debug!("'{}' has no mini-game, completing immediately", mission.name);
                self.complete(&mission)?;
                return Ok(Acceptance::Completed);
            }
        };

        let kind = mission.kind();
        log::info!("Mission '{}' accepted ({:?})", mission.name, kind);
        self.state = MissionState::RunningMiniGame(Box::new(ActiveMission { mission, game }));
        Ok(Acceptance::MiniGame(kind))
    }

    /// Complete a mission: remove it from the batch, chart its star, pick the
    /// co-pilot's message, post the reward notice and free the mission slot.
    pub fn complete(&mut self, mission: &Mission) -> Result<()> {
        match &self.state {
            MissionState::Idle => {}
            MissionState::AwaitingContent(_) => return Err(SessionError::Busy("awaiting content")),
            MissionState::RunningMiniGame(active) if active.mission.name != mission.name => {
                return Err(SessionError::Busy("mission in progress"));
            }
            MissionState::RunningMiniGame(_) => {}
        }

        self.batch.remove_by_name(&mission.name);
        let rng: &mut dyn RandomSource = self.rng.as_mut();
        self.star_map.chart(mission.name.clone(), rng);

        let message = mission.completion_message.clone().unwrap_or_else(|| {
            if self.batch.is_empty() {
                format!(
                    "All missions for this log complete, Captain {}! Your galaxy shines brighter with every completed task.",
                    self.profile.name
                )
            } else {
                format!(
                    "Excellent work on that mission, Captain {}! Ready for another? The galaxy awaits.",
                    self.profile.name
                )
            }
        });
        self.co_pilot_message = Some(message);
        self.reward_notice = Some(format!(
            "Mission \"{}\" complete! Reward: {}",
            mission.name, mission.reward
        ));
        self.state = MissionState::Idle;
        self.completed += 1;
        log::info!(
            "Mission '{}' complete, {} stars charted",
            mission.name,
            self.star_map.len()
        );
        Ok(())
    }

    /// Claim the reward of a mini-game that reported success
    pub fn claim_reward(&mut self) -> Result<()> {
        let active = self.active_mission().ok_or(SessionError::NoActiveMission)?;
        if active.game.outcome() != Some(Outcome::Success) {
            return Err(SessionError::NotClaimable);
        }
        let mission = active.mission.clone();
        self.complete(&mission)
    }

    // --- mini-game input (stale calls are ignored) ---

    /// Start the active mini-game from its briefing screen
    pub fn start_mini_game(&mut self) -> bool {
        let MissionState::RunningMiniGame(active) = &mut self.state else {
            return false;
        };
        match &mut active.game {
            MiniGame::Reflex(game) => game.start(),
            MiniGame::Sequence(game) => game.begin(self.rng.as_mut()),
        }
    }

    /// Tap an asteroid
    pub fn hit(&mut self, asteroid_id: u32) -> bool {
        match self.active_mut().map(|a| &mut a.game) {
            Some(MiniGame::Reflex(game)) => game.hit(asteroid_id),
            _ => false,
        }
    }

    /// Tap a constellation cell
    pub fn submit(&mut self, cell: usize) -> Option<Outcome> {
        let active = self.active_mut()?;
        let MiniGame::Sequence(game) = &mut active.game else {
            return None;
        };
        game.submit(cell);
        let outcome = active.game.take_outcome();
        self.log_outcome(outcome);
        outcome
    }

    /// Reset a lost memory game for another attempt
    pub fn retry(&mut self) -> bool {
        match self.active_mut().map(|a| &mut a.game) {
            Some(MiniGame::Sequence(game)) if game.outcome() == Some(Outcome::Failure) => {
                game.reset();
                log::info!("Memory constellation retry #{}", game.attempt());
                true
            }
            _ => false,
        }
    }

    /// Advance the active mini-game's clock. Returns an outcome the first
    /// time the attempt reaches one.
    pub fn advance(&mut self, dt_ms: u64) -> Option<Outcome> {
        let MissionState::RunningMiniGame(active) = &mut self.state else {
            return None;
        };
        let rng = self.rng.as_mut();
        let outcome = match &mut active.game {
            MiniGame::Reflex(game) => game.advance(dt_ms, rng),
            MiniGame::Sequence(game) => game.advance(dt_ms, rng),
        };
        self.log_outcome(outcome);
        outcome
    }

    fn log_outcome(&self, outcome: Option<Outcome>) {
        if let (Some(outcome), Some(active)) = (outcome, self.active_mission()) {
            log::info!("Mission '{}' attempt finished: {:?}", active.mission.name, outcome);
        }
    }

    fn active_mut(&mut self) -> Option<&mut ActiveMission> {
        match &mut self.state {
            MissionState::RunningMiniGame(active) => Some(&mut **active),
            _ => None,
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.state {
            MissionState::Idle => Ok(()),
            MissionState::AwaitingContent(_) => Err(SessionError::Busy("awaiting content")),
            MissionState::RunningMiniGame(_) => Err(SessionError::Busy("mission in progress")),
        }
    }
}
