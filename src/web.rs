//! Browser bindings
//!
//! The page owns rendering, input and the remote generator call; this handle
//! owns the session. JavaScript drives the clock from `requestAnimationFrame`
//! and renders from `snapshot()`.

use wasm_bindgen::prelude::*;

use crate::content::{CoPilot, ContentGenerator, ContentRequest, GeneratorError, OfflineGenerator, PlayerProfile, Spaceship};
use crate::orchestrator::{Acceptance, MissionState, Orchestrator};
use crate::settings::Settings;
use crate::sim::{Outcome, SeededRandom};

/// Longest frame gap applied in one go (tab switches, debugger pauses)
const MAX_FRAME_MS: f64 = 250.0;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("Logger already initialised");
    }
    log::info!("Mind Galaxy core loaded");
}

#[wasm_bindgen]
pub struct WebSession {
    inner: Orchestrator,
    last_frame_ms: Option<f64>,
}

#[wasm_bindgen]
impl WebSession {
    /// Create a session once onboarding has picked a name, ship and co-pilot
    #[wasm_bindgen(constructor)]
    pub fn new(
        name: &str,
        spaceship: &str,
        co_pilot: &str,
        settings_json: Option<String>,
    ) -> Result<WebSession, JsError> {
        let spaceship = Spaceship::parse(spaceship).unwrap_or_default();
        let co_pilot = CoPilot::parse(co_pilot).unwrap_or_default();
        let profile = PlayerProfile::new(name, spaceship, co_pilot)?;
        let settings = match settings_json {
            Some(json) => Settings::from_json(&json)?,
            None => Settings::default(),
        };
        let rng = SeededRandom::new(js_sys::Date::now() as u64);
        log::info!("Session initialized with seed: {}", rng.seed());
        Ok(Self {
            inner: Orchestrator::new(profile, settings, Box::new(rng)),
            last_frame_ms: None,
        })
    }

    /// Whether the page should call the remote generator at all
    #[wasm_bindgen(getter)]
    pub fn credentials_present(&self) -> bool {
        self.inner.settings().generator.credentials_present
    }

    /// Start an onboarding request; returns the prompt as JSON
    pub fn begin_onboarding(&mut self) -> Result<String, JsError> {
        self.begin(ContentRequest::Onboarding)
    }

    pub fn begin_daily_reward(&mut self) -> Result<String, JsError> {
        self.begin(ContentRequest::DailyReward)
    }

    pub fn begin_mood_log(&mut self, mood: &str) -> Result<String, JsError> {
        self.begin(ContentRequest::MoodLog(mood.to_string()))
    }

    fn begin(&mut self, request: ContentRequest) -> Result<String, JsError> {
        let prompt = self.inner.begin_request(request)?;
        Ok(serde_json::to_string(&prompt)?)
    }

    /// Hand back the raw JSON reply of the remote call
    pub fn deliver(&mut self, reply: String) -> Result<(), JsError> {
        Ok(self.inner.deliver(Ok(reply))?)
    }

    /// Report that the remote call failed
    pub fn deliver_failure(&mut self, error: &str) -> Result<(), JsError> {
        Ok(self.inner.deliver(Err(GeneratorError::Remote(error.to_string())))?)
    }

    /// Answer the pending request with canned content (no credentials)
    pub fn deliver_offline(&mut self) -> Result<(), JsError> {
        let reply = match self.inner.state() {
            MissionState::AwaitingContent(request) => {
                let prompt = request.prompt(self.inner.profile(), &self.inner.settings().generator);
                OfflineGenerator.generate(request, &prompt)
            }
            _ => Err(GeneratorError::Unavailable),
        };
        Ok(self.inner.deliver(reply)?)
    }

    /// Accept a mission; returns "mini_game" or "completed"
    pub fn accept(&mut self, name: &str) -> Result<String, JsError> {
        let acceptance = self.inner.accept(name)?;
        self.last_frame_ms = None;
        Ok(match acceptance {
            Acceptance::MiniGame(_) => "mini_game".to_string(),
            Acceptance::Completed => "completed".to_string(),
        })
    }

    pub fn start_mini_game(&mut self) -> bool {
        self.inner.start_mini_game()
    }

    pub fn hit(&mut self, asteroid_id: u32) -> bool {
        self.inner.hit(asteroid_id)
    }

    /// Tap a cell; returns "success"/"failure" when the attempt ends
    pub fn submit(&mut self, cell: usize) -> Option<String> {
        self.inner.submit(cell).map(outcome_label)
    }

    pub fn retry(&mut self) -> bool {
        self.inner.retry()
    }

    pub fn claim_reward(&mut self) -> Result<(), JsError> {
        Ok(self.inner.claim_reward()?)
    }

    /// Advance the active mini-game to the frame timestamp `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> Option<String> {
        let dt = match self.last_frame_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        self.inner.advance(dt.round() as u64).map(outcome_label)
    }

    pub fn dismiss_reward_notice(&mut self) {
        self.inner.dismiss_reward_notice();
    }

    pub fn dismiss_daily_reward(&mut self) {
        self.inner.dismiss_daily_reward();
    }

    /// Current session view as JSON
    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.inner.snapshot())?)
    }
}

fn outcome_label(outcome: Outcome) -> String {
    match outcome {
        Outcome::Success => "success".to_string(),
        Outcome::Failure => "failure".to_string(),
    }
}
