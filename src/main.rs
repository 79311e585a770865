//! Mind Galaxy native entry point
//!
//! Plays one session headless against the offline generator: onboarding,
//! daily reward, a mood log, then every suggested mission on autopilot.
//! The browser build enters through `mind_galaxy::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use mind_galaxy::consts::REFLEX_TICK_MS;
    use mind_galaxy::sim::{Outcome, SeededRandom, SequencePhase};
    use mind_galaxy::{
        Acceptance, CoPilot, ContentRequest, MissionKind, OfflineGenerator, Orchestrator,
        PlayerProfile, Settings, Spaceship,
    };

    /// Sequence input is polled at this interval
    const POLL_MS: u64 = 100;

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let settings = Settings::from_env()?;
        let seed = std::env::args()
            .nth(1)
            .and_then(|arg| arg.parse::<u64>().ok())
            .unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0)
            });
        let rng = SeededRandom::new(seed);
        log::info!("Session initialized with seed: {}", rng.seed());

        let profile = PlayerProfile::new("Nova", Spaceship::Starblazer, CoPilot::Robot)?;
        let mut session = Orchestrator::new(profile, settings, Box::new(rng));
        let mut generator = OfflineGenerator;

        session.request_content(&mut generator, ContentRequest::Onboarding)?;
        if let Some(message) = session.onboarding_message() {
            println!("[co-pilot] {message}");
        }
        session.request_content(&mut generator, ContentRequest::DailyReward)?;
        if let Some(reward) = session.daily_reward() {
            println!("[daily] {reward}");
        }
        session.dismiss_daily_reward();

        session.request_content(
            &mut generator,
            ContentRequest::MoodLog("Tired after a long week".to_string()),
        )?;
        if let Some(message) = session.co_pilot_message() {
            println!("[co-pilot] {message}");
        }
        if let Some(hint) = session.support_hint() {
            println!("[support] {hint}");
        }

        play_offered(&mut session)?;

        println!(
            "\n{} missions complete, {} stars charted",
            session.completed(),
            session.star_map().len()
        );
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        Ok(())
    }

    /// Accept and finish missions until the batch is empty
    pub fn play_offered(session: &mut Orchestrator) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let Some(name) = session.missions().as_slice().first().map(|m| m.name.clone()) else {
                return Ok(());
            };
            println!("\n> Accepting '{name}'");
            match session.accept(&name)? {
                Acceptance::Completed => {}
                Acceptance::MiniGame(MissionKind::AsteroidField) => play_asteroids(session)?,
                Acceptance::MiniGame(_) => play_constellation(session)?,
            }
            if let Some(notice) = session.reward_notice() {
                println!("[reward] {notice}");
            }
            if let Some(message) = session.co_pilot_message() {
                println!("[co-pilot] {message}");
            }
            session.dismiss_reward_notice();
        }
    }

    fn play_asteroids(session: &mut Orchestrator) -> Result<(), Box<dyn std::error::Error>> {
        session.start_mini_game();
        loop {
            if let Some(outcome) = session.advance(REFLEX_TICK_MS) {
                if let Some(game) = session.reflex() {
                    println!("Asteroid field cleared: {} hits, score {}", game.hits(), game.score());
                }
                return finish(session, outcome);
            }
            // a player who waits until the rock is well into view
            let targets: Vec<u32> = session
                .reflex()
                .map(|game| {
                    game.asteroids()
                        .iter()
                        .filter(|a| a.y > 30.0)
                        .map(|a| a.id)
                        .collect()
                })
                .unwrap_or_default();
            for id in targets {
                session.hit(id);
            }
        }
    }

    fn play_constellation(session: &mut Orchestrator) -> Result<(), Box<dyn std::error::Error>> {
        session.start_mini_game();
        loop {
            let next = session.sequence().and_then(|game| {
                let ready = game.phase() == SequencePhase::Awaiting && !game.between_rounds();
                ready.then(|| game.target()[game.input().len()])
            });
            let outcome = match next {
                Some(cell) => session.submit(cell),
                None => session.advance(POLL_MS),
            };
            if let Some(outcome) = outcome {
                if let Some(game) = session.sequence() {
                    println!("Constellation finished at level {}", game.level());
                }
                return finish(session, outcome);
            }
        }
    }

    fn finish(session: &mut Orchestrator, outcome: Outcome) -> Result<(), Box<dyn std::error::Error>> {
        match outcome {
            Outcome::Success => session.claim_reward()?,
            Outcome::Failure => {
                // autopilot never misses, so this only happens on bad tuning
                log::warn!("Mini-game lost, abandoning session");
                return Err("mini-game lost".into());
            }
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Mind Galaxy (native) starting...");

    if let Err(e) = autopilot::run() {
        log::error!("Session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is mind_galaxy::web::start, this is just to satisfy the compiler
}
