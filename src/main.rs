//! Neon Runner entry point
//!
//! On the web this exposes the stage engine to the scene/DOM layer. Natively
//! it plays a scripted, headless campaign against in-memory storage.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use serde_json::json;
    use wasm_bindgen::prelude::*;

    use neon_runner::platform::BrowserStore;
    use neon_runner::sim::{FinishHooks, Obstacle, RunSession, StageResult, TickInput};
    use neon_runner::{Settings, stages, stars};

    /// Forwards stage results to a JS callback `(stars, reward | null)`
    struct JsHooks {
        on_complete: Option<js_sys::Function>,
    }

    impl FinishHooks for JsHooks {
        fn on_stage_complete(&mut self, result: &StageResult) {
            let Some(callback) = &self.on_complete else {
                return;
            };
            let reward = result
                .new_reward
                .as_ref()
                .and_then(|r| serde_json::to_string(r).ok())
                .map(|s| JsValue::from_str(&s))
                .unwrap_or(JsValue::NULL);
            if let Err(e) = callback.call2(&JsValue::NULL, &JsValue::from(result.stars), &reward) {
                log::error!("Stage complete callback failed: {:?}", e);
            }
        }
    }

    fn to_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|e| {
            log::error!("Serialization failed: {}", e);
            "null".to_string()
        })
    }

    /// Game instance handed to JS
    #[wasm_bindgen]
    pub struct NeonRunner {
        session: RunSession<BrowserStore>,
    }

    #[wasm_bindgen]
    impl NeonRunner {
        #[wasm_bindgen(constructor)]
        pub fn new(on_complete: Option<js_sys::Function>) -> Self {
            Self {
                session: RunSession::new(BrowserStore, Box::new(JsHooks { on_complete })),
            }
        }

        pub fn all_stages(&self) -> String {
            to_json(&stages::get_all_stages())
        }

        pub fn stage(&self, id: &str) -> String {
            to_json(&stages::get_stage(id))
        }

        pub fn star_requirements(&self, id: &str) -> String {
            to_json(&stages::get_stage(id).map(stars::get_star_requirements))
        }

        pub fn progress_summary(&self) -> String {
            to_json(&self.session.progress().get_progress_summary())
        }

        pub fn stage_statuses(&self) -> String {
            to_json(&self.session.progress().stage_statuses())
        }

        pub fn stage_data(&self, id: &str) -> String {
            to_json(&self.session.progress().get_stage_data(id))
        }

        pub fn is_stage_unlocked(&self, id: &str) -> bool {
            self.session.progress().is_stage_unlocked(id)
        }

        pub fn clear_new_rewards_flag(&self) {
            self.session.progress().clear_new_rewards_flag();
        }

        pub fn reset_progress(&self) {
            self.session.progress().reset_progress();
        }

        pub fn start_stage(&mut self, id: &str, seed: u32) -> bool {
            self.session.start_stage(id, u64::from(seed))
        }

        pub fn replay(&mut self, seed: u32) -> bool {
            self.session.replay(u64::from(seed))
        }

        pub fn next_stage(&mut self, seed: u32) -> bool {
            self.session.next_stage(u64::from(seed))
        }

        pub fn start_free_run(&mut self, seed: u32) {
            self.session.start_free_run(u64::from(seed));
        }

        pub fn finish_free_run(&mut self) -> Option<u32> {
            self.session.finish_free_run().map(|rank| rank as u32)
        }

        pub fn exit(&mut self) {
            self.session.exit();
        }

        pub fn record_crash(&mut self) {
            self.session.record_crash();
        }

        pub fn record_orb(&mut self) {
            self.session.record_orb();
        }

        /// Per-frame update with the scene's distance. Returns
        /// `{spawn, result}` as JSON.
        pub fn update(&mut self, distance: f64, dt: f64) -> String {
            let input = TickInput {
                distance: Some(distance),
                ..Default::default()
            };
            let outcome = self.session.tick(&input, dt);
            let spawn = outcome.spawn.map(|s| match s.obstacle {
                Obstacle::Jump => json!({ "distance": s.distance, "kind": "jump" }),
                Obstacle::Lanes(lanes) => {
                    json!({ "distance": s.distance, "kind": "lanes", "lanes": lanes })
                }
            });
            to_json(&json!({ "spawn": spawn, "result": outcome.result }))
        }

        pub fn star_message(&self, count: u8) -> String {
            stars::get_star_message(count, &mut rand::rng()).to_string()
        }

        pub fn distance_remaining(&self) -> f64 {
            self.session.distance_remaining()
        }

        pub fn star_pace(&self, target_stars: u8) -> String {
            to_json(&self.session.star_pace(target_stars))
        }

        pub fn telemetry(&self) -> String {
            to_json(&self.session.context().telemetry)
        }

        pub fn settings(&self) -> String {
            to_json(self.session.settings())
        }

        /// Replace and persist settings from JSON. Returns false if the JSON
        /// does not parse.
        pub fn set_settings(&mut self, json: &str) -> bool {
            match serde_json::from_str::<Settings>(json) {
                Ok(settings) => {
                    self.session.set_settings(settings);
                    true
                }
                Err(e) => {
                    log::warn!("Rejected settings: {}", e);
                    false
                }
            }
        }

        pub fn should_show_tutorial(&self, id: &str) -> bool {
            self.session.should_show_tutorial(id)
        }

        pub fn mark_tutorial_seen(&self, id: &str) {
            self.session.mark_tutorial_seen(id);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("Neon Runner starting...");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Neon Runner (native) starting...");
    log::info!("Native mode plays a headless campaign - run with `trunk serve` for the web version");

    run_campaign(0xC0FFEE);
}

/// Logs results as they arrive
#[cfg(not(target_arch = "wasm32"))]
struct LogHooks;

#[cfg(not(target_arch = "wasm32"))]
impl neon_runner::sim::FinishHooks for LogHooks {
    fn on_stage_complete(&mut self, result: &neon_runner::sim::StageResult) {
        if let Some(reward) = &result.new_reward {
            log::info!("New reward: {}", reward.name);
        }
    }
}

/// Scripted player: crashes into some obstacles, misses some orbs
#[cfg(not(target_arch = "wasm32"))]
fn run_campaign(seed: u64) {
    use neon_runner::consts::SIM_DT;
    use neon_runner::platform::DefaultStore;
    use neon_runner::sim::{RunSession, TickInput};
    use neon_runner::{stages, stars};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    let mut rng = Pcg32::seed_from_u64(seed);
    let mut session = RunSession::new(DefaultStore::new(), Box::new(LogHooks));

    println!("\nPlaying Stage Mode...");
    for stage in stages::get_all_stages() {
        if !session.start_stage(stage.id, rng.random()) {
            break;
        }
        let orb_spacing = stage.distance / f64::from(stage.total_orbs.max(1));
        let mut next_orb = orb_spacing;
        let mut input = TickInput::default();

        let result = loop {
            let outcome = session.tick(&input, SIM_DT);
            if let Some(result) = outcome.result {
                break result;
            }
            let distance = session.context().telemetry.distance_traveled;
            input = TickInput {
                crashed: outcome.spawn.is_some() && rng.random_bool(0.08),
                orbs_collected: 0,
                distance: None,
            };
            if distance >= next_orb {
                next_orb += orb_spacing;
                input.orbs_collected = u32::from(rng.random_bool(0.8));
            }
        };

        println!(
            "  {:>2}. {:<16} {:<3}  ({} crashes, {}/{} orbs) {}",
            stage.order,
            stage.name,
            "*".repeat(result.stars as usize),
            result.crashes,
            result.orbs_collected,
            result.total_orbs,
            stars::get_star_message(result.stars, &mut rng)
        );
    }

    let summary = session.progress().get_progress_summary();
    println!(
        "\n{}/{} stars, {}/{} stages, rewards: {:?}",
        summary.total_stars,
        summary.max_stars,
        summary.stages_completed,
        summary.total_stages,
        summary.unlocked_rewards
    );
}
