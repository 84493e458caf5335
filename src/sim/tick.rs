//! Run session and per-frame tick
//!
//! `RunSession` owns everything an attempt touches: the run context, the
//! finish line, the obstacle spawner and the persistence handles. Starting an
//! attempt always goes through [`RunSession::start_attempt`], which resets all
//! of it before the first tick.

use serde::Serialize;

use super::finish_line::FinishLine;
use super::spawn::{ObstacleSpawner, Spawn};
use super::state::{RunContext, RunMode, RunPhase};
use crate::consts::{FREE_RUN_SPEED, NO_DISTANCE};
use crate::highscores::HighScores;
use crate::persistence::{KeyValueStore, ProgressTracker, get_next_stage_id};
use crate::platform;
use crate::rewards::RewardUnlock;
use crate::settings::Settings;
use crate::stages::{self, StageDefinition};
use crate::stars::{self, StarPace};
use crate::tutorial::TutorialFlags;

/// Haptic pulse on stage clear (ms)
const CLEAR_VIBRATION_MS: u32 = 200;

/// Outcome of a finished stage, handed to the results screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResult {
    pub stage_id: &'static str,
    pub stars: u8,
    pub crashes: u32,
    pub orbs_collected: u32,
    pub total_orbs: u32,
    pub new_reward: Option<RewardUnlock>,
    pub next_stage_id: Option<&'static str>,
}

/// Fire-and-forget notifications to the presentation layer
pub trait FinishHooks {
    /// Results are ready (stars, newly unlocked reward)
    fn on_stage_complete(&mut self, result: &StageResult);

    fn play_fanfare(&mut self) {}

    fn flash_screen(&mut self) {}

    fn vibrate(&mut self, _duration_ms: u32) {}
}

/// Events reported since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Avatar hit an obstacle
    pub crashed: bool,
    /// Orbs picked up
    pub orbs_collected: u32,
    /// Distance reported by the scene; when None the session advances by
    /// `speed * dt` itself
    pub distance: Option<f64>,
}

/// What happened during a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub spawn: Option<Spawn>,
    pub result: Option<StageResult>,
}

pub struct RunSession<S: KeyValueStore + Clone> {
    context: RunContext,
    finish_line: FinishLine,
    spawner: ObstacleSpawner,
    progress: ProgressTracker<S>,
    tutorials: TutorialFlags<S>,
    settings: Settings,
    storage: S,
    hooks: Box<dyn FinishHooks>,
}

impl<S: KeyValueStore + Clone> RunSession<S> {
    pub fn new(storage: S, hooks: Box<dyn FinishHooks>) -> Self {
        Self {
            context: RunContext::default(),
            finish_line: FinishLine::new(),
            spawner: ObstacleSpawner::new(None, 0),
            progress: ProgressTracker::new(storage.clone()),
            tutorials: TutorialFlags::new(storage.clone()),
            settings: Settings::load(&storage),
            storage,
            hooks,
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn finish_line(&self) -> &FinishLine {
        &self.finish_line
    }

    pub fn progress(&self) -> &ProgressTracker<S> {
        &self.progress
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist settings
    pub fn set_settings(&mut self, settings: Settings) {
        settings.save(&self.storage);
        self.settings = settings;
    }

    /// Begin (or restart) a stage attempt. Always resets telemetry, re-arms
    /// the finish line and reseeds the spawner.
    pub fn start_attempt(&mut self, stage: &'static StageDefinition, seed: u64) {
        self.context.start(RunMode::Stage(stage));
        self.finish_line.arm(stage);
        self.spawner = ObstacleSpawner::new(Some(stage), seed);
        log::info!("Stage {} '{}' started", stage.order, stage.name);
    }

    /// Start a stage by id if it exists and is unlocked
    pub fn start_stage(&mut self, stage_id: &str, seed: u64) -> bool {
        let Some(stage) = stages::get_stage(stage_id) else {
            log::warn!("Unknown stage '{}'", stage_id);
            return false;
        };
        if !self.progress.is_stage_unlocked(stage_id) {
            log::warn!("Stage '{}' is locked", stage_id);
            return false;
        }
        self.start_attempt(stage, seed);
        true
    }

    /// Play the current stage again
    pub fn replay(&mut self, seed: u64) -> bool {
        match self.context.current_stage() {
            Some(stage) => {
                self.start_attempt(stage, seed);
                true
            }
            None => false,
        }
    }

    /// Move on to the stage after the current one
    pub fn next_stage(&mut self, seed: u64) -> bool {
        match self
            .context
            .current_stage()
            .and_then(|s| stages::get_next_stage(s.id))
        {
            Some(next) => self.start_stage(next.id, seed),
            None => false,
        }
    }

    pub fn start_free_run(&mut self, seed: u64) {
        self.context.start(RunMode::FreeRun);
        self.finish_line.disarm();
        self.spawner = ObstacleSpawner::new(None, seed);
        log::info!("Free Run started");
    }

    /// End a Free Run and record its distance. Returns the leaderboard rank.
    pub fn finish_free_run(&mut self) -> Option<usize> {
        if self.context.mode != RunMode::FreeRun || !self.context.is_running() {
            return None;
        }
        self.context.finish();

        let telemetry = self.context.telemetry;
        let mut scores = HighScores::load(&self.storage);
        let rank = scores.add_score(
            telemetry.distance_traveled,
            telemetry.orbs_collected,
            platform::now_ms(),
        );
        if rank.is_some() {
            scores.save(&self.storage);
        }
        log::info!(
            "Free Run ended at {:.0}m (rank {:?})",
            telemetry.distance_traveled,
            rank
        );
        rank
    }

    /// Leave the run (back to menus)
    pub fn exit(&mut self) {
        self.context.exit();
        self.finish_line.disarm();
    }

    pub fn record_crash(&mut self) {
        self.context.record_crash();
    }

    pub fn record_orb(&mut self) {
        self.context.record_orbs(1);
    }

    /// Update the distance and check the finish line
    pub fn advance_to(&mut self, distance: f64) -> Option<StageResult> {
        if !self.context.is_running() {
            return None;
        }
        self.context.advance_to(distance);
        if self
            .finish_line
            .poll(self.context.telemetry.distance_traveled)
        {
            return self.complete_stage();
        }
        None
    }

    /// Advance the run by one frame
    pub fn tick(&mut self, input: &TickInput, dt: f64) -> TickOutcome {
        if !self.context.is_running() {
            return TickOutcome::default();
        }

        if input.crashed {
            self.context.record_crash();
        }
        self.context.record_orbs(input.orbs_collected);

        let distance = input.distance.unwrap_or_else(|| {
            let speed = self
                .context
                .current_stage()
                .map_or(FREE_RUN_SPEED, |s| s.speed);
            self.context.telemetry.distance_traveled + speed * dt
        });

        self.context.advance_to(distance);
        let spawn = self
            .spawner
            .update(self.context.telemetry.distance_traveled);
        let result = if self
            .finish_line
            .poll(self.context.telemetry.distance_traveled)
        {
            self.complete_stage()
        } else {
            None
        };

        TickOutcome { spawn, result }
    }

    /// Runs once per attempt, when the finish line is crossed
    fn complete_stage(&mut self) -> Option<StageResult> {
        self.context.finish();

        let Some(stage) = self.context.current_stage() else {
            log::error!("Finish line crossed with no active stage");
            return None;
        };

        let telemetry = self.context.telemetry;
        let stars = stars::calculate_stars(
            telemetry.crashes,
            telemetry.orbs_collected,
            stage.total_orbs,
            Some(stage),
        );
        let new_reward = self.progress.save_progress(
            stage.id,
            stars,
            telemetry.crashes,
            telemetry.orbs_collected,
            stage.total_orbs,
        );

        self.hooks.play_fanfare();
        if self.settings.effective_screen_flash() {
            self.hooks.flash_screen();
        }
        if self.settings.effective_haptics() {
            self.hooks.vibrate(CLEAR_VIBRATION_MS);
        }

        let result = StageResult {
            stage_id: stage.id,
            stars,
            crashes: telemetry.crashes,
            orbs_collected: telemetry.orbs_collected,
            total_orbs: stage.total_orbs,
            new_reward,
            next_stage_id: get_next_stage_id(stage.id),
        };
        log::info!(
            "Stage {} complete: {} stars ({} crashes, {}/{} orbs)",
            stage.order,
            stars,
            telemetry.crashes,
            telemetry.orbs_collected,
            stage.total_orbs
        );
        self.hooks.on_stage_complete(&result);
        Some(result)
    }

    /// Meters to the finish line, -1 outside Stage Mode
    pub fn distance_remaining(&self) -> f64 {
        if self.context.phase == RunPhase::Idle || self.context.current_stage().is_none() {
            return NO_DISTANCE;
        }
        self.finish_line
            .distance_remaining(self.context.telemetry.distance_traveled)
    }

    /// Live pace toward `target_stars` for the HUD (Stage Mode only)
    pub fn star_pace(&self, target_stars: u8) -> Option<StarPace> {
        let stage = self.context.current_stage()?;
        let t = &self.context.telemetry;
        Some(stars::check_star_pace(
            target_stars,
            t.crashes,
            t.orbs_collected,
            stage.total_orbs,
            stage,
        ))
    }

    pub fn should_show_tutorial(&self, stage_id: &str) -> bool {
        self.settings.show_tutorials && !self.tutorials.has_seen(stage_id)
    }

    pub fn mark_tutorial_seen(&self, stage_id: &str) {
        self.tutorials.mark_seen(stage_id);
    }
}
