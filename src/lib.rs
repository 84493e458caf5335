//! Neon Runner - A lane-based rhythm runner
//!
//! Core modules:
//! - `stages`: Static catalog of the 15 Stage Mode levels
//! - `patterns`: Obstacle pattern pools per stage
//! - `stars`: Star rating rules and live pace feedback
//! - `rewards`: Total-star milestones and their cosmetic unlocks
//! - `persistence`: Key-value storage capability and stage progress
//! - `sim`: Per-run context, finish line and obstacle spawning
//! - `platform`: Browser/native platform abstraction

pub mod highscores;
pub mod patterns;
pub mod persistence;
pub mod platform;
pub mod rewards;
pub mod settings;
pub mod sim;
pub mod stages;
pub mod stars;
pub mod tutorial;

pub use highscores::HighScores;
pub use patterns::{PatternKind, PatternPool};
pub use persistence::{KeyValueStore, MemoryStore, ProgressStore, ProgressTracker, StorageError};
pub use rewards::{RewardId, RewardUnlock};
pub use settings::Settings;
pub use stages::StageDefinition;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;

    /// Number of Stage Mode levels
    pub const TOTAL_STAGES: u32 = 15;
    /// Three stars per stage
    pub const MAX_STARS: u32 = TOTAL_STAGES * 3;

    /// Lanes are indexed 0 (left), 1 (center), 2 (right)
    pub const LANE_COUNT: u8 = 3;

    /// Free Run defaults (no stage, no pattern pool)
    pub const FREE_RUN_GAP: f64 = 15.0;
    pub const FREE_RUN_JUMP_FREQUENCY: f64 = 0.35;
    /// Forward speed in Free Run (m/s)
    pub const FREE_RUN_SPEED: f64 = 20.0;

    /// Sentinel for "no finish line in play"
    pub const NO_DISTANCE: f64 = -1.0;

    /// Storage keys
    pub const PROGRESS_KEY: &str = "neon_runner_stage_progress";
    pub const TUTORIALS_KEY: &str = "neon_runner_tutorials";
    pub const SETTINGS_KEY: &str = "neon_runner_settings";
    pub const FREE_RUN_SCORES_KEY: &str = "neon_runner_free_run_scores";
    pub const TOP_DISTANCE_KEY: &str = "neon_runner_top_distance";
}
