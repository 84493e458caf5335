//! Per-run simulation
//!
//! Everything that happens between "stage started" and "results shown":
//! - Run context and telemetry (crashes, orbs, distance)
//! - Finish line detection
//! - Obstacle spawning from pattern pools
//! - The session that ties them to saved progress
//!
//! No rendering or platform dependencies.

pub mod finish_line;
pub mod spawn;
pub mod state;
pub mod tick;

pub use finish_line::{FinishLine, FinishLineState};
pub use spawn::{Obstacle, ObstacleSpawner, SPAWN_LEAD, Spawn};
pub use state::{RunContext, RunMode, RunPhase, RunTelemetry};
pub use tick::{FinishHooks, RunSession, StageResult, TickInput, TickOutcome};
