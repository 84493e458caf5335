//! Run context and telemetry
//!
//! Everything a single attempt accumulates lives here. The context is owned
//! by the session and reset on every start; nothing is global.

use serde::{Deserialize, Serialize};

use crate::stages::StageDefinition;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// No run in progress (menus, level select)
    Idle,
    /// Avatar is moving, telemetry accumulates
    Running,
    /// Run ended; telemetry is frozen until the next start
    Finished,
}

/// What kind of run is being played
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunMode {
    /// Endless, no finish line
    FreeRun,
    /// Stage Mode attempt
    Stage(&'static StageDefinition),
}

/// Live counters for the current attempt
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTelemetry {
    pub crashes: u32,
    pub orbs_collected: u32,
    /// Meters traveled, never decreases during a run
    pub distance_traveled: f64,
}

impl RunTelemetry {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-run state shared by the finish line, spawner and HUD
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub mode: RunMode,
    pub phase: RunPhase,
    pub telemetry: RunTelemetry,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            mode: RunMode::FreeRun,
            phase: RunPhase::Idle,
            telemetry: RunTelemetry::default(),
        }
    }
}

impl RunContext {
    /// Begin a run, always clearing telemetry
    pub fn start(&mut self, mode: RunMode) {
        self.mode = mode;
        self.phase = RunPhase::Running;
        self.telemetry.reset();
    }

    /// Stop the run and freeze telemetry
    pub fn finish(&mut self) {
        self.phase = RunPhase::Finished;
    }

    /// Leave the run entirely (back to menus)
    pub fn exit(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Active stage, None in Free Run
    pub fn current_stage(&self) -> Option<&'static StageDefinition> {
        match self.mode {
            RunMode::Stage(stage) => Some(stage),
            RunMode::FreeRun => None,
        }
    }

    pub fn record_crash(&mut self) {
        if self.is_running() {
            self.telemetry.crashes += 1;
        }
    }

    pub fn record_orbs(&mut self, count: u32) {
        if self.is_running() {
            self.telemetry.orbs_collected += count;
        }
    }

    /// Move the avatar forward to `distance` (ignored if behind)
    pub fn advance_to(&mut self, distance: f64) {
        if self.is_running() && distance > self.telemetry.distance_traveled {
            self.telemetry.distance_traveled = distance;
        }
    }
}
