//! Finish line trigger
//!
//! `Inactive -> Armed -> Crossed`. Crossing fires once per attempt; a replay
//! must call [`FinishLine::reset`] (or re-arm) before the next poll.

use crate::consts::NO_DISTANCE;
use crate::stages::StageDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishLineState {
    /// Free Run or no run
    Inactive,
    /// Waiting for the avatar to reach the trigger distance
    Armed,
    /// Crossed this attempt
    Crossed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinishLine {
    trigger_distance: Option<f64>,
    crossed: bool,
}

impl FinishLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for a stage attempt
    pub fn arm(&mut self, stage: &StageDefinition) {
        self.trigger_distance = Some(stage.distance);
        self.crossed = false;
    }

    /// Back to inactive (Free Run, exit)
    pub fn disarm(&mut self) {
        *self = Self::default();
    }

    /// Clear the crossed flag, keeping the trigger distance
    pub fn reset(&mut self) {
        self.crossed = false;
    }

    pub fn state(&self) -> FinishLineState {
        match (self.trigger_distance, self.crossed) {
            (None, _) => FinishLineState::Inactive,
            (Some(_), false) => FinishLineState::Armed,
            (Some(_), true) => FinishLineState::Crossed,
        }
    }

    pub fn trigger_distance(&self) -> Option<f64> {
        self.trigger_distance
    }

    /// Returns true exactly once, on the poll that reaches the trigger
    pub fn poll(&mut self, distance_traveled: f64) -> bool {
        match self.trigger_distance {
            Some(trigger) if !self.crossed && distance_traveled >= trigger => {
                self.crossed = true;
                true
            }
            _ => false,
        }
    }

    /// Meters to the line, or -1 when no line is armed
    pub fn distance_remaining(&self, distance_traveled: f64) -> f64 {
        match self.trigger_distance {
            Some(trigger) => trigger - distance_traveled,
            None => NO_DISTANCE,
        }
    }
}
