//! Obstacle pattern pools
//!
//! Each stage names a pattern pool. A pool lists the lane combinations an
//! obstacle may block (duplicates weight the draw), how often an obstacle is
//! a jump barrier instead, and the minimum spacing between obstacles.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{FREE_RUN_GAP, FREE_RUN_JUMP_FREQUENCY};
use crate::stages::StageDefinition;

/// Blocked lane indices for a single obstacle
pub type LaneSet = &'static [u8];

/// Pattern pool identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    /// Single-lane blocks, rare jumps. Fallback for unknown keys.
    #[default]
    Intro,
    Rhythm,
    Weave,
    Jumps,
    Split,
    Surge,
    Cascade,
    Gauntlet,
    Overdrive,
    Finale,
}

impl PatternKind {
    pub const ALL: [PatternKind; 10] = [
        PatternKind::Intro,
        PatternKind::Rhythm,
        PatternKind::Weave,
        PatternKind::Jumps,
        PatternKind::Split,
        PatternKind::Surge,
        PatternKind::Cascade,
        PatternKind::Gauntlet,
        PatternKind::Overdrive,
        PatternKind::Finale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Intro => "intro",
            PatternKind::Rhythm => "rhythm",
            PatternKind::Weave => "weave",
            PatternKind::Jumps => "jumps",
            PatternKind::Split => "split",
            PatternKind::Surge => "surge",
            PatternKind::Cascade => "cascade",
            PatternKind::Gauntlet => "gauntlet",
            PatternKind::Overdrive => "overdrive",
            PatternKind::Finale => "finale",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Resolve a pattern key, falling back to the default pool when unknown
    pub fn resolve(key: &str) -> Self {
        Self::from_str(key).unwrap_or_else(|| {
            log::warn!("Unknown pattern key '{}', using default pool", key);
            Self::default()
        })
    }

    /// The static pool for this pattern
    pub fn pool(&self) -> &'static PatternPool {
        match self {
            PatternKind::Intro => &INTRO,
            PatternKind::Rhythm => &RHYTHM,
            PatternKind::Weave => &WEAVE,
            PatternKind::Jumps => &JUMPS,
            PatternKind::Split => &SPLIT,
            PatternKind::Surge => &SURGE,
            PatternKind::Cascade => &CASCADE,
            PatternKind::Gauntlet => &GAUNTLET,
            PatternKind::Overdrive => &OVERDRIVE,
            PatternKind::Finale => &FINALE,
        }
    }
}

/// A weighted set of obstacle layouts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternPool {
    /// Lane layouts; a layout listed twice is drawn twice as often
    pub obstacles: &'static [LaneSet],
    /// Probability (0-1) that an obstacle is a jump barrier
    pub jump_frequency: f64,
    /// Minimum distance between obstacles (meters)
    pub gap: f64,
}

const LEFT: LaneSet = &[0];
const CENTER: LaneSet = &[1];
const RIGHT: LaneSet = &[2];
const LEFT_CENTER: LaneSet = &[0, 1];
const CENTER_RIGHT: LaneSet = &[1, 2];
const OUTER: LaneSet = &[0, 2];

static INTRO: PatternPool = PatternPool {
    obstacles: &[LEFT, CENTER, RIGHT],
    jump_frequency: 0.1,
    gap: 22.0,
};

static RHYTHM: PatternPool = PatternPool {
    obstacles: &[LEFT, CENTER, RIGHT, LEFT, CENTER, RIGHT, OUTER],
    jump_frequency: 0.2,
    gap: 20.0,
};

static WEAVE: PatternPool = PatternPool {
    obstacles: &[LEFT_CENTER, CENTER_RIGHT, LEFT_CENTER, CENTER_RIGHT, LEFT, RIGHT],
    jump_frequency: 0.2,
    gap: 18.0,
};

static JUMPS: PatternPool = PatternPool {
    obstacles: &[CENTER, LEFT, RIGHT],
    jump_frequency: 0.55,
    gap: 18.0,
};

static SPLIT: PatternPool = PatternPool {
    obstacles: &[OUTER, OUTER, CENTER, LEFT_CENTER, CENTER_RIGHT],
    jump_frequency: 0.25,
    gap: 17.0,
};

static SURGE: PatternPool = PatternPool {
    obstacles: &[LEFT_CENTER, CENTER_RIGHT, OUTER, CENTER],
    jump_frequency: 0.3,
    gap: 15.0,
};

static CASCADE: PatternPool = PatternPool {
    obstacles: &[LEFT, LEFT_CENTER, CENTER, CENTER_RIGHT, RIGHT, OUTER],
    jump_frequency: 0.3,
    gap: 14.0,
};

static GAUNTLET: PatternPool = PatternPool {
    obstacles: &[LEFT_CENTER, CENTER_RIGHT, OUTER, LEFT_CENTER, CENTER_RIGHT],
    jump_frequency: 0.4,
    gap: 13.0,
};

static OVERDRIVE: PatternPool = PatternPool {
    obstacles: &[LEFT_CENTER, CENTER_RIGHT, OUTER],
    jump_frequency: 0.35,
    gap: 12.0,
};

static FINALE: PatternPool = PatternPool {
    obstacles: &[
        LEFT_CENTER,
        CENTER_RIGHT,
        OUTER,
        LEFT_CENTER,
        CENTER_RIGHT,
        OUTER,
        CENTER,
    ],
    jump_frequency: 0.45,
    gap: 11.0,
};

/// Pool for a stage; Free Run (no stage) uses the default pool
pub fn get_pattern_pool(stage: Option<&StageDefinition>) -> &'static PatternPool {
    stage.map(|s| s.pattern).unwrap_or_default().pool()
}

/// Pool for a raw pattern key (e.g. from content data)
pub fn get_pattern_pool_by_key(key: &str) -> &'static PatternPool {
    PatternKind::resolve(key).pool()
}

/// Uniform draw over the pool's layouts, duplicates included
pub fn select_random_pattern<R: Rng>(pool: &PatternPool, rng: &mut R) -> LaneSet {
    if pool.obstacles.is_empty() {
        return CENTER;
    }
    pool.obstacles[rng.random_range(0..pool.obstacles.len())]
}

/// Bernoulli draw: should the next obstacle be a jump barrier?
pub fn should_spawn_jump<R: Rng>(pool: &PatternPool, rng: &mut R) -> bool {
    rng.random_bool(pool.jump_frequency.clamp(0.0, 1.0))
}

/// Minimum obstacle spacing for a stage (Free Run default when None)
pub fn get_obstacle_gap(stage: Option<&StageDefinition>) -> f64 {
    match stage {
        Some(stage) => stage.pattern.pool().gap,
        None => FREE_RUN_GAP,
    }
}

/// Jump barrier probability for a stage (Free Run default when None)
pub fn get_jump_frequency(stage: Option<&StageDefinition>) -> f64 {
    match stage {
        Some(stage) => stage.pattern.pool().jump_frequency,
        None => FREE_RUN_JUMP_FREQUENCY,
    }
}
