//! Star rating rules
//!
//! A finished stage always earns at least one star. Two and three stars need
//! BOTH a crash ceiling and an orb percentage floor. The three-star tier is
//! checked first.

use rand::Rng;
use serde::Serialize;

use crate::stages::{StageDefinition, StarThreshold};

/// Percentage of orbs collected (0 when the stage has no orbs)
pub fn orb_percent(orbs_collected: u32, total_orbs: u32) -> f64 {
    if total_orbs == 0 {
        return 0.0;
    }
    // Multiply first so exact thresholds (e.g. 9/15 = 60%) compare exactly
    orbs_collected as f64 * 100.0 / total_orbs as f64
}

fn meets(threshold: &StarThreshold, crashes: u32, percent: f64) -> bool {
    crashes <= threshold.crashes && percent >= threshold.orbs
}

/// Star rating (1-3) for a completed stage
pub fn calculate_stars(
    crashes: u32,
    orbs_collected: u32,
    total_orbs: u32,
    stage: Option<&StageDefinition>,
) -> u8 {
    let Some(stage) = stage else {
        log::error!("calculate_stars called without a stage, awarding 1 star");
        return 1;
    };

    let percent = orb_percent(orbs_collected, total_orbs);
    if meets(&stage.stars.star3, crashes, percent) {
        3
    } else if meets(&stage.stars.star2, crashes, percent) {
        2
    } else {
        1
    }
}

/// Display strings for each star tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarRequirements {
    pub one: String,
    pub two: String,
    pub three: String,
}

fn describe(threshold: &StarThreshold) -> String {
    let crashes = match threshold.crashes {
        0 => "No crashes".to_string(),
        1 => "Max 1 crash".to_string(),
        n => format!("Max {} crashes", n),
    };
    format!("{}, {}% orbs", crashes, threshold.orbs)
}

pub fn get_star_requirements(stage: &StageDefinition) -> StarRequirements {
    StarRequirements {
        one: "Complete the stage".to_string(),
        two: describe(&stage.stars.star2),
        three: describe(&stage.stars.star3),
    }
}

/// Live HUD feedback toward a star target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarPace {
    pub crashes_ok: bool,
    pub orbs_ok: bool,
    /// Crashes that can still be absorbed
    pub crashes_remaining: u32,
    /// Orbs still required
    pub orbs_needed: u32,
}

/// Where the current run stands relative to `target_stars`.
///
/// Uses the same thresholds as [`calculate_stars`]: a run with `orbs_ok` and
/// `crashes_ok` finishes with at least the target. `orbs_ok` holds exactly
/// when `orbs_needed == 0`. On a stage without orbs a nonzero orb threshold
/// is out of reach, so `orbs_ok` stays false with one orb reported needed.
pub fn check_star_pace(
    target_stars: u8,
    crashes: u32,
    orbs_collected: u32,
    total_orbs: u32,
    stage: &StageDefinition,
) -> StarPace {
    let threshold = match target_stars {
        3 => &stage.stars.star3,
        2 => &stage.stars.star2,
        _ => {
            return StarPace {
                crashes_ok: true,
                orbs_ok: true,
                ..Default::default()
            };
        }
    };

    let orbs_ok = orb_percent(orbs_collected, total_orbs) >= threshold.orbs;
    let orbs_needed = if orbs_ok {
        0
    } else {
        let required_orbs = (threshold.orbs * total_orbs as f64 / 100.0).ceil() as u32;
        required_orbs.saturating_sub(orbs_collected).max(1)
    };
    StarPace {
        crashes_ok: crashes <= threshold.crashes,
        orbs_ok,
        crashes_remaining: threshold.crashes.saturating_sub(crashes),
        orbs_needed,
    }
}

const ONE_STAR: &[&str] = &[
    "Made it! Now go for more orbs.",
    "Finish line crossed. The grid remembers.",
    "A clear is a clear.",
];

const TWO_STAR: &[&str] = &[
    "Solid run!",
    "Nice rhythm, almost perfect.",
    "Two stars, one to go.",
];

const THREE_STAR: &[&str] = &[
    "Flawless frequency!",
    "Perfect run!",
    "Pure neon.",
];

/// Random flavor text for a star result
pub fn get_star_message<R: Rng>(stars: u8, rng: &mut R) -> &'static str {
    let pool = match stars {
        3 => THREE_STAR,
        2 => TWO_STAR,
        _ => ONE_STAR,
    };
    pool[rng.random_range(0..pool.len())]
}
