//! Stage Mode catalog
//!
//! Fifteen fixed stages, ordered 1..=15. Each stage unlocks the next one when
//! completed. Ids are stable and double as persistence keys.

use serde::Serialize;

use crate::patterns::PatternKind;

/// Requirement for a star tier: at most `crashes` crashes AND at least
/// `orbs` percent of the stage's orbs collected
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StarThreshold {
    /// Maximum crashes allowed
    pub crashes: u32,
    /// Minimum orb percentage (0-100)
    pub orbs: f64,
}

/// Per-stage star requirements. `star3` is never looser than `star2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StarThresholds {
    pub star3: StarThreshold,
    pub star2: StarThreshold,
}

/// How a stage becomes playable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UnlockRule {
    /// Available from the start (first stage only)
    Default,
    /// Requires the preceding stage to be completed
    CompletePrevious {
        #[serde(rename = "requiredStageId")]
        required_stage_id: &'static str,
    },
}

/// A single Stage Mode level
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    pub id: &'static str,
    /// Position in the campaign (1-based, contiguous)
    pub order: u32,
    pub name: &'static str,
    pub description: &'static str,
    /// Finish line distance (meters)
    pub distance: f64,
    /// Forward speed (m/s)
    pub speed: f64,
    /// Orbs placed along the track
    pub total_orbs: u32,
    pub pattern: PatternKind,
    pub stars: StarThresholds,
    pub unlock: UnlockRule,
}

impl StageDefinition {
    /// True for the final stage of the campaign
    pub fn is_last(&self) -> bool {
        self.order as usize == STAGES.len()
    }
}

const fn tier(crashes: u32, orbs: f64) -> StarThreshold {
    StarThreshold { crashes, orbs }
}

const fn after(required_stage_id: &'static str) -> UnlockRule {
    UnlockRule::CompletePrevious { required_stage_id }
}

static STAGES: [StageDefinition; 15] = [
    StageDefinition {
        id: "stage-1-intro",
        order: 1,
        name: "First Light",
        description: "Learn to switch lanes and grab orbs",
        distance: 500.0,
        speed: 14.0,
        total_orbs: 15,
        pattern: PatternKind::Intro,
        stars: StarThresholds { star3: tier(2, 60.0), star2: tier(5, 40.0) },
        unlock: UnlockRule::Default,
    },
    StageDefinition {
        id: "stage-2-rhythm",
        order: 2,
        name: "Rhythm Check",
        description: "Obstacles start falling on the beat",
        distance: 600.0,
        speed: 15.0,
        total_orbs: 18,
        pattern: PatternKind::Rhythm,
        stars: StarThresholds { star3: tier(2, 65.0), star2: tier(5, 45.0) },
        unlock: after("stage-1-intro"),
    },
    StageDefinition {
        id: "stage-3-weave",
        order: 3,
        name: "Lane Weaver",
        description: "Two lanes closed at once, keep moving",
        distance: 700.0,
        speed: 16.0,
        total_orbs: 20,
        pattern: PatternKind::Weave,
        stars: StarThresholds { star3: tier(2, 65.0), star2: tier(4, 45.0) },
        unlock: after("stage-2-rhythm"),
    },
    StageDefinition {
        id: "stage-4-jump",
        order: 4,
        name: "Hop Circuit",
        description: "Barriers you can only clear by jumping",
        distance: 800.0,
        speed: 17.0,
        total_orbs: 22,
        pattern: PatternKind::Jumps,
        stars: StarThresholds { star3: tier(2, 70.0), star2: tier(4, 50.0) },
        unlock: after("stage-3-weave"),
    },
    StageDefinition {
        id: "stage-5-pulse",
        order: 5,
        name: "Pulse Line",
        description: "A faster beat with fewer second chances",
        distance: 900.0,
        speed: 18.0,
        total_orbs: 25,
        pattern: PatternKind::Rhythm,
        stars: StarThresholds { star3: tier(1, 70.0), star2: tier(4, 50.0) },
        unlock: after("stage-4-jump"),
    },
    StageDefinition {
        id: "stage-6-split",
        order: 6,
        name: "Split Signal",
        description: "The outer lanes close together",
        distance: 1000.0,
        speed: 19.0,
        total_orbs: 26,
        pattern: PatternKind::Split,
        stars: StarThresholds { star3: tier(1, 70.0), star2: tier(3, 50.0) },
        unlock: after("stage-5-pulse"),
    },
    StageDefinition {
        id: "stage-7-surge",
        order: 7,
        name: "Neon Surge",
        description: "Tighter gaps and a rising tempo",
        distance: 1100.0,
        speed: 20.0,
        total_orbs: 28,
        pattern: PatternKind::Surge,
        stars: StarThresholds { star3: tier(1, 75.0), star2: tier(3, 55.0) },
        unlock: after("stage-6-split"),
    },
    StageDefinition {
        id: "stage-8-cascade",
        order: 8,
        name: "Cascade",
        description: "Walls roll across the track lane by lane",
        distance: 1200.0,
        speed: 21.0,
        total_orbs: 30,
        pattern: PatternKind::Cascade,
        stars: StarThresholds { star3: tier(1, 75.0), star2: tier(3, 55.0) },
        unlock: after("stage-7-surge"),
    },
    StageDefinition {
        id: "stage-9-vortex",
        order: 9,
        name: "Vortex Run",
        description: "Jumps and double walls, back to back",
        distance: 1300.0,
        speed: 22.0,
        total_orbs: 32,
        pattern: PatternKind::Gauntlet,
        stars: StarThresholds { star3: tier(1, 80.0), star2: tier(3, 55.0) },
        unlock: after("stage-8-cascade"),
    },
    StageDefinition {
        id: "stage-10-prism",
        order: 10,
        name: "Prism Gate",
        description: "Read the gate, pick the open lane",
        distance: 1400.0,
        speed: 23.0,
        total_orbs: 34,
        pattern: PatternKind::Cascade,
        stars: StarThresholds { star3: tier(1, 80.0), star2: tier(3, 60.0) },
        unlock: after("stage-9-vortex"),
    },
    StageDefinition {
        id: "stage-11-overdrive",
        order: 11,
        name: "Overdrive",
        description: "Top speed with barely a breath between walls",
        distance: 1500.0,
        speed: 24.0,
        total_orbs: 36,
        pattern: PatternKind::Overdrive,
        stars: StarThresholds { star3: tier(1, 80.0), star2: tier(2, 60.0) },
        unlock: after("stage-10-prism"),
    },
    StageDefinition {
        id: "stage-12-storm",
        order: 12,
        name: "Static Storm",
        description: "Every pattern you know, all at once",
        distance: 1600.0,
        speed: 25.0,
        total_orbs: 38,
        pattern: PatternKind::Gauntlet,
        stars: StarThresholds { star3: tier(0, 80.0), star2: tier(2, 60.0) },
        unlock: after("stage-11-overdrive"),
    },
    StageDefinition {
        id: "stage-13-eclipse",
        order: 13,
        name: "Eclipse",
        description: "Long stretches of double walls",
        distance: 1700.0,
        speed: 26.0,
        total_orbs: 40,
        pattern: PatternKind::Overdrive,
        stars: StarThresholds { star3: tier(0, 85.0), star2: tier(2, 65.0) },
        unlock: after("stage-12-storm"),
    },
    StageDefinition {
        id: "stage-14-nova",
        order: 14,
        name: "Nova Drift",
        description: "The last warm-up before the finale",
        distance: 1850.0,
        speed: 27.0,
        total_orbs: 42,
        pattern: PatternKind::Finale,
        stars: StarThresholds { star3: tier(0, 85.0), star2: tier(2, 65.0) },
        unlock: after("stage-13-eclipse"),
    },
    StageDefinition {
        id: "stage-15-finale",
        order: 15,
        name: "Final Frequency",
        description: "Flawless or bust",
        distance: 2000.0,
        speed: 28.0,
        total_orbs: 45,
        pattern: PatternKind::Finale,
        stars: StarThresholds { star3: tier(0, 90.0), star2: tier(1, 70.0) },
        unlock: after("stage-14-nova"),
    },
];

/// Look up a stage by id
pub fn get_stage(id: &str) -> Option<&'static StageDefinition> {
    STAGES.iter().find(|s| s.id == id)
}

/// Look up a stage by its 1-based order
pub fn get_stage_by_order(order: u32) -> Option<&'static StageDefinition> {
    STAGES.iter().find(|s| s.order == order)
}

/// Stage following `id` in the campaign, or None for the last/unknown stage
pub fn get_next_stage(id: &str) -> Option<&'static StageDefinition> {
    let current = get_stage(id)?;
    get_stage_by_order(current.order + 1)
}

/// All stages, ascending by order
pub fn get_all_stages() -> &'static [StageDefinition] {
    &STAGES
}

pub fn get_total_stages() -> usize {
    STAGES.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TOTAL_STAGES;

    #[test]
    fn test_all_stages_strictly_ordered() {
        let stages = get_all_stages();
        assert_eq!(stages.len(), 15);
        assert_eq!(get_total_stages(), TOTAL_STAGES as usize);
        for (i, stage) in stages.iter().enumerate() {
            assert_eq!(stage.order, i as u32 + 1, "{} out of order", stage.id);
        }
    }

    #[test]
    fn test_ids_unique() {
        let stages = get_all_stages();
        for (i, a) in stages.iter().enumerate() {
            for b in &stages[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_unlock_chain() {
        let stages = get_all_stages();
        assert_eq!(stages[0].unlock, UnlockRule::Default);
        for pair in stages.windows(2) {
            assert_eq!(
                pair[1].unlock,
                UnlockRule::CompletePrevious {
                    required_stage_id: pair[0].id
                }
            );
        }
        let defaults = stages
            .iter()
            .filter(|s| s.unlock == UnlockRule::Default)
            .count();
        assert_eq!(defaults, 1);
    }

    #[test]
    fn test_star3_at_least_as_strict_as_star2() {
        for stage in get_all_stages() {
            let s = &stage.stars;
            assert!(s.star3.crashes <= s.star2.crashes, "{}", stage.id);
            assert!(s.star3.orbs >= s.star2.orbs, "{}", stage.id);
            assert!(stage.distance > 0.0);
        }
    }

    #[test]
    fn test_next_stage() {
        let stages = get_all_stages();
        for pair in stages.windows(2) {
            let next = get_next_stage(pair[0].id).expect("has next");
            assert_eq!(next.order, pair[0].order + 1);
            assert_eq!(next.id, pair[1].id);
        }
        assert!(get_next_stage("stage-15-finale").is_none());
        assert!(get_next_stage("stage-99-missing").is_none());
        assert!(get_stage_by_order(15).is_some_and(|s| s.is_last()));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(get_stage("stage-1-intro").map(|s| s.order), Some(1));
        assert_eq!(get_stage_by_order(2).map(|s| s.id), Some("stage-2-rhythm"));
        assert!(get_stage_by_order(0).is_none());
        assert!(get_stage_by_order(16).is_none());
        assert!(get_stage("").is_none());
    }
}
