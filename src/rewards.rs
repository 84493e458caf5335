//! Total-star milestones and the cosmetics they unlock

use serde::{Deserialize, Serialize};

/// Cosmetic rewards unlocked by total stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewardId {
    NeonTrail,
    PulseAura,
    PrismSkin,
    GridRunner,
    GoldenGlow,
}

impl RewardId {
    /// Stable id used in saved progress
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardId::NeonTrail => "neon-trail",
            RewardId::PulseAura => "pulse-aura",
            RewardId::PrismSkin => "prism-skin",
            RewardId::GridRunner => "grid-runner",
            RewardId::GoldenGlow => "golden-glow",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        REWARD_THRESHOLDS
            .iter()
            .map(|t| t.id)
            .find(|id| id.as_str() == s)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RewardId::NeonTrail => "Neon Trail",
            RewardId::PulseAura => "Pulse Aura",
            RewardId::PrismSkin => "Prism Skin",
            RewardId::GridRunner => "Grid Runner",
            RewardId::GoldenGlow => "Golden Glow",
        }
    }
}

/// A total-star milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardThreshold {
    pub stars: u32,
    pub id: RewardId,
}

/// Milestones in ascending star order. Order is significant: the lowest
/// unclaimed milestone is granted first.
pub static REWARD_THRESHOLDS: [RewardThreshold; 5] = [
    RewardThreshold {
        stars: 5,
        id: RewardId::NeonTrail,
    },
    RewardThreshold {
        stars: 15,
        id: RewardId::PulseAura,
    },
    RewardThreshold {
        stars: 25,
        id: RewardId::PrismSkin,
    },
    RewardThreshold {
        stars: 35,
        id: RewardId::GridRunner,
    },
    RewardThreshold {
        stars: 45,
        id: RewardId::GoldenGlow,
    },
];

/// A reward granted by a save, as handed to the results screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardUnlock {
    pub id: String,
    pub name: String,
}

impl From<RewardId> for RewardUnlock {
    fn from(id: RewardId) -> Self {
        Self {
            id: id.as_str().to_string(),
            name: id.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_STARS;

    #[test]
    fn test_thresholds_ascending() {
        for pair in REWARD_THRESHOLDS.windows(2) {
            assert!(pair[0].stars < pair[1].stars);
        }
        assert!(REWARD_THRESHOLDS.iter().all(|t| t.stars <= MAX_STARS));
    }

    #[test]
    fn test_id_round_trip() {
        for t in REWARD_THRESHOLDS {
            assert_eq!(RewardId::from_str(t.id.as_str()), Some(t.id));
            // serde and as_str agree
            let json = serde_json::to_string(&t.id).unwrap();
            assert_eq!(json, format!("\"{}\"", t.id.as_str()));
        }
        assert_eq!(RewardId::from_str("rainbow-hat"), None);
    }

    #[test]
    fn test_unlock_from_id() {
        let unlock = RewardUnlock::from(RewardId::NeonTrail);
        assert_eq!(unlock.id, "neon-trail");
        assert_eq!(unlock.name, "Neon Trail");
    }
}
