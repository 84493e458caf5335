//! Free Run leaderboard
//!
//! Tracks the top 10 Free Run distances plus a single top-distance counter
//! read by the HUD.

use serde::{Deserialize, Serialize};

use crate::consts::{FREE_RUN_SCORES_KEY, TOP_DISTANCE_KEY};
use crate::persistence::KeyValueStore;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single Free Run result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Distance reached (meters)
    pub distance: f64,
    /// Orbs collected on the run
    pub orbs: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Free Run leaderboard, sorted by distance descending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a distance qualifies for the leaderboard
    pub fn qualifies(&self, distance: f64) -> bool {
        if distance <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if distance beats the lowest entry
        self.entries
            .last()
            .map(|e| distance > e.distance)
            .unwrap_or(true)
    }

    /// Add a run to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, distance: f64, orbs: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(distance) {
            return None;
        }

        let entry = HighScoreEntry {
            distance,
            orbs,
            timestamp,
        };

        // Find insertion point (sorted descending by distance)
        let pos = self.entries.iter().position(|e| distance > e.distance);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best distance (if any)
    pub fn top_distance(&self) -> Option<f64> {
        self.entries.first().map(|e| e.distance)
    }

    pub fn load<S: KeyValueStore>(storage: &S) -> Self {
        match storage.get_json::<HighScores>(FREE_RUN_SCORES_KEY) {
            Some(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            None => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    /// Persist the leaderboard and the HUD's top-distance counter
    pub fn save<S: KeyValueStore>(&self, storage: &S) {
        if let Err(e) = storage.set_json(FREE_RUN_SCORES_KEY, self) {
            log::error!("Failed to save high scores: {}", e);
            return;
        }
        let best = self.top_distance().unwrap_or(0.0);
        if best > storage.get_number(TOP_DISTANCE_KEY, 0.0) {
            if let Err(e) = storage.set(TOP_DISTANCE_KEY, best) {
                log::error!("Failed to save top distance: {}", e);
            }
        }
        log::info!("High scores saved ({} entries)", self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_ranking() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(0.0, 0, 0.0), None);
        assert_eq!(scores.add_score(300.0, 5, 1.0), Some(1));
        assert_eq!(scores.add_score(500.0, 2, 2.0), Some(1));
        assert_eq!(scores.add_score(400.0, 9, 3.0), Some(2));
        assert_eq!(scores.top_distance(), Some(500.0));
    }

    #[test]
    fn test_truncates_to_max() {
        let mut scores = HighScores::new();
        for i in 1..=12 {
            scores.add_score(i as f64 * 100.0, 0, 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(150.0));
        assert!(scores.qualifies(350.0));
    }

    #[test]
    fn test_save_updates_top_distance() {
        let store = MemoryStore::new();
        let mut scores = HighScores::load(&store);
        assert!(scores.is_empty());
        scores.add_score(812.5, 3, 0.0);
        scores.save(&store);
        assert_eq!(store.get_number(TOP_DISTANCE_KEY, 0.0), 812.5);
        assert_eq!(HighScores::load(&store), scores);
    }
}
