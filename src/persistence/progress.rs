//! Stage Mode progress
//!
//! One JSON aggregate holds every stage record plus the star total, the
//! completed count and unlocked rewards. Every read goes back to storage and
//! every write persists the whole aggregate, so the last writer wins.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::storage::KeyValueStore;
use crate::consts::{MAX_STARS, PROGRESS_KEY, TOTAL_STAGES};
use crate::rewards::{REWARD_THRESHOLDS, RewardId, RewardUnlock};
use crate::stages::{self, StageDefinition};

/// Persisted state of a single stage. Fields missing from older saves
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageProgressRecord {
    pub unlocked: bool,
    pub completed: bool,
    /// Best rating so far (0 until first completion)
    pub best_stars: u8,
    /// Crashes in the run that set `best_stars`
    pub best_crashes: u32,
    /// Orbs in the run that set `best_stars`
    pub best_orbs: u32,
    /// Orb total recorded at the last completion
    pub total_orbs: u32,
    /// Number of completions
    pub play_count: u32,
}

/// The whole persisted progress aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStore {
    pub stage_progress: BTreeMap<String, StageProgressRecord>,
    /// Sum of `best_stars` over all stages
    pub total_stars: u32,
    /// Count of completed stages
    #[serde(default)]
    pub stages_completed: u32,
    /// Reward ids, in unlock order
    #[serde(default)]
    pub unlocked_rewards: Vec<String>,
    #[serde(default)]
    pub new_rewards_available: bool,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::initialize()
    }
}

impl ProgressStore {
    /// Fresh progress: first stage unlocked, everything else locked and zeroed
    pub fn initialize() -> Self {
        let stage_progress = stages::get_all_stages()
            .iter()
            .map(|stage| {
                let record = StageProgressRecord {
                    unlocked: stage.order == 1,
                    ..Default::default()
                };
                (stage.id.to_string(), record)
            })
            .collect();

        Self {
            stage_progress,
            total_stars: 0,
            stages_completed: 0,
            unlocked_rewards: Vec::new(),
            new_rewards_available: false,
        }
    }

    /// Recompute derived totals from the stage records
    pub fn recalculate(&mut self) {
        self.total_stars = self
            .stage_progress
            .values()
            .map(|r| u32::from(r.best_stars))
            .sum();
        self.stages_completed = self.stage_progress.values().filter(|r| r.completed).count() as u32;
    }

    pub fn has_reward(&self, id: RewardId) -> bool {
        self.unlocked_rewards.iter().any(|r| r == id.as_str())
    }

    /// Grant the lowest earned-but-unclaimed reward, if any.
    ///
    /// At most one reward is granted per call, even when the star total
    /// crosses several milestones at once; the rest follow on later saves.
    pub fn check_rewards(&mut self) -> Option<RewardId> {
        let threshold = REWARD_THRESHOLDS
            .iter()
            .find(|t| self.total_stars >= t.stars && !self.has_reward(t.id))?;
        self.unlocked_rewards.push(threshold.id.as_str().to_string());
        self.new_rewards_available = true;
        Some(threshold.id)
    }

    /// Minimal shape check applied before deserializing saved progress
    fn is_valid_shape(value: &Value) -> bool {
        value.get("stageProgress").is_some_and(Value::is_object)
            && value.get("totalStars").is_some_and(Value::is_number)
    }

    /// Rebuild the aggregate from saved JSON that passed the shape check.
    ///
    /// Registry stages start from their fresh records and take the saved
    /// record where one is readable, so a damaged entry costs that stage only.
    /// A stage whose predecessor is completed is always unlocked.
    fn from_saved(value: Value) -> Option<Self> {
        if !Self::is_valid_shape(&value) {
            log::warn!("Saved progress has an invalid shape, starting fresh");
            return None;
        }

        let mut store = Self::initialize();
        if let Some(Value::Object(records)) = value.get("stageProgress") {
            for (id, raw) in records {
                let Some(slot) = store.stage_progress.get_mut(id.as_str()) else {
                    log::warn!("Dropping saved progress for unknown stage '{}'", id);
                    continue;
                };
                match StageProgressRecord::deserialize(raw) {
                    Ok(record) => *slot = record,
                    Err(e) => log::warn!("Saved progress for '{}' unreadable ({}), reset", id, e),
                }
            }
        }

        for pair in stages::get_all_stages().windows(2) {
            let previous_done = store
                .stage_progress
                .get(pair[0].id)
                .is_some_and(|r| r.completed);
            if previous_done {
                if let Some(next) = store.stage_progress.get_mut(pair[1].id) {
                    next.unlocked = true;
                }
            }
        }

        store.total_stars = value
            .get("totalStars")
            .and_then(Value::as_f64)
            .map_or(0, |n| n.max(0.0) as u32);
        let completed = store.stage_progress.values().filter(|r| r.completed).count() as u32;
        store.stages_completed =
            saved_field::<Option<u32>>(&value, "stagesCompleted").unwrap_or(completed);
        store.unlocked_rewards = saved_field(&value, "unlockedRewards");
        store.new_rewards_available = saved_field(&value, "newRewardsAvailable");
        Some(store)
    }
}

/// A top-level saved field, or its default when missing or mistyped
fn saved_field<T: DeserializeOwned + Default>(value: &Value, key: &str) -> T {
    value
        .get(key)
        .and_then(|v| T::deserialize(v).ok())
        .unwrap_or_default()
}

/// Level-select summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total_stars: u32,
    pub max_stars: u32,
    pub stages_completed: u32,
    pub total_stages: u32,
    pub unlocked_rewards: Vec<String>,
    pub new_rewards_available: bool,
}

/// A stage paired with its saved record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageStatus {
    pub stage: &'static StageDefinition,
    pub progress: StageProgressRecord,
}

/// Id of the stage after `stage_id`, using the order embedded in the id
/// (`stage-<order>-<name>`). None past the last stage.
pub fn get_next_stage_id(stage_id: &str) -> Option<&'static str> {
    let order: u32 = stage_id
        .strip_prefix("stage-")?
        .split('-')
        .next()?
        .parse()
        .ok()?;
    if order >= TOTAL_STAGES {
        return None;
    }
    stages::get_stage_by_order(order + 1).map(|s| s.id)
}

/// Reads and writes stage progress through a key-value store
#[derive(Debug, Clone)]
pub struct ProgressTracker<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> ProgressTracker<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Saved progress, or fresh progress if nothing valid is stored
    pub fn load_progress(&self) -> ProgressStore {
        self.storage
            .get_json::<Value>(PROGRESS_KEY)
            .and_then(ProgressStore::from_saved)
            .unwrap_or_else(ProgressStore::initialize)
    }

    fn persist(&self, store: &ProgressStore) {
        match self.storage.set_json(PROGRESS_KEY, store) {
            Ok(()) => log::info!(
                "Progress saved ({} stars, {} stages)",
                store.total_stars,
                store.stages_completed
            ),
            Err(e) => log::error!("Failed to save progress: {}", e),
        }
    }

    /// Record a stage completion and return a newly unlocked reward, if any
    pub fn save_progress(
        &self,
        stage_id: &str,
        stars: u8,
        crashes: u32,
        orbs_collected: u32,
        total_orbs: u32,
    ) -> Option<RewardUnlock> {
        let mut store = self.load_progress();

        let Some(record) = store.stage_progress.get_mut(stage_id) else {
            log::error!("No progress record for stage '{}'", stage_id);
            return None;
        };

        let stars = stars.min(3);
        let is_new_best = !record.completed || stars > record.best_stars;
        if is_new_best {
            record.best_stars = stars;
            record.best_crashes = crashes;
            record.best_orbs = orbs_collected;
        }
        record.completed = true;
        record.total_orbs = total_orbs;
        record.play_count += 1;

        // Any clear unlocks the next stage, whatever the rating
        if let Some(next) = get_next_stage_id(stage_id)
            .and_then(|id| store.stage_progress.get_mut(id))
        {
            next.unlocked = true;
        }

        store.recalculate();
        let reward = store.check_rewards();
        if let Some(id) = reward {
            log::info!("Reward unlocked: {} at {} stars", id.name(), store.total_stars);
        }

        self.persist(&store);
        reward.map(RewardUnlock::from)
    }

    pub fn is_stage_unlocked(&self, stage_id: &str) -> bool {
        self.load_progress()
            .stage_progress
            .get(stage_id)
            .is_some_and(|r| r.unlocked)
    }

    pub fn get_stage_data(&self, stage_id: &str) -> Option<StageProgressRecord> {
        self.load_progress().stage_progress.remove(stage_id)
    }

    pub fn get_progress_summary(&self) -> ProgressSummary {
        let store = self.load_progress();
        ProgressSummary {
            total_stars: store.total_stars,
            max_stars: MAX_STARS,
            stages_completed: store.stages_completed,
            total_stages: TOTAL_STAGES,
            unlocked_rewards: store.unlocked_rewards,
            new_rewards_available: store.new_rewards_available,
        }
    }

    /// Every stage in order with its record (level select)
    pub fn stage_statuses(&self) -> Vec<StageStatus> {
        let store = self.load_progress();
        stages::get_all_stages()
            .iter()
            .map(|stage| StageStatus {
                stage,
                progress: store
                    .stage_progress
                    .get(stage.id)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Wipe all progress. Irreversible.
    pub fn reset_progress(&self) -> ProgressStore {
        let store = ProgressStore::initialize();
        self.persist(&store);
        log::info!("Progress reset");
        store
    }

    /// Acknowledge new rewards (keeps the unlocked list)
    pub fn clear_new_rewards_flag(&self) {
        let mut store = self.load_progress();
        store.new_rewards_available = false;
        self.persist(&store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    fn tracker() -> ProgressTracker<MemoryStore> {
        ProgressTracker::new(MemoryStore::new())
    }

    #[test]
    fn test_fresh_store_shape() {
        let store = tracker().load_progress();
        assert_eq!(store.stage_progress.len(), 15);
        assert_eq!(store.total_stars, 0);
        assert_eq!(store.stages_completed, 0);
        assert!(store.unlocked_rewards.is_empty());
        assert!(!store.new_rewards_available);
        assert!(store.stage_progress["stage-1-intro"].unlocked);
        let locked = store.stage_progress.values().filter(|r| !r.unlocked).count();
        assert_eq!(locked, 14);
    }

    #[test]
    fn test_load_is_idempotent() {
        let t = tracker();
        t.save_progress("stage-1-intro", 2, 3, 8, 15);
        assert_eq!(t.load_progress(), t.load_progress());
    }

    #[test]
    fn test_invalid_shapes_fall_back() {
        let t = tracker();
        for bad in [
            "{not json",
            "[]",
            r#"{"totalStars": 3}"#,
            r#"{"stageProgress": {}, "totalStars": "3"}"#,
            r#"{"stageProgress": [], "totalStars": 3}"#,
        ] {
            t.storage().set_item(PROGRESS_KEY, bad).unwrap();
            assert_eq!(t.load_progress(), ProgressStore::initialize(), "{}", bad);
        }
    }

    #[test]
    fn test_partial_records_keep_progress() {
        let t = tracker();
        // Older save: no playCount/totalOrbs, stage 2 record carries only a flag
        let saved = r#"{
            "stageProgress": {
                "stage-1-intro": {"unlocked": true, "completed": true, "bestStars": 3, "bestCrashes": 0, "bestOrbs": 15},
                "stage-2-rhythm": {"unlocked": true}
            },
            "totalStars": 3
        }"#;
        t.storage().set_item(PROGRESS_KEY, saved).unwrap();

        let store = t.load_progress();
        assert_eq!(store.stage_progress.len(), 15);
        assert_eq!(store.total_stars, 3);
        assert_eq!(store.stages_completed, 1);
        let intro = &store.stage_progress["stage-1-intro"];
        assert_eq!(intro.best_stars, 3);
        assert_eq!(intro.play_count, 0);
        assert!(store.stage_progress["stage-2-rhythm"].unlocked);
        assert!(!store.stage_progress["stage-3-weave"].unlocked);

        t.save_progress("stage-2-rhythm", 1, 9, 0, 18);
        let store = t.load_progress();
        assert_eq!(store.stage_progress["stage-1-intro"].best_stars, 3);
        assert_eq!(store.total_stars, 4);
        assert_eq!(store.stages_completed, 2);
        assert!(store.stage_progress["stage-3-weave"].unlocked);
    }

    #[test]
    fn test_damaged_record_costs_only_that_stage() {
        let t = tracker();
        let saved = r#"{
            "stageProgress": {
                "stage-1-intro": {"unlocked": true, "completed": true, "bestStars": 2},
                "stage-2-rhythm": {"unlocked": "yes", "completed": true, "bestStars": 1},
                "stage-99-gone": {"unlocked": true, "completed": true, "bestStars": 3}
            },
            "totalStars": 3.0,
            "unlockedRewards": "neon-trail"
        }"#;
        t.storage().set_item(PROGRESS_KEY, saved).unwrap();

        let store = t.load_progress();
        assert_eq!(store.stage_progress.len(), 15);
        assert!(!store.stage_progress.contains_key("stage-99-gone"));
        assert_eq!(store.stage_progress["stage-1-intro"].best_stars, 2);
        // Unreadable record is fresh again, but stays reachable
        let rhythm = &store.stage_progress["stage-2-rhythm"];
        assert!(rhythm.unlocked);
        assert!(!rhythm.completed);
        assert_eq!(store.total_stars, 3);
        assert!(store.unlocked_rewards.is_empty());
    }

    #[test]
    fn test_missing_stages_filled_in() {
        let t = tracker();
        t.storage()
            .set_item(PROGRESS_KEY, r#"{"stageProgress": {}, "totalStars": 0}"#)
            .unwrap();
        assert_eq!(t.load_progress(), ProgressStore::initialize());
        assert!(t.is_stage_unlocked("stage-1-intro"));
        assert!(t.get_stage_data("stage-15-finale").is_some());
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let t = tracker();
        t.save_progress("stage-1-intro", 3, 0, 15, 15);
        let raw = t.storage().get_item(PROGRESS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"stageProgress\""));
        assert!(raw.contains("\"bestStars\":3"));
        assert!(raw.contains("\"newRewardsAvailable\""));
    }

    #[test]
    fn test_completion_unlocks_next_only() {
        let t = tracker();
        assert!(!t.is_stage_unlocked("stage-2-rhythm"));
        t.save_progress("stage-1-intro", 1, 9, 0, 15);
        assert!(t.is_stage_unlocked("stage-2-rhythm"));
        for stage in &stages::get_all_stages()[2..] {
            assert!(!t.is_stage_unlocked(stage.id), "{}", stage.id);
        }
    }

    #[test]
    fn test_best_only_improves() {
        let t = tracker();
        t.save_progress("stage-1-intro", 2, 4, 8, 15);
        t.save_progress("stage-1-intro", 1, 9, 2, 15);
        let data = t.get_stage_data("stage-1-intro").unwrap();
        assert_eq!(data.best_stars, 2);
        assert_eq!(data.best_crashes, 4);
        assert_eq!(data.best_orbs, 8);
        assert_eq!(data.play_count, 2);
        assert!(data.completed);

        t.save_progress("stage-1-intro", 3, 1, 12, 15);
        let data = t.get_stage_data("stage-1-intro").unwrap();
        assert_eq!(data.best_stars, 3);
        assert_eq!(data.best_crashes, 1);
        assert_eq!(data.best_orbs, 12);
        assert_eq!(data.play_count, 3);
    }

    #[test]
    fn test_equal_stars_keep_snapshot() {
        let t = tracker();
        t.save_progress("stage-1-intro", 2, 5, 6, 15);
        t.save_progress("stage-1-intro", 2, 3, 9, 15);
        let data = t.get_stage_data("stage-1-intro").unwrap();
        assert_eq!(data.best_crashes, 5);
        assert_eq!(data.best_orbs, 6);
    }

    #[test]
    fn test_unknown_stage_is_ignored() {
        let t = tracker();
        assert_eq!(t.save_progress("stage-99-nope", 3, 0, 10, 10), None);
        assert_eq!(t.load_progress(), ProgressStore::initialize());
        assert!(t.get_stage_data("stage-99-nope").is_none());
        assert!(!t.is_stage_unlocked("stage-99-nope"));
    }

    #[test]
    fn test_reward_unlocked_once() {
        let t = tracker();
        assert_eq!(t.save_progress("stage-1-intro", 3, 0, 15, 15), None);
        let reward = t.save_progress("stage-2-rhythm", 2, 3, 10, 18);
        assert_eq!(
            reward,
            Some(RewardUnlock {
                id: "neon-trail".to_string(),
                name: "Neon Trail".to_string(),
            })
        );
        // Same total, no repeat
        assert_eq!(t.save_progress("stage-2-rhythm", 1, 8, 0, 18), None);

        let summary = t.get_progress_summary();
        assert_eq!(summary.total_stars, 5);
        assert_eq!(summary.unlocked_rewards, vec!["neon-trail".to_string()]);
        assert!(summary.new_rewards_available);

        t.clear_new_rewards_flag();
        let summary = t.get_progress_summary();
        assert!(!summary.new_rewards_available);
        assert_eq!(summary.unlocked_rewards.len(), 1);
    }

    #[test]
    fn test_one_reward_per_save() {
        let t = tracker();
        let mut store = ProgressStore::initialize();
        for stage in &stages::get_all_stages()[..5] {
            let record = store.stage_progress.get_mut(stage.id).unwrap();
            record.unlocked = true;
            record.completed = true;
            record.best_stars = 3;
        }
        t.storage().set_json(PROGRESS_KEY, &store).unwrap();

        // 15 + 1 stars crosses both the 5 and 15 milestones
        let first = t.save_progress("stage-6-split", 1, 5, 0, 26);
        assert_eq!(first.map(|r| r.id), Some("neon-trail".to_string()));
        let second = t.save_progress("stage-6-split", 1, 5, 0, 26);
        assert_eq!(second.map(|r| r.id), Some("pulse-aura".to_string()));
        assert_eq!(t.save_progress("stage-6-split", 1, 5, 0, 26), None);
    }

    #[test]
    fn test_aggregates_recomputed_from_records() {
        let t = tracker();
        // Out-of-band edit leaves totals stale
        let mut store = ProgressStore::initialize();
        store.stage_progress.get_mut("stage-3-weave").unwrap().best_stars = 2;
        store.stage_progress.get_mut("stage-3-weave").unwrap().completed = true;
        store.total_stars = 40;
        t.storage().set_json(PROGRESS_KEY, &store).unwrap();

        t.save_progress("stage-1-intro", 1, 6, 0, 15);
        let store = t.load_progress();
        assert_eq!(store.total_stars, 3);
        assert_eq!(store.stages_completed, 2);
    }

    #[test]
    fn test_reset_restores_fresh_shape() {
        let t = tracker();
        t.save_progress("stage-1-intro", 3, 0, 15, 15);
        t.save_progress("stage-2-rhythm", 3, 0, 18, 18);
        let reset = t.reset_progress();
        assert_eq!(reset, ProgressStore::initialize());
        assert_eq!(t.load_progress(), ProgressStore::initialize());
        assert!(t.is_stage_unlocked("stage-1-intro"));
        assert!(!t.is_stage_unlocked("stage-2-rhythm"));
    }

    #[test]
    fn test_reads_observe_external_writes() {
        let t = tracker();
        let other = ProgressTracker::new(t.storage().clone());
        t.save_progress("stage-1-intro", 3, 0, 15, 15);
        assert_eq!(other.get_progress_summary().total_stars, 3);
        other.reset_progress();
        assert_eq!(t.get_progress_summary().total_stars, 0);
    }

    #[test]
    fn test_next_stage_id() {
        assert_eq!(get_next_stage_id("stage-1-intro"), Some("stage-2-rhythm"));
        assert_eq!(get_next_stage_id("stage-9-vortex"), Some("stage-10-prism"));
        assert_eq!(get_next_stage_id("stage-14-nova"), Some("stage-15-finale"));
        assert_eq!(get_next_stage_id("stage-15-finale"), None);
        assert_eq!(get_next_stage_id("bonus-level"), None);
        assert_eq!(get_next_stage_id("stage-x-intro"), None);
    }

    #[test]
    fn test_finale_completion_unlocks_nothing() {
        let t = tracker();
        let before = t.load_progress();
        assert_eq!(t.save_progress("stage-15-finale", 2, 1, 32, 45), None);

        let after = t.load_progress();
        let finale = &after.stage_progress["stage-15-finale"];
        assert!(finale.completed);
        assert_eq!(finale.best_stars, 2);
        assert_eq!(finale.total_orbs, 45);
        for stage in &stages::get_all_stages()[..14] {
            assert_eq!(
                after.stage_progress[stage.id].unlocked,
                before.stage_progress[stage.id].unlocked,
                "{}",
                stage.id
            );
        }
        assert_eq!(after.total_stars, 2);
        assert_eq!(after.stages_completed, 1);
    }

    #[test]
    fn test_summary_and_statuses() {
        let t = tracker();
        t.save_progress("stage-1-intro", 2, 3, 7, 15);
        let summary = t.get_progress_summary();
        assert_eq!(summary.max_stars, 45);
        assert_eq!(summary.total_stages, 15);
        assert_eq!(summary.stages_completed, 1);

        let statuses = t.stage_statuses();
        assert_eq!(statuses.len(), 15);
        assert_eq!(statuses[0].progress.best_stars, 2);
        assert!(statuses[1].progress.unlocked);
        assert!(!statuses[2].progress.unlocked);
    }

    proptest! {
        #[test]
        fn prop_saves_are_monotonic(
            saves in prop::collection::vec((0usize..15, 1u8..=3, 0u32..10, 0u32..45), 1..40)
        ) {
            let t = tracker();
            let all = stages::get_all_stages();
            let mut before = t.load_progress();
            for (idx, stars, crashes, orbs) in saves {
                let stage = &all[idx];
                t.save_progress(stage.id, stars, crashes, orbs.min(stage.total_orbs), stage.total_orbs);
                let after = t.load_progress();
                for (id, old) in &before.stage_progress {
                    let new = &after.stage_progress[id];
                    prop_assert!(new.best_stars >= old.best_stars);
                    prop_assert!(new.completed || !old.completed);
                    prop_assert!(new.unlocked || !old.unlocked);
                }
                let sum: u32 = after.stage_progress.values().map(|r| u32::from(r.best_stars)).sum();
                prop_assert_eq!(after.total_stars, sum);
                prop_assert!(after.unlocked_rewards.len() >= before.unlocked_rewards.len());
                before = after;
            }
        }
    }
}
