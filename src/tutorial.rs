//! Tutorial-seen flags, one per stage

use std::collections::BTreeMap;

use crate::consts::TUTORIALS_KEY;
use crate::persistence::KeyValueStore;

/// Which stages have already shown their tutorial overlay
#[derive(Debug, Clone)]
pub struct TutorialFlags<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> TutorialFlags<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    fn load(&self) -> BTreeMap<String, bool> {
        self.storage.get_json_or(TUTORIALS_KEY, BTreeMap::new())
    }

    pub fn has_seen(&self, stage_id: &str) -> bool {
        self.load().get(stage_id).copied().unwrap_or(false)
    }

    pub fn mark_seen(&self, stage_id: &str) {
        let mut flags = self.load();
        flags.insert(stage_id.to_string(), true);
        if let Err(e) = self.storage.set_json(TUTORIALS_KEY, &flags) {
            log::error!("Failed to save tutorial flags: {}", e);
        }
    }

    pub fn reset(&self) {
        self.storage.remove(TUTORIALS_KEY);
    }
}
