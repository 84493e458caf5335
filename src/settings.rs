//! Game settings and preferences
//!
//! Persisted separately from stage progress.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::persistence::KeyValueStore;

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Full-screen flash on stage clear
    pub screen_flash: bool,
    /// Show the tutorial overlay the first time a stage is played
    pub show_tutorials: bool,
    /// Vibrate on stage clear (mobile)
    pub haptics: bool,
    /// Reduced motion (no flashes or vibration)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_flash: true,
            show_tutorials: true,
            haptics: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen flash (respects reduced_motion)
    pub fn effective_screen_flash(&self) -> bool {
        self.screen_flash && !self.reduced_motion
    }

    /// Effective haptics (respects reduced_motion)
    pub fn effective_haptics(&self) -> bool {
        self.haptics && !self.reduced_motion
    }

    /// Load settings, falling back to defaults
    pub fn load<S: KeyValueStore>(storage: &S) -> Self {
        match storage.get_json(SETTINGS_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore>(&self, storage: &S) {
        match storage.set_json(SETTINGS_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::error!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_reduced_motion_disables_flash() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_flash());
        settings.reduced_motion = true;
        assert!(!settings.effective_screen_flash());
    }

    #[test]
    fn test_reduced_motion_disables_haptics() {
        let mut settings = Settings::default();
        assert!(settings.effective_haptics());
        settings.reduced_motion = true;
        assert!(!settings.effective_haptics());
        settings.reduced_motion = false;
        settings.haptics = false;
        assert!(!settings.effective_haptics());
    }

    #[test]
    fn test_round_trip_and_partial_json() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());

        let settings = Settings {
            haptics: false,
            screen_flash: false,
            ..Settings::default()
        };
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);

        // Missing fields default, unknown ones are ignored
        store
            .set_item(SETTINGS_KEY, r#"{"reduced_motion": true, "master_volume": 0.5}"#)
            .unwrap();
        let loaded = Settings::load(&store);
        assert!(loaded.reduced_motion);
        assert!(loaded.show_tutorials);
    }
}
