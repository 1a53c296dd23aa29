//! Player settings and preferences
//!
//! Persisted separately from high scores, as one JSON value under
//! [`SETTINGS_KEY`](crate::consts::SETTINGS_KEY).

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::platform::KeyValueStore;
use crate::tuning::{Difficulty, PaletteKind, PatternKind};

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    pub sound_enabled: bool,
    /// Cue volume (0.0 - 1.0)
    pub volume: f32,

    // === Per-game choices made on the menu screen ===
    pub pong_difficulty: Difficulty,
    pub rhythm_pattern: PatternKind,
    pub color_palette: PaletteKind,

    /// Pause when the window loses focus or visibility
    pub auto_pause_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            volume: 0.1,
            pong_difficulty: Difficulty::Medium,
            rhythm_pattern: PatternKind::Calm,
            color_palette: PaletteKind::Calm,
            auto_pause_on_blur: true,
        }
    }
}

impl Settings {
    /// Volume actually handed to the audio sink
    pub fn effective_volume(&self) -> f32 {
        if self.sound_enabled {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Load from storage, falling back to defaults on missing or corrupt data
    pub fn load<S: KeyValueStore + ?Sized>(storage: &S) -> Self {
        match storage.get(SETTINGS_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    settings
                }
                Err(e) => {
                    log::warn!("Stored settings are corrupt ({e}), using defaults");
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read settings: {e}");
                Self::default()
            }
        }
    }

    /// Save to storage. Failures are logged; returns whether the write landed.
    pub fn save<S: KeyValueStore + ?Sized>(&self, storage: &mut S) -> bool {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not serialize settings: {e}");
                return false;
            }
        };
        match storage.set(SETTINGS_KEY, &json) {
            Ok(()) => {
                log::info!("Settings saved");
                true
            }
            Err(e) => {
                log::warn!("Settings not saved: {e}");
                false
            }
        }
    }
}
