//! Game settings and preferences
//!
//! Supplied by the host page as JSON; nothing is persisted between sessions.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Difficulty;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty preselected before the first session
    pub difficulty: Difficulty,

    // === Panel ===
    pub panel_width: f32,
    pub panel_height: f32,

    // === Gameplay ===
    /// How long a time-freeze holds targets in place
    pub freeze_duration_ms: u64,
    /// Misses and expiries also reset the combo
    pub combo_resets_on_life_loss: bool,

    // === Visual Effects ===
    /// Laser trail fade-out
    pub laser_fade_ms: u64,

    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Background tracks offered by the song picker
    pub songs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            panel_width: DEFAULT_PANEL_WIDTH,
            panel_height: DEFAULT_PANEL_HEIGHT,

            freeze_duration_ms: DEFAULT_FREEZE_MS,
            combo_resets_on_life_loss: false,

            laser_fade_ms: DEFAULT_LASER_FADE_MS,

            music_volume: 0.7,
            songs: vec!["music/theme.mp3".to_string()],
        }
    }
}

impl Settings {
    /// Parse settings, filling omitted fields with defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.music_volume = settings.music_volume.clamp(0.0, 1.0);
        settings.panel_width = settings.panel_width.max(TARGET_SIZE * 2.0);
        settings.panel_height = settings.panel_height.max(TARGET_SIZE * 2.0);
        Ok(settings)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
