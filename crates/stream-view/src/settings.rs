use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::media::test_pattern::PatternConfig;
use crate::view::{ClearColor, ColorSpace, GravityMode, PresentOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub version: u32,
    pub video_gravity: GravityMode,
    pub clear_color: ClearColor,
    pub color_space: ColorSpace,
    pub pattern: PatternConfig,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            version: 1,
            video_gravity: GravityMode::default(),
            clear_color: ClearColor::default(),
            color_space: ColorSpace::default(),
            pattern: PatternConfig::default(),
        }
    }
}

impl ViewSettings {
    /// `<config_dir>/stream-view/settings.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stream-view").join("settings.json"))
    }

    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Missing or unreadable files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            log::warn!("Failed to save settings to {}: {e}", path.display());
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn present_options(&self) -> PresentOptions {
        PresentOptions {
            video_gravity: self.video_gravity,
            clear_color: self.clear_color,
            color_space: self.color_space,
        }
    }
}
