//! Game settings
//!
//! Loaded once at startup and validated before any run is created.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::CRAFT_START_FROM_BOTTOM;
use crate::error::SettingsError;

/// Play-field and control settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Play-field width (units). Obstacles spawn anywhere in `[0, width]`.
    pub field_width: f32,
    /// Play-field height (units)
    pub field_height: f32,
    /// Craft move speed; per-tick displacement is `move_speed * dt_ms / 2000`
    pub move_speed: f64,
    /// Seed for the obstacle spawner; each new run offsets it by the run number
    pub seed: u64,
    /// Where the leaderboard is stored
    pub leaderboard_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_width: 480.0,
            field_height: 800.0,
            move_speed: 600.0,
            seed: 0x5eed,
            leaderboard_path: PathBuf::from("leaderboard.json"),
        }
    }
}

impl Settings {
    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.field_width.is_finite() || self.field_width <= 0.0 {
            return Err(SettingsError::InvalidFieldWidth(self.field_width));
        }
        if !self.field_height.is_finite() || self.field_height <= 0.0 {
            return Err(SettingsError::InvalidFieldHeight(self.field_height));
        }
        if !self.move_speed.is_finite() || self.move_speed <= 0.0 {
            return Err(SettingsError::InvalidMoveSpeed(self.move_speed));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Where the craft starts and respawns
    pub fn craft_start(&self) -> Vec2 {
        Vec2::new(
            self.field_width / 2.0,
            self.field_height - CRAFT_START_FROM_BOTTOM,
        )
    }
}
