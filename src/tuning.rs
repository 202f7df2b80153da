//! Data-driven engine defaults
//!
//! Every fresh level starts from these values plus level scaling. Loaded from
//! JSON so balance can be adjusted without rebuilding; missing fields keep
//! their defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Engine defaults and per-level scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Viewport ===
    /// Default viewport width before the first resize
    pub width: f32,
    /// Default viewport height before the first resize
    pub height: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    /// Horizontal speed set by a move intent (units/s)
    pub player_speed: f32,
    /// Upward speed given by a jump (units/s)
    pub jump_force: f32,
    pub player_health: f32,

    // === World ===
    pub gravity: f32,

    // === Rewind ===
    /// Energy at the start of a level
    pub rewind_energy: f32,
    pub max_rewind_energy: f32,
    /// Energy regained per second while not rewinding
    pub rewind_recharge_rate: f32,
    /// Snapshots kept for rewinding (about two seconds at 60 Hz)
    pub max_history_length: usize,

    // === Level scaling ===
    pub gravity_per_level: f32,
    pub max_energy_per_level: f32,
    pub recharge_per_level: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,

            player_width: 30.0,
            player_height: 50.0,
            player_speed: 300.0,
            jump_force: 350.0,
            player_health: 100.0,

            gravity: 600.0,

            rewind_energy: 100.0,
            max_rewind_energy: 100.0,
            rewind_recharge_rate: 20.0,
            max_history_length: 120,

            gravity_per_level: 5.0,
            max_energy_per_level: 5.0,
            recharge_per_level: 0.2,
        }
    }
}

impl Tuning {
    /// Parse a JSON document, filling gaps with defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a JSON tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(TuningError::Invalid("viewport dimensions must be positive"));
        }
        if self.player_width <= 0.0 || self.player_height <= 0.0 {
            return Err(TuningError::Invalid("player size must be positive"));
        }
        if self.max_history_length == 0 {
            return Err(TuningError::Invalid("history length must be at least 1"));
        }
        if self.max_rewind_energy <= 0.0 || self.rewind_energy < 0.0 {
            return Err(TuningError::Invalid("rewind energy must be non-negative"));
        }
        if self.rewind_recharge_rate < 0.0
            || self.gravity_per_level < 0.0
            || self.max_energy_per_level < 0.0
            || self.recharge_per_level < 0.0
        {
            return Err(TuningError::Invalid("rates must be non-negative"));
        }
        Ok(())
    }

    pub fn player_size(&self) -> Vec2 {
        Vec2::new(self.player_width, self.player_height)
    }

    /// Gravity for a level (harder levels fall faster)
    pub fn gravity_for_level(&self, level: u32) -> f32 {
        self.gravity + level as f32 * self.gravity_per_level
    }

    pub fn max_energy_for_level(&self, level: u32) -> f32 {
        self.max_rewind_energy + level as f32 * self.max_energy_per_level
    }

    pub fn recharge_rate_for_level(&self, level: u32) -> f32 {
        self.rewind_recharge_rate + level as f32 * self.recharge_per_level
    }
}
