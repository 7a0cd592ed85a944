//! Simulation tuning
//!
//! Every constant the tick pipeline consults lives here so balance changes
//! don't need a rebuild. Loaded from JSON; missing fields fall back to the
//! defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its valid range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Scoring and damage rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTuning {
    /// Score awarded when the player collects a pickup
    pub pickup_score: u64,
    /// Score awarded when a projectile destroys an enemy
    pub kill_score: u64,
    /// Hit points lost per tick of player/enemy contact
    pub contact_damage: i32,
}

impl Default for RuleTuning {
    fn default() -> Self {
        Self {
            pickup_score: PICKUP_SCORE,
            kill_score: KILL_SCORE,
            contact_damage: CONTACT_DAMAGE,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed tick rate (Hz)
    pub tick_hz: f32,
    /// Frame deltas above this are clamped before accumulation (seconds)
    pub max_frame_dt: f64,
    /// Spatial hash cell edge length
    pub cell_size: f32,
    /// Half the side length of the square arena (0 disables walls)
    pub arena_half_extent: f32,
    /// Starting hit points
    pub max_hp: i32,
    pub rules: RuleTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            max_frame_dt: MAX_FRAME_DT,
            cell_size: DEFAULT_CELL_SIZE,
            arena_half_extent: 20.0,
            max_hp: MAX_HP,
            rules: RuleTuning::default(),
        }
    }
}

impl SimConfig {
    /// Fixed step length in seconds
    pub fn step(&self) -> f32 {
        1.0 / self.tick_hz
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Load from a file, falling back to defaults (logged) on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default simulation config: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_hz > 0.0) {
            return Err(ConfigError::Invalid {
                field: "tick_hz",
                reason: "must be positive",
            });
        }
        if !(self.max_frame_dt > 0.0) {
            return Err(ConfigError::Invalid {
                field: "max_frame_dt",
                reason: "must be positive",
            });
        }
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "cell_size",
                reason: "must be positive",
            });
        }
        if self.arena_half_extent < 0.0 {
            return Err(ConfigError::Invalid {
                field: "arena_half_extent",
                reason: "must not be negative",
            });
        }
        if self.max_hp <= 0 {
            return Err(ConfigError::Invalid {
                field: "max_hp",
                reason: "must be positive",
            });
        }
        if self.rules.contact_damage < 0 {
            return Err(ConfigError::Invalid {
                field: "rules.contact_damage",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}
