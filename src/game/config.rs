//! Session configuration, supplied as JSON by the page at startup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::state::DEFAULT_ROUND_TIME;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid game config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("round_time_secs must be at least 1")]
    ZeroRoundTime,

    #[error("tick_interval_ms must be at least 1")]
    ZeroTickInterval,
}

/// Tunables for one game session. Missing JSON fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds on the clock at the start of each round.
    pub round_time_secs: u32,
    /// Period of the countdown timer. One tick removes one second.
    pub tick_interval_ms: u32,
    /// Permit `add_new_player` after round 0.
    pub allow_late_players: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_time_secs: DEFAULT_ROUND_TIME,
            tick_interval_ms: 1000,
            allow_late_players: false,
        }
    }
}

impl GameConfig {
    /// Parse and validate. An empty (or whitespace) string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_time_secs == 0 {
            return Err(ConfigError::ZeroRoundTime);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms))
    }
}
