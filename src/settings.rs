//! Session configuration
//!
//! Everything that used to be a scattered debug branch lives here and is
//! consumed once when a session is created.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Session flags for a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Offer the whole catalog on every level-up instead of one per category
    pub dev_mode: bool,
    /// Begin at this level; `start_level - 1` upgrade picks are pre-seeded
    pub start_level: u32,
    /// Spawn invincible practice targets instead of the normal field
    pub sandbox: bool,
    /// Run seed for the session RNG
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            start_level: 1,
            sandbox: false,
            seed: 0x5eed,
        }
    }
}

impl SimConfig {
    /// Default config with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON config; missing keys use defaults
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.start_level == 0 {
            return Err(SimError::InvalidStartLevel(self.start_level));
        }
        Ok(())
    }

    /// Upgrade picks owed before play begins
    pub fn seeded_picks(&self) -> u32 {
        self.start_level.saturating_sub(1)
    }
}
