//! Engine Configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hard ceiling on a single gift-day grant. `max_gift_days` may lower it.
pub const GIFT_DAYS_CEILING: u32 = 365;

/// How much time an unfreeze credits back onto the expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezeCreditPolicy {
    /// Whole days actually spent frozen
    #[default]
    ElapsedTime,
    /// The planned freeze duration, even on early unfreeze
    PlannedDuration,
}

/// Lifecycle engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Freeze credit policy applied at unfreeze
    pub freeze_credit_policy: FreezeCreditPolicy,
    /// Largest single gift-day grant, at most [`GIFT_DAYS_CEILING`]
    pub max_gift_days: u32,
    /// Window length used for lifetime plans
    pub lifetime_horizon_years: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            freeze_credit_policy: FreezeCreditPolicy::ElapsedTime,
            max_gift_days: GIFT_DAYS_CEILING,
            lifetime_horizon_years: 100,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_gift_days == 0 {
            return Err(ConfigError::Invalid("max_gift_days must be at least 1".into()));
        }
        if self.max_gift_days > GIFT_DAYS_CEILING {
            return Err(ConfigError::Invalid(format!(
                "max_gift_days must not exceed {}",
                GIFT_DAYS_CEILING
            )));
        }
        if self.lifetime_horizon_years == 0 {
            return Err(ConfigError::Invalid(
                "lifetime_horizon_years must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
