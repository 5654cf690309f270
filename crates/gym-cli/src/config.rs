//! CLI Configuration

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use gym_membership::{ConfigError, EngineConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

const CONFIG_DIR: &str = ".gymctl";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON state file; defaults to ~/.gymctl/state.json
    pub state_file: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("cannot find home directory")?;
        Ok(home.join(CONFIG_DIR).join("config.toml"))
    }

    pub fn state_file(&self) -> PathBuf {
        match &self.state_file {
            Some(path) => path.clone(),
            None => dirs::home_dir()
                .map(|home| home.join(CONFIG_DIR).join("state.json"))
                .unwrap_or_else(|| PathBuf::from("gymctl-state.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gym_membership::FreezeCreditPolicy;

    #[test]
    fn test_parse_engine_section() {
        let config = Config::from_toml(
            r#"
            state_file = "/var/lib/gymctl/state.json"

            [engine]
            freeze_credit_policy = "planned_duration"
            max_gift_days = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.state_file(), PathBuf::from("/var/lib/gymctl/state.json"));
        assert_eq!(config.engine.freeze_credit_policy, FreezeCreditPolicy::PlannedDuration);
        assert_eq!(config.engine.max_gift_days, 30);
        assert_eq!(config.engine.lifetime_horizon_years, 100);
    }

    #[test]
    fn test_invalid_engine_rejected() {
        let err = Config::from_toml("[engine]\nmax_gift_days = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/gymctl/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let path = std::env::temp_dir()
            .join(format!("gymctl-config-{}", std::process::id()))
            .join("config.toml");
        let config = Config {
            state_file: Some(PathBuf::from("state.json")),
            engine: EngineConfig::default(),
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
