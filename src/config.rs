use std::path::Path;

use crate::ai::AgentConfig;
use crate::checkpoint::TableStoreConfig;
use crate::error::ConfigError;
use crate::training::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub training: TrainerConfig,
    pub store: TableStoreConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!("Warning: config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.agent.alpha > 0.0 && self.agent.alpha <= 1.0) {
            return Err(ConfigError::Validation(
                "agent.alpha must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.agent.gamma) {
            return Err(ConfigError::Validation(
                "agent.gamma must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.agent.epsilon) {
            return Err(ConfigError::Validation(
                "agent.epsilon must be in [0, 1]".into(),
            ));
        }
        if self.training.num_episodes == 0 {
            return Err(ConfigError::Validation(
                "training.num_episodes must be > 0".into(),
            ));
        }
        if self.training.progress_interval == 0 {
            return Err(ConfigError::Validation(
                "training.progress_interval must be > 0".into(),
            ));
        }
        if self.training.seed.is_some_and(|seed| seed > i64::MAX as u64) {
            return Err(ConfigError::Validation(
                "training.seed must be at most i64::MAX".into(),
            ));
        }
        if self.store.table_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "store.table_dir must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&AppConfig::default())?)
    }
}
