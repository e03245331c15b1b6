//! Configuration file support for plansync.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/plansync/config.toml`.

use crate::report::write_atomic;
use crate::scheduler::SchedulerOptions;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Remote platform connection settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding an already-issued bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Retry and pacing parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_backoff_step_secs")]
    pub backoff_step_secs: u64,

    #[serde(default = "default_session_delay_ms")]
    pub session_delay_ms: u64,

    #[serde(default = "default_validation_delay_ms")]
    pub validation_delay_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            backoff_step_secs: default_backoff_step_secs(),
            session_delay_ms: default_session_delay_ms(),
            validation_delay_ms: default_validation_delay_ms(),
        }
    }
}

impl SchedulerConfig {
    pub fn options(&self) -> SchedulerOptions {
        SchedulerOptions {
            retry_attempts: self.retry_attempts,
            backoff_step: Duration::from_secs(self.backoff_step_secs),
            session_delay: Duration::from_millis(self.session_delay_ms),
            validation_delay: Duration::from_millis(self.validation_delay_ms),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://connectapi.garmin.com".into()
}

fn default_token_env() -> String {
    "GARMIN_CONNECT_TOKEN".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_backoff_step_secs() -> u64 {
    2
}

fn default_session_delay_ms() -> u64 {
    500
}

fn default_validation_delay_ms() -> u64 {
    200
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"));
        base.join("plansync").join("config.toml")
    }

    /// Reject settings the scheduler cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.retry_attempts == 0 {
            return Err(Error::Config(
                "scheduler.retry_attempts must be at least 1".into(),
            ));
        }
        if self.remote.token_env.trim().is_empty() {
            return Err(Error::Config("remote.token_env must not be empty".into()));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        write_atomic(path, contents.as_bytes())?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.remote.base_url, "https://connectapi.garmin.com");
        assert_eq!(config.remote.token_env, "GARMIN_CONNECT_TOKEN");
        assert_eq!(config.scheduler.options(), SchedulerOptions::default());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.remote.timeout_secs = 5;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[scheduler]
session_delay_ms = 1500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.scheduler.options().session_delay,
            Duration::from_millis(1500)
        );
        assert_eq!(config.scheduler.retry_attempts, 3); // default
        assert_eq!(config.remote.timeout_secs, 30); // default
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scheduler]\nretry_attempts = 0\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
