//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `cozyhub.toml` in the working directory (or the path in
//! `COZYHUB_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use cozyhub_adapter_cozylife_tcp::TcpDeviceConfig;
use cozyhub_app::services::poller::DEFAULT_POLL_INTERVAL;
use cozyhub_app::services::switch_adapter::DEFAULT_UPDATE_INTERVAL;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Polling and refresh cadence.
    pub polling: PollingConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
    /// CozyLife devices reached over TCP.
    pub devices: Vec<TcpDeviceConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Polling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// How often the poller calls each switch's update hook, in seconds.
    pub poll_interval_secs: u64,
    /// Minimum time between two queries to the same device, in seconds.
    pub update_interval_secs: u64,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Enable the virtual/demo devices.
    pub virtual_enabled: bool,
}

impl Config {
    /// Load configuration from `cozyhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("COZYHUB_CONFIG").unwrap_or_else(|_| "cozyhub.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("COZYHUB_POLL_INTERVAL_SECS") {
            if let Ok(secs) = val.parse() {
                self.polling.poll_interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("COZYHUB_UPDATE_INTERVAL_SECS") {
            if let Ok(secs) = val.parse() {
                self.polling.update_interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("COZYHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.polling.update_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "update_interval_secs must be non-zero".to_string(),
            ));
        }
        for (idx, device) in self.devices.iter().enumerate() {
            if device.host.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "devices[{idx}].host must not be empty"
                )));
            }
            if device.timeout_ms == 0 {
                return Err(ConfigError::Validation(format!(
                    "devices[{idx}].timeout_ms must be non-zero"
                )));
            }
        }
        Ok(())
    }
}

impl PollingConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "cozyhubd=info,cozyhub=info".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            update_interval_secs: DEFAULT_UPDATE_INTERVAL.as_secs(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
