//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `pkone.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use pkone_app::watchdog::BOARD_TIMEOUT;
use pkone_domain::board::ExpansionBoard;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform timing and buffering.
    pub platform: PlatformConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Extension boards on the chain, in discovery order.
    #[serde(rename = "extension")]
    pub extensions: Vec<ExpansionBoard>,
    /// Lightshow boards on the chain.
    #[serde(rename = "lightshow")]
    pub lightshows: Vec<ExpansionBoard>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Heartbeat period in milliseconds.
    pub watchdog_period_ms: u64,
    /// Switch events buffered per subscriber.
    pub event_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `pkone.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("pkone.toml")?;
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
        if let Ok(val) = std::env::var("PKONE_WATCHDOG_MS")
            && let Ok(period) = val.parse()
        {
            self.platform.watchdog_period_ms = period;
        }
        if let Ok(val) = std::env::var("PKONE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let period = self.watchdog_period();
        if period.is_zero() {
            return Err(ConfigError::Validation(
                "watchdog_period_ms must be non-zero".to_string(),
            ));
        }
        if period >= BOARD_TIMEOUT {
            return Err(ConfigError::Validation(format!(
                "watchdog_period_ms must be below {} ms",
                BOARD_TIMEOUT.as_millis()
            )));
        }
        if self.platform.event_capacity == 0 {
            return Err(ConfigError::Validation(
                "event_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn watchdog_period(&self) -> Duration {
        Duration::from_millis(self.platform.watchdog_period_ms)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            watchdog_period_ms: 500,
            event_capacity: 256,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "pkoned=info,pkone=info".to_string(),
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
