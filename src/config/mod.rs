//! Configuration loading and validation
//!
//! Configuration is read from a TOML file; every section and field has a
//! default so a partial file (or no file at all) yields a usable setup.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

/// Allowed refresh intervals in seconds
pub const INTERVAL_RANGE: RangeInclusive<u64> = 1..=10;

/// Allowed history capacities
pub const HISTORY_RANGE: RangeInclusive<usize> = 50..=500;

/// Timeout applied to every outbound HTTP call unless overridden
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 3;

/// Where samples come from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Locally generated readings, for testing without hardware
    Synthetic,
    /// Readings fetched from the sensor's HTTP endpoint
    Remote,
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub synthetic: SyntheticConfig,
    pub polling: PollingConfig,
    pub history: HistoryConfig,
    pub report: ReportConfig,
    pub notify: NotifyConfig,
}

/// Where samples come from and how the sensor is reached
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub mode: SourceMode,
    /// Sensor endpoint queried in remote mode
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::Remote,
            url: "http://192.168.0.102/api".to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Simulation parameters for synthetic mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Chance that a reading is replaced by an out-of-range value
    pub abnormal_probability: f64,
    /// Chance that a reading reports a finger on the probe
    pub finger_detected_probability: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            abnormal_probability: 0.2,
            finger_detected_probability: 0.7,
        }
    }
}

/// Poll loop timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between cycles, within [`INTERVAL_RANGE`]
    pub interval_seconds: u64,
    /// Stop after this many cycles; run until interrupted when unset
    pub max_cycles: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 2,
            max_cycles: None,
        }
    }
}

impl PollingConfig {
    /// The delay between cycles as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// History buffer sizing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Samples kept before the oldest is evicted, within [`HISTORY_RANGE`]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Report presentation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Name printed in the report header; "Not specified" when unset
    pub patient_name: Option<String>,
}

/// Telegram bot settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifyConfig {
    pub bot_token: Option<String>,
    /// Destination chat for reports
    pub chat_id: Option<String>,
    /// Bot API root, overridable for self-hosted gateways
    pub api_base: String,
    pub timeout_seconds: u64,
    /// Cap on periodic reports per minute; 0 removes the cap
    pub max_reports_per_minute: usize,
    /// Push a report automatically every N cycles
    pub report_every_cycles: Option<u64>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_reports_per_minute: 3,
            report_every_cycles: None,
        }
    }
}

impl NotifyConfig {
    /// Token and chat id, if both are present and non-blank
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.bot_token.as_deref().map(str::trim)?;
        let chat_id = self.chat_id.as_deref().map(str::trim)?;
        if token.is_empty() || chat_id.is_empty() {
            None
        } else {
            Some((token, chat_id))
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML for this schema and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.mode == SourceMode::Remote && self.source.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "remote mode requires a sensor endpoint URL (source.url)".to_string(),
            ));
        }

        if self.source.timeout_seconds == 0 || self.notify.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be at least 1 second".to_string(),
            ));
        }

        if !INTERVAL_RANGE.contains(&self.polling.interval_seconds) {
            return Err(ConfigError::ValidationError(format!(
                "polling.interval_seconds must be within {}..={}, got {}",
                INTERVAL_RANGE.start(),
                INTERVAL_RANGE.end(),
                self.polling.interval_seconds
            )));
        }

        if self.polling.max_cycles == Some(0) {
            return Err(ConfigError::ValidationError(
                "polling.max_cycles must be greater than 0".to_string(),
            ));
        }

        if !HISTORY_RANGE.contains(&self.history.capacity) {
            return Err(ConfigError::ValidationError(format!(
                "history.capacity must be within {}..={}, got {}",
                HISTORY_RANGE.start(),
                HISTORY_RANGE.end(),
                self.history.capacity
            )));
        }

        for (name, value) in [
            ("abnormal_probability", self.synthetic.abnormal_probability),
            (
                "finger_detected_probability",
                self.synthetic.finger_detected_probability,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "synthetic.{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }

        match self.notify.report_every_cycles {
            Some(0) => {
                return Err(ConfigError::ValidationError(
                    "notify.report_every_cycles must be greater than 0".to_string(),
                ))
            }
            Some(_) if self.notify.credentials().is_none() => {
                return Err(ConfigError::ValidationError(
                    "periodic reports require notify.bot_token and notify.chat_id".to_string(),
                ))
            }
            _ => {}
        }

        Ok(())
    }
}
