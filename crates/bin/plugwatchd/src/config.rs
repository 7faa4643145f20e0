//! Configuration loading — TOML file with environment variable overrides.
//!
//! Every field has a sensible default except the device list, which must
//! name at least one plug. Per-device tunables (thresholds, debounce) live
//! in each device's persisted JSON document, not here; this file only holds
//! what the daemon needs to start.

use std::path::Path;

use serde::Deserialize;

use plugwatch_domain::state::{DeviceDocument, RecordKind, Urgency};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Poll pacing.
    pub poll: PollConfig,
    /// Monitored plugs.
    pub devices: Vec<DeviceConfig>,
    /// Telegram transport settings.
    pub telegram: TelegramConfig,
    /// Default urgencies seeded into fresh device documents.
    pub notifications: NotificationsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Poll loop pacing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between cycle starts.
    pub interval_secs: u64,
}

/// One monitored plug.
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    /// IP address or hostname, no scheme.
    pub host: String,
}

/// Telegram transport settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// File holding the bot token, so the token stays out of this file.
    pub token_file: String,
    /// Chat to deliver to.
    pub chat_id: String,
    /// Optional forum thread within the chat.
    pub thread_id: Option<String>,
}

/// Default per-event urgencies for fresh device documents.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Urgency of "started" messages.
    pub on: Urgency,
    /// Urgency of "off" messages.
    pub off: Urgency,
    /// Urgency of "done" messages and reminders.
    pub done: Urgency,
    /// Urgency of running-state messages (none are defined today).
    pub running: Urgency,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is malformed, or if
    /// validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PLUGWATCH_INTERVAL_SECS") {
            if let Ok(secs) = val.parse() {
                self.poll.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("PLUGWATCH_TOKEN_FILE") {
            self.telegram.token_file = val;
        }
        if let Ok(val) = std::env::var("PLUGWATCH_CHAT_ID") {
            self.telegram.chat_id = val;
        }
        if let Ok(val) = std::env::var("PLUGWATCH_THREAD_ID") {
            self.telegram.thread_id = Some(val);
        }
        if let Ok(val) = std::env::var("PLUGWATCH_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if self.devices.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[devices]] entry is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Pause between cycle starts.
    #[must_use]
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll.interval_secs)
    }

    /// Read and trim the bot token from the configured file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the token file cannot be read.
    pub fn read_token(&self) -> Result<String, ConfigError> {
        let token = std::fs::read_to_string(&self.telegram.token_file)?;
        Ok(token.trim().to_string())
    }

    /// Document used when a device has no persisted state yet, with the
    /// configured chat seeded into every record at its default urgency.
    #[must_use]
    pub fn document_template(&self) -> DeviceDocument {
        let mut doc = DeviceDocument::default();
        if self.telegram.chat_id.is_empty() {
            return doc;
        }
        let defaults = [
            (RecordKind::On, self.notifications.on),
            (RecordKind::Off, self.notifications.off),
            (RecordKind::Done, self.notifications.done),
            (RecordKind::Running, self.notifications.running),
        ];
        for (kind, urgency) in defaults {
            doc.record_mut(kind)
                .notification
                .insert(self.telegram.chat_id.clone(), urgency);
        }
        doc
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            on: Urgency::Muted,
            off: Urgency::Muted,
            done: Urgency::Alert,
            running: Urgency::Skip,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "plugwatchd=info,plugwatch=info".to_string(),
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
