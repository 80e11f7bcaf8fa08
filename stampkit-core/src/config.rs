//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/stampkit/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/stampkit/` (~/.config/stampkit/)
//! - State/Logs: `$XDG_STATE_HOME/stampkit/` (~/.local/state/stampkit/)

use crate::error::{Error, Result};
use crate::format::{Zone, DEFAULT_FORMAT, HOUR_MS};
use crate::settings::SettingsProvider;
use serde::Deserialize;
use std::path::PathBuf;

/// Threshold used when none (or a non-positive one) is configured.
pub const DEFAULT_THRESHOLD_HOURS: u32 = 24;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Timestamp rendering
    #[serde(default)]
    pub timestamps: TimestampConfig,

    /// Zone timestamps are rendered in
    #[serde(default)]
    pub locale: LocaleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How timestamps are displayed
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TimestampConfig {
    /// `SimpleDateFormat`-style pattern for absolute timestamps
    #[serde(default = "default_format")]
    pub format: String,

    /// Show recent messages as "5m ago"
    #[serde(default = "default_true")]
    pub use_relative_time: bool,

    /// Hours below which a timestamp is shown as relative time
    #[serde(default = "default_threshold_hours")]
    pub relative_time_threshold: u32,

    /// Recompute labels younger than an hour on every render
    #[serde(default = "default_true")]
    pub real_time_updates: bool,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            use_relative_time: true,
            relative_time_threshold: default_threshold_hours(),
            real_time_updates: true,
        }
    }
}

impl TimestampConfig {
    /// Settings key for the absolute format pattern
    pub const FORMAT_KEY: &'static str = "format";
    /// Settings key for the relative time toggle
    pub const USE_RELATIVE_TIME_KEY: &'static str = "useRelativeTime";
    /// Settings key for the threshold in hours
    pub const THRESHOLD_KEY: &'static str = "relativeTimeThreshold";
    /// Settings key for the real-time update toggle
    pub const REAL_TIME_UPDATES_KEY: &'static str = "realTimeUpdates";

    /// Read the configuration from an external settings store.
    ///
    /// A non-positive threshold falls back to [`DEFAULT_THRESHOLD_HOURS`].
    pub fn from_settings(settings: &dyn SettingsProvider) -> Self {
        let threshold = settings.get_int(Self::THRESHOLD_KEY, DEFAULT_THRESHOLD_HOURS.into());
        let relative_time_threshold = u32::try_from(threshold)
            .ok()
            .filter(|hours| *hours > 0)
            .unwrap_or(DEFAULT_THRESHOLD_HOURS);

        Self {
            format: settings.get_string(Self::FORMAT_KEY, DEFAULT_FORMAT),
            use_relative_time: settings.get_bool(Self::USE_RELATIVE_TIME_KEY, true),
            relative_time_threshold,
            real_time_updates: settings.get_bool(Self::REAL_TIME_UPDATES_KEY, true),
        }
    }

    /// Threshold converted to milliseconds
    pub fn threshold_millis(&self) -> u64 {
        u64::from(self.relative_time_threshold) * HOUR_MS
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.relative_time_threshold == 0 {
            return Err(Error::Config(
                "timestamps.relative_time_threshold must be at least 1 hour".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse threshold input the way the settings page does: anything that is not
/// a number means the default, and non-positive numbers are rejected.
pub fn parse_threshold_hours(input: &str) -> Option<u32> {
    let hours = input
        .trim()
        .parse::<i64>()
        .unwrap_or(DEFAULT_THRESHOLD_HOURS.into());
    u32::try_from(hours).ok().filter(|hours| *hours > 0)
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_threshold_hours() -> u32 {
    DEFAULT_THRESHOLD_HOURS
}

/// Locale configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    /// `local`, `utc`, or a fixed offset like `+02:00`
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl LocaleConfig {
    pub fn zone(&self) -> Result<Zone> {
        self.timezone.parse()
    }
}

fn default_timezone() -> String {
    "local".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.timestamps.validate()?;
        self.locale.zone()?;
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/stampkit/config.toml` (~/.config/stampkit/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("stampkit").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/stampkit/` (~/.local/state/stampkit/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("stampkit")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/stampkit/stampkit.log` (~/.local/state/stampkit/stampkit.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("stampkit.log")
    }
}
