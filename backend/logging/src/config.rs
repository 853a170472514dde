//! Logger configuration: defaults, functional options, and YAML loading.
//!
//! A config is resolved by starting from [`LoggerConfig::default`] and applying
//! each [`LogOption`] in order, so a later option overrides an earlier one.
//! Nothing is validated here. A misspelled level resolves to `Info` when the
//! logger is built, and an unwritable path only fails on the first write.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LoggerError;
use crate::level::Level;

/// Default log file, relative to the working directory.
pub const DEFAULT_FILE_PATH: &str = "./server.log";

/// Default size threshold before rotation, in megabytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// Default age after which rotated files are removed, in days.
pub const DEFAULT_MAX_AGE_DAYS: u64 = 7;

/// Default minimum level name.
pub const DEFAULT_LEVEL: &str = "debug";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    /// Active log file. Its directory must already exist.
    pub file_path: PathBuf,
    /// Rotate once the active file would grow past this many megabytes.
    pub max_size_mb: u64,
    /// Rotated files older than this many days are removed. 0 keeps them forever.
    pub max_age_days: u64,
    /// Minimum level name, see [`Level::from_name`].
    pub level: String,
    /// Written under the `N` key of every record when set.
    pub name: Option<String>,
    /// Keep at most this many rotated files. 0 keeps them all.
    pub max_backups: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            level: DEFAULT_LEVEL.to_string(),
            name: None,
            max_backups: 0,
        }
    }
}

impl LoggerConfig {
    /// Defaults with every option applied in order.
    pub fn resolve<I>(options: I) -> Self
    where
        I: IntoIterator<Item = LogOption>,
    {
        apply_options(LoggerConfig::default(), options)
    }

    /// Minimum level this config resolves to.
    pub fn min_level(&self) -> Level {
        Level::from_name(&self.level)
    }
}

/// A single override applied to a [`LoggerConfig`].
pub struct LogOption(Box<dyn FnOnce(&mut LoggerConfig) + Send>);

impl LogOption {
    pub fn new(f: impl FnOnce(&mut LoggerConfig) + Send + 'static) -> Self {
        LogOption(Box::new(f))
    }

    pub fn apply(self, config: &mut LoggerConfig) {
        (self.0)(config)
    }
}

impl std::fmt::Debug for LogOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LogOption")
    }
}

pub fn with_file_path(path: impl Into<PathBuf>) -> LogOption {
    let path = path.into();
    LogOption::new(move |c| c.file_path = path)
}

pub fn with_max_size(megabytes: u64) -> LogOption {
    LogOption::new(move |c| c.max_size_mb = megabytes)
}

pub fn with_max_age(days: u64) -> LogOption {
    LogOption::new(move |c| c.max_age_days = days)
}

pub fn with_level(level: impl Into<String>) -> LogOption {
    let level = level.into();
    LogOption::new(move |c| c.level = level)
}

pub fn with_name(name: impl Into<String>) -> LogOption {
    let name = name.into();
    LogOption::new(move |c| c.name = Some(name))
}

pub fn with_max_backups(count: usize) -> LogOption {
    LogOption::new(move |c| c.max_backups = count)
}

/// Apply options on top of an existing config, in order.
pub fn apply_options<I>(mut config: LoggerConfig, options: I) -> LoggerConfig
where
    I: IntoIterator<Item = LogOption>,
{
    for option in options {
        option.apply(&mut config);
    }
    config
}

/// Load a YAML logger config. Missing keys take their defaults.
///
/// Returns `Ok(LoggerConfig::default())` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<LoggerConfig, LoggerError> {
    if !path.exists() {
        debug!(path = %path.display(), "Logger config does not exist; using defaults");
        return Ok(LoggerConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read logger config: {}", path.display()))?;

    let config = parse_config(&raw)
        .map_err(|e| LoggerError::Config(format!("{}: {e}", path.display())))?;

    info!(path = %path.display(), "Loaded logger config");
    Ok(config)
}

/// Parse a YAML logger config from a string.
pub fn parse_config(raw: &str) -> Result<LoggerConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(LoggerConfig::default());
    }
    serde_yaml::from_str(raw)
}
