//! Configuration loading and management
//!
//! Handles parsing of the optional `config.toml`. Resolution order for the
//! config file:
//! 1) CLI --config (explicit)
//! 2) ACTS_CONFIG environment variable
//! 3) `<platform config dir>/acts/config.toml`
//!
//! Resolution order for the log file:
//! 1) CLI --log-file (explicit)
//! 2) ACTS_LOGFILE environment variable
//! 3) `log_file` from the config
//! 4) `logfile.txt` in the current directory

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::DEFAULT_LOG_FILE;

pub const CONFIG_ENV: &str = "ACTS_CONFIG";
pub const LOGFILE_ENV: &str = "ACTS_LOGFILE";
pub const CONFIG_FILENAME: &str = "config.toml";
pub const DEFAULT_TIMEZONE: &str = "Australia/Melbourne";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// IANA zone all activity timestamps are read and written in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Grep configuration
    #[serde(default)]
    pub grep: GrepConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: None,
            timezone: default_timezone(),
            grep: GrepConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

/// Grep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrepConfig {
    /// Literal text placed in front of every search pattern
    #[serde(default = "default_pattern_wrap")]
    pub pattern_wrap: String,
}

fn default_pattern_wrap() -> String {
    "(".to_string()
}

impl Default for GrepConfig {
    fn default() -> Self {
        Self {
            pattern_wrap: default_pattern_wrap(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Highlight short ids when writing to a terminal
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults when it is missing
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The reference timezone
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|err| {
            Error::InvalidConfig(format!("unknown timezone '{}': {err}", self.timezone))
        })
    }

    fn validate(&self) -> Result<()> {
        self.timezone()?;
        if let Some(path) = &self.log_file {
            if path.as_os_str().is_empty() {
                return Err(Error::InvalidConfig("log_file cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Platform default config path, if a home directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "acts").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Resolve the config file path using CLI, environment and platform default.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path.filter(|path| !path.as_os_str().is_empty()) {
        return Some(path.to_path_buf());
    }
    if let Some(path) = non_empty_env(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    default_config_path()
}

/// Resolve the log file path using CLI, environment, config and default.
pub fn resolve_log_path(cli_path: Option<&Path>, config: &Config) -> PathBuf {
    if let Some(path) = cli_path.filter(|path| !path.as_os_str().is_empty()) {
        return path.to_path_buf();
    }
    if let Some(path) = non_empty_env(LOGFILE_ENV) {
        return PathBuf::from(path);
    }
    config
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
