//! Configuration handling for catalog-sync
//!
//! Configuration is read from `--config <path>`, then `$CATALOG_SYNC_CONFIG`,
//! then `~/.config/catalog-sync/config.toml` (or the platform equivalent).
//! Every section is optional; missing values fall back to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::source::Source;
use crate::domain::ExceptionRegistry;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "CATALOG_SYNC_CONFIG";

/// Upstream landscape document
pub const DEFAULT_LANDSCAPE: &str = "https://raw.githubusercontent.com/cncf/landscape/master/landscape.yml";

/// Upstream registry document
pub const DEFAULT_REGISTRY: &str = "https://raw.githubusercontent.com/cncf/devstats/master/projects.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Locations of the two catalogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub landscape: Source,
    pub registry: Source,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            landscape: default_source(DEFAULT_LANDSCAPE),
            registry: default_source(DEFAULT_REGISTRY),
        }
    }
}

fn default_source(raw: &str) -> Source {
    raw.parse().unwrap_or_else(|_| Source::Local(PathBuf::from(raw)))
}

/// Remote retrieval settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds; unset means no timeout
    pub timeout_secs: Option<u64>,
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Drift notification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Send notifications when drift is detected
    pub enabled: bool,

    /// Addressees; nothing is sent when empty
    pub recipients: Vec<String>,

    /// `From:` address
    pub sender: String,

    /// Subject line
    pub subject: String,

    /// sendmail-compatible command
    pub sendmail: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recipients: vec![],
            sender: "catalog-sync@localhost".to_string(),
            subject: "DevStats <=> landscape sync status".to_string(),
            sendmail: "sendmail".to_string(),
        }
    }
}

impl NotifyConfig {
    /// Replaces recipients from a comma-separated list
    pub fn set_recipients(&mut self, list: &str) {
        self.recipients = list
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();
    }

    /// True when a notification would actually be sent
    pub fn is_active(&self) -> bool {
        self.enabled && !self.recipients.is_empty()
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub fetch: FetchConfig,
    pub notify: NotifyConfig,
    pub exceptions: ExceptionRegistry,

    /// File this configuration was read from
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Loads configuration, preferring an explicit path
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Self::from_file(Path::new(&path));
        }

        match Self::global_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Self::default().normalized(),
        }
    }

    /// Returns the per-user config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "catalog-sync", "catalog-sync").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the per-user config file path
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Reads and validates a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses and validates TOML configuration
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.normalized()
    }

    /// Folds exception names; fails on inconsistent exception tables
    fn normalized(mut self) -> Result<Self> {
        self.exceptions = self
            .exceptions
            .normalized()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(self)
    }
}
