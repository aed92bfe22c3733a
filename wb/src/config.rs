//! widgetboot tool configuration types and loading
//!
//! This is the configuration of the `wb` tool itself (logging, HTTP
//! behaviour). The widget configuration fetched from `data-conf` lives in
//! [`crate::widget::Configuration`].

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local config file name
const LOCAL_CONFIG: &str = ".widgetboot.yml";

/// Main widgetboot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP fetch configuration
    pub fetch: FetchConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_ms == 0 {
            return Err(eyre::eyre!("fetch.timeout-ms must be greater than zero"));
        }
        if let Some(base) = &self.fetch.base_url {
            reqwest::Url::parse(base).context(format!("Invalid fetch.base-url '{}'", base))?;
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    ///
    /// An explicit path must load. Otherwise the first readable file among
    /// [`Config::search_paths`] wins; unreadable ones are skipped with a
    /// warning, and defaults apply when none is usable.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::read(path).context(format!("Failed to load config from {}", path.display()));
        }

        for path in Self::search_paths().iter().filter(|path| path.exists()) {
            match Self::read(path) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable config file"),
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed: the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::search_paths(),
        };

        candidates
            .iter()
            .filter(|path| path.exists())
            .find_map(|path| Self::read(path).ok())
            .and_then(|config| config.log_level)
    }

    /// Implicit config locations, most specific first:
    /// `./.widgetboot.yml`, then `<config dir>/widgetboot/widgetboot.yml`
    pub fn search_paths() -> Vec<PathBuf> {
        let user = dirs::config_dir().map(|dir| dir.join("widgetboot").join("widgetboot.yml"));
        std::iter::once(PathBuf::from(LOCAL_CONFIG)).chain(user).collect()
    }

    fn read(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_yaml::from_str::<Self>(&yaml).context("Failed to parse config file")?;
        tracing::info!(path = %path.display(), "Loaded tool config");
        Ok(config)
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Base URL for relative configuration URLs (the hosting page)
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: format!("widgetboot/{}", env!("CARGO_PKG_VERSION")),
            base_url: None,
        }
    }
}
