//! Console configuration.
//!
//! Loaded from `config.toml` in the config directory. Every section is
//! optional; environment variables and command-line flags are layered on
//! top, in that order.

use crate::paths::RecsPaths;
use crate::storage::AtomicTomlFile;
use recs_core::table::PAGE_SIZE_OPTIONS;
use recs_core::{RecsError, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const ENV_BASE_URL: &str = "RECS_BASE_URL";
pub const ENV_EXPORT_DIR: &str = "RECS_EXPORT_DIR";
pub const ENV_LOG_LEVEL: &str = "RECS_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// Request timeout; the HTTP client's own default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub page_size: usize,
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: recs_core::table::DEFAULT_PAGE_SIZE,
            color: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `recs=debug,reqwest=warn`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server: ServerConfig,
    pub ui: UiConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

impl ConsoleConfig {
    /// Applies environment overrides. `lookup` is `std::env::var` in
    /// production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.server.base_url = url;
        }
        if let Some(dir) = lookup(ENV_EXPORT_DIR).filter(|v| !v.trim().is_empty()) {
            self.export.directory = PathBuf::from(dir);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level;
        }
    }

    /// Rejects values the console cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !PAGE_SIZE_OPTIONS.contains(&self.ui.page_size) {
            return Err(RecsError::config(format!(
                "ui.page_size must be one of {:?}, got {}",
                PAGE_SIZE_OPTIONS, self.ui.page_size
            )));
        }

        let url = self.server.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RecsError::config(format!(
                "server.base_url must start with http:// or https://, got '{}'",
                self.server.base_url
            )));
        }

        if self.server.timeout_secs == Some(0) {
            return Err(RecsError::config("server.timeout_secs must be greater than zero"));
        }

        Ok(())
    }

    /// Configured page size; only meaningful after [`ConsoleConfig::validate`].
    pub fn page_size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.ui.page_size).unwrap_or(NonZeroUsize::MIN)
    }
}

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
}

/// Loads [`ConsoleConfig`] for a given set of paths.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: RecsPaths,
}

impl ConfigService {
    pub fn new(paths: RecsPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &RecsPaths {
        &self.paths
    }

    /// File, then process environment, then `overrides`; validated.
    ///
    /// A missing config file yields the defaults.
    pub fn load(&self, overrides: &ConfigOverrides) -> Result<ConsoleConfig> {
        self.load_with_env(overrides, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(&self, overrides: &ConfigOverrides, lookup: F) -> Result<ConsoleConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = AtomicTomlFile::<ConsoleConfig>::new(self.paths.config_file().to_path_buf());
        let mut config = match file.load()? {
            Some(config) => config,
            None => {
                tracing::debug!(path = %self.paths.config_file().display(), "No config file, using defaults");
                ConsoleConfig::default()
            }
        };

        config.apply_env(lookup);
        if let Some(url) = &overrides.base_url {
            config.server.base_url = url.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
