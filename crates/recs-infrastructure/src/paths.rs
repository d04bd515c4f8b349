//! Path management for recs configuration and session files.

use recs_core::{RecsError, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "recs";

/// Locations of the console's local files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/recs/              # Config directory (dirs::config_dir)
/// ├── config.toml              # Console configuration
/// ├── session.toml             # Persisted bearer token (0600)
/// └── logs/                    # Daily rolling logs
///     └── recs.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecsPaths {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl RecsPaths {
    /// Resolves paths under `base`, or under the platform config dir when
    /// `base` is `None`.
    pub fn new(base: Option<&Path>) -> Result<Self> {
        let config_dir = match base {
            Some(base) => base.to_path_buf(),
            None => dirs::config_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| RecsError::config("Cannot find home directory"))?,
        };

        let config_file = config_dir.join("config.toml");
        Ok(Self {
            config_dir,
            config_file,
        })
    }

    /// Uses `path` as the config file; the other files stay in the config dir.
    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_file = path;
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// # Security Note
    ///
    /// Holds the bearer token; written with mode 0600 on Unix.
    pub fn session_file(&self) -> PathBuf {
        self.config_dir.join("session.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }
}
