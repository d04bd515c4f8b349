//! File-backed session token storage.

use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use recs_core::Result;
use recs_core::session::TokenStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk layout of `session.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Persists the bearer token under the `token` key of a TOML file.
///
/// Clearing the token rewrites the file without the key rather than
/// deleting it, so concurrent consoles never race on file removal.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    file: AtomicTomlFile<SessionFile>,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path).with_mode(0o600),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load_token(&self) -> Result<Option<String>> {
        let token = self
            .file
            .load()?
            .and_then(|session| session.token)
            .filter(|token| !token.is_empty());
        tracing::debug!(present = token.is_some(), path = %self.path().display(), "Loaded session file");
        Ok(token)
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        self.file.update(SessionFile::default(), |session| {
            session.token = Some(token.to_string());
            Ok(())
        })?;
        tracing::debug!(path = %self.path().display(), "Session token saved");
        Ok(())
    }

    async fn remove_token(&self) -> Result<()> {
        if !self.path().exists() {
            return Ok(());
        }
        self.file.update(SessionFile::default(), |session| {
            session.token = None;
            Ok(())
        })?;
        tracing::debug!(path = %self.path().display(), "Session token removed");
        Ok(())
    }
}
