//! Session token persistence.
//!
//! A session is nothing more than the bearer token returned by the login
//! endpoint. The [`TokenStore`] trait abstracts where it is kept so the
//! application layer can be exercised against an in-memory store in tests
//! and a file in the console.

mod credentials;

pub use credentials::Credentials;

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Key under which the token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Durable storage for the single session token.
///
/// # Security Note
///
/// Implementations must never log the token value.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Reads the persisted token.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(token))`: A token survived from an earlier run
    /// - `Ok(None)`: Nothing persisted (or the stored value is empty)
    /// - `Err(_)`: The backing storage could not be read
    async fn load_token(&self) -> Result<Option<String>>;

    /// Persists `token`, replacing any previous value.
    async fn save_token(&self, token: &str) -> Result<()>;

    /// Removes the persisted token. Removing an absent token succeeds.
    async fn remove_token(&self) -> Result<()>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as after a previous login.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load_token(&self) -> Result<Option<String>> {
        Ok(self.token.lock().await.clone().filter(|t| !t.is_empty()))
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        *self.token.lock().await = Some(token.to_string());
        Ok(())
    }

    async fn remove_token(&self) -> Result<()> {
        *self.token.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = InMemoryTokenStore::new();
        assert_eq!(store.load_token().await.unwrap(), None);

        store.save_token("abc").await.unwrap();
        assert_eq!(store.load_token().await.unwrap().as_deref(), Some("abc"));

        store.remove_token().await.unwrap();
        store.remove_token().await.unwrap();
        assert_eq!(store.load_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_token_reads_as_absent() {
        let store = InMemoryTokenStore::with_token("");
        assert_eq!(store.load_token().await.unwrap(), None);
    }
}
