//! The authenticated session shared by every view.

use recs_core::session::TokenStore;
use recs_core::{RecsError, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Current bearer token, mirrored to a [`TokenStore`].
///
/// Constructed once by the shell and handed to each view as
/// `Arc<SessionContext>`; there is no global session.
pub struct SessionContext {
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<String>>,
}

impl SessionContext {
    /// Starts unauthenticated; call [`SessionContext::hydrate`] to pick up a
    /// persisted token.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            token: RwLock::new(None),
        }
    }

    /// Loads the persisted token into memory. Returns whether one was found.
    pub async fn hydrate(&self) -> Result<bool> {
        let persisted = self.store.load_token().await?;
        let found = persisted.is_some();
        *self.token.write().await = persisted;
        tracing::debug!(authenticated = found, "Session hydrated");
        Ok(found)
    }

    /// Replaces the token in memory and storage. `None` clears both.
    pub async fn set_token(&self, token: Option<String>) -> Result<()> {
        let token = token.filter(|t| !t.is_empty());
        *self.token.write().await = token.clone();
        match token {
            Some(token) => self.store.save_token(&token).await,
            None => self.store.remove_token().await,
        }
    }

    /// Ends the session (logout or 401).
    ///
    /// Memory is cleared even if the persisted token cannot be removed; the
    /// storage failure is logged.
    pub async fn clear(&self) {
        *self.token.write().await = None;
        if let Err(e) = self.store.remove_token().await {
            tracing::warn!(error = %e, "Failed to remove persisted session token");
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// The token, or [`RecsError::NotAuthenticated`].
    pub async fn require_token(&self) -> Result<String> {
        self.token().await.ok_or(RecsError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recs_core::session::InMemoryTokenStore;

    #[tokio::test]
    async fn test_hydrate_picks_up_persisted_token() {
        let store = Arc::new(InMemoryTokenStore::with_token("persisted"));
        let session = SessionContext::new(store);
        assert!(!session.is_authenticated().await);

        assert!(session.hydrate().await.unwrap());
        assert_eq!(session.token().await.as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn test_set_and_clear_mirror_storage() {
        let store = Arc::new(InMemoryTokenStore::new());
        let session = SessionContext::new(store.clone());

        session.set_token(Some("abc".to_string())).await.unwrap();
        assert_eq!(store.load_token().await.unwrap().as_deref(), Some("abc"));

        session.clear().await;
        assert!(!session.is_authenticated().await);
        assert_eq!(store.load_token().await.unwrap(), None);
        assert!(matches!(
            session.require_token().await,
            Err(RecsError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_empty_token_is_treated_as_logout() {
        let store = Arc::new(InMemoryTokenStore::with_token("old"));
        let session = SessionContext::new(store.clone());
        session.hydrate().await.unwrap();

        session.set_token(Some(String::new())).await.unwrap();
        assert!(!session.is_authenticated().await);
        assert_eq!(store.load_token().await.unwrap(), None);
    }
}
