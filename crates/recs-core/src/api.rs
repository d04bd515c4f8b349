//! Backend API contract.
//!
//! The application layer talks to the backend only through [`ConsoleApi`];
//! the HTTP implementation lives in `recs-interaction`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audit::AuditLogEntry;
use crate::error::Result;
use crate::record::Record;
use crate::search::SearchCriteria;
use crate::session::Credentials;

/// Successful response of the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Operations the console performs against the backend.
///
/// Every method except [`ConsoleApi::login`] requires a bearer token.
/// Implementations map an HTTP 401 to [`crate::RecsError::Unauthorized`]
/// and a 422 to [`crate::RecsError::Validation`].
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Exchanges credentials for an access token.
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken>;

    /// Fetches every record matching `criteria`.
    async fn fetch_records(&self, token: &str, criteria: &SearchCriteria) -> Result<Vec<Record>>;

    /// Fetches the full audit log.
    async fn fetch_audit_logs(&self, token: &str) -> Result<Vec<AuditLogEntry>>;

    /// Checks that `token` is still accepted by the backend.
    async fn validate_token(&self, token: &str) -> Result<()>;
}
