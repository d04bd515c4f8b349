//! `ConsoleApi` over HTTP.
//!
//! Every request is a single attempt; failures are classified into
//! [`RecsError`] variants by status code and never retried.

use async_trait::async_trait;
use recs_core::api::{AccessToken, ConsoleApi};
use recs_core::audit::AuditLogEntry;
use recs_core::record::Record;
use recs_core::search::SearchCriteria;
use recs_core::session::Credentials;
use recs_core::{RecsError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Error body used by the backend: `{"detail": "..."}`.
///
/// Validation errors carry a list in `detail`; only string details are
/// surfaced.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct TokenValidity {
    #[serde(default)]
    valid: bool,
}

/// HTTP client for the records backend.
#[derive(Debug, Clone)]
pub struct HttpConsoleApi {
    client: Client,
    base_url: String,
}

impl HttpConsoleApi {
    /// Creates a client for `base_url` (e.g. `http://localhost:8000`).
    ///
    /// `timeout` bounds each request; `None` keeps reqwest's default.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RecsError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", token))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(error = %e, "{} request failed", what);
            RecsError::transport(format!("{} request failed: {}", what, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = classify(status, &body);
        tracing::debug!(status = status.as_u16(), "{} rejected: {}", what, error);
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| RecsError::transport(format!("Failed to parse {} response: {}", what, e)))
    }
}

/// Maps a non-success response to the error taxonomy.
fn classify(status: StatusCode, body: &str) -> RecsError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail.as_str().map(str::to_string));

    match status {
        StatusCode::UNAUTHORIZED => RecsError::unauthorized(detail),
        StatusCode::UNPROCESSABLE_ENTITY => RecsError::Validation { detail },
        other => RecsError::server(other.as_u16(), detail),
    }
}

#[async_trait]
impl ConsoleApi for HttpConsoleApi {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken> {
        let request = self.client.post(self.url("/token")).form(&[
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ]);

        let response = self.send(request, "Login").await?;
        Self::decode(response, "login").await
    }

    async fn fetch_records(&self, token: &str, criteria: &SearchCriteria) -> Result<Vec<Record>> {
        let params = criteria.query_params();
        let request = self.authorized(self.client.get(self.url("/records")), token).query(&params);

        let response = self.send(request, "Record search").await?;
        let records: Vec<Record> = Self::decode(response, "records").await?;
        tracing::debug!(count = records.len(), "Records fetched");
        Ok(records)
    }

    async fn fetch_audit_logs(&self, token: &str) -> Result<Vec<AuditLogEntry>> {
        let request = self.authorized(self.client.get(self.url("/audit-logs")), token);

        let response = self.send(request, "Audit log").await?;
        let entries: Vec<AuditLogEntry> = Self::decode(response, "audit log").await?;
        tracing::debug!(count = entries.len(), "Audit log fetched");
        Ok(entries)
    }

    async fn validate_token(&self, token: &str) -> Result<()> {
        let request = self.authorized(self.client.get(self.url("/validate-token")), token);

        let response = self.send(request, "Token check").await?;
        let validity: TokenValidity = Self::decode(response, "token check").await?;
        if validity.valid {
            Ok(())
        } else {
            Err(RecsError::unauthorized(None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_statuses() {
        let err = classify(StatusCode::UNAUTHORIZED, r#"{"detail":"Invalid token"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Invalid token");

        let err = classify(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","username"],"msg":"field required"}]}"#,
        );
        assert!(err.is_validation());
        assert_eq!(err.server_detail(), None);

        let err = classify(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, RecsError::Server { status: 502, detail: None }));
        assert_eq!(err.user_message(), "An error occurred");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpConsoleApi::new("http://localhost:8000/", None).unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url("/token"), "http://localhost:8000/token");
    }
}
