//! Error types for the records console.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown when the login form is submitted with missing fields.
pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "Please fill in both the username and password fields.";

/// Message shown when an error carries no server-supplied detail.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// A shared error type for the entire console.
///
/// The first four variants mirror how the backend reports failures; the
/// rest cover local concerns (files, configuration, serialization).
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RecsError {
    /// The backend rejected the request body (HTTP 422)
    #[error("Validation error: {}", .detail.as_deref().unwrap_or("request rejected"))]
    Validation { detail: Option<String> },

    /// The bearer token is missing, invalid or expired (HTTP 401)
    #[error("Unauthorized: {}", .detail.as_deref().unwrap_or("invalid token"))]
    Unauthorized { detail: Option<String> },

    /// Any other non-success response from the backend
    #[error("Server error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },

    /// The request never produced a response (connect, timeout, decode)
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "CSV"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An action that needs a session was attempted without one
    #[error("Not logged in")]
    NotAuthenticated,

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecsError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Unauthorized error
    pub fn unauthorized(detail: Option<String>) -> Self {
        Self::Unauthorized { detail }
    }

    /// Creates a Server error
    pub fn server(status: u16, detail: Option<String>) -> Self {
        Self::Server { status, detail }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error should end the current session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is a transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// The detail message reported by the backend, if any.
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            Self::Validation { detail }
            | Self::Unauthorized { detail }
            | Self::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Text shown to the user for a failed authenticated request.
    ///
    /// Server-reported errors show the server's detail; everything else
    /// collapses to the generic message.
    pub fn user_message(&self) -> String {
        self.server_detail()
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
    }

    /// Text shown to the user for a failed login attempt.
    pub fn login_message(&self) -> String {
        if self.is_validation() {
            MISSING_CREDENTIALS_MESSAGE.to_string()
        } else {
            self.user_message()
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RecsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RecsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RecsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RecsError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at the front-end boundary)
impl From<anyhow::Error> for RecsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, RecsError>`.
pub type Result<T> = std::result::Result<T, RecsError>;
