//! Error types for the lending client
//!
//! Failures are classified at the transport layer only. Every variant maps to
//! a single user-facing message through [`AppError::user_message`].

use reqwest::StatusCode;
use std::error::Error as StdError;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Unable to resolve host: {0}")]
    UnresolvedHost(String),

    /// Low-level I/O failure in the HTTP stack, handled like a connection failure
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid server address: {0}")]
    InvalidServerAddress(String),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cache error: {0}")]
    Cache(#[from] sqlx::Error),

    #[error("Cache migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Classify a reqwest failure that happened before a status line was received
    pub fn from_transport(err: reqwest::Error) -> Self {
        let detail = err.to_string();

        if err.is_timeout() {
            return AppError::Timeout(detail);
        }
        if is_dns_failure(&err) {
            return AppError::UnresolvedHost(detail);
        }
        if err.is_connect() {
            return AppError::Connection(detail);
        }
        if err.is_decode() {
            return AppError::Decode(detail);
        }
        if err.is_builder() {
            return AppError::InvalidServerAddress(detail);
        }
        // Body/request/internal failures surface as plain network errors
        AppError::Network(detail)
    }

    /// Build an HTTP error, extracting a message from the body when it is JSON
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        AppError::Http {
            status: status.as_u16(),
            message: extract_error_message(body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string()),
        }
    }

    /// True for failures where the server was never reached
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            AppError::Connection(_)
                | AppError::Timeout(_)
                | AppError::UnresolvedHost(_)
                | AppError::Network(_)
        )
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, AppError::Http { status: 401, .. })
    }

    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            AppError::Connection(_) | AppError::Network(_) => {
                "Unable to connect to the server, please check your network".to_string()
            }
            AppError::Timeout(_) => "The server took too long to respond, please retry".to_string(),
            AppError::UnresolvedHost(_) => {
                "Server address not found, please check the server settings".to_string()
            }
            AppError::Http { status, message } => match *status {
                400 => format!("Invalid request: {}", message),
                401 => "Session expired, please log in again".to_string(),
                403 => "You do not have permission to perform this action".to_string(),
                404 => "The requested resource does not exist".to_string(),
                409 => format!("Conflict: {}", message),
                500..=599 => "Server error, please try again later".to_string(),
                _ => message.clone(),
            },
            AppError::InvalidServerAddress(_) => "Invalid server address".to_string(),
            AppError::NotAuthenticated => "Please log in first".to_string(),
            AppError::PermissionDenied(_) => {
                "You do not have permission to perform this action".to_string()
            }
            AppError::NotFound(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::Cache(e) => {
                tracing::error!("Cache error: {:?}", e);
                "Local data error".to_string()
            }
            AppError::Migration(e) => {
                tracing::error!("Cache migration error: {:?}", e);
                "Local data error".to_string()
            }
            AppError::Decode(_) => "Unexpected response from the server".to_string(),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An unexpected error occurred".to_string()
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

/// Walk the source chain looking for a resolver failure
fn is_dns_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string().to_lowercase();
        if text.contains("dns error")
            || text.contains("failed to lookup address")
            || text.contains("name or service not known")
            || text.contains("no such host")
        {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Best-effort message extraction from an error body
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["message", "error", "msg"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        Err(_) if trimmed.len() <= 200 && !trimmed.starts_with('<') => Some(trimmed.to_string()),
        Err(_) => None,
    }
}

/// Result type alias for client operations
pub type AppResult<T> = Result<T, AppError>;
