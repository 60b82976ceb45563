//! Per-request concerns applied around every call: bearer token injection and
//! the HTTP exchange log.

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use std::time::Duration;

/// Tracing target routed to the HTTP log file by [`crate::logging`]
pub const HTTP_LOG_TARGET: &str = "lending_client::http";

/// Attach `Authorization: Bearer <token>` when a token is present
pub fn with_bearer(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) if !token.is_empty() => builder.bearer_auth(token),
        _ => builder,
    }
}

/// Record one request/response exchange
pub fn log_exchange(method: &Method, url: &Url, outcome: Result<StatusCode, &reqwest::Error>, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match outcome {
        Ok(status) if status.is_success() => {
            tracing::debug!(target: HTTP_LOG_TARGET, %method, %url, status = status.as_u16(), elapsed_ms, "HTTP exchange");
        }
        Ok(status) => {
            tracing::warn!(target: HTTP_LOG_TARGET, %method, %url, status = status.as_u16(), elapsed_ms, "HTTP exchange failed");
        }
        Err(error) => {
            tracing::warn!(target: HTTP_LOG_TARGET, %method, %url, elapsed_ms, %error, "HTTP transport error");
        }
    }
}
