//! Error types for the Fletnix client
//!
//! This module defines all error types used throughout the library.
//! FletnixError implements Serialize for Tauri compatibility.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Error type for Fletnix client operations
#[derive(Error, Debug)]
pub enum FletnixError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error (status {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        status: u16,
        detail: Option<String>,
    },

    /// Login rejected (HTTP 401)
    #[error("Invalid email or password")]
    Unauthorized,

    /// Input rejected before any request was sent
    #[error("{0}")]
    Validation(String),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid URL or path segment
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Session store could not be read or written
    #[error("Session store error: {0}")]
    Session(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FletnixError {
    /// Server-supplied detail message, if the failure carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            FletnixError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FletnixError::Api { status, .. } => Some(*status),
            FletnixError::Unauthorized => Some(401),
            FletnixError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message to show the user: the server detail when present, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self.detail() {
            Some(detail) if !detail.is_empty() => detail.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Error bodies the API is known to send.
///
/// FastAPI answers `{"detail": "..."}`; some proxies wrap it as
/// `{"error": {"detail": "..."}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Flat { detail: String },
    Wrapped { error: WrappedDetail },
}

#[derive(Debug, Deserialize)]
struct WrappedDetail {
    detail: String,
}

/// Extract the detail message from an error response body.
///
/// Returns `None` when the body is not JSON or carries no string detail.
pub fn parse_error_detail(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body).ok()? {
        ErrorBody::Flat { detail } => Some(detail),
        ErrorBody::Wrapped { error } => Some(error.detail),
    }
}

/// Serialize FletnixError as a string for Tauri compatibility
impl Serialize for FletnixError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for Fletnix client operations
pub type Result<T> = std::result::Result<T, FletnixError>;
