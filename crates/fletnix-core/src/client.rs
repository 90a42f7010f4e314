//! HTTP client for the Fletnix API
//!
//! This module provides the JSON transport shared by the catalog, watchlist
//! and authentication clients. Error responses are decoded here, once, into
//! [`FletnixError`] so callers never inspect raw bodies.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{parse_error_detail, FletnixError, Result};
use crate::types::DEFAULT_PAGE_SIZE;

/// API base URL used when none is configured
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Configuration for the Fletnix HTTP client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, without trailing slash (default: http://localhost:8000)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Titles per catalog page (default: 15)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `api_base_url`, other values default
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from `FLETNIX_*` environment variables
    ///
    /// A `.env` file in the working directory is read first when present.
    /// Recognised variables: `FLETNIX_API_BASE_URL`, `FLETNIX_TIMEOUT_SECS`,
    /// `FLETNIX_PAGE_SIZE`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("FLETNIX_")
            .from_env::<ClientConfig>()
            .map_err(|e| FletnixError::Config(e.to_string()))
    }
}

/// JSON-over-HTTP client for the Fletnix API
///
/// One instance is shared (behind an `Arc`) by every service client.
#[derive(Debug)]
pub struct FletnixClient {
    /// Underlying HTTP client
    http: reqwest::Client,
    /// Base URL without trailing slash
    base_url: String,
    /// Page size the controllers request
    page_size: u32,
}

impl FletnixClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// - `FletnixError::InvalidUrl` if the base URL is not http(s)
    /// - `FletnixError::HttpError` if the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = config.api_base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FletnixError::InvalidUrl(config.api_base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            page_size: config.page_size.max(1),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured page size
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Start a request for `path` (which must begin with `/`)
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");
        self.http.request(method, url)
    }

    /// Send a request and decode a JSON success body
    ///
    /// # Errors
    /// - `FletnixError::HttpError` - network failure or timeout
    /// - `FletnixError::Unauthorized` - server returned 401
    /// - `FletnixError::Api` - any other non-success status, with the server detail
    /// - `FletnixError::Decode` - success body did not match `T`
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| FletnixError::Decode(e.to_string()))
    }

    /// GET `path` with query parameters
    pub(crate) async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::GET, path).query(query)).await
    }

    /// Map a non-success status and its body to an error
    fn status_error(status: StatusCode, body: &str) -> FletnixError {
        if status == StatusCode::UNAUTHORIZED {
            return FletnixError::Unauthorized;
        }
        FletnixError::Api {
            status: status.as_u16(),
            detail: parse_error_detail(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.page_size, 15);
    }

    #[test]
    fn test_client_creation() {
        let client = FletnixClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = FletnixClient::with_config(ClientConfig::with_base_url("https://api.example.com/")).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_client_rejects_non_http_url() {
        let result = FletnixClient::with_config(ClientConfig::with_base_url("ftp://example.com"));
        match result {
            Err(FletnixError::InvalidUrl(url)) => assert_eq!(url, "ftp://example.com"),
            _ => panic!("Expected InvalidUrl error"),
        }
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let config = ClientConfig {
            page_size: 0,
            ..ClientConfig::default()
        };
        let client = FletnixClient::with_config(config).unwrap();
        assert_eq!(client.page_size(), 1);
    }

    #[test]
    fn test_status_error_unauthorized() {
        let error = FletnixClient::status_error(StatusCode::UNAUTHORIZED, r#"{"detail": "Invalid email or password"}"#);
        assert!(matches!(error, FletnixError::Unauthorized));
    }

    #[test]
    fn test_status_error_carries_detail() {
        let error = FletnixClient::status_error(StatusCode::NOT_FOUND, r#"{"detail": "No User Found"}"#);
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.detail(), Some("No User Found"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let client = FletnixClient::with_config(ClientConfig::with_base_url("http://127.0.0.1:1")).unwrap();
        let result: Result<serde_json::Value> = client.get_json("/titles", &[("page", "1")]).await;
        assert!(matches!(result, Err(FletnixError::HttpError(_))));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"page_size": 20}"#).unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.api_base_url, "http://localhost:8000");
    }
}
