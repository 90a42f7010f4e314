//! Per-user watchlist endpoints

use std::sync::Arc;

use reqwest::Method;

use crate::client::FletnixClient;
use crate::error::{FletnixError, Result};
use crate::types::{ApiMessage, Show, WatchlistResponse};

/// Client for reading and mutating a user's watchlist
///
/// Users are identified by email; shows by their catalog identifier.
#[derive(Debug, Clone)]
pub struct WatchlistClient {
    client: Arc<FletnixClient>,
}

impl WatchlistClient {
    pub fn new(client: Arc<FletnixClient>) -> Self {
        Self { client }
    }

    /// Fetch the user's watchlist (`GET /titles/watchlist`).
    ///
    /// An absent `shows` field is returned as an empty list.
    pub async fn get(&self, email: &str) -> Result<Vec<Show>> {
        let response: WatchlistResponse = self
            .client
            .get_json("/titles/watchlist", &[("email", email)])
            .await?;
        Ok(response.shows.unwrap_or_default())
    }

    /// Add a show (`POST /titles/watchlist`).
    pub async fn add(&self, email: &str, show_id: &str) -> Result<ApiMessage> {
        self.mutate(Method::POST, email, show_id).await
    }

    /// Remove a show (`DELETE /titles/watchlist`).
    pub async fn remove(&self, email: &str, show_id: &str) -> Result<ApiMessage> {
        self.mutate(Method::DELETE, email, show_id).await
    }

    async fn mutate(&self, method: Method, email: &str, show_id: &str) -> Result<ApiMessage> {
        if email.is_empty() {
            return Err(FletnixError::Validation("Email is required".to_string()));
        }
        if show_id.is_empty() {
            return Err(FletnixError::Validation("Show id is required".to_string()));
        }

        let request = self
            .client
            .request(method, "/titles/watchlist")
            .query(&[("email", email), ("show_id", show_id)])
            .json(&serde_json::json!({}));
        self.client.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WatchlistClient {
        WatchlistClient::new(Arc::new(FletnixClient::new().unwrap()))
    }

    #[tokio::test]
    async fn test_add_requires_email() {
        match client().add("", "s1").await {
            Err(FletnixError::Validation(msg)) => assert_eq!(msg, "Email is required"),
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_remove_requires_show_id() {
        match client().remove("a@b.c", "").await {
            Err(FletnixError::Validation(msg)) => assert_eq!(msg, "Show id is required"),
            _ => panic!("Expected Validation error"),
        }
    }
}
