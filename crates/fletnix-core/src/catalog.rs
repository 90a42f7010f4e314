//! Catalog listing, search and single-title lookup

use std::sync::Arc;

use crate::client::FletnixClient;
use crate::error::{FletnixError, Result};
use crate::types::{PageQuery, SearchResults, Show, TitlesPage};

/// Client for the read-only catalog endpoints
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use fletnix_core::{CatalogClient, FletnixClient, PageQuery};
///
/// # async fn example() -> Result<(), fletnix_core::FletnixError> {
/// let catalog = CatalogClient::new(Arc::new(FletnixClient::new()?));
/// let page = catalog.list_titles(&PageQuery::first(21, 15)).await?;
/// println!("{} titles in total", page.total);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Arc<FletnixClient>,
}

impl CatalogClient {
    pub fn new(client: Arc<FletnixClient>) -> Self {
        Self { client }
    }

    /// Fetch one page of titles (`GET /titles`).
    pub async fn list_titles(&self, query: &PageQuery) -> Result<TitlesPage> {
        let age = query.age.to_string();
        let page = query.page.to_string();
        let limit = query.limit.to_string();
        let params = [
            ("age", age.as_str()),
            ("type", query.type_filter.as_query()),
            ("page", page.as_str()),
            ("limit", limit.as_str()),
        ];
        self.client.get_json("/titles", &params).await
    }

    /// Free-text search over titles (`GET /title/search`).
    ///
    /// The term is sent as given; callers normalise it.
    pub async fn search_titles(&self, term: &str, age: u32) -> Result<SearchResults> {
        let age = age.to_string();
        let params = [("q", term), ("age", age.as_str())];
        self.client.get_json("/title/search", &params).await
    }

    /// Fetch a single title by identifier (`GET /titles/details/{id}`).
    ///
    /// # Errors
    /// `FletnixError::InvalidUrl` if `show_id` is empty or whitespace-only
    pub async fn get_title(&self, show_id: &str) -> Result<Show> {
        let show_id = show_id.trim();
        if show_id.is_empty() {
            return Err(FletnixError::InvalidUrl("Show id cannot be empty".to_string()));
        }

        let path = format!("/titles/details/{}", urlencoding::encode(show_id));
        self.client.get_json(&path, &[] as &[(&str, &str)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_title_empty_id() {
        let catalog = CatalogClient::new(Arc::new(FletnixClient::new().unwrap()));
        match catalog.get_title("  ").await {
            Err(FletnixError::InvalidUrl(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected InvalidUrl error"),
        }
    }
}
