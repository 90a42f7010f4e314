//! Data types for the Fletnix client
//!
//! This module contains the core data structures shared by the API clients
//! and the controllers. All types implement Serialize and Deserialize for
//! JSON compatibility with the API and with Tauri.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Default number of titles per catalog page
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// A catalog title (movie or TV show) as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    /// Unique catalog identifier (e.g. "s1")
    pub show_id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// "Movie" or "TV Show"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub show_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_rating: Option<String>,
    /// Raw date the title was added to the catalog, see [`crate::detail::format_date`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,
    /// Any other fields the API sends (cast, director, duration, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Show {
    /// Create a show with only identifier and title set
    pub fn new(show_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            show_id: show_id.into(),
            title: title.into(),
            show_type: None,
            description: None,
            release_date: None,
            rating: None,
            age_rating: None,
            date_added: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Builder-style setter for the show type
    pub fn with_type(mut self, show_type: impl Into<String>) -> Self {
        self.show_type = Some(show_type.into());
        self
    }
}

/// Rating as sent by the API: a numeric score or a certificate label ("TV-MA")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Label(String),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(score) => write!(f, "{}", score),
            Rating::Label(label) => write!(f, "{}", label),
        }
    }
}

/// The signed-in user, as kept in the session store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// External identifier for watchlist operations
    #[serde(default)]
    pub email: String,
    /// Content-filter age; numbers and numeric strings are accepted
    #[serde(default, deserialize_with = "deserialize_age")]
    pub age: u32,
    #[serde(default, deserialize_with = "deserialize_watchlist")]
    pub watchlist: Vec<Show>,
}

impl User {
    /// Upper-cased first letter of the email, or "?" when there is none
    pub fn initial_letter(&self) -> String {
        self.email
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

fn deserialize_age<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let age = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map(|f| f.max(0.0) as u64).unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(age).unwrap_or(u32::MAX))
}

fn deserialize_watchlist<'de, D>(deserializer: D) -> std::result::Result<Vec<Show>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Show>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Content type selector used by the catalog filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeFilter {
    /// No filtering
    #[default]
    All,
    Movie,
    #[serde(rename = "TV Show", alias = "TV")]
    TvShow,
}

impl TypeFilter {
    /// Value sent as the `type` query parameter of `GET /titles`
    pub fn as_query(self) -> &'static str {
        match self {
            TypeFilter::All => "All",
            TypeFilter::Movie => "Movie",
            TypeFilter::TvShow => "TV",
        }
    }

    /// Whether a show passes this filter, matched exactly on its `type` field
    pub fn matches(self, show: &Show) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Movie => show.show_type.as_deref() == Some("Movie"),
            TypeFilter::TvShow => show.show_type.as_deref() == Some("TV Show"),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => write!(f, "All"),
            TypeFilter::Movie => write!(f, "Movie"),
            TypeFilter::TvShow => write!(f, "TV Show"),
        }
    }
}

/// Parameters of one catalog page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    /// Page number (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    pub type_filter: TypeFilter,
    /// Viewer age used for content filtering
    pub age: u32,
}

impl PageQuery {
    /// First page of the whole catalog for a viewer
    pub fn first(age: u32, limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            type_filter: TypeFilter::All,
            age,
        }
    }
}

/// Response of `GET /titles`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitlesPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    /// Absent when the server had nothing to return
    #[serde(default)]
    pub data: Option<Vec<Show>>,
}

/// Response of `GET /title/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Option<Vec<Show>>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Response of `GET /titles/watchlist`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchlistResponse {
    #[serde(default)]
    pub shows: Option<Vec<Show>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Plain acknowledgement body (`{"message": "..."}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}
