//! Fletnix Client Core Library
//!
//! This crate provides the client side of the Fletnix catalog service:
//! HTTP clients for the remote API and the controllers behind the
//! browse and detail screens.
//!
//! # Features
//! - Paged catalog browsing with type filter and age-based content filtering
//! - Free-text title search
//! - Per-user watchlist view with local search and filtering
//! - Watchlist add/remove from the detail screen
//! - Login, registration and a session-gated route table

pub mod auth;
pub mod browse;
pub mod catalog;
pub mod client;
pub mod detail;
pub mod error;
pub mod router;
pub mod session;
pub mod types;
pub mod watchlist;

// Re-export main types for convenience
pub use auth::{AuthClient, AuthOutcome, Authenticator};
pub use browse::{BrowseController, BrowseView};
pub use catalog::CatalogClient;
pub use client::{ClientConfig, FletnixClient};
pub use detail::{format_date, DetailController, DetailView};
pub use error::{FletnixError, Result};
pub use router::{resolve, Route};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use types::{PageQuery, Rating, Show, TypeFilter, User};
pub use watchlist::WatchlistClient;
