//! Fletnix Tauri Integration
//!
//! This crate provides Tauri commands that expose the Fletnix client
//! core to a web frontend.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fletnix_tauri::AppState;
//! use tauri::Manager;
//!
//! fn main() {
//!     fletnix_tauri::init_logging();
//!     tauri::Builder::default()
//!         .setup(|app| {
//!             let dir = app.path().app_data_dir()?;
//!             app.manage(AppState::new(dir.join("session.json"))?);
//!             Ok(())
//!         })
//!         .invoke_handler(tauri::generate_handler![
//!             fletnix_tauri::commands::resolve_route,
//!             fletnix_tauri::commands::login,
//!             fletnix_tauri::commands::register,
//!             fletnix_tauri::commands::logout,
//!             fletnix_tauri::commands::open_home,
//!             fletnix_tauri::commands::load_page,
//!             fletnix_tauri::commands::search,
//!             fletnix_tauri::commands::filter_by_type,
//!             fletnix_tauri::commands::next_page,
//!             fletnix_tauri::commands::previous_page,
//!             fletnix_tauri::commands::toggle_watchlist_view,
//!             fletnix_tauri::commands::is_in_watchlist,
//!             fletnix_tauri::commands::open_details,
//!             fletnix_tauri::commands::toggle_watchlist,
//!         ])
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```

pub mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use fletnix_core::{
    AuthClient, Authenticator, BrowseController, CatalogClient, ClientConfig, DetailController,
    FileSessionStore, FletnixClient, Session, WatchlistClient,
};

/// Filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "fletnix_core=info,fletnix_tauri=info";

/// Install the global tracing subscriber.
///
/// Honours `RUST_LOG`; safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Shared state managed by Tauri.
///
/// Holds one HTTP client and session for the whole app, plus the
/// controller of each screen currently open. Opening a screen replaces its
/// controller; dropping the old one is the screen's teardown.
pub struct AppState {
    client: Arc<FletnixClient>,
    session: Session,
    page_size: u32,
    browse: Mutex<Option<Arc<BrowseController>>>,
    detail: Mutex<Option<Arc<DetailController>>>,
}

impl AppState {
    /// Create the state from `FLETNIX_*` environment configuration, keeping
    /// the session record at `session_path`.
    ///
    /// # Errors
    /// Returns an error string if the configuration or HTTP client is invalid.
    pub fn new(session_path: impl Into<PathBuf>) -> Result<Self, String> {
        let config = ClientConfig::from_env().map_err(|e| e.to_string())?;
        let session = Session::new(Arc::new(FileSessionStore::new(session_path)));
        Self::with_config(config, session)
    }

    /// Create the state from explicit configuration and session.
    pub fn with_config(config: ClientConfig, session: Session) -> Result<Self, String> {
        let page_size = config.page_size;
        let client = FletnixClient::with_config(config).map_err(|e| e.to_string())?;
        tracing::info!(base_url = client.base_url(), "fletnix client ready");
        Ok(Self {
            client: Arc::new(client),
            session,
            page_size,
            browse: Mutex::new(None),
            detail: Mutex::new(None),
        })
    }

    /// Get the session handle.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Login/register/logout flows over this state's client and session.
    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(AuthClient::new(self.client.clone()), self.session.clone())
    }

    /// Replace the home screen controller with a fresh one.
    pub async fn open_browse(&self) -> Arc<BrowseController> {
        let controller = Arc::new(BrowseController::new(
            CatalogClient::new(self.client.clone()),
            WatchlistClient::new(self.client.clone()),
            self.session.clone(),
            self.page_size,
        ));
        *self.browse.lock().await = Some(controller.clone());
        controller
    }

    /// Replace the detail screen controller with a fresh one.
    pub async fn open_detail(&self) -> Arc<DetailController> {
        let controller = Arc::new(DetailController::new(
            CatalogClient::new(self.client.clone()),
            WatchlistClient::new(self.client.clone()),
            self.session.clone(),
        ));
        *self.detail.lock().await = Some(controller.clone());
        controller
    }

    /// Current home screen controller.
    pub async fn browse(&self) -> Result<Arc<BrowseController>, String> {
        self.browse
            .lock()
            .await
            .clone()
            .ok_or_else(|| "Home screen is not open".to_string())
    }

    /// Current detail screen controller.
    pub async fn detail(&self) -> Result<Arc<DetailController>, String> {
        self.detail
            .lock()
            .await
            .clone()
            .ok_or_else(|| "Details screen is not open".to_string())
    }

    /// Tear down both screens (used on logout).
    pub async fn close_screens(&self) {
        *self.browse.lock().await = None;
        *self.detail.lock().await = None;
    }
}
