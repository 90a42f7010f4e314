//! Detail controller: one title and its watchlist membership

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::catalog::CatalogClient;
use crate::session::Session;
use crate::types::Show;
use crate::watchlist::WatchlistClient;

const FETCH_DETAILS_FAILED: &str = "Error fetching details";

/// Shown when a title has no date-added
pub const NO_DATE: &str = "—";

/// Date layouts the catalog is known to use
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Format a catalog date as "Month D, YYYY".
///
/// Values that cannot be parsed are returned unchanged.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw.trim()) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

/// What the detail screen renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub show: Option<Show>,
    pub loading: bool,
    pub error: Option<String>,
    pub formatted_date: String,
    pub in_watchlist: bool,
    pub watchlist: Vec<Show>,
}

impl Default for DetailView {
    fn default() -> Self {
        Self {
            show: None,
            loading: true,
            error: None,
            formatted_date: NO_DATE.to_string(),
            in_watchlist: false,
            watchlist: Vec::new(),
        }
    }
}

impl DetailView {
    fn refresh_membership(&mut self) {
        self.in_watchlist = match &self.show {
            Some(show) => contains(&self.watchlist, show),
            None => false,
        };
    }
}

fn contains(watchlist: &[Show], show: &Show) -> bool {
    watchlist.iter().any(|item| item.show_id == show.show_id)
}

struct Inner {
    view: DetailView,
    email: String,
    /// A toggle request is awaiting the server
    toggling: bool,
}

/// Detail screen controller
pub struct DetailController {
    catalog: CatalogClient,
    watchlist: WatchlistClient,
    session: Session,
    inner: Mutex<Inner>,
}

impl DetailController {
    pub fn new(catalog: CatalogClient, watchlist: WatchlistClient, session: Session) -> Self {
        Self {
            catalog,
            watchlist,
            session,
            inner: Mutex::new(Inner {
                view: DetailView::default(),
                email: String::new(),
                toggling: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current view
    pub fn snapshot(&self) -> DetailView {
        self.lock().view.clone()
    }

    /// Load the session user, their watchlist and the title `show_id`.
    ///
    /// The watchlist and title requests run concurrently and both complete
    /// before the view is returned, so `in_watchlist` is already correct.
    pub async fn initialize(&self, show_id: &str) -> DetailView {
        let email = self.session.user().map(|user| user.email).unwrap_or_default();
        {
            let mut inner = self.lock();
            inner.email = email.clone();
            inner.view = DetailView::default();
        }

        let show_id = show_id.trim();
        tokio::join!(self.load_watchlist(&email), self.load_show(show_id));

        let mut inner = self.lock();
        inner.view.refresh_membership();
        inner.view.clone()
    }

    async fn load_watchlist(&self, email: &str) {
        if email.is_empty() {
            return;
        }
        let shows = match self.watchlist.get(email).await {
            Ok(shows) => shows,
            Err(e) => {
                warn!(error = %e, "failed to load watchlist");
                Vec::new()
            }
        };
        self.lock().view.watchlist = shows;
    }

    async fn load_show(&self, show_id: &str) {
        if show_id.is_empty() {
            self.lock().view.loading = false;
            return;
        }
        let result = self.catalog.get_title(show_id).await;

        let mut inner = self.lock();
        inner.view.loading = false;
        match result {
            Ok(show) => {
                inner.view.formatted_date = show
                    .date_added
                    .as_deref()
                    .map(format_date)
                    .unwrap_or_else(|| NO_DATE.to_string());
                inner.view.show = Some(show);
            }
            Err(e) => {
                error!(error = %e, show_id, "{}", FETCH_DETAILS_FAILED);
                inner.view.error = Some(e.user_message(FETCH_DETAILS_FAILED));
            }
        }
    }

    /// Whether `show` is in the loaded watchlist, by identifier.
    pub fn is_in_watchlist(&self, show: &Show) -> bool {
        contains(&self.lock().view.watchlist, show)
    }

    /// Add `show` to the watchlist, or remove it if already present.
    ///
    /// The local watchlist changes only after the server acknowledges.
    /// Failures are logged and leave it untouched. While one toggle is in
    /// flight further toggles are ignored.
    pub async fn toggle_watchlist(&self, show: &Show) -> DetailView {
        let (email, remove) = {
            let mut inner = self.lock();
            if inner.email.is_empty() || show.show_id.is_empty() {
                return inner.view.clone();
            }
            if inner.toggling {
                debug!(show_id = %show.show_id, "toggle already in flight");
                return inner.view.clone();
            }
            inner.toggling = true;
            (inner.email.clone(), contains(&inner.view.watchlist, show))
        };

        let result = if remove {
            self.watchlist.remove(&email, &show.show_id).await
        } else {
            self.watchlist.add(&email, &show.show_id).await
        };

        let mut inner = self.lock();
        inner.toggling = false;
        match result {
            Ok(_) if remove => inner.view.watchlist.retain(|item| item.show_id != show.show_id),
            Ok(_) => inner.view.watchlist.push(show.clone()),
            Err(e) if remove => warn!(error = %e, show_id = %show.show_id, "failed to remove from watchlist"),
            Err(e) => warn!(error = %e, show_id = %show.show_id, "failed to add to watchlist"),
        }
        inner.view.refresh_membership();
        inner.view.clone()
    }
}
