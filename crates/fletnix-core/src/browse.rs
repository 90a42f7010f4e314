//! Browse controller
//!
//! Drives the home screen: a paged view of the remote catalog and a
//! single-page view of the user's watchlist, with search, type filter and
//! paging layered on top of whichever mode is active.
//!
//! Every action that changes what is displayed bumps a generation counter.
//! A remote response is applied only if the generation it was issued under
//! is still current, so a slow response can never overwrite the result of a
//! newer action.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::catalog::CatalogClient;
use crate::error::{FletnixError, Result};
use crate::session::Session;
use crate::types::{PageQuery, SearchResults, Show, TitlesPage, TypeFilter, User};
use crate::watchlist::WatchlistClient;

const LOAD_SHOWS_FAILED: &str = "Failed to load shows";
const LOAD_WATCHLIST_FAILED: &str = "Failed to load watchlist";
const SEARCH_FAILED: &str = "Search failed";
const EMPTY_WATCHLIST: &str = "Nothing in watchlist";

/// Number of pages needed for `total_items`, never less than one.
pub fn total_pages(total_items: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    let pages = total_items.div_ceil(limit).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Shows whose title contains `term`, ignoring case.
///
/// An empty (or whitespace-only) term keeps everything.
pub fn filter_by_title(shows: &[Show], term: &str) -> Vec<Show> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return shows.to_vec();
    }
    shows
        .iter()
        .filter(|show| show.title.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// Shows passing `filter`.
pub fn filter_by_type(shows: &[Show], filter: TypeFilter) -> Vec<Show> {
    shows.iter().filter(|show| filter.matches(show)).cloned().collect()
}

/// What the home screen renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowseView {
    pub search_term: String,
    pub type_filter: TypeFilter,
    /// Current page (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    pub shows: Vec<Show>,
    pub total_items: u64,
    /// Zero only after an empty result; otherwise at least one
    pub total_pages: u32,
    /// The last query succeeded with nothing to show
    pub no_results: bool,
    pub showing_watchlist: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub user_age: u32,
    /// Avatar letter for the signed-in user
    pub initial_letter: String,
}

impl BrowseView {
    fn new(limit: u32) -> Self {
        Self {
            search_term: String::new(),
            type_filter: TypeFilter::All,
            page: 1,
            limit: limit.max(1),
            shows: Vec::new(),
            total_items: 0,
            total_pages: 0,
            no_results: false,
            showing_watchlist: false,
            loading: true,
            error: None,
            user_age: 0,
            initial_letter: String::new(),
        }
    }

    fn query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
            type_filter: self.type_filter,
            age: self.user_age,
        }
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
        self.no_results = false;
    }

    /// Successful query with nothing in it
    fn set_empty(&mut self) {
        self.shows.clear();
        self.total_items = 0;
        self.total_pages = 0;
        self.no_results = true;
        self.loading = false;
    }

    fn set_failed(&mut self, err: &FletnixError, fallback: &str) {
        error!(error = %err, "{}", fallback);
        self.error = Some(err.user_message(fallback));
        self.loading = false;
        self.no_results = false;
        self.shows.clear();
    }

    /// Show a locally derived subset of the watchlist as a single page
    fn set_local(&mut self, shows: Vec<Show>) {
        self.total_items = shows.len() as u64;
        self.total_pages = 1;
        self.no_results = shows.is_empty();
        self.shows = shows;
        self.loading = false;
    }

    fn apply_titles(&mut self, page: TitlesPage) {
        let data = match page.data {
            Some(data) if !data.is_empty() => data,
            _ => return self.set_empty(),
        };
        self.total_items = if page.total > 0 {
            page.total
        } else {
            data.len() as u64
        };
        self.total_pages = total_pages(self.total_items, self.limit);
        self.shows = data;
        self.no_results = false;
        self.loading = false;
    }

    fn apply_search(&mut self, response: SearchResults) {
        let results = match response.results {
            Some(results) if !results.is_empty() => results,
            _ => return self.set_empty(),
        };
        self.total_items = response
            .count
            .filter(|count| *count > 0)
            .unwrap_or(results.len() as u64);
        self.total_pages = total_pages(self.total_items, self.limit);
        self.shows = results;
        self.page = 1;
        self.no_results = false;
        self.loading = false;
    }

    fn apply_watchlist(&mut self, shows: Vec<Show>) {
        if shows.is_empty() {
            self.set_empty();
            // The watchlist view is always a single page.
            self.total_pages = 1;
            self.error = Some(EMPTY_WATCHLIST.to_string());
            return;
        }
        self.total_items = shows.len() as u64;
        self.total_pages = 1;
        self.shows = shows;
        self.no_results = false;
        self.loading = false;
    }
}

struct Inner {
    view: BrowseView,
    user: User,
    /// Last watchlist fetched from the server
    watchlist: Vec<Show>,
    /// Bumped by every action that changes the displayed set
    generation: u64,
    /// Bumped by every watchlist fetch
    watchlist_generation: u64,
}

/// Home screen controller
///
/// All methods take `&self`; state sits behind a mutex that is never held
/// across a request, so a frontend may fire actions concurrently. Remote
/// failures never surface as `Err`: they are logged and recorded in the
/// returned [`BrowseView`].
pub struct BrowseController {
    catalog: CatalogClient,
    watchlist: WatchlistClient,
    session: Session,
    inner: Mutex<Inner>,
}

impl BrowseController {
    pub fn new(catalog: CatalogClient, watchlist: WatchlistClient, session: Session, limit: u32) -> Self {
        Self {
            catalog,
            watchlist,
            session,
            inner: Mutex::new(Inner {
                view: BrowseView::new(limit),
                user: User::default(),
                watchlist: Vec::new(),
                generation: 0,
                watchlist_generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a remote action; returns the generation it runs under
    fn begin(inner: &mut Inner) -> u64 {
        inner.generation += 1;
        inner.view.begin();
        inner.generation
    }

    /// Start a local action, superseding any pending remote one
    fn supersede(inner: &mut Inner) {
        inner.generation += 1;
    }

    /// Re-lock and check `generation` is still current
    fn finish(&self, generation: u64, action: &str) -> Option<MutexGuard<'_, Inner>> {
        let inner = self.lock();
        if inner.generation != generation {
            debug!(action, generation, current = inner.generation, "discarding stale response");
            return None;
        }
        Some(inner)
    }

    /// Current view
    pub fn snapshot(&self) -> BrowseView {
        self.lock().view.clone()
    }

    /// Read the session user, then load page 1 of the catalog and the
    /// user's watchlist.
    pub async fn initialize(&self) -> BrowseView {
        let query = {
            let mut inner = self.lock();
            let user = self.session.user().unwrap_or_default();
            inner.view.user_age = user.age;
            inner.view.initial_letter = user.initial_letter();
            inner.view.page = 1;
            inner.view.type_filter = TypeFilter::All;
            inner.watchlist = user.watchlist.clone();
            inner.user = user;
            inner.view.query()
        };

        tokio::join!(self.load_page(query), self.refresh_watchlist());
        self.snapshot()
    }

    /// Load one page of the catalog.
    ///
    /// Ignored while the watchlist is shown; that view is a single page.
    pub async fn load_page(&self, query: PageQuery) -> BrowseView {
        let generation = {
            let mut inner = self.lock();
            if inner.view.showing_watchlist {
                return inner.view.clone();
            }
            inner.view.page = query.page.max(1);
            inner.view.limit = query.limit.max(1);
            inner.view.type_filter = query.type_filter;
            inner.view.user_age = query.age;
            Self::begin(&mut inner)
        };
        let query = PageQuery {
            page: query.page.max(1),
            limit: query.limit.max(1),
            ..query
        };

        let result = self.catalog.list_titles(&query).await;

        let Some(mut inner) = self.finish(generation, "load_page") else {
            return self.snapshot();
        };
        match result {
            Ok(page) => inner.view.apply_titles(page),
            Err(e) => inner.view.set_failed(&e, LOAD_SHOWS_FAILED),
        }
        inner.view.clone()
    }

    /// Reload the catalog from page 1 with the current filter.
    async fn load_first_page(&self) -> BrowseView {
        let query = {
            let inner = self.lock();
            PageQuery {
                page: 1,
                ..inner.view.query()
            }
        };
        self.load_page(query).await
    }

    /// Refresh the cached watchlist without touching the displayed set.
    async fn refresh_watchlist(&self) {
        let (email, generation) = {
            let mut inner = self.lock();
            if inner.user.email.is_empty() {
                return;
            }
            inner.watchlist_generation += 1;
            (inner.user.email.clone(), inner.watchlist_generation)
        };

        let result = self.watchlist.get(&email).await;

        let mut inner = self.lock();
        if inner.watchlist_generation != generation {
            debug!(generation, "discarding stale watchlist");
            return;
        }
        match result {
            Ok(shows) => inner.watchlist = shows,
            Err(e) => {
                warn!(error = %e, "{}", LOAD_WATCHLIST_FAILED);
                inner.watchlist.clear();
            }
        }
    }

    async fn fetch_watchlist(&self, email: &str) -> Result<Vec<Show>> {
        if email.is_empty() {
            return Ok(Vec::new());
        }
        self.watchlist.get(email).await
    }

    /// Switch between the catalog and the watchlist.
    ///
    /// Entering the watchlist fetches it afresh and shows it as one page;
    /// an empty watchlist sets both `no_results` and the error
    /// "Nothing in watchlist". Leaving reloads catalog page 1.
    pub async fn toggle_watchlist_view(&self) -> BrowseView {
        let entering = {
            let mut inner = self.lock();
            inner.view.showing_watchlist = !inner.view.showing_watchlist;
            inner.view.showing_watchlist
        };
        if !entering {
            return self.load_first_page().await;
        }

        let (email, generation, watchlist_generation) = {
            let mut inner = self.lock();
            inner.watchlist_generation += 1;
            inner.view.page = 1;
            let generation = Self::begin(&mut inner);
            (inner.user.email.clone(), generation, inner.watchlist_generation)
        };

        let result = self.fetch_watchlist(&email).await;

        // The cache follows the freshest fetch even when the view moved on.
        if let Ok(shows) = &result {
            let mut inner = self.lock();
            if inner.watchlist_generation == watchlist_generation {
                inner.watchlist = shows.clone();
            }
        }

        let Some(mut inner) = self.finish(generation, "toggle_watchlist_view") else {
            return self.snapshot();
        };
        match result {
            Ok(shows) => inner.view.apply_watchlist(shows),
            Err(e) => inner.view.set_failed(&e, LOAD_WATCHLIST_FAILED),
        }
        inner.view.clone()
    }

    /// Search by title.
    ///
    /// In watchlist mode the cached watchlist is filtered locally. Otherwise
    /// an empty term reloads catalog page 1 and any other term is sent to
    /// the server trimmed and lower-cased.
    pub async fn search(&self, term: &str) -> BrowseView {
        let query = term.trim().to_lowercase();

        let generation = {
            let mut inner = self.lock();
            inner.view.search_term = term.to_string();

            if inner.view.showing_watchlist {
                Self::supersede(&mut inner);
                let shows = filter_by_title(&inner.watchlist, &query);
                inner.view.set_local(shows);
                return inner.view.clone();
            }
            if query.is_empty() {
                None
            } else {
                Some((Self::begin(&mut inner), inner.view.user_age))
            }
        };

        let Some((generation, age)) = generation else {
            return self.load_first_page().await;
        };

        let result = self.catalog.search_titles(&query, age).await;

        let Some(mut inner) = self.finish(generation, "search") else {
            return self.snapshot();
        };
        match result {
            Ok(results) => inner.view.apply_search(results),
            Err(e) => inner.view.set_failed(&e, SEARCH_FAILED),
        }
        inner.view.clone()
    }

    /// Filter by content type.
    ///
    /// In watchlist mode the cached watchlist is filtered locally; otherwise
    /// the catalog is reloaded from page 1.
    pub async fn filter_by_type(&self, filter: TypeFilter) -> BrowseView {
        {
            let mut inner = self.lock();
            inner.view.type_filter = filter;

            if inner.view.showing_watchlist {
                Self::supersede(&mut inner);
                let shows = filter_by_type(&inner.watchlist, filter);
                inner.view.set_local(shows);
                return inner.view.clone();
            }
        }
        self.load_first_page().await
    }

    /// Advance one page; no-op on the last page and in watchlist mode.
    pub async fn next_page(&self) -> BrowseView {
        let query = {
            let inner = self.lock();
            if inner.view.showing_watchlist || inner.view.page >= inner.view.total_pages {
                return inner.view.clone();
            }
            PageQuery {
                page: inner.view.page + 1,
                ..inner.view.query()
            }
        };
        self.load_page(query).await
    }

    /// Go back one page; no-op on the first page and in watchlist mode.
    pub async fn previous_page(&self) -> BrowseView {
        let query = {
            let inner = self.lock();
            if inner.view.showing_watchlist || inner.view.page <= 1 {
                return inner.view.clone();
            }
            PageQuery {
                page: inner.view.page - 1,
                ..inner.view.query()
            }
        };
        self.load_page(query).await
    }

    /// Whether `show` is in the cached watchlist, by identifier.
    pub fn is_in_watchlist(&self, show: &Show) -> bool {
        self.lock()
            .watchlist
            .iter()
            .any(|item| item.show_id == show.show_id)
    }

    /// Cached watchlist
    pub fn watchlist(&self) -> Vec<Show> {
        self.lock().watchlist.clone()
    }
}
