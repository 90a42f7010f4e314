//! Tauri commands for the Fletnix client
//!
//! This module contains all Tauri commands that can be invoked from the frontend.
//! Controllers absorb remote failures into their views, so most commands only
//! fail when their screen is not open.

use tauri::State;

use crate::AppState;
use fletnix_core::{AuthOutcome, BrowseView, DetailView, PageQuery, Route, Show, TypeFilter};

/// Resolve a path to a screen, applying the session gate.
#[tauri::command]
pub fn resolve_route(state: State<'_, AppState>, path: String) -> Route {
    fletnix_core::resolve(&path, state.session().is_present())
}

/// Sign in.
///
/// # Returns
/// The form message and, on success, the route to navigate to.
#[tauri::command]
pub async fn login(
    state: State<'_, AppState>,
    email: String,
    password: String,
) -> Result<AuthOutcome, String> {
    Ok(state.authenticator().login(&email, &password).await)
}

/// Create an account.
#[tauri::command]
pub async fn register(
    state: State<'_, AppState>,
    email: String,
    password: String,
    age: Option<u32>,
) -> Result<AuthOutcome, String> {
    Ok(state.authenticator().register(&email, &password, age).await)
}

/// Clear the session and close all screens.
#[tauri::command]
pub async fn logout(state: State<'_, AppState>) -> Result<Route, String> {
    state.close_screens().await;
    state.authenticator().logout().map_err(|e| e.to_string())
}

/// Open the home screen: read the session, load catalog page 1 and the watchlist.
#[tauri::command]
pub async fn open_home(state: State<'_, AppState>) -> Result<BrowseView, String> {
    let browse = state.open_browse().await;
    Ok(browse.initialize().await)
}

/// Load an explicit catalog page.
#[tauri::command]
pub async fn load_page(
    state: State<'_, AppState>,
    query: PageQuery,
) -> Result<BrowseView, String> {
    let browse = state.browse().await?;
    Ok(browse.load_page(query).await)
}

/// Search titles (locally while the watchlist is shown).
#[tauri::command]
pub async fn search(state: State<'_, AppState>, term: String) -> Result<BrowseView, String> {
    let browse = state.browse().await?;
    Ok(browse.search(&term).await)
}

/// Filter by content type.
#[tauri::command]
pub async fn filter_by_type(
    state: State<'_, AppState>,
    type_filter: TypeFilter,
) -> Result<BrowseView, String> {
    let browse = state.browse().await?;
    Ok(browse.filter_by_type(type_filter).await)
}

/// Next catalog page.
#[tauri::command]
pub async fn next_page(state: State<'_, AppState>) -> Result<BrowseView, String> {
    let browse = state.browse().await?;
    Ok(browse.next_page().await)
}

/// Previous catalog page.
#[tauri::command]
pub async fn previous_page(state: State<'_, AppState>) -> Result<BrowseView, String> {
    let browse = state.browse().await?;
    Ok(browse.previous_page().await)
}

/// Switch between catalog and watchlist.
#[tauri::command]
pub async fn toggle_watchlist_view(state: State<'_, AppState>) -> Result<BrowseView, String> {
    let browse = state.browse().await?;
    Ok(browse.toggle_watchlist_view().await)
}

/// Watchlist badge for a card on the home screen.
#[tauri::command]
pub async fn is_in_watchlist(state: State<'_, AppState>, show: Show) -> Result<bool, String> {
    let browse = state.browse().await?;
    Ok(browse.is_in_watchlist(&show))
}

/// Open the detail screen for one title.
#[tauri::command]
pub async fn open_details(
    state: State<'_, AppState>,
    show_id: String,
) -> Result<DetailView, String> {
    let detail = state.open_detail().await;
    Ok(detail.initialize(&show_id).await)
}

/// Add or remove the title from the watchlist.
#[tauri::command]
pub async fn toggle_watchlist(
    state: State<'_, AppState>,
    show: Show,
) -> Result<DetailView, String> {
    let detail = state.detail().await?;
    Ok(detail.toggle_watchlist(&show).await)
}
