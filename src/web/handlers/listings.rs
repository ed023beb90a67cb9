//! Exam listing and notification handlers.
//!
//! Each listing route caches only its own view. `refresh` (any value)
//! skips the cache read but still writes the fresh view through.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use crate::cache::keys;
use crate::error::Result;
use crate::models::ListingSet;
use crate::web::response::{raw_json, to_json};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RefreshParams {
    pub refresh: Option<String>,
}

impl RefreshParams {
    fn requested(&self) -> bool {
        self.refresh.is_some()
    }
}

/// Which view of the listing a route serves.
#[derive(Debug, Clone, Copy)]
enum View {
    All,
    Regular,
    Supply,
    Unordered,
}

impl View {
    fn key(self) -> &'static str {
        match self {
            View::All => keys::ALL_EXAMS,
            View::Regular => keys::ALL_REGULAR,
            View::Supply => keys::ALL_SUPPLY,
            View::Unordered => keys::ALL_UNORDERED,
        }
    }

    /// Serialized view and whether it has no entries.
    fn render(self, listing: &ListingSet) -> Result<(String, bool)> {
        let (body, empty) = match self {
            View::All => (to_json(&listing.all)?, listing.all.is_empty()),
            View::Regular => (to_json(&listing.regular)?, listing.regular.is_empty()),
            View::Supply => (to_json(&listing.supply)?, listing.supply.is_empty()),
            View::Unordered => (to_json(&listing.unordered)?, listing.unordered.is_empty()),
        };
        Ok((body, empty))
    }
}

async fn serve_view(state: &AppState, view: View, refresh: bool) -> Result<Response> {
    let key = view.key();
    if !refresh && let Some(raw) = state.cache.get(key).await {
        debug!(key, "Listing cache hit");
        return Ok(raw_json(raw));
    }

    let listing = state.listings.fetch_listings().await?;
    let (body, empty) = view.render(&listing)?;
    if empty {
        debug!(key, "Empty listing view, not caching");
    } else {
        state.cache.set(key, &body, state.config.ttl.listing()).await;
    }
    Ok(raw_json(body))
}

/// GET /new/all
pub async fn all_exams(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RefreshParams>,
) -> Result<Response> {
    serve_view(&state, View::All, params.requested()).await
}

/// GET /new/all/regular
pub async fn regular_exams(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RefreshParams>,
) -> Result<Response> {
    serve_view(&state, View::Regular, params.requested()).await
}

/// GET /new/all/supply
pub async fn supply_exams(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RefreshParams>,
) -> Result<Response> {
    serve_view(&state, View::Supply, params.requested()).await
}

/// GET /new/
pub async fn unordered_exams(State(state): State<Arc<AppState>>) -> Result<Response> {
    serve_view(&state, View::Unordered, false).await
}

/// GET /notifications
///
/// Always fetched fresh; the cache entry is write-only.
pub async fn notifications(
    State(state): State<Arc<AppState>>,
    Query(_params): Query<RefreshParams>,
) -> Result<Response> {
    let notifications = state.listings.fetch_notifications().await?;
    let body = to_json(&notifications)?;
    if !notifications.is_empty() {
        state
            .cache
            .set(keys::NOTIFICATIONS, &body, state.config.ttl.listing())
            .await;
    }
    Ok(raw_json(body))
}
