//! Health check handler.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::cache::CacheHealth;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache: CacheHealth,
    pub bulk_workers: usize,
}

/// Basic health check endpoint: GET /health
///
/// Always 200 while the process serves requests; a degraded cache shows up
/// in the body, since every route keeps working without it.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let cache = state.cache.health().await;
    let status = if cache.healthy { "ok" } else { "degraded" };
    Json(HealthResponse {
        status,
        cache,
        bulk_workers: state.bulk.in_flight(),
    })
}
