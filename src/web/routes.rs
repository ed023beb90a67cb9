//! Route definitions, grouped by functionality.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::web::{handlers, state::AppState};

/// Landing page and health.
pub fn meta_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index::landing_page))
        .route("/health", get(handlers::health::health_check))
}

/// Single-student result lookups.
pub fn result_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{hallticket}/{dob}/{year}", get(handlers::results::year_result))
        .route(
            "/calculate/{hallticket}/{dob}/{year}",
            get(handlers::results::calculated_year_result),
        )
        .route("/result", get(handlers::results::year_result_query))
        .route("/api", get(handlers::results::exam_result))
        .route("/api/calculate", get(handlers::results::calculated_exam_result))
        .route("/all-r18/{hallticket}", get(handlers::results::all_results))
}

/// Range fetches over contiguous halltickets.
pub fn bulk_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/bulk/calculate", get(handlers::bulk::bulk_calculate))
}

/// Exam listings and notifications.
pub fn listing_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/new/all", get(handlers::listings::all_exams))
        .route("/new/all/regular", get(handlers::listings::regular_exams))
        .route("/new/all/supply", get(handlers::listings::supply_exams))
        .route("/new/", get(handlers::listings::unordered_exams))
        .route("/notifications", get(handlers::listings::notifications))
}
