//! HTTP surface of the result server.
//!
//! Every route is a GET. Success bodies keep the shapes clients already
//! depend on (`{"data": ...}` for single results, bare arrays and objects
//! elsewhere); every error is `{"error": message}` with a typed status.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use state::AppState;

/// Create the web application with all routes and middleware.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let common_middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(state.config.server.request_timeout_ms),
        ))
        .layer(cors);

    let app = Router::new()
        .merge(routes::meta_routes())
        .merge(routes::result_routes())
        .merge(routes::bulk_routes())
        .merge(routes::listing_routes())
        .layer(common_middleware)
        .with_state(state);

    info!("Web application created with all routes and middleware");
    app
}
