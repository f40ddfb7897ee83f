//! Router configuration for the web server.

use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use super::handlers;
use super::middleware::{cors_layer, handle_panic, json_error_body, request_logger};
use super::AppState;

/// Upper bound on handling a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/create", post(handlers::create_collections))
        .route("/getbyorigin", get(handlers::get_by_origin))
        .route("/getbytimerange", post(handlers::get_by_time_range))
        .route("/origins", get(handlers::list_origins))
        .route("/health", get(handlers::health))
        // Applied in reverse order: the last layer added runs first.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(middleware::map_response(json_error_body))
        .layer(cors_layer())
        .layer(middleware::from_fn(request_logger))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
