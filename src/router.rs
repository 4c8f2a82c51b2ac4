use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Import job
        .route(
            "/api/jobs/import-device-type",
            post(handlers::jobs::import_device_type),
        )
        // Manufacturer routes
        .route("/api/manufacturers", get(handlers::device_types::list_manufacturers))
        // Device type routes
        .route("/api/device-types", get(handlers::device_types::list_device_types))
        .route("/api/device-types/:model", get(handlers::device_types::get_device_type))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
