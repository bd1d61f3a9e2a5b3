//! HTTP route definitions

use crate::{handlers, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Service endpoints
        .route(
            "/s3",
            get(handlers::list_buckets).post(handlers::create_object),
        )
        // Object content (the "file" prefix keeps it apart from presign)
        .route("/s3/file/{bucket}/{key}", get(handlers::download_object))
        // Bucket endpoints
        .route("/s3/{bucket}/files", get(handlers::list_objects))
        .route("/s3/{bucket}", delete(handlers::teardown_bucket))
        // Object endpoints
        .route(
            "/s3/{bucket}/{key}",
            get(handlers::presign_download)
                .put(handlers::replace_object)
                .delete(handlers::delete_object),
        )
        // Apply middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}
