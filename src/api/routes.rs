use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

/// Room for multipart boundaries and the text fields around the file part.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize + MULTIPART_OVERHEAD;

    Router::new()
        // Public
        .route("/courses", get(handlers::list_courses))
        .route("/files/:course", get(handlers::list_course_files))
        // Admin (unauthenticated)
        .route("/admin/add-course", post(handlers::add_course))
        .route("/admin/add-file", post(handlers::add_file))
        .route(
            "/admin/upload-file",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/admin/delete-file/:id", delete(handlers::delete_file))
        .route("/admin/delete-course/:id", delete(handlers::delete_course))
        // Uploaded content (read-only)
        .route("/uploads/:key", get(handlers::serve_upload))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
