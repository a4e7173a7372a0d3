//! Router configuration for the STASH HTTP layer.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, download, login, public_files, register, search, share, toggle_visibility,
    upload, AppState,
};

/// Build the CORS layer.
///
/// An empty origin list allows any origin, matching the open default of the
/// service's dashboard deployment.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Create the application router.
pub fn create_router(
    state: Arc<AppState>,
    cors_origins: &[String],
    max_upload_bytes: usize,
) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/upload", post(upload))
        .route("/files", get(search))
        .route("/files/share", post(share))
        .route("/files/toggle-visibility", post(toggle_visibility))
        .route("/files/:filename", get(download).delete(delete_file))
        .route("/public-files", get(public_files))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                // Leave headroom for multipart framing around the payload
                .layer(DefaultBodyLimit::max(max_upload_bytes + 64 * 1024)),
        )
        .with_state(state)
}
