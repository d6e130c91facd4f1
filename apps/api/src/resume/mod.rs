// Resume files on local disk and the handlers that keep each user's single
// resume reference in step with them.

pub mod handlers;
pub mod service;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Headroom over the file limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(handlers::handle_upload)
                .layer(DefaultBodyLimit::max(storage::MAX_RESUME_BYTES + MULTIPART_OVERHEAD)),
        )
        .route("/", get(handlers::handle_get).delete(handlers::handle_delete))
}
