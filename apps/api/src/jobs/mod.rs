// Job postings: public search, skill matching, and owner-only mutation.

pub mod handlers;
pub mod matching;
pub mod search;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::handle_list).post(handlers::handle_create))
        .route("/matched", get(handlers::handle_matched))
        .route(
            "/:id",
            get(handlers::handle_get)
                .put(handlers::handle_update)
                .delete(handlers::handle_delete),
        )
        .route("/:id/applications", get(handlers::handle_job_applications))
}
