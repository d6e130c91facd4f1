// Job applications and their status lifecycle.

pub mod handlers;
pub mod lifecycle;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::handle_list_mine).post(handlers::handle_apply),
        )
        .route(
            "/:id",
            get(handlers::handle_get)
                .put(handlers::handle_update_status)
                .delete(handlers::handle_withdraw),
        )
}
