// Bearer-token auth: JWT issue/verify, bcrypt hashing, the `AuthUser`
// extractor that gates private routes, and the account handlers.

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod token;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::handle_register))
        .route("/login", post(handlers::handle_login))
        .route(
            "/profile",
            get(handlers::handle_get_profile).put(handlers::handle_update_profile),
        )
}
