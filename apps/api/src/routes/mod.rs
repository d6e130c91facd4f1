pub mod health;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::middleware::{rate_limit_middleware, security_headers, RateLimit};
use crate::state::AppState;
use crate::{applications, auth, jobs, resume};

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Everything under `/api` is rate limited per client IP.
pub fn build_router(state: AppState, rate_limit: RateLimit) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_handler))
        .nest("/auth", auth::router())
        .nest("/jobs", jobs::router())
        .nest("/applications", applications::router())
        .nest("/resume", resume::router())
        .layer(middleware::from_fn_with_state(rate_limit, rate_limit_middleware));

    Router::new()
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
