mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod jobs;
mod middleware;
mod models;
mod ownership;
mod resume;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::middleware::{cors_layer, RateLimit};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Board API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL, with migrations applied
    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    let state = AppState::new(store, &config);
    state.resumes.ensure_dir().await.with_context(|| {
        format!(
            "Could not create upload directory {}",
            state.resumes.dir().display()
        )
    })?;
    info!("Storing resumes under {}", state.resumes.dir().display());

    let rate_limit = RateLimit::from_config(&config)?;
    info!(
        "Rate limit: {} requests per {}s per client IP (trust proxy: {})",
        config.rate_limit_max, config.rate_limit_window_secs, config.trust_proxy
    );

    let app = build_router(state, rate_limit).layer(cors_layer(&config.client_url)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
