use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenService;
use crate::config::Config;
use crate::resume::storage::ResumeStorage;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable persistence. `PgStore` in production.
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
    pub resumes: ResumeStorage,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            store,
            tokens: TokenService::new(&config.jwt_secret, config.jwt_expires_in_days),
            passwords: PasswordHasher::new(config.bcrypt_cost),
            resumes: ResumeStorage::new(config.upload_dir.clone()),
        }
    }
}
