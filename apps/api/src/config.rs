use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    pub bcrypt_cost: u32,
    pub client_url: String,
    pub upload_dir: PathBuf,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    /// Key rate limiting on `X-Forwarded-For` / `X-Real-IP` instead of the peer.
    pub trust_proxy: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_expires_in_days: token_lifetime_days(parse_env("JWT_EXPIRES_IN_DAYS", 30)?)?,
            bcrypt_cost: parse_env("BCRYPT_COST", 10)?,
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads/resumes")),
            rate_limit_max: parse_env("RATE_LIMIT_MAX", 100)?,
            rate_limit_window_secs: parse_env("RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
            trust_proxy: parse_env("TRUST_PROXY", false)?,
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Token lifetimes must be positive and land on a representable expiry date.
fn token_lifetime_days(days: i64) -> Result<i64> {
    if days <= 0 {
        bail!("JWT_EXPIRES_IN_DAYS must be positive, got {days}");
    }
    Duration::try_days(days)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .with_context(|| format!("JWT_EXPIRES_IN_DAYS {days} is out of range"))?;
    Ok(days)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
