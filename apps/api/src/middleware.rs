//! Cross-cutting HTTP layers: per-IP rate limiting, CORS and security headers.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderName, HeaderValue, Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::config::Config;
use crate::errors::AppError;

pub type IpRateLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// Tracked IPs above which stale limiter state is pruned.
const MAX_TRACKED_IPS: usize = 10_000;

/// Keyed limiter plus the rule for deciding which address a request is from.
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<IpRateLimiter>,
    trust_proxy: bool,
}

impl RateLimit {
    /// `max` requests per `window`, refilled one cell at a time.
    pub fn new(max: u32, window: Duration, trust_proxy: bool) -> Result<Self> {
        let burst =
            NonZeroU32::new(max).ok_or_else(|| anyhow!("RATE_LIMIT_MAX must be positive"))?;
        let quota = Quota::with_period(window / max)
            .ok_or_else(|| anyhow!("RATE_LIMIT_WINDOW_SECS must be positive"))?
            .allow_burst(burst);
        Ok(Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            trust_proxy,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
            config.trust_proxy,
        )
    }

    /// Takes one cell for `ip`; false once its quota is spent.
    pub fn check(&self, ip: IpAddr) -> bool {
        if self.limiter.len() > MAX_TRACKED_IPS {
            self.limiter.retain_recent();
        }
        self.limiter.check_key(&ip).is_ok()
    }
}

/// Rejects requests from an IP that has exhausted its quota.
/// Requests with no identifiable client IP are let through.
pub async fn rate_limit_middleware(
    State(limit): State<RateLimit>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(ip) = client_ip(&request, limit.trust_proxy) {
        if !limit.check(ip) {
            warn!(ip = %ip, path = request.uri().path(), "Rate limit exceeded");
            return AppError::TooManyRequests.into_response();
        }
    }
    next.run(request).await
}

/// The socket peer address. With `trust_proxy` the first hop of
/// `X-Forwarded-For`, then `X-Real-IP`, take precedence over it.
pub fn client_ip<B>(request: &Request<B>, trust_proxy: bool) -> Option<IpAddr> {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(request) {
            return Some(ip);
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
}

fn forwarded_ip<B>(request: &Request<B>) -> Option<IpAddr> {
    let headers = request.headers();
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|ip| ip.trim().parse().ok())
        })
}

/// CORS for the single configured browser origin, with credentials.
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("CLIENT_URL '{origin}' is not a valid origin"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600)))
}

const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "0"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("x-permitted-cross-domain-policies", "none"),
];

pub async fn security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    response
}
