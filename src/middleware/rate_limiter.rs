use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderName,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::{error::AppError, state::AppState};

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Sliding window applied to credential routes
const WINDOW: Duration = Duration::from_secs(60);

/// Track request rates per IP address using sliding window
#[derive(Clone)]
pub struct RateLimiter {
    /// Map of IP -> list of request timestamps
    requests: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
    /// Last cleanup time
    last_cleanup: Arc<Mutex<Instant>>,
    /// Cleanup interval
    cleanup_interval: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
            cleanup_interval: WINDOW,
        }
    }

    /// Check if request is allowed under rate limit
    ///
    /// # Arguments
    ///
    /// * `ip` - Client IP address
    /// * `limit` - Maximum requests allowed in window
    /// * `window` - Time window
    ///
    /// # Returns
    ///
    /// True if request is allowed, False if rate limit exceeded
    pub async fn is_allowed(&self, ip: IpAddr, limit: usize, window: Duration) -> bool {
        let now = Instant::now();

        let mut requests = self.requests.lock().await;
        let timestamps = requests.entry(ip).or_default();

        // Drop requests that fell out of the window
        timestamps.retain(|&ts| now.duration_since(ts) < window);

        if timestamps.len() >= limit {
            return false;
        }

        timestamps.push(now);
        true
    }

    /// Remove stale IP entries to prevent memory leaks
    async fn cleanup_old_entries(&self) {
        let now = Instant::now();

        let mut last_cleanup = self.last_cleanup.lock().await;
        if now.duration_since(*last_cleanup) < self.cleanup_interval {
            return;
        }

        let mut requests = self.requests.lock().await;
        requests.retain(|_, timestamps| {
            timestamps
                .iter()
                .any(|&ts| now.duration_since(ts) < WINDOW)
        });

        *last_cleanup = now;
    }

    /// Number of IPs currently tracked
    pub async fn tracked_ips(&self) -> usize {
        self.requests.lock().await.len()
    }
}

/// Paths subject to rate limiting
///
/// Only the credential endpoints are limited; everything else is either
/// gated by a session or free to call.
fn is_rate_limited(path: &str) -> bool {
    matches!(path, "/login" | "/register")
}

/// Client address used as the limiter key
///
/// With `trust_forwarded_for` the left-most `X-Forwarded-For` entry wins, as
/// set by the reverse proxy in front of the service. Otherwise, or when the
/// header is absent or unparseable, the peer address is used. Requests with
/// neither (e.g. in-process tests) share one bucket.
fn client_ip(req: &Request, trust_forwarded_for: bool) -> IpAddr {
    let forwarded = trust_forwarded_for
        .then(|| req.headers().get(X_FORWARDED_FOR))
        .flatten()
        .and_then(|value| value.to_str().ok())
        .and_then(|list| list.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    forwarded
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Axum middleware limiting `/login` and `/register` per client IP
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if !is_rate_limited(req.uri().path()) {
        return next.run(req).await;
    }

    let ip = client_ip(&req, state.config.trust_forwarded_for);

    let limit = state.config.auth_rate_limit_per_minute;
    if !state.rate_limiter.is_allowed(ip, limit, WINDOW).await {
        tracing::warn!(%ip, path = req.uri().path(), "rate limit exceeded");
        return AppError::RateLimited.into_response();
    }

    state.rate_limiter.cleanup_old_entries().await;

    next.run(req).await
}
