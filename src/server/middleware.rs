//! Boundary middleware: API key, rate limiting, security headers, CORS.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use log::warn;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::{BoundaryConfig, API_KEY_HEADER};
use crate::server::{ApiError, AppState};

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Client table size above which expired entries are swept
const SWEEP_THRESHOLD: usize = 4096;

/// Rejects requests whose `X-API-Key` does not match, when a key is configured.
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, ApiError> {
    if let Some(expected) = state.api_key.as_deref() {
        let given = req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
        if given != Some(expected) {
            warn!("rejected request with invalid or missing {}", API_KEY_HEADER);
            return Err(ApiError::Unauthorized);
        }
    }
    Ok(next.run(req).await)
}

/// Per-client fixed-window limiting, when enabled.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, ApiError> {
    if let Some(limiter) = state.limiter.as_deref() {
        let ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        if let Err(e) = limiter.check(ip, Instant::now()) {
            warn!("rate limit hit for {}: {} per {}", ip, e.limit, e.scope);
            return Err(ApiError::RateLimited {
                limit: e.limit,
                scope: e.scope,
                retry_after_secs: e.retry_after.as_secs(),
            });
        }
    }
    Ok(next.run(req).await)
}

/// Fixed security headers on every response.
pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut res = next.run(req).await;
    let headers = res.headers_mut();
    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("x-xss-protection", HeaderValue::from_static("1; mode=block"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    res
}

/// CORS for the configured allow-list.
pub fn cors_layer(config: &BoundaryConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) if v != "*" => Some(v),
            _ => {
                warn!("ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, HeaderName::from_static("x-api-key")])
        .allow_credentials(true)
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self { started: now, count: 0 }
    }

    fn roll(&mut self, now: Instant, len: Duration) {
        if now.duration_since(self.started) >= len {
            *self = Window::new(now);
        }
    }

    fn remaining(&self, now: Instant, len: Duration) -> Duration {
        len.saturating_sub(now.duration_since(self.started))
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientWindows {
    minute: Window,
    hour: Window,
}

/// Why a request was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitExceeded {
    pub limit: u32,
    pub scope: &'static str,
    pub retry_after: Duration,
}

/// Fixed-window request counter keyed by client address
#[derive(Debug)]
pub struct RateLimiter {
    per_minute: u32,
    per_hour: u32,
    clients: Mutex<HashMap<IpAddr, ClientWindows>>,
}

impl RateLimiter {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            per_minute,
            per_hour,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request from `ip` at `now`, or refuse it.
    ///
    /// Refused requests do not consume quota.
    pub fn check(&self, ip: IpAddr, now: Instant) -> Result<(), LimitExceeded> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if clients.len() > SWEEP_THRESHOLD {
            clients.retain(|_, w| now.duration_since(w.hour.started) < HOUR);
        }

        let entry = clients.entry(ip).or_insert_with(|| ClientWindows {
            minute: Window::new(now),
            hour: Window::new(now),
        });
        entry.minute.roll(now, MINUTE);
        entry.hour.roll(now, HOUR);

        if entry.minute.count >= self.per_minute {
            return Err(LimitExceeded {
                limit: self.per_minute,
                scope: "minute",
                retry_after: entry.minute.remaining(now, MINUTE),
            });
        }
        if entry.hour.count >= self.per_hour {
            return Err(LimitExceeded {
                limit: self.per_hour,
                scope: "hour",
                retry_after: entry.hour.remaining(now, HOUR),
            });
        }

        entry.minute.count += 1;
        entry.hour.count += 1;
        Ok(())
    }
}
