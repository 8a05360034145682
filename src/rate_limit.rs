//! # rate_limit: Token bucket per client IP
//!
//! Applied to `/api/*` only; `/health` and `/ws` are never throttled.
//! Defaults allow a burst of 1000 requests refilled at 1000 per 15 minutes
//! (100 in production).  Buckets that have refilled are swept by the price
//! feed tick.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tracing::warn;

use crate::error::AppError;
use crate::state::SharedState;

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_update: Instant,
}

impl Bucket {
    fn full(capacity: u32) -> Self {
        Self {
            tokens: capacity as f64,
            last_update: Instant::now(),
        }
    }

    fn refilled(&self, now: Instant, capacity: u32, refill_rate: f64) -> f64 {
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        f64::min(capacity as f64, self.tokens + elapsed * refill_rate)
    }

    fn allow_request(&mut self, capacity: u32, refill_rate: f64) -> bool {
        let now = Instant::now();
        self.tokens = self.refilled(now, capacity, refill_rate);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    capacity: u32,
    refill_rate: f64,
}

impl RateLimiter {
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity,
            refill_rate: refill_rate.max(0.0),
        }
    }

    pub fn check(&self, key: &str) -> Result<(), AppError> {
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket::full(self.capacity));

        if bucket.allow_request(self.capacity, self.refill_rate) {
            Ok(())
        } else {
            Err(AppError::RateLimited(
                "Too many requests from this IP, please try again later.".to_string(),
            ))
        }
    }

    /// Forget clients whose bucket has refilled completely; a fresh full
    /// bucket is indistinguishable from one that was never created.
    pub fn prune_idle(&self) -> usize {
        let now = Instant::now();
        let capacity = self.capacity;
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| bucket.refilled(now, capacity, self.refill_rate) < capacity as f64);
        before.saturating_sub(self.buckets.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

/// Axum middleware: throttle `/api/*` by peer IP.
///
/// Requests without `ConnectInfo` (in-process tests) share the `"unknown"`
/// bucket.
pub async fn limit_api_requests(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with("/api/") {
        return next.run(request).await;
    }

    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match state.rate_limiter.check(&key) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            warn!(client = %key, path = request.uri().path(), "Rate limit exceeded");
            err.into_response()
        }
    }
}
