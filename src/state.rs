//! # state
//!
//! The shared application state: one owned object handed to every Axum
//! handler (via `axum::extract::State`) and to the price-feed task.  Nothing
//! lives in globals.
//!
//! * `market`: the symbol table.  The feed is the only writer; REST
//!   handlers take short read guards.
//! * `broadcaster`: the WebSocket listener registry, with its own lock so
//!   fan-out never contends with table reads.

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::engine::broadcaster::Broadcaster;
use crate::engine::mutator::PriceMutator;
use crate::market::{seed, MarketTable};
use crate::models::Prediction;
use crate::rate_limit::RateLimiter;

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    // ── Market ────────────────────────────────────────────────────────────────
    pub market: Arc<RwLock<MarketTable>>,
    /// Latest prediction per symbol; replaced by `POST …/generate`.
    pub predictions: Arc<RwLock<HashMap<String, Prediction>>>,
    pub mutator: Arc<PriceMutator>,

    // ── Live feed ─────────────────────────────────────────────────────────────
    pub broadcaster: Arc<Broadcaster>,

    // ── HTTP ──────────────────────────────────────────────────────────────────
    pub rate_limiter: Arc<RateLimiter>,

    // ── Metrics ───────────────────────────────────────────────────────────────
    pub tick_count: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl AppState {
    /// Seed the market and wire up every component from `config`.
    pub fn new(config: AppConfig) -> Self {
        let mut rng = StdRng::from_entropy();
        let market = seed::seed_market(&mut rng, config.history_window, Utc::now());

        Self {
            market:       Arc::new(RwLock::new(market)),
            predictions:  Arc::new(RwLock::new(seed::seed_predictions())),
            mutator:      Arc::new(PriceMutator::new(config.tick_band_pct, config.history_window)),
            broadcaster:  Arc::new(Broadcaster::new(config.listener_queue)),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_burst, config.rate_limit_per_sec)),
            tick_count:   Arc::new(AtomicU64::new(0)),
            started_at:   Instant::now(),
            config:       Arc::new(config),
        }
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(config: AppConfig) -> SharedState {
    Arc::new(AppState::new(config))
}
