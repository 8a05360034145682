//! # routes::health

use std::sync::atomic::Ordering;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::state::SharedState;

/// GET /health: liveness plus a few feed counters.  Never rate limited.
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let listeners = state.broadcaster.len().await;

    Json(json!({
        "status":      "healthy",
        "timestamp":   Utc::now(),
        "uptime":      state.started_at.elapsed().as_secs_f64(),
        "environment": state.config.environment,
        "version":     env!("CARGO_PKG_VERSION"),
        "tickCount":   state.tick_count.load(Ordering::Relaxed),
        "listeners":   listeners,
        "trackedClients": state.rate_limiter.tracked_clients(),
    }))
}
