//! # routes::market

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Local, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    market::{analytics, seed, session},
    state::SharedState,
};

const MOVERS_LIMIT: usize = 5;
const DEFAULT_NEWS_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    /// Raw so a bad value gets the JSON error body instead of Axum's
    /// plain-text rejection.
    pub limit: Option<String>,
}

/// GET /api/market/overview: session, indices, breadth and movers.
pub async fn overview(State(state): State<SharedState>) -> impl IntoResponse {
    let (summary, movers) = {
        let table = state.market.read().await;
        (analytics::market_summary(&table), analytics::movers(&table, MOVERS_LIMIT))
    };
    let indices = {
        let mut rng = StdRng::from_entropy();
        seed::mock_indices(&mut rng)
    };

    Json(json!({
        "success": true,
        "data": {
            "marketStatus":  session::status(Local::now().naive_local()),
            "indices":       indices,
            "marketSummary": summary,
            "topGainers":    movers.top_gainers,
            "topLosers":     movers.top_losers,
            "mostActive":    movers.most_active,
        },
        "timestamp": Utc::now(),
    }))
}

/// GET /api/market/sectors
pub async fn sectors(State(state): State<SharedState>) -> impl IntoResponse {
    let sectors = analytics::sector_performance(&*state.market.read().await);

    Json(json!({
        "success":   true,
        "data":      sectors,
        "timestamp": Utc::now(),
    }))
}

/// GET /api/market/news?limit=10
pub async fn news(Query(query): Query<NewsQuery>) -> Result<impl IntoResponse, AppError> {
    let limit = match query.limit.as_deref() {
        None => DEFAULT_NEWS_LIMIT,
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            AppError::BadRequest(format!("limit must be a non-negative integer, got '{raw}'"))
        })?,
    };

    let mut items = seed::news_feed(Utc::now());
    items.truncate(limit);

    Ok(Json(json!({
        "success":   true,
        "data":      items,
        "total":     items.len(),
        "timestamp": Utc::now(),
    })))
}
