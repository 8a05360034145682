//! # routes::stocks
//!
//! Read-only views of the live symbol table.  None of these handlers touch
//! prices; the feed is the only writer.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    market::analytics::{trend, volatility},
    models::HistoryPeriod,
    routes::{companies::CompanyDetail, normalize_symbol},
    state::SharedState,
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub period: Option<String>,
    pub interval: Option<String>,
}

/// GET /api/stocks
pub async fn list_stocks(State(state): State<SharedState>) -> impl IntoResponse {
    let rows = state.market.read().await.rows();

    Json(json!({
        "success":   true,
        "data":      rows,
        "total":     rows.len(),
        "timestamp": Utc::now(),
    }))
}

/// GET /api/stocks/:symbol
pub async fn get_stock(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    let table = state.market.read().await;

    let (company, stock) = table
        .company(&symbol)
        .zip(table.get(&symbol))
        .ok_or_else(|| AppError::NotFound("Stock not found".into()))?;

    Ok(Json(json!({
        "success":   true,
        "data":      CompanyDetail::new(company, stock),
        "timestamp": Utc::now(),
    })))
}

/// GET /api/stocks/:symbol/history?period=30d&interval=1d
///
/// `interval` is echoed back only; bars are always daily-ish ticks.
pub async fn get_history(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    let period_label = query.period.unwrap_or_else(|| "30d".to_string());
    let interval = query.interval.unwrap_or_else(|| "1d".to_string());
    let cutoff = HistoryPeriod::parse(&period_label).cutoff(Utc::now());

    let table = state.market.read().await;
    let stock = table
        .get(&symbol)
        .ok_or_else(|| AppError::NotFound("Stock not found".into()))?;
    let history = stock.history_since(cutoff);

    Ok(Json(json!({
        "success": true,
        "data": {
            "symbol":   symbol,
            "period":   period_label,
            "interval": interval,
            "history":  history,
        },
        "timestamp": Utc::now(),
    })))
}

/// GET /api/stocks/:symbol/quote: price block plus derived indicators.
pub async fn get_quote(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    let table = state.market.read().await;

    let (company, stock) = table
        .company(&symbol)
        .zip(table.get(&symbol))
        .ok_or_else(|| AppError::NotFound("Stock not found".into()))?;
    let closes = stock.closes();

    Ok(Json(json!({
        "success": true,
        "data": {
            "symbol":        stock.symbol,
            "name":          company.name,
            "currentPrice":  stock.current_price,
            "change":        stock.change,
            "changePercent": stock.change_percent,
            "volume":        stock.volume,
            "weekHigh":      stock.week_high,
            "weekLow":       stock.week_low,
            "marketCap":     company.market_cap,
            "trend":         trend(&closes),
            "volatility":    volatility(&closes),
        },
        "timestamp": Utc::now(),
    })))
}
