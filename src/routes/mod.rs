//! # routes
//!
//! | Method    | Path                                 | Handler                      |
//! |-----------|--------------------------------------|------------------------------|
//! | GET       | `/health`                            | [`health::health_check`]     |
//! | GET       | `/api/companies`                     | [`companies::list_companies`]|
//! | GET       | `/api/companies/:symbol`             | [`companies::get_company`]   |
//! | GET       | `/api/stocks`                        | [`stocks::list_stocks`]      |
//! | GET       | `/api/stocks/:symbol`                | [`stocks::get_stock`]        |
//! | GET       | `/api/stocks/:symbol/history`        | [`stocks::get_history`]      |
//! | GET       | `/api/stocks/:symbol/quote`          | [`stocks::get_quote`]        |
//! | GET       | `/api/predictions`                   | [`predictions::list_predictions`] |
//! | GET       | `/api/predictions/:symbol`           | [`predictions::get_prediction`]   |
//! | POST      | `/api/predictions/:symbol/generate`  | [`predictions::generate_prediction`] |
//! | GET       | `/api/predictions/:symbol/accuracy`  | [`predictions::get_accuracy`]     |
//! | GET       | `/api/market/overview`               | [`market::overview`]         |
//! | GET       | `/api/market/sectors`                | [`market::sectors`]          |
//! | GET       | `/api/market/news`                   | [`market::news`]             |
//! | GET (WS)  | `/ws`                                | [`ws::ws_handler`]           |

pub mod companies;
pub mod health;
pub mod market;
pub mod predictions;
pub mod stocks;
pub mod ws;

use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, rate_limit::limit_api_requests, state::SharedState};

/// Build the full router with middleware attached.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health",                            get(health::health_check))
        // ── Companies ─────────────────────────────────────────────────────────
        .route("/api/companies",                     get(companies::list_companies))
        .route("/api/companies/:symbol",             get(companies::get_company))
        // ── Stocks ────────────────────────────────────────────────────────────
        .route("/api/stocks",                        get(stocks::list_stocks))
        .route("/api/stocks/:symbol",                get(stocks::get_stock))
        .route("/api/stocks/:symbol/history",        get(stocks::get_history))
        .route("/api/stocks/:symbol/quote",          get(stocks::get_quote))
        // ── Predictions ───────────────────────────────────────────────────────
        .route("/api/predictions",                   get(predictions::list_predictions))
        .route("/api/predictions/:symbol",           get(predictions::get_prediction))
        .route("/api/predictions/:symbol/generate",  post(predictions::generate_prediction))
        .route("/api/predictions/:symbol/accuracy",  get(predictions::get_accuracy))
        // ── Market ────────────────────────────────────────────────────────────
        .route("/api/market/overview",               get(market::overview))
        .route("/api/market/sectors",                get(market::sectors))
        .route("/api/market/news",                   get(market::news))
        // ── Live feed ─────────────────────────────────────────────────────────
        .route("/ws",                                get(ws::ws_handler))
        .fallback(route_not_found)
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(axum::middleware::from_fn_with_state(state.clone(), limit_api_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn route_not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success":   false,
            "error":     "Route not found",
            "path":      uri.path(),
            "timestamp": Utc::now(),
        })),
    )
}

/// Upper-case a ticker from the path and check it looks like one
/// (`AAPL`, `BRK-B`).
pub(crate) fn normalize_symbol(raw: &str) -> Result<String, AppError> {
    let symbol = raw.trim().to_uppercase();
    if is_valid_symbol(&symbol) {
        Ok(symbol)
    } else {
        Err(AppError::BadRequest(format!("Invalid stock symbol: '{raw}'")))
    }
}

fn is_valid_symbol(symbol: &str) -> bool {
    let (base, class) = match symbol.split_once('-') {
        Some((base, class)) => (base, Some(class)),
        None => (symbol, None),
    };
    let base_ok = (1..=5).contains(&base.len()) && base.bytes().all(|b| b.is_ascii_uppercase());
    let class_ok = class.map_or(true, |c| c.len() == 1 && c.bytes().all(|b| b.is_ascii_uppercase()));
    base_ok && class_ok
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::state::{build_state, SharedState};

    pub fn app() -> (Router, SharedState) {
        let state = build_state(AppConfig::default());
        (super::build_router(state.clone()), state)
    }

    pub async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, "GET", uri).await
    }
}
