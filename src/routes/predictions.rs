//! # routes::predictions
//!
//! Mock AI forecasts.  One prediction per symbol is kept in
//! [`AppState::predictions`](crate::state::AppState); `POST …/generate`
//! replaces it with a fresh random draw.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{
    error::AppError,
    market::forecast,
    models::Prediction,
    routes::normalize_symbol,
    state::SharedState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictionView<'a> {
    symbol: &'a str,
    current_price: f64,
    #[serde(flatten)]
    prediction: &'a Prediction,
    #[serde(skip_serializing_if = "Option::is_none")]
    potential_return: Option<f64>,
}

/// GET /api/predictions
pub async fn list_predictions(State(state): State<SharedState>) -> impl IntoResponse {
    let table = state.market.read().await;
    let predictions = state.predictions.read().await;

    let data: Vec<PredictionView> = table
        .listings()
        .filter_map(|(company, stock)| {
            predictions.get(&company.symbol).map(|prediction| PredictionView {
                symbol:           &company.symbol,
                current_price:    stock.current_price,
                prediction,
                potential_return: None,
            })
        })
        .collect();

    Json(json!({
        "success":   true,
        "data":      data,
        "total":     data.len(),
        "timestamp": Utc::now(),
    }))
}

/// GET /api/predictions/:symbol
pub async fn get_prediction(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    let table = state.market.read().await;
    let predictions = state.predictions.read().await;

    let prediction = predictions
        .get(&symbol)
        .ok_or_else(|| AppError::NotFound("Prediction not found".into()))?;
    let current_price = table.get(&symbol).map_or(0.0, |s| s.current_price);

    let view = PredictionView {
        symbol:           &symbol,
        current_price,
        prediction,
        potential_return: forecast::potential_return(prediction.target_price, current_price),
    };

    Ok(Json(json!({
        "success":   true,
        "data":      view,
        "timestamp": Utc::now(),
    })))
}

/// POST /api/predictions/:symbol/generate
pub async fn generate_prediction(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    let current_price = state
        .market
        .read()
        .await
        .get(&symbol)
        .map(|s| s.current_price)
        .ok_or_else(|| AppError::NotFound("Stock not found".into()))?;

    let prediction = {
        let mut rng = StdRng::from_entropy();
        forecast::generate(&mut rng, current_price, Utc::now())
    };

    info!(
        symbol = %symbol,
        outlook = prediction.prediction.as_str(),
        confidence = prediction.confidence,
        "🔮 Prediction regenerated"
    );

    let view = PredictionView {
        symbol:           &symbol,
        current_price,
        prediction:       &prediction,
        potential_return: forecast::potential_return(prediction.target_price, current_price),
    };
    let body = json!({
        "success":   true,
        "data":      view,
        "message":   "New prediction generated successfully",
        "timestamp": Utc::now(),
    });

    state.predictions.write().await.insert(symbol, prediction);
    Ok(Json(body))
}

/// GET /api/predictions/:symbol/accuracy
pub async fn get_accuracy(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    if state.market.read().await.get(&symbol).is_none() {
        return Err(AppError::NotFound("Stock not found".into()));
    }

    let report = {
        let mut rng = StdRng::from_entropy();
        forecast::accuracy_report(&mut rng, &symbol)
    };

    Ok(Json(json!({
        "success":   true,
        "data":      report,
        "timestamp": Utc::now(),
    })))
}
