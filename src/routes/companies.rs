//! # routes::companies

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::AppError,
    models::{Company, TrackedSymbol},
    routes::normalize_symbol,
    state::SharedState,
};

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    pub search: Option<String>,
    pub sector: Option<String>,
}

/// Company metadata plus the live price fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompanyWithPrice<'a> {
    #[serde(flatten)]
    company: &'a Company,
    current_price: f64,
    change: f64,
    change_percent: f64,
}

/// Company metadata plus the whole live quote (history included).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyDetail<'a> {
    pub name: &'a str,
    pub sector: &'a str,
    pub market_cap: u64,
    pub description: &'a str,
    #[serde(flatten)]
    pub stock: &'a TrackedSymbol,
}

impl<'a> CompanyDetail<'a> {
    pub fn new(company: &'a Company, stock: &'a TrackedSymbol) -> Self {
        Self {
            name:        &company.name,
            sector:      &company.sector,
            market_cap:  company.market_cap,
            description: &company.description,
            stock,
        }
    }
}

/// GET /api/companies?search=&sector=
pub async fn list_companies(
    State(state): State<SharedState>,
    Query(query): Query<CompanyQuery>,
) -> impl IntoResponse {
    let table = state.market.read().await;

    let companies: Vec<CompanyWithPrice> = table
        .listings()
        .filter(|(c, _)| query.search.as_deref().map_or(true, |term| c.matches_search(term)))
        .filter(|(c, _)| query.sector.as_deref().map_or(true, |sector| c.in_sector(sector)))
        .map(|(company, stock)| CompanyWithPrice {
            company,
            current_price:  stock.current_price,
            change:         stock.change,
            change_percent: stock.change_percent,
        })
        .collect();

    Json(json!({
        "success":   true,
        "data":      companies,
        "total":     companies.len(),
        "timestamp": Utc::now(),
    }))
}

/// GET /api/companies/:symbol
pub async fn get_company(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    let table = state.market.read().await;

    let (company, stock) = table
        .company(&symbol)
        .zip(table.get(&symbol))
        .ok_or_else(|| AppError::NotFound("Company not found".into()))?;

    Ok(Json(json!({
        "success":   true,
        "data":      CompanyDetail::new(company, stock),
        "timestamp": Utc::now(),
    })))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{app, get};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_all() {
        let (app, _) = app();
        let (status, body) = get(app, "/api/companies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 5);
        assert!(body["data"][0]["currentPrice"].is_number());
        assert_eq!(body["data"][0]["symbol"], "AAPL");
    }

    #[tokio::test]
    async fn test_search_and_sector_filters() {
        let (app, _) = app();
        let (_, body) = get(app.clone(), "/api/companies?search=micro").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["symbol"], "MSFT");

        let (_, body) = get(app.clone(), "/api/companies?sector=automotive").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["symbol"], "TSLA");

        let (_, body) = get(app, "/api/companies?search=zzz").await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_get_company_detail() {
        let (app, _) = app();
        let (status, body) = get(app, "/api/companies/nvda").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["symbol"], "NVDA");
        assert_eq!(body["data"]["name"], "NVIDIA Corporation");
        assert!(body["data"]["priceHistory"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_company_404() {
        let (app, _) = app();
        let (status, body) = get(app, "/api/companies/IBM").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Company not found");
    }
}
