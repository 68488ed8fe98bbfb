use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use crate::services::chart::render_donut;
use crate::types::models::PortfolioReport;
use super::error::ApiError;
use super::state::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_portfolio(
    State(service): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<PortfolioReport>, ApiError> {
    let report = service.snapshot(&address).await.map_err(|e| {
        tracing::warn!("Portfolio lookup for {} failed: {}", address.trim(), e);
        e
    })?;
    Ok(Json(report))
}

pub async fn get_portfolio_chart(
    State(service): State<AppState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let report = service.snapshot(&address).await?;
    let svg = render_donut(&report.grouped, report.total_value);
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
