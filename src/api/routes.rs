use axum::{
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use super::handlers::{get_portfolio, get_portfolio_chart, health};
use super::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/portfolio/:address", get(get_portfolio))
        .route("/portfolio/:address/chart.svg", get(get_portfolio_chart))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
