use std::sync::Arc;
use poem::{handler, get, post, Route, EndpointExt, Endpoint};
use poem::web::{Data, Html, Json};
use serde::Deserialize;
use crate::services::portfolio::PortfolioService;

pub mod page;

#[derive(Deserialize)]
struct AddressInput {
    address: String,
}

#[handler]
async fn index() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

#[handler]
async fn submit(Json(input): Json<AddressInput>, service: Data<&Arc<PortfolioService>>) -> Html<String> {
    let address = input.address.trim();
    if address.is_empty() {
        return Html(page::prompt_fragment());
    }

    match service.snapshot(address).await {
        Ok(report) => Html(page::report_fragment(&report)),
        Err(e) => {
            tracing::warn!("Dashboard lookup for {} failed: {}", address, e);
            Html(page::error_fragment(&e))
        }
    }
}

pub fn create_frontend(service: Arc<PortfolioService>) -> impl Endpoint {
    Route::new()
        .at("/", get(index))
        .at("/submit", post(submit))
        .data(service)
}
