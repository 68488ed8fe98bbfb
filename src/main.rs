use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Result;
use dotenv::dotenv;
use tokio::net::TcpListener;
use poem::Server;

mod api;
mod config;
mod frontend;
mod services;
mod types;

use crate::api::routes::create_router;
use crate::config::Config;
use crate::frontend::create_frontend;
use crate::services::portfolio::PortfolioService;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    dotenv().ok();
    let config = Config::from_env()?;
    if config.api_key.is_none() {
        tracing::warn!("COVALENT_API_KEY is not set; every lookup will fail until it is configured");
    }
    tracing::info!(
        "Using {} on {} (other threshold ${:.2}, {} req/s)",
        config.base_url,
        config.chain,
        config.other_threshold,
        config.requests_per_second
    );

    let service = Arc::new(PortfolioService::new(&config)?);

    let app = create_router(service.clone());
    let api_addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = TcpListener::bind(api_addr).await?;
    tracing::info!("API listening on {}", api_addr);

    let frontend_addr = SocketAddr::from(([0, 0, 0, 0], config.frontend_port));
    let frontend_server = Server::new(poem::listener::TcpListener::bind(frontend_addr))
        .run(create_frontend(service));
    tracing::info!("Dashboard listening on {}", frontend_addr);

    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            if let Err(e) = result {
                tracing::error!("Failed to serve API: {:?}", e);
            }
        }
        result = frontend_server => {
            if let Err(e) = result {
                tracing::error!("Failed to serve dashboard: {:?}", e);
            }
        }
    }

    Ok(())
}
