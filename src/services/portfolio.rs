use chrono::Utc;
use crate::config::Config;
use crate::services::aggregate::group_holdings;
use crate::services::balances::{BalanceClient, QUOTE_CURRENCY};
use crate::services::transform::normalize;
use crate::types::error::PortfolioError;
use crate::types::models::PortfolioReport;

/// Runs fetch, transform and aggregation for one wallet at a time.
pub struct PortfolioService {
    client: BalanceClient,
    other_threshold: f64,
}

impl PortfolioService {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        Ok(Self {
            client: BalanceClient::new(config)?,
            other_threshold: config.other_threshold,
        })
    }

    pub async fn snapshot(&self, address: &str) -> Result<PortfolioReport, PortfolioError> {
        let operation_start = std::time::Instant::now();
        let address = address.trim();
        if address.is_empty() {
            return Err(PortfolioError::InvalidAddress("wallet address is required".to_string()));
        }

        let data = self.client.fetch_balances(address).await?;
        let fetched_at = Utc::now();
        let chain = data.chain_name.clone().unwrap_or_else(|| self.client.chain().to_string());

        let snapshot = normalize(data.items);
        if snapshot.is_empty() {
            tracing::info!("No positively valued holdings for {}", address);
            return Err(PortfolioError::EmptyPortfolio);
        }

        let total_value = snapshot.total_value();
        let grouped = group_holdings(&snapshot.holdings, self.other_threshold);

        tracing::info!(
            "Portfolio {}: {} holdings, {} chart buckets, total ${:.2} ({:?})",
            address,
            snapshot.holdings.len(),
            grouped.len(),
            total_value,
            operation_start.elapsed()
        );

        Ok(PortfolioReport {
            address: address.to_string(),
            chain,
            quote_currency: QUOTE_CURRENCY.to_string(),
            fetched_at,
            upstream_updated_at: data.updated_at,
            total_value,
            holdings: snapshot.holdings,
            grouped,
            dropped: snapshot.dropped,
        })
    }
}
