use std::sync::Arc;
use governor::{Quota, RateLimiter, state::{NotKeyed, InMemoryState}, clock::DefaultClock};
use reqwest::{Client, StatusCode, Url};
use crate::config::Config;
use crate::types::error::PortfolioError;
use crate::types::models::{BalancesData, BalancesResponse, UpstreamErrorBody};

pub type UpstreamLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub const QUOTE_CURRENCY: &str = "USD";

/// Client for the Covalent `balances_v2` endpoint.
pub struct BalanceClient {
    http: Client,
    rate_limiter: Arc<UpstreamLimiter>,
    api_key: Option<String>,
    base_url: Url,
    chain: String,
}

impl BalanceClient {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("walletspread/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = Url::parse(&config.base_url)?;
        anyhow::ensure!(!base_url.cannot_be_a_base(), "COVALENT_BASE_URL must be an http(s) URL");

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(config.requests_per_second)));

        Ok(Self {
            http,
            rate_limiter,
            api_key: config.api_key.clone(),
            base_url,
            chain: config.chain.clone(),
        })
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Each path piece is pushed as one segment, so `/`, `?` or `#` inside the
    /// address are percent-encoded instead of reshaping the request path.
    pub fn balances_url(&self, address: &str) -> Url {
        let mut url = self.base_url.clone();
        // base_url was checked for cannot_be_a_base in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1", self.chain.as_str(), "address", address, "balances_v2", ""]);
        }
        url.query_pairs_mut().append_pair("quote-currency", QUOTE_CURRENCY);
        url
    }

    /// Fetches every token the wallet has touched. `address` must already be trimmed.
    pub async fn fetch_balances(&self, address: &str) -> Result<BalancesData, PortfolioError> {
        let api_key = self.api_key.as_deref().ok_or(PortfolioError::CredentialMissing)?;

        self.rate_limiter.until_ready().await;

        let url = self.balances_url(address);
        tracing::info!("Fetching balances for {} on {}", address, self.chain);

        let response = self.http
            .get(url)
            .basic_auth(api_key, Some(""))
            .send()
            .await
            .map_err(|e| PortfolioError::NetworkOrAuth(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortfolioError::NetworkOrAuth(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!("Covalent returned {} for {}", status, address);
            return Err(classify_failure(status, &body));
        }

        let parsed: BalancesResponse = serde_json::from_str(&body)
            .map_err(|e| PortfolioError::MalformedResponse(e.to_string()))?;

        tracing::info!("Received {} balance items for {}", parsed.data.items.len(), address);
        Ok(parsed.data)
    }
}

fn classify_failure(status: StatusCode, body: &str) -> PortfolioError {
    let upstream_message = serde_json::from_str::<UpstreamErrorBody>(body)
        .ok()
        .and_then(|b| b.error_message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PortfolioError::NetworkOrAuth(format!("unauthorized ({}), check COVALENT_API_KEY", status.as_u16()))
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
            PortfolioError::InvalidAddress(upstream_message.unwrap_or_else(|| status.to_string()))
        }
        _ => {
            let detail = upstream_message.unwrap_or_else(|| body.chars().take(200).collect());
            PortfolioError::NetworkOrAuth(format!("status {}: {}", status.as_u16(), detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(base_url: String, api_key: Option<&str>) -> BalanceClient {
        let config = Config {
            api_key: api_key.map(str::to_string),
            base_url,
            ..Config::default()
        };
        BalanceClient::new(&config).unwrap()
    }

    #[test]
    fn builds_balances_url() {
        let client = client_for("https://api.covalenthq.com".to_string(), Some("k"));
        assert_eq!(
            client.balances_url("0xabc").as_str(),
            "https://api.covalenthq.com/v1/eth-mainnet/address/0xabc/balances_v2/?quote-currency=USD"
        );
    }

    #[test]
    fn address_cannot_escape_its_path_segment() {
        let client = client_for("https://api.covalenthq.com".to_string(), Some("k"));
        assert_eq!(
            client.balances_url("0xabc#frag/../x?y=1").as_str(),
            "https://api.covalenthq.com/v1/eth-mainnet/address/0xabc%23frag%2F..%2Fx%3Fy=1/balances_v2/?quote-currency=USD"
        );
    }

    #[test]
    fn keeps_base_url_path_prefix() {
        let client = client_for("http://127.0.0.1:9999/proxy".to_string(), Some("k"));
        assert_eq!(
            client.balances_url("0xabc").as_str(),
            "http://127.0.0.1:9999/proxy/v1/eth-mainnet/address/0xabc/balances_v2/?quote-currency=USD"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        let config = Config {
            base_url: "mailto:someone@example.com".to_string(),
            ..Config::default()
        };
        assert!(BalanceClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_odd_address_still_hits_balances_endpoint() {
        let mut server = mockito::Server::new_async().await;

        let other = server.mock("GET", "/v1/eth-mainnet/address/0xabc")
            .with_status(200)
            .with_body(r#"{"data": {"items": []}}"#)
            .expect(0)
            .create_async()
            .await;
        let balances = server.mock("GET", Matcher::Regex(r"^/v1/eth-mainnet/address/[^/]+/balances_v2/$".to_string()))
            .match_query(Matcher::UrlEncoded("quote-currency".into(), "USD".into()))
            .with_status(200)
            .with_body(r#"{"data": {"items": []}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(server.url(), Some("ckey_test"));
        client.fetch_balances("0xabc#frag/x").await.unwrap();

        balances.assert_async().await;
        other.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_balances_sends_basic_auth() {
        let mut server = mockito::Server::new_async().await;

        let _m = server.mock("GET", "/v1/eth-mainnet/address/0xabc/balances_v2/")
            .match_query(Matcher::UrlEncoded("quote-currency".into(), "USD".into()))
            .match_header("authorization", "Basic Y2tleV90ZXN0Og==")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{
                "data": {
                    "address": "0xabc",
                    "updated_at": "2024-01-01T00:00:00Z",
                    "chain_name": "eth-mainnet",
                    "items": [
                        {
                            "contract_name": "Ether",
                            "contract_ticker_symbol": "ETH",
                            "contract_decimals": 18,
                            "balance": "1500000000000000000",
                            "quote": 2500.0,
                            "pretty_quote": "$2,500.00"
                        },
                        {
                            "contract_name": null,
                            "contract_ticker_symbol": null,
                            "contract_decimals": null,
                            "balance": null,
                            "pretty_quote": null
                        }
                    ]
                },
                "error": false
            }"#)
            .create_async()
            .await;

        let client = client_for(server.url(), Some("ckey_test"));
        let data = client.fetch_balances("0xabc").await.unwrap();

        assert_eq!(data.items.len(), 2);
        assert_eq!(data.items[0].contract_ticker_symbol.as_deref(), Some("ETH"));
        assert_eq!(data.items[0].contract_decimals, Some(18));
        assert_eq!(data.items[0].pretty_quote.as_deref(), Some("$2,500.00"));
        assert!(data.items[1].balance.is_none());
        assert_eq!(data.updated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_missing_credential_skips_request() {
        let mut server = mockito::Server::new_async().await;
        let m = server.mock("GET", Matcher::Any).expect(0).create_async().await;

        let client = client_for(server.url(), None);
        let err = client.fetch_balances("0xabc").await.unwrap_err();

        assert_eq!(err, PortfolioError::CredentialMissing);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_is_network_or_auth() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": true, "error_message": "Invalid API key", "error_code": 401}"#)
            .create_async()
            .await;

        let client = client_for(server.url(), Some("bad"));
        let err = client.fetch_balances("0xabc").await.unwrap_err();

        assert!(matches!(err, PortfolioError::NetworkOrAuth(ref msg) if msg.contains("unauthorized")));
    }

    #[tokio::test]
    async fn test_bad_request_is_invalid_address() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": true, "error_message": "Malformed address provided: nope", "error_code": 400}"#)
            .create_async()
            .await;

        let client = client_for(server.url(), Some("ckey_test"));
        let err = client.fetch_balances("nope").await.unwrap_err();

        assert_eq!(err, PortfolioError::InvalidAddress("Malformed address provided: nope".to_string()));
    }

    #[tokio::test]
    async fn test_server_error_keeps_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", Matcher::Any)
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let client = client_for(server.url(), Some("ckey_test"));
        let err = client.fetch_balances("0xabc").await.unwrap_err();

        assert_eq!(err, PortfolioError::NetworkOrAuth("status 503: upstream down".to_string()));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = client_for(server.url(), Some("ckey_test"));
        let err = client.fetch_balances("0xabc").await.unwrap_err();

        assert!(matches!(err, PortfolioError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_items_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data": {"address": "0xabc"}}"#)
            .create_async()
            .await;

        let client = client_for(server.url(), Some("ckey_test"));
        let err = client.fetch_balances("0xabc").await.unwrap_err();

        assert!(matches!(err, PortfolioError::MalformedResponse(_)));
    }
}
