use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};

/// Envelope returned by the Covalent `balances_v2` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BalancesResponse {
    pub data: BalancesData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalancesData {
    pub items: Vec<RawHoldingRecord>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub chain_name: Option<String>,
}

/// Error body Covalent sends alongside 4xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamErrorBody {
    pub error_message: Option<String>,
}

/// One token entry as the upstream API reports it. Every field can be null,
/// and a field of an unexpected JSON type reads as missing rather than
/// failing the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHoldingRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_ticker_symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub balance: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimals")]
    pub contract_decimals: Option<i32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pretty_quote: Option<String>,
}

/// Strings pass through, numbers keep their textual form, anything else is `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_decimals<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().and_then(|d| i32::try_from(d).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedHolding {
    pub name: String,
    pub asset: String,
    /// Human-scaled balance; `None` when the raw balance or decimals were unusable.
    pub balance: Option<f64>,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub holdings: Vec<NormalizedHolding>,
    pub dropped: usize,
}

impl PortfolioSnapshot {
    pub fn total_value(&self) -> f64 {
        self.holdings.iter().map(|h| h.value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// A chart wedge: one asset, or the "Other" catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub value: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub address: String,
    pub chain: String,
    pub quote_currency: String,
    pub fetched_at: DateTime<Utc>,
    pub upstream_updated_at: Option<String>,
    pub total_value: f64,
    pub holdings: Vec<NormalizedHolding>,
    pub grouped: Vec<Bucket>,
    pub dropped: usize,
}

/// A formatted row of the holdings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub coin: String,
    pub name: String,
    pub balance: String,
    pub value: String,
}
