use crate::types::models::{NormalizedHolding, PortfolioSnapshot, RawHoldingRecord};

const UNKNOWN_ASSET: &str = "Unknown";

/// Why a record did not make it into the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnparseableValue,
    NonPositiveValue,
}

/// Parses a numeric string, treating anything unparseable or non-finite as absent.
fn to_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// `balance / 10^decimals`; absent if either side is absent.
pub fn scale_balance(raw_balance: Option<&str>, decimals: Option<i32>) -> Option<f64> {
    let balance = to_number(raw_balance)?;
    let decimals = decimals?;
    let scaled = balance / 10f64.powi(decimals);
    scaled.is_finite().then_some(scaled)
}

/// Strips `$` and thousands separators from a formatted quote, then parses it.
pub fn parse_quote(pretty_quote: Option<&str>) -> Option<f64> {
    let cleaned: Option<String> = pretty_quote.map(|q| q.chars().filter(|c| *c != '$' && *c != ',').collect());
    to_number(cleaned.as_deref())
}

/// Holdings are kept only when their USD value is present and strictly above zero.
pub fn retain_positive_value(value: Option<f64>) -> Result<f64, DropReason> {
    match value {
        None => Err(DropReason::UnparseableValue),
        Some(v) if v > 0.0 => Ok(v),
        Some(_) => Err(DropReason::NonPositiveValue),
    }
}

fn asset_label(record: &RawHoldingRecord) -> String {
    [&record.contract_ticker_symbol, &record.contract_name]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_ASSET)
        .to_string()
}

pub fn normalize(records: Vec<RawHoldingRecord>) -> PortfolioSnapshot {
    let mut holdings = Vec::with_capacity(records.len());
    let mut unparseable = 0usize;
    let mut non_positive = 0usize;

    for record in records {
        let value = parse_quote(record.pretty_quote.as_deref());
        let value = match retain_positive_value(value) {
            Ok(v) => v,
            Err(DropReason::UnparseableValue) => {
                unparseable += 1;
                continue;
            }
            Err(DropReason::NonPositiveValue) => {
                non_positive += 1;
                continue;
            }
        };

        holdings.push(NormalizedHolding {
            asset: asset_label(&record),
            name: record.contract_name.clone().unwrap_or_default(),
            balance: scale_balance(record.balance.as_deref(), record.contract_decimals),
            value,
        });
    }

    if unparseable + non_positive > 0 {
        tracing::info!(
            "Dropped {} holdings ({} without a usable quote, {} valued at or below $0.00)",
            unparseable + non_positive,
            unparseable,
            non_positive
        );
    }

    PortfolioSnapshot {
        holdings,
        dropped: unparseable + non_positive,
    }
}
