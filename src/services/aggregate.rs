use crate::types::models::{Bucket, NormalizedHolding};

pub const OTHER_LABEL: &str = "Other";

/// Folds holdings worth less than `threshold` into "Other", sums per label
/// and sorts by value, largest first. Equal values keep first-seen order.
pub fn group_holdings(holdings: &[NormalizedHolding], threshold: f64) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();

    for holding in holdings {
        let label = if holding.value < threshold {
            OTHER_LABEL
        } else {
            holding.asset.as_str()
        };

        let balance = holding.balance.unwrap_or(0.0);
        match buckets.iter_mut().find(|b| b.label == label) {
            Some(bucket) => {
                bucket.value += holding.value;
                bucket.balance += balance;
            }
            None => buckets.push(Bucket {
                label: label.to_string(),
                value: holding.value,
                balance,
            }),
        }
    }

    // sort_by is stable
    buckets.sort_by(|a, b| b.value.total_cmp(&a.value));
    buckets
}
