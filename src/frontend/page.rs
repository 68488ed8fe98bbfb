use crate::services::chart::{holdings_table, render_donut};
use crate::services::format::escape_markup;
use crate::types::error::PortfolioError;
use crate::types::models::PortfolioReport;

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Portfolio Balance</title>
    <style>
        body { font-family: sans-serif; max-width: 760px; margin: 2rem auto; }
        input { width: 32rem; padding: 0.4rem; }
        table { border-collapse: collapse; margin-top: 1rem; }
        th, td { border-bottom: 1px solid #ddd; padding: 0.3rem 0.8rem; text-align: right; }
        th:first-child, td:first-child, td:nth-child(2) { text-align: left; }
        .notice { padding: 0.8rem; background: #f4f4f4; border-left: 4px solid #1f78b4; }
        .error { border-left-color: #e31a1c; }
    </style>
</head>
<body>
    <h1>Portfolio Balance</h1>
    <form id="wallet-form">
        <input type="text" id="address" placeholder="Please enter a wallet address">
        <button type="submit">Submit</button>
    </form>
    <div id="result"></div>
    <script>
        document.getElementById('wallet-form').addEventListener('submit', async (e) => {
            e.preventDefault();
            const address = document.getElementById('address').value;
            const result = document.getElementById('result');
            result.innerHTML = '<p class="notice">Loading…</p>';
            const res = await fetch('/submit', {
                method: 'POST',
                headers: {'Content-Type': 'application/json'},
                body: JSON.stringify({address})
            });
            result.innerHTML = await res.text();
        });
    </script>
</body>
</html>"#;

fn notice(message: &str, is_error: bool) -> String {
    let class = if is_error { "notice error" } else { "notice" };
    format!(r#"<p class="{}">{}</p>"#, class, escape_markup(message))
}

pub fn prompt_fragment() -> String {
    notice("Please enter a wallet address.", false)
}

pub fn error_fragment(error: &PortfolioError) -> String {
    let message = match error {
        PortfolioError::CredentialMissing => {
            "The server has no Covalent API key configured. Set COVALENT_API_KEY and restart it.".to_string()
        }
        PortfolioError::NetworkOrAuth(detail) => format!("Could not reach the balance service: {}", detail),
        PortfolioError::MalformedResponse(_) => {
            "The balance service returned a response that could not be read.".to_string()
        }
        PortfolioError::InvalidAddress(detail) => format!("That wallet address was not accepted: {}", detail),
        PortfolioError::EmptyPortfolio => {
            return notice("This wallet holds nothing with a positive USD value.", false);
        }
    };
    notice(&message, true)
}

/// Chart followed by the table of individual holdings.
pub fn report_fragment(report: &PortfolioReport) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="chart">"#);
    html.push_str(&render_donut(&report.grouped, report.total_value));
    html.push_str("</div>");

    html.push_str("<table><thead><tr><th>Coin</th><th>Name</th><th>Balance</th><th>Value</th></tr></thead><tbody>");
    for row in holdings_table(&report.holdings) {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_markup(&row.coin),
            escape_markup(&row.name),
            escape_markup(&row.balance),
            escape_markup(&row.value)
        ));
    }
    html.push_str("</tbody></table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::types::models::{Bucket, NormalizedHolding};

    fn sample_report() -> PortfolioReport {
        PortfolioReport {
            address: "0xabc".to_string(),
            chain: "eth-mainnet".to_string(),
            quote_currency: "USD".to_string(),
            fetched_at: Utc::now(),
            upstream_updated_at: None,
            total_value: 2550.0,
            holdings: vec![
                NormalizedHolding {
                    name: "Ether".to_string(),
                    asset: "ETH".to_string(),
                    balance: Some(1.5),
                    value: 2500.0,
                },
                NormalizedHolding {
                    name: "<b>USD</b> Coin".to_string(),
                    asset: "USDC".to_string(),
                    balance: Some(50.0),
                    value: 50.0,
                },
            ],
            grouped: vec![
                Bucket { label: "ETH".to_string(), value: 2500.0, balance: 1.5 },
                Bucket { label: "Other".to_string(), value: 50.0, balance: 50.0 },
            ],
            dropped: 1,
        }
    }

    #[test]
    fn report_contains_chart_and_rows() {
        let html = report_fragment(&sample_report());
        assert!(html.contains("<svg"));
        assert!(html.contains("<th>Coin</th>"));
        assert!(html.contains("<tr><td>ETH</td><td>Ether</td><td>1.50</td><td>$2,500.00</td></tr>"));
        assert!(html.contains("<td>USDC</td><td>&lt;b&gt;USD&lt;/b&gt; Coin</td><td>50.00</td><td>$50.00</td>"));
        assert_eq!(html.matches("<tr><td>").count(), 2);
    }

    #[test]
    fn each_error_has_its_own_message() {
        let errors = [
            PortfolioError::CredentialMissing,
            PortfolioError::NetworkOrAuth("timed out".to_string()),
            PortfolioError::MalformedResponse("eof".to_string()),
            PortfolioError::InvalidAddress("bad checksum".to_string()),
            PortfolioError::EmptyPortfolio,
        ];
        let fragments: Vec<String> = errors.iter().map(error_fragment).collect();

        for (i, a) in fragments.iter().enumerate() {
            for b in fragments.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(fragments[1].contains("timed out"));
        assert!(fragments[3].contains("bad checksum"));
        assert!(fragments[0].contains("notice error"));
        assert!(!fragments[4].contains("notice error"));
    }

    #[test]
    fn error_details_are_escaped() {
        let html = error_fragment(&PortfolioError::InvalidAddress("<script>".to_string()));
        assert!(html.contains("&lt;script&gt;"));
    }
}
