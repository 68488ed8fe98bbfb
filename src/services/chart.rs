use std::f64::consts::TAU;
use crate::services::format::{escape_markup, usd, whole_usd, with_thousands};
use crate::types::models::{Bucket, NormalizedHolding, TableRow};

const SIZE: f64 = 600.0;
const CENTER: f64 = SIZE / 2.0;
const OUTER_RADIUS: f64 = 170.0;
const INNER_RADIUS: f64 = OUTER_RADIUS * 0.7;
const LABEL_DISTANCE: f64 = 1.3;
const AMOUNT_DISTANCE: f64 = 1.12;

/// ColorBrewer "Paired", cycled when there are more wedges than colors.
const PALETTE: [&str; 12] = [
    "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c",
    "#fdbf6f", "#ff7f00", "#cab2d6", "#6a3d9a", "#ffff99", "#b15928",
];

fn point(angle: f64, radius: f64) -> (f64, f64) {
    (CENTER + radius * angle.cos(), CENTER - radius * angle.sin())
}

fn wedge_path(start: f64, end: f64) -> String {
    let large_arc = if end - start > TAU / 2.0 { 1 } else { 0 };
    let (ox1, oy1) = point(start, OUTER_RADIUS);
    let (ox2, oy2) = point(end, OUTER_RADIUS);
    let (ix2, iy2) = point(end, INNER_RADIUS);
    let (ix1, iy1) = point(start, INNER_RADIUS);

    format!(
        "M {ox1:.3} {oy1:.3} A {r:.3} {r:.3} 0 {large_arc} 0 {ox2:.3} {oy2:.3} \
         L {ix2:.3} {iy2:.3} A {ri:.3} {ri:.3} 0 {large_arc} 1 {ix1:.3} {iy1:.3} Z",
        r = OUTER_RADIUS,
        ri = INNER_RADIUS,
    )
}

/// Two concentric circles; a single arc cannot close on its own start point.
fn ring_path() -> String {
    let circle = |r: f64| {
        format!(
            "M {x1:.3} {c:.3} A {r:.3} {r:.3} 0 1 0 {x2:.3} {c:.3} A {r:.3} {r:.3} 0 1 0 {x1:.3} {c:.3} Z",
            x1 = CENTER + r,
            x2 = CENTER - r,
            c = CENTER,
        )
    };
    format!("{} {}", circle(OUTER_RADIUS), circle(INNER_RADIUS))
}

fn svg_open(out: &mut String) {
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{s}" height="{s}" viewBox="0 0 {s} {s}" font-family="sans-serif" font-size="10">"#,
        s = SIZE
    ));
}

/// Renders the grouped view as a donut with the portfolio total in the hole.
pub fn render_donut(buckets: &[Bucket], total_value: f64) -> String {
    let mut svg = String::new();
    svg_open(&mut svg);

    let chart_sum: f64 = buckets.iter().map(|b| b.value).sum();
    if buckets.is_empty() || chart_sum <= 0.0 {
        svg.push_str(&format!(
            r##"<text x="{c}" y="{c}" text-anchor="middle" dominant-baseline="middle" font-size="14" fill="#666">No holdings to chart</text></svg>"##,
            c = CENTER
        ));
        return svg;
    }

    let mut start = 0.0_f64;
    for (i, bucket) in buckets.iter().enumerate() {
        let sweep = bucket.value / chart_sum * TAU;
        let end = start + sweep;
        let color = PALETTE[i % PALETTE.len()];
        let label = escape_markup(&bucket.label);

        let (path, fill_rule) = if buckets.len() == 1 {
            (ring_path(), "evenodd")
        } else {
            (wedge_path(start, end), "nonzero")
        };
        svg.push_str(&format!(
            r#"<path d="{path}" fill="{color}" fill-rule="{fill_rule}" stroke="white" stroke-width="1"><title>{label}</title></path>"#
        ));

        let mid = start + sweep / 2.0;
        let (lx, ly) = point(mid, OUTER_RADIUS * LABEL_DISTANCE);
        let anchor = if mid.cos() >= 0.0 { "start" } else { "end" };
        svg.push_str(&format!(
            r#"<text x="{lx:.3}" y="{ly:.3}" text-anchor="{anchor}" dominant-baseline="middle">{label}</text>"#
        ));

        let (ax, ay) = point(mid, OUTER_RADIUS * AMOUNT_DISTANCE);
        svg.push_str(&format!(
            r#"<text x="{ax:.3}" y="{ay:.3}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            escape_markup(&whole_usd(bucket.value))
        ));

        start = end;
    }

    svg.push_str(&format!(
        r#"<text x="{c}" y="{c}" text-anchor="middle" dominant-baseline="middle" font-size="12" fill="black">{}</text></svg>"#,
        escape_markup(&usd(total_value)),
        c = CENTER
    ));
    svg
}

/// Rows for the holdings table, one per ungrouped holding.
pub fn holdings_table(holdings: &[NormalizedHolding]) -> Vec<TableRow> {
    holdings
        .iter()
        .map(|h| TableRow {
            coin: h.asset.clone(),
            name: h.name.clone(),
            balance: h.balance.map(|b| with_thousands(b, 2)).unwrap_or_else(|| "n/a".to_string()),
            value: usd(h.value),
        })
        .collect()
}
