//! Console rendering of comparison results.
//!
//! All functions here build strings; callers decide where they go.

use pricecmp_core::{ComparisonResult, Site, Verdict};
use rust_decimal::Decimal;

const BLOCK_WIDTH: usize = 50;
const CELL_WIDTH: usize = 25;

/// `₹` followed by the amount rounded to two places with comma grouping in
/// thousands, e.g. `₹1,24,999` becomes `₹124,999.00`.
pub(crate) fn format_inr(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}₹{grouped}.{fraction}")
}

fn price_or(price: Option<Decimal>, missing: &str) -> String {
    price.map_or_else(|| missing.to_string(), format_inr)
}

pub(crate) fn verdict_line(result: &ComparisonResult) -> String {
    match result.verdict() {
        Verdict::Cheaper { site, by } => {
            format!("{} is cheaper by {}", site.display_name(), format_inr(by))
        }
        Verdict::Equal => "Prices are equal".to_string(),
        Verdict::Unavailable => "Price comparison not available (missing data)".to_string(),
    }
}

/// The boxed per-product block printed as each product finishes.
pub(crate) fn render_block(result: &ComparisonResult) -> String {
    let rule = "=".repeat(BLOCK_WIDTH);
    let dashes = "-".repeat(CELL_WIDTH);
    let amazon = price_or(result.price_for(Site::Amazon), "Not available");
    let flipkart = price_or(result.price_for(Site::Flipkart), "Not available");

    let lines = [
        String::new(),
        rule.clone(),
        format!("{:^BLOCK_WIDTH$}", "PRICE COMPARISON"),
        rule.clone(),
        format!("{:^BLOCK_WIDTH$}", result.product_name),
        rule.clone(),
        format!("{:<CELL_WIDTH$}{:<CELL_WIDTH$}", "Amazon", "Flipkart"),
        format!("{dashes}{dashes}"),
        format!("{amazon:<CELL_WIDTH$}{flipkart:<CELL_WIDTH$}"),
        String::new(),
        verdict_line(result),
        rule,
    ];
    lines.join("\n")
}

const SUMMARY_HEADERS: [&str; 5] = [
    "Product",
    "Amazon Price (₹)",
    "Flipkart Price (₹)",
    "Cheaper Site",
    "Difference (₹)",
];

/// The end-of-run table: one row per product, every column right-aligned
/// and as wide as its widest cell.
pub(crate) fn render_summary(results: &[ComparisonResult]) -> String {
    let rows: Vec<[String; 5]> = results
        .iter()
        .map(|r| {
            [
                r.product_name.clone(),
                price_or(r.amazon_price, "N/A"),
                price_or(r.flipkart_price, "N/A"),
                r.cheaper_site.to_string(),
                price_or(r.difference, "N/A"),
            ]
        })
        .collect();

    let mut widths = SUMMARY_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_row = |cells: [&str; 5]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:>width$}"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut out = vec![
        "---- Final Price Comparison Summary ----".to_string(),
        render_row(SUMMARY_HEADERS),
    ];
    for row in &rows {
        out.push(render_row(row.each_ref().map(String::as_str)));
    }
    out.join("\n")
}
