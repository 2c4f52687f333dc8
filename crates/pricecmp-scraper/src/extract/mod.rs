//! Per-site price extraction.
//!
//! Each site has an ordered list of lookup rules tried against the rendered
//! page; the first rule that yields an acceptable price wins. A rule that
//! finds nothing, or whose renderer call fails, is a miss and the next rule
//! runs. Extraction never fails: exhausting every rule is `None`.

mod amazon;
mod flipkart;

use std::time::Duration;

use pricecmp_core::{AppConfig, Site};
use rust_decimal::Decimal;

use crate::page::RenderedPage;

pub use flipkart::price_from_markup;

/// How long extraction rules may wait on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitBudget {
    /// Per-rule wait for an element to appear.
    pub rule_timeout: Duration,
    /// The last-resort wait at the end of a fallback chain.
    pub final_timeout: Duration,
    pub poll_interval: Duration,
    /// Pause after dismissing an overlay, to let the page re-render.
    pub overlay_pause: Duration,
}

impl WaitBudget {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            rule_timeout: Duration::from_millis(config.rule_timeout_ms),
            final_timeout: Duration::from_millis(config.final_timeout_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            overlay_pause: Duration::from_millis(config.overlay_pause_ms),
        }
    }

    /// No waiting at all. For pages that are fully present up front.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            rule_timeout: Duration::ZERO,
            final_timeout: Duration::ZERO,
            poll_interval: Duration::ZERO,
            overlay_pause: Duration::ZERO,
        }
    }
}

/// Extracts the listed price for `site` from whatever `page` currently shows.
pub async fn extract_price<P: RenderedPage>(
    site: Site,
    page: &P,
    budget: &WaitBudget,
) -> Option<Decimal> {
    let price = match site {
        Site::Amazon => amazon::extract(page, budget).await,
        Site::Flipkart => flipkart::extract(page, budget).await,
    };
    match price {
        Some(price) => tracing::debug!(site = %site, %price, "price extracted"),
        None => tracing::debug!(site = %site, "no price found after all rules"),
    }
    price
}
