use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::WaitBudget;
use crate::page::{Locator, RenderedPage};
use crate::parse::{parse_price, to_decimal};

/// Close button of the login modal shown to new visitors.
const LOGIN_OVERLAY_CLOSE: Locator = Locator::Css("button._2KpZ6l._2doB4z");

/// Price element lookups. The class names are build-hashed and change over
/// time, so the last two rules fall back to any element showing a rupee sign.
const PRICE_RULES: [Locator; 5] = [
    Locator::Css("div[class*='_30jeq3']"),
    Locator::Css("div[class*='_30jeq3'][class*='_16Jk6d']"),
    Locator::Css("div[class*='_30jeq3'][class*='_1_WHN1']"),
    Locator::OwnTextContains {
        tag: "div",
        needle: "₹",
    },
    Locator::OwnTextContains {
        tag: "span",
        needle: "₹",
    },
];

const ANY_RUPEE_TEXT: Locator = Locator::OwnTextContains {
    tag: "*",
    needle: "₹",
};

/// Element-rule candidates at or below this are discount badges, EMI amounts
/// and the like.
const MIN_ELEMENT_PRICE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Exclusive bounds for rupee amounts scraped from raw markup.
const MARKUP_PRICE_FLOOR: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);
const MARKUP_PRICE_CEILING: Decimal = Decimal::from_parts(500_000, 0, 0, false, 0);

static EMBEDDED_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""price":\s*"?(\d+(?:\.\d+)?)"?"#).expect("valid regex")
});

static RUPEE_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"₹\s*([\d,]+)").expect("valid regex"));

pub(super) async fn extract<P: RenderedPage>(page: &P, budget: &WaitBudget) -> Option<Decimal> {
    dismiss_login_overlay(page, budget).await;

    if let Some(price) = from_price_elements(page).await {
        return Some(price);
    }

    match page.markup().await {
        Ok(markup) => {
            if let Some(price) = price_from_markup(&markup) {
                tracing::debug!(site = "flipkart", %price, "price taken from page markup");
                return Some(price);
            }
        }
        Err(e) => tracing::debug!(site = "flipkart", error = %e, "could not read page markup"),
    }

    from_final_wait(page, budget).await
}

async fn dismiss_login_overlay<P: RenderedPage>(page: &P, budget: &WaitBudget) {
    match page.click_first(&LOGIN_OVERLAY_CLOSE).await {
        Ok(true) => {
            tracing::debug!(site = "flipkart", "dismissed login overlay");
            if !budget.overlay_pause.is_zero() {
                tokio::time::sleep(budget.overlay_pause).await;
            }
        }
        Ok(false) => {}
        Err(e) => tracing::debug!(site = "flipkart", error = %e, "could not dismiss login overlay"),
    }
}

async fn from_price_elements<P: RenderedPage>(page: &P) -> Option<Decimal> {
    for rule in &PRICE_RULES {
        let texts = match page.texts(rule).await {
            Ok(texts) => texts,
            Err(e) => {
                tracing::debug!(site = "flipkart", %rule, error = %e, "rule failed");
                continue;
            }
        };

        let accepted = texts
            .iter()
            .filter(|text| text.contains('₹'))
            .filter_map(|text| parse_price(text))
            .find(|price| *price > MIN_ELEMENT_PRICE);

        if let Some(price) = accepted {
            tracing::debug!(site = "flipkart", %rule, %price, "rule accepted");
            return Some(price);
        }
        tracing::debug!(site = "flipkart", %rule, candidates = texts.len(), "rule yielded no price");
    }
    None
}

async fn from_final_wait<P: RenderedPage>(page: &P, budget: &WaitBudget) -> Option<Decimal> {
    match page
        .wait_for_text(&ANY_RUPEE_TEXT, budget.final_timeout)
        .await
    {
        Ok(Some(text)) => parse_price(&text).filter(|p| *p > Decimal::ZERO),
        Ok(None) => None,
        Err(e) => {
            tracing::debug!(site = "flipkart", error = %e, "final wait failed");
            None
        }
    }
}

/// Reads a price out of raw page markup.
///
/// The first positive embedded `"price": ...` field (structured product
/// data) is trusted as-is. Zero placeholders such as shipping fees are
/// skipped. Otherwise every rupee amount in the markup is collected, amounts
/// outside (1,000, 500,000) are dropped as noise, and the largest remaining
/// one is taken to be the listing price.
#[must_use]
pub fn price_from_markup(markup: &str) -> Option<Decimal> {
    let embedded = EMBEDDED_PRICE_RE
        .captures_iter(markup)
        .filter_map(|c| c.get(1))
        .filter_map(|m| Decimal::from_str(m.as_str()).ok())
        .find(|p| *p > Decimal::ZERO);
    if embedded.is_some() {
        return embedded;
    }

    RUPEE_AMOUNT_RE
        .captures_iter(markup)
        .filter_map(|c| c.get(1))
        .filter_map(|m| to_decimal(m.as_str()))
        .filter(|p| *p > MARKUP_PRICE_FLOOR && *p < MARKUP_PRICE_CEILING)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_page::StaticPage;

    async fn run(html: &str) -> Option<Decimal> {
        extract(&StaticPage::new(html), &WaitBudget::immediate()).await
    }

    #[test]
    fn markup_band_keeps_plausible_amounts_and_takes_max() {
        let markup = "<b>₹50</b><b>₹1,500</b><b>₹45,000</b><b>₹6,00,000</b>";
        assert_eq!(price_from_markup(markup), Some(Decimal::from(45_000)));
    }

    #[test]
    fn markup_band_is_exclusive() {
        assert_eq!(price_from_markup("₹1,000 ₹5,00,000"), None);
    }

    #[test]
    fn embedded_price_field_wins() {
        let markup = r#"<script>{"@type":"Offer","price": "74999","priceCurrency":"INR"}</script> ₹99,999"#;
        assert_eq!(price_from_markup(markup), Some(Decimal::from(74_999)));
    }

    #[test]
    fn embedded_price_field_unquoted_with_fraction() {
        assert_eq!(
            price_from_markup(r#"{"price":1299.5}"#),
            Some(Decimal::new(12_995, 1))
        );
    }

    #[test]
    fn zero_embedded_price_falls_through_to_rupee_scan() {
        let markup = r#"<script>{"shipping":{"price":0}}</script><div>₹45,000</div>"#;
        assert_eq!(price_from_markup(markup), Some(Decimal::from(45_000)));
    }

    #[test]
    fn zero_embedded_price_skipped_for_later_field() {
        let markup = r#"{"shipping":{"price":"0.00"},"offer":{"price":"52999"}}"#;
        assert_eq!(price_from_markup(markup), Some(Decimal::from(52_999)));
    }

    #[tokio::test]
    async fn zero_embedded_price_on_sold_out_page_is_none() {
        let html = r#"<script>{"shipping":{"price":0}}</script><p>Sold out</p>"#;
        assert_eq!(run(html).await, None);
    }

    #[test]
    fn markup_without_rupee_amounts() {
        assert_eq!(price_from_markup("<html><body>Sold out</body></html>"), None);
    }

    #[tokio::test]
    async fn primary_price_class() {
        let html = r#"<div class="_30jeq3 _16Jk6d">₹1,24,990</div>"#;
        assert_eq!(run(html).await, Some(Decimal::from(124_990)));
    }

    #[tokio::test]
    async fn element_candidates_at_or_below_floor_are_skipped() {
        let html = r#"
            <div class="_30jeq3">₹100</div>
            <div class="_30jeq3">₹45,999</div>
        "#;
        assert_eq!(run(html).await, Some(Decimal::from(45_999)));
    }

    #[tokio::test]
    async fn element_text_without_rupee_sign_is_skipped() {
        let html = r#"
            <div class="_30jeq3">45,999</div>
            <span>₹39,999</span>
        "#;
        assert_eq!(run(html).await, Some(Decimal::from(39_999)));
    }

    #[tokio::test]
    async fn own_text_div_rule() {
        let html = r#"<div class="Nx9bqj CxhGGd">₹64,999</div>"#;
        assert_eq!(run(html).await, Some(Decimal::from(64_999)));
    }

    #[tokio::test]
    async fn overlay_present_does_not_block_extraction() {
        let html = r#"
            <button class="_2KpZ6l _2doB4z">✕</button>
            <div class="_30jeq3">₹19,999</div>
        "#;
        assert_eq!(run(html).await, Some(Decimal::from(19_999)));
    }

    #[tokio::test]
    async fn falls_back_to_embedded_data() {
        let html = r#"<script type="application/ld+json">{"offers":{"price":"58999"}}</script>"#;
        assert_eq!(run(html).await, Some(Decimal::from(58_999)));
    }

    #[tokio::test]
    async fn falls_back_to_markup_amounts() {
        // Amounts only appear inside attributes, invisible to element rules.
        let html = r#"<meta content="Buy now at ₹45,000 (was ₹52,000), EMI from ₹2,100">"#;
        assert_eq!(run(html).await, Some(Decimal::from(52_000)));
    }

    #[tokio::test]
    async fn final_wait_accepts_small_amounts() {
        // ₹99 fails the element floor and the markup band, but the last
        // resort accepts any positive amount.
        let html = r#"<p>₹99</p>"#;
        assert_eq!(run(html).await, Some(Decimal::from(99)));
    }

    #[tokio::test]
    async fn nothing_found() {
        assert_eq!(run("<p>Coming soon</p>").await, None);
    }
}
