use rust_decimal::Decimal;

use super::WaitBudget;
use crate::page::{Locator, RenderedPage};
use crate::parse::parse_price;

/// Price element selectors, most specific first.
const PRICE_RULES: [Locator; 5] = [
    Locator::Css("span.a-price-whole"),
    Locator::Css("span#priceblock_ourprice"),
    Locator::Css("span#priceblock_dealprice"),
    Locator::Css("span.a-price span.a-offscreen"),
    Locator::Css("span.a-color-price"),
];

pub(super) async fn extract<P: RenderedPage>(page: &P, budget: &WaitBudget) -> Option<Decimal> {
    for rule in &PRICE_RULES {
        let text = match page.wait_for_text(rule, budget.rule_timeout).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!(site = "amazon", %rule, "rule matched nothing");
                continue;
            }
            Err(e) => {
                tracing::debug!(site = "amazon", %rule, error = %e, "rule failed");
                continue;
            }
        };

        if let Some(price) = parse_price(&text).filter(|p| *p > Decimal::ZERO) {
            tracing::debug!(site = "amazon", %rule, %price, "rule accepted");
            return Some(price);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_page::StaticPage;

    async fn run(html: &str) -> Option<Decimal> {
        extract(&StaticPage::new(html), &WaitBudget::immediate()).await
    }

    #[tokio::test]
    async fn whole_price_span() {
        let html = r#"<span class="a-price"><span class="a-price-whole">89,990.</span></span>"#;
        assert_eq!(run(html).await, Some(Decimal::from(89_990)));
    }

    #[tokio::test]
    async fn legacy_price_block() {
        let html = r#"<span id="priceblock_ourprice">₹ 1,24,999.00</span>"#;
        assert_eq!(run(html).await, Some(Decimal::new(12_499_900, 2)));
    }

    #[tokio::test]
    async fn deal_price_block() {
        let html = r#"<span id="priceblock_dealprice">₹54,999</span>"#;
        assert_eq!(run(html).await, Some(Decimal::from(54_999)));
    }

    #[tokio::test]
    async fn offscreen_price() {
        let html = r#"<span class="a-price"><span class="a-offscreen">₹72,900.00</span></span>"#;
        assert_eq!(run(html).await, Some(Decimal::new(7_290_000, 2)));
    }

    #[tokio::test]
    async fn falls_through_unparseable_rule() {
        let html = r#"
            <span class="a-price-whole">See options</span>
            <span class="a-color-price">₹3,499</span>
        "#;
        assert_eq!(run(html).await, Some(Decimal::from(3499)));
    }

    #[tokio::test]
    async fn zero_price_is_a_miss() {
        let html = r#"
            <span class="a-price-whole">0</span>
            <span class="a-color-price">₹999</span>
        "#;
        assert_eq!(run(html).await, Some(Decimal::from(999)));
    }

    #[tokio::test]
    async fn earlier_rule_wins() {
        let html = r#"
            <span class="a-color-price">₹1</span>
            <span class="a-price-whole">45,000</span>
        "#;
        assert_eq!(run(html).await, Some(Decimal::from(45_000)));
    }

    #[tokio::test]
    async fn no_price_elements() {
        assert_eq!(run("<p>Currently unavailable.</p>").await, None);
    }
}
