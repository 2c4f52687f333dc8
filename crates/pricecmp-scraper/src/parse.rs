//! Text-to-price normalization.
//!
//! [`parse_price`] turns a raw text fragment (an element's visible text, a
//! snippet of markup) into a [`Decimal`]. It never fails loudly: anything it
//! cannot read is `None`. Deciding whether a parsed number is a plausible
//! listing price is the extractor's job, not this module's.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

/// A numeric run directly preceded by a currency marker: `₹`, `Rs`, `Rs.`
/// or `INR`, any case, optional whitespace in between.
static CURRENCY_MARKED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:₹|Rs\.?|INR)\s*([\d,]+(?:\.\d{1,2})?)").expect("valid regex")
});

/// Same grouping/fraction shape with no marker required.
static BARE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d,]+(?:\.\d{1,2})?)").expect("valid regex"));

/// Parses the first price-shaped number out of `text`.
///
/// Matching rules, first match wins:
/// 1. A currency-marked run, e.g. `"₹1,234.50"`, `"Rs. 999"`, `"inr 45,000"`.
/// 2. Any run of digits and grouping commas with up to two decimals.
/// 3. Otherwise `None`.
///
/// Grouping commas are stripped before parsing, so both western
/// (`1,234,567`) and Indian (`12,34,567`) grouping read the same.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }

    if let Some(m) = CURRENCY_MARKED_RE.captures(text).and_then(|c| c.get(1)) {
        return to_decimal(m.as_str());
    }

    BARE_NUMBER_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| to_decimal(m.as_str()))
}

/// Strips grouping commas and parses the remainder. A run made only of
/// commas (`","`) has nothing left to parse.
pub(crate) fn to_decimal(raw: &str) -> Option<Decimal> {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return None;
    }
    Decimal::from_str(&digits).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn rupee_symbol_with_grouping_and_paise() {
        assert_eq!(parse_price("₹1,234.50"), Some(dec("1234.50")));
    }

    #[test]
    fn rupee_symbol_with_space() {
        assert_eq!(parse_price("₹ 45,999"), Some(dec("45999")));
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(parse_price("₹1,24,999"), Some(dec("124999")));
    }

    #[test]
    fn rs_prefix_with_dot() {
        assert_eq!(parse_price("Rs. 2,499.00"), Some(dec("2499.00")));
    }

    #[test]
    fn rs_prefix_without_dot() {
        assert_eq!(parse_price("Rs 799"), Some(dec("799")));
    }

    #[test]
    fn inr_code_case_insensitive() {
        assert_eq!(parse_price("price: inr 45,000"), Some(dec("45000")));
    }

    #[test]
    fn currency_marked_run_wins_over_earlier_bare_number() {
        assert_eq!(parse_price("4.5 out of 5 stars ₹89,990"), Some(dec("89990")));
    }

    #[test]
    fn first_of_multiple_marked_prices() {
        assert_eq!(parse_price("₹59,999 M.R.P.: ₹74,999"), Some(dec("59999")));
    }

    #[test]
    fn bare_number_fallback() {
        assert_eq!(parse_price("999"), Some(dec("999")));
    }

    #[test]
    fn bare_number_with_grouping() {
        assert_eq!(parse_price("1,29,900."), Some(dec("129900")));
    }

    #[test]
    fn fraction_limited_to_two_digits() {
        assert_eq!(parse_price("₹10.999"), Some(dec("10.99")));
    }

    #[test]
    fn no_digits_is_none() {
        assert_eq!(parse_price("Currently unavailable"), None);
    }

    #[test]
    fn empty_is_none() {
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn lone_comma_is_none() {
        assert_eq!(parse_price(","), None);
    }

    #[test]
    fn marker_followed_by_commas_only_does_not_fall_back() {
        assert_eq!(parse_price("₹, 500"), None);
    }

    #[test]
    fn to_decimal_strips_commas() {
        assert_eq!(to_decimal("1,00,000"), Some(dec("100000")));
        assert_eq!(to_decimal(",,"), None);
    }
}
