//! Price comparison between the two storefronts.
//!
//! [`ComparisonResult::from_prices`] is a pure function of the two optional
//! prices; everything in a result row is derived from them.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    /// Site A.
    Amazon,
    /// Site B.
    Flipkart,
}

impl Site {
    /// Both sites in the order they are visited for each product.
    pub const ALL: [Site; 2] = [Site::Amazon, Site::Flipkart];

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Site::Amazon => "Amazon",
            Site::Flipkart => "Flipkart",
        }
    }

    /// Lowercase identifier used in file names and on the command line.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Site::Amazon => "amazon",
            Site::Flipkart => "flipkart",
        }
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Site {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amazon" | "a" => Ok(Site::Amazon),
            "flipkart" | "b" => Ok(Site::Flipkart),
            _ => Err(CoreError::UnknownSite(s.to_string())),
        }
    }
}

/// The `Cheaper Site` column. `Neither` renders as `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheaperSite {
    Site(Site),
    Neither,
}

impl std::fmt::Display for CheaperSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheaperSite::Site(site) => f.write_str(site.display_name()),
            CheaperSite::Neither => f.write_str("-"),
        }
    }
}

impl Serialize for CheaperSite {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Human-readable outcome shown under each per-product comparison block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Cheaper { site: Site, by: Decimal },
    Equal,
    /// At least one side has no price.
    Unavailable,
}

/// One dataset row. Column names match the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    #[serde(rename = "Product")]
    pub product_name: String,
    #[serde(rename = "Amazon Price (₹)")]
    pub amazon_price: Option<Decimal>,
    #[serde(rename = "Flipkart Price (₹)")]
    pub flipkart_price: Option<Decimal>,
    #[serde(rename = "Cheaper Site")]
    pub cheaper_site: CheaperSite,
    #[serde(rename = "Difference (₹)")]
    pub difference: Option<Decimal>,
}

impl ComparisonResult {
    /// Derives a result row from the two extracted prices.
    ///
    /// - both present, unequal: the strictly smaller side is cheaper, `difference = |a - b|`
    /// - both present, equal: `cheaper_site = -`, `difference = 0`
    /// - one present: that side is reported as cheaper, `difference` absent
    /// - none present: `cheaper_site = -`, `difference` absent
    #[must_use]
    pub fn from_prices(
        product_name: impl Into<String>,
        amazon_price: Option<Decimal>,
        flipkart_price: Option<Decimal>,
    ) -> Self {
        let (cheaper_site, difference) = match (amazon_price, flipkart_price) {
            (Some(a), Some(f)) => {
                let cheaper = match a.cmp(&f) {
                    std::cmp::Ordering::Less => CheaperSite::Site(Site::Amazon),
                    std::cmp::Ordering::Greater => CheaperSite::Site(Site::Flipkart),
                    std::cmp::Ordering::Equal => CheaperSite::Neither,
                };
                (cheaper, Some((a - f).abs()))
            }
            (Some(_), None) => (CheaperSite::Site(Site::Amazon), None),
            (None, Some(_)) => (CheaperSite::Site(Site::Flipkart), None),
            (None, None) => (CheaperSite::Neither, None),
        };

        Self {
            product_name: product_name.into(),
            amazon_price,
            flipkart_price,
            cheaper_site,
            difference,
        }
    }

    #[must_use]
    pub fn price_for(&self, site: Site) -> Option<Decimal> {
        match site {
            Site::Amazon => self.amazon_price,
            Site::Flipkart => self.flipkart_price,
        }
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        match (self.cheaper_site, self.difference) {
            (CheaperSite::Site(site), Some(by)) => Verdict::Cheaper { site, by },
            (CheaperSite::Neither, Some(_)) => Verdict::Equal,
            _ => Verdict::Unavailable,
        }
    }
}
