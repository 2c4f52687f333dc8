//! The renderer contract the extractors are written against.
//!
//! Extraction code only ever sees a [`RenderedPage`]: a read-mostly view of
//! whatever the browser currently shows. The live WebDriver session and the
//! saved-markup fixture both implement it, so every extraction rule runs the
//! same way against either.

use std::path::Path;
use std::time::Duration;

use crate::error::ScraperError;

/// How an extraction rule finds elements on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// A CSS selector, e.g. `span.a-price-whole`.
    Css(&'static str),
    /// Elements named `tag` (`*` for any) whose own first text node contains
    /// `needle`. Mirrors the XPath `//tag[contains(text(), 'needle')]`.
    OwnTextContains {
        tag: &'static str,
        needle: &'static str,
    },
}

impl Locator {
    /// The XPath equivalent of an [`Locator::OwnTextContains`] rule.
    #[must_use]
    pub fn to_xpath(&self) -> Option<String> {
        match self {
            Locator::Css(_) => None,
            Locator::OwnTextContains { tag, needle } => {
                Some(format!("//{tag}[contains(text(), '{needle}')]"))
            }
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(css) => f.write_str(css),
            Locator::OwnTextContains { tag, needle } => {
                write!(f, "{tag} containing '{needle}'")
            }
        }
    }
}

/// Read access to the page currently loaded in a renderer.
///
/// Methods return `Err` only when the renderer itself misbehaves (a dropped
/// session, a malformed selector). "Nothing matched" is `Ok(None)` or an
/// empty `Vec`.
#[allow(async_fn_in_trait)]
pub trait RenderedPage {
    /// Waits up to `timeout` for an element matching `locator` and returns
    /// the visible text of the first one, or `None` if none appeared.
    async fn wait_for_text(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<String>, ScraperError>;

    /// Visible text of every element currently matching `locator`, in
    /// document order.
    async fn texts(&self, locator: &Locator) -> Result<Vec<String>, ScraperError>;

    /// The full page markup as currently rendered.
    async fn markup(&self) -> Result<String, ScraperError>;

    /// Clicks the first element matching `locator`. Returns `false` when no
    /// element matched.
    async fn click_first(&self, locator: &Locator) -> Result<bool, ScraperError>;
}

/// A renderer that can load URLs and capture what it shows.
#[allow(async_fn_in_trait)]
pub trait Browser: RenderedPage {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError>;

    async fn screenshot(&self, path: &Path) -> Result<(), ScraperError>;
}
