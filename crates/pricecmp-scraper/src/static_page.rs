//! A renderer backed by saved HTML instead of a live browser.
//!
//! Used by the `extract` subcommand to run extraction against a page saved to
//! disk, and by tests to drive the whole comparison loop without chromedriver.
//! Nothing here executes scripts: what the markup says is what the page shows.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::page::{Browser, Locator, RenderedPage};

/// A single page of fixed markup.
#[derive(Debug, Clone)]
pub struct StaticPage {
    markup: String,
}

impl StaticPage {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    fn matching_texts(&self, locator: &Locator) -> Result<Vec<String>, ScraperError> {
        let document = Html::parse_document(&self.markup);
        match locator {
            Locator::Css(css) => {
                let selector = parse_selector(css)?;
                Ok(document.select(&selector).map(visible_text).collect())
            }
            Locator::OwnTextContains { tag, needle } => {
                let selector = parse_selector(tag)?;
                Ok(document
                    .select(&selector)
                    .filter(|el| first_text_child_contains(*el, needle))
                    .map(visible_text)
                    .collect())
            }
        }
    }
}

impl RenderedPage for StaticPage {
    async fn wait_for_text(
        &self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<Option<String>, ScraperError> {
        // Static markup never changes, so there is nothing to wait for.
        Ok(self.matching_texts(locator)?.into_iter().next())
    }

    async fn texts(&self, locator: &Locator) -> Result<Vec<String>, ScraperError> {
        self.matching_texts(locator)
    }

    async fn markup(&self) -> Result<String, ScraperError> {
        Ok(self.markup.clone())
    }

    async fn click_first(&self, locator: &Locator) -> Result<bool, ScraperError> {
        Ok(!self.matching_texts(locator)?.is_empty())
    }
}

fn parse_selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Element text with runs of whitespace collapsed, roughly what a browser
/// reports as rendered text.
fn visible_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// XPath 1.0 `contains(text(), ..)` only looks at the first text node.
fn first_text_child_contains(el: ElementRef<'_>, needle: &str) -> bool {
    el.children()
        .find_map(|child| child.value().as_text().map(|text| text.contains(needle)))
        .unwrap_or(false)
}

/// A fake browser serving fixed markup per URL.
///
/// Navigation to a URL with no registered page is an error, which lets tests
/// exercise the "page failed to load" path. Screenshots are recorded, not
/// written.
#[derive(Debug, Default)]
pub struct StaticBrowser {
    pages: HashMap<String, String>,
    current: RefCell<Option<StaticPage>>,
    visited: RefCell<Vec<String>>,
    screenshots: RefCell<Vec<PathBuf>>,
}

impl StaticBrowser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the markup returned when `url` is navigated to.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages.insert(url.into(), markup.into());
        self
    }

    /// URLs navigated to so far, in order. Failed navigations are included.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }

    /// Paths passed to [`Browser::screenshot`], in order.
    #[must_use]
    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.screenshots.borrow().clone()
    }

    fn current_page(&self) -> Result<StaticPage, ScraperError> {
        self.current
            .borrow()
            .clone()
            .ok_or(ScraperError::NoPageLoaded)
    }
}

impl RenderedPage for StaticBrowser {
    async fn wait_for_text(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<String>, ScraperError> {
        self.current_page()?.wait_for_text(locator, timeout).await
    }

    async fn texts(&self, locator: &Locator) -> Result<Vec<String>, ScraperError> {
        self.current_page()?.texts(locator).await
    }

    async fn markup(&self) -> Result<String, ScraperError> {
        Ok(self.current_page()?.markup)
    }

    async fn click_first(&self, locator: &Locator) -> Result<bool, ScraperError> {
        self.current_page()?.click_first(locator).await
    }
}

impl Browser for StaticBrowser {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        self.visited.borrow_mut().push(url.to_string());
        let page = self.pages.get(url).map(StaticPage::new);
        let loaded = page.is_some();
        *self.current.borrow_mut() = page;
        if loaded {
            Ok(())
        } else {
            Err(ScraperError::UnknownUrl {
                url: url.to_string(),
            })
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<(), ScraperError> {
        self.current_page()?;
        self.screenshots.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
