//! Live browser sessions over WebDriver.
//!
//! A run owns exactly one headless Chrome session. [`with_session`] scopes it:
//! the session is opened before the body runs and closed after, whether the
//! body returns normally or panics.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::time::Duration;

use futures::FutureExt;
use pricecmp_core::{AppConfig, WindowSize};
use serde::Deserialize;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;

use crate::error::ScraperError;
use crate::page::{Browser, Locator, RenderedPage};

/// Everything needed to open a browser session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub window_size: WindowSize,
    pub user_agent: String,
    pub status_timeout: Duration,
    pub poll_interval: Duration,
}

impl SessionOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            headless: config.headless,
            window_size: config.window_size,
            user_agent: config.user_agent.clone(),
            status_timeout: Duration::from_secs(config.status_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Chrome command-line switches for this session.
    #[must_use]
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(6);
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args.push(format!(
            "--window-size={},{}",
            self.window_size.width, self.window_size.height
        ));
        args.push("--disable-gpu".to_string());
        args.push("--no-sandbox".to_string());
        args.push("--disable-dev-shm-usage".to_string());
        args.push(format!("--user-agent={}", self.user_agent));
        args
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    value: StatusValue,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    ready: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Asks the WebDriver server whether it can accept a new session.
///
/// # Errors
///
/// Returns [`ScraperError::Setup`] if the server is unreachable, answers with a
/// non-success status or an unexpected body, or reports `ready: false`.
pub async fn check_webdriver_ready(
    webdriver_url: &str,
    timeout: Duration,
) -> Result<(), ScraperError> {
    let setup = |reason: String| ScraperError::Setup {
        webdriver_url: webdriver_url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let status_url = format!("{}/status", webdriver_url.trim_end_matches('/'));

    let response = client
        .get(&status_url)
        .send()
        .await
        .map_err(|e| setup(format!("WebDriver server unreachable: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(setup(format!("status endpoint returned HTTP {status}")));
    }

    let body: StatusResponse = response
        .json()
        .await
        .map_err(|e| setup(format!("unexpected status response: {e}")))?;

    if !body.value.ready {
        let message = body
            .value
            .message
            .unwrap_or_else(|| "no message".to_string());
        return Err(setup(format!("WebDriver server not ready: {message}")));
    }

    tracing::debug!(webdriver_url, "webdriver ready");
    Ok(())
}

/// A connected Chrome session.
///
/// Cloning is cheap and shares the underlying session. Only one clone should
/// call [`BrowserSession::quit`].
#[derive(Debug, Clone)]
pub struct BrowserSession {
    driver: WebDriver,
    poll_interval: Duration,
}

impl BrowserSession {
    /// Checks the server, then starts a new Chrome session.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Setup`] if the server is not ready or refuses
    /// the session.
    pub async fn connect(options: &SessionOptions) -> Result<Self, ScraperError> {
        check_webdriver_ready(&options.webdriver_url, options.status_timeout).await?;

        let setup = |reason: String| ScraperError::Setup {
            webdriver_url: options.webdriver_url.clone(),
            reason,
        };

        let mut caps = DesiredCapabilities::chrome();
        for arg in options.chrome_args() {
            caps.add_arg(&arg)
                .map_err(|e| setup(format!("invalid Chrome argument {arg}: {e}")))?;
        }

        let driver = WebDriver::new(options.webdriver_url.as_str(), caps)
            .await
            .map_err(|e| setup(format!("could not start Chrome session: {e}")))?;

        tracing::info!(
            webdriver_url = %options.webdriver_url,
            headless = options.headless,
            "browser session started"
        );

        Ok(Self {
            driver,
            poll_interval: options.poll_interval,
        })
    }

    /// Ends the session and closes the browser.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::WebDriver`] if the server rejects the request.
    pub async fn quit(self) -> Result<(), ScraperError> {
        self.driver.quit().await?;
        tracing::debug!("browser session closed");
        Ok(())
    }
}

fn to_by(locator: &Locator) -> By {
    match locator {
        Locator::Css(css) => By::Css(*css),
        Locator::OwnTextContains { .. } => {
            let xpath = locator.to_xpath().unwrap_or_default();
            By::XPath(xpath)
        }
    }
}

impl RenderedPage for BrowserSession {
    async fn wait_for_text(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<String>, ScraperError> {
        let found = self
            .driver
            .query(to_by(locator))
            .wait(timeout, self.poll_interval)
            .first_opt()
            .await?;
        match found {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }

    async fn texts(&self, locator: &Locator) -> Result<Vec<String>, ScraperError> {
        let elements = self.driver.find_all(to_by(locator)).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            texts.push(element.text().await?);
        }
        Ok(texts)
    }

    async fn markup(&self) -> Result<String, ScraperError> {
        Ok(self.driver.source().await?)
    }

    async fn click_first(&self, locator: &Locator) -> Result<bool, ScraperError> {
        let elements = self.driver.find_all(to_by(locator)).await?;
        let Some(element) = elements.into_iter().next() else {
            return Ok(false);
        };
        element.click().await?;
        Ok(true)
    }
}

impl Browser for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), ScraperError> {
        self.driver.screenshot(path).await?;
        Ok(())
    }
}

/// Opens a session, runs `body` with it, and always closes it afterwards.
///
/// A failure to close is logged and does not replace the body's result. If
/// `body` panics the session is closed first and the panic then resumes.
///
/// # Errors
///
/// Returns [`ScraperError::Setup`] if the session cannot be opened; `body`
/// does not run in that case.
pub async fn with_session<T, F, Fut>(options: &SessionOptions, body: F) -> Result<T, ScraperError>
where
    F: FnOnce(BrowserSession) -> Fut,
    Fut: Future<Output = T>,
{
    let session = BrowserSession::connect(options).await?;

    let outcome = AssertUnwindSafe(body(session.clone()))
        .catch_unwind()
        .await;

    if let Err(e) = session.quit().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }

    match outcome {
        Ok(value) => Ok(value),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
