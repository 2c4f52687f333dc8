use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// No usable WebDriver endpoint. This is the only fatal error of a run.
    #[error("browser setup failed for {webdriver_url}: {reason}")]
    Setup {
        webdriver_url: String,
        reason: String,
    },

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("no page has been loaded yet")]
    NoPageLoaded,

    #[error("no fixture registered for {url}")]
    UnknownUrl { url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
