use std::path::PathBuf;
use std::time::Duration;

use crate::comparison::Site;

/// Inclusive range of milliseconds a randomized pause is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that never sleeps. Used by tests and fixture runs.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }

    #[must_use]
    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

impl std::fmt::Display for DelayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}ms", self.min_ms, self.max_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub webdriver_url: String,
    pub log_level: String,
    pub output_path: PathBuf,
    pub screenshot_dir: PathBuf,
    /// `None` means the built-in catalog is used.
    pub catalog_path: Option<PathBuf>,
    pub headless: bool,
    pub window_size: WindowSize,
    pub user_agent: String,
    pub debug_screenshots: bool,
    pub status_timeout_secs: u64,
    pub rule_timeout_ms: u64,
    pub final_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub overlay_pause_ms: u64,
    pub amazon_settle: DelayRange,
    pub flipkart_settle: DelayRange,
    pub inter_site_delay: DelayRange,
    pub inter_product_delay: DelayRange,
}

impl AppConfig {
    /// Settle delay applied after navigating to `site`, before extraction.
    #[must_use]
    pub fn settle_for(&self, site: Site) -> DelayRange {
        match site {
            Site::Amazon => self.amazon_settle,
            Site::Flipkart => self.flipkart_settle,
        }
    }
}
