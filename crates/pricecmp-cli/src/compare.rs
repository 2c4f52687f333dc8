//! The comparison run: visit every product on both sites, report, persist.
//!
//! Per-site failures (navigation errors, missing prices, screenshot errors)
//! are logged and recorded as "no price" so one bad page never aborts the
//! run. Only failing to open the browser session is fatal.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pricecmp_core::{AppConfig, Catalog, ComparisonResult, DelayRange, Product, Site};
use pricecmp_scraper::pacing::pause;
use pricecmp_scraper::{extract_price, with_session, Browser, SessionOptions, WaitBudget};
use rust_decimal::Decimal;

use crate::{output, report, CompareArgs};

/// Everything the run loop needs besides the browser and catalog.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    /// `None` disables screenshots entirely.
    pub screenshot_dir: Option<PathBuf>,
    pub debug_screenshots: bool,
    pub budget: WaitBudget,
    pub amazon_settle: DelayRange,
    pub flipkart_settle: DelayRange,
    pub inter_site_delay: DelayRange,
    pub inter_product_delay: DelayRange,
}

impl RunSettings {
    pub(crate) fn from_config(config: &AppConfig, screenshot_dir: Option<PathBuf>) -> Self {
        Self {
            screenshot_dir,
            debug_screenshots: config.debug_screenshots,
            budget: WaitBudget::from_config(config),
            amazon_settle: config.settle_for(Site::Amazon),
            flipkart_settle: config.settle_for(Site::Flipkart),
            inter_site_delay: config.inter_site_delay,
            inter_product_delay: config.inter_product_delay,
        }
    }

    fn settle_for(&self, site: Site) -> DelayRange {
        match site {
            Site::Amazon => self.amazon_settle,
            Site::Flipkart => self.flipkart_settle,
        }
    }
}

/// Runs the `compare` command end to end.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the previous output
/// cannot be backed up, the browser session cannot be opened, or the CSV
/// cannot be written.
pub(crate) async fn run_compare(config: &AppConfig, args: &CompareArgs) -> anyhow::Result<()> {
    let catalog = resolve_catalog(args.catalog.as_deref().or(config.catalog_path.as_deref()))?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_path.clone());
    let screenshot_dir = if args.no_screenshots {
        None
    } else {
        let dir = args
            .screenshot_dir
            .clone()
            .unwrap_or_else(|| config.screenshot_dir.clone());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create screenshot directory {}", dir.display()))?;
        Some(dir)
    };
    let settings = RunSettings::from_config(config, screenshot_dir);

    println!("Starting price comparison for {} products...", catalog.len());

    if let Some(backup) = output::backup_existing(&output_path, chrono::Utc::now().timestamp())? {
        println!("Created backup of previous data: {}", backup.display());
    }

    let session_options = SessionOptions::from_config(config);
    let (catalog_ref, settings_ref) = (&catalog, &settings);
    let results = with_session(&session_options, |session| async move {
        run_comparison(&session, catalog_ref, settings_ref).await
    })
    .await?;

    finish(&results, &output_path, settings.screenshot_dir.is_some())
}

/// Prints the summary and writes the dataset. An empty run writes nothing.
pub(crate) fn finish(
    results: &[ComparisonResult],
    output_path: &Path,
    screenshots_taken: bool,
) -> anyhow::Result<()> {
    if results.is_empty() {
        println!("\nNo data was collected. Please check the error messages above.");
        return Ok(());
    }

    println!("\n{}", report::render_summary(results));

    output::write_dataset(output_path, results)?;
    let shown = std::fs::canonicalize(output_path).unwrap_or_else(|_| output_path.to_path_buf());
    println!("\nCSV written to {}", shown.display());
    if screenshots_taken {
        println!("\nScreenshots of the product pages have been saved for verification.");
    }
    Ok(())
}

pub(crate) fn resolve_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(path) => pricecmp_core::load_catalog(path)
            .with_context(|| format!("failed to load catalog {}", path.display())),
        None => Ok(Catalog::builtin()),
    }
}

/// Visits each product on Amazon then Flipkart, printing a comparison block
/// as each product completes.
pub(crate) async fn run_comparison<B: Browser>(
    browser: &B,
    catalog: &Catalog,
    settings: &RunSettings,
) -> Vec<ComparisonResult> {
    let mut results = Vec::with_capacity(catalog.len());

    for (index, product) in catalog.products().iter().enumerate() {
        if index > 0 {
            pause(settings.inter_product_delay, "between products").await;
        }
        println!("\nFetching: {}", product.name);

        let amazon_price = visit(browser, product, Site::Amazon, settings).await;
        pause(settings.inter_site_delay, "between sites").await;
        let flipkart_price = visit(browser, product, Site::Flipkart, settings).await;

        let result = ComparisonResult::from_prices(&product.name, amazon_price, flipkart_price);
        println!("{}", report::render_block(&result));
        results.push(result);
    }

    results
}

async fn visit<B: Browser>(
    browser: &B,
    product: &Product,
    site: Site,
    settings: &RunSettings,
) -> Option<Decimal> {
    let url = product.url_for(site);
    tracing::info!(product = %product.name, site = %site, url, "navigating");

    let price = match browser.navigate(url).await {
        Ok(()) => {
            pause(settings.settle_for(site), "page settle").await;
            if site == Site::Flipkart && settings.debug_screenshots {
                let name = format!("flipkart_debug_{}.png", chrono::Utc::now().timestamp());
                capture(browser, settings, &name).await;
            }
            extract_price(site, browser, &settings.budget).await
        }
        Err(e) => {
            tracing::warn!(product = %product.name, site = %site, error = %e, "navigation failed");
            None
        }
    };

    match price {
        Some(price) => println!("Found {site} price: {}", report::format_inr(price)),
        None => println!("No price found on {site}"),
    }

    let name = format!("{}_{}.png", site.slug(), product.file_stem());
    capture(browser, settings, &name).await;

    price
}

/// Best-effort screenshot into the configured directory.
async fn capture<B: Browser>(browser: &B, settings: &RunSettings, file_name: &str) {
    let Some(dir) = &settings.screenshot_dir else {
        return;
    };
    let path = dir.join(file_name);
    match browser.screenshot(&path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "screenshot saved"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "screenshot failed"),
    }
}

pub(crate) fn print_troubleshooting_tips() {
    println!("\nTroubleshooting tips:");
    println!("1. Make sure Chrome and a matching chromedriver are installed and chromedriver is running");
    println!("2. Check PRICECMP_WEBDRIVER_URL points at it (default http://localhost:9515)");
    println!("3. Check your internet connection");
    println!("4. Try with different product URLs");
}

#[cfg(test)]
#[path = "compare_test.rs"]
mod tests;
