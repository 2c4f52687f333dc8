use crate::app_config::{AppConfig, DelayRange, WindowSize};
use crate::catalog::is_http_url;
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values are errors. Tests
/// drive this with a `HashMap` lookup instead of mutating the process env.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] naming the first malformed variable.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        parse_flag(&raw).ok_or_else(|| invalid(var, format!("expected a boolean, got \"{raw}\"")))
    };

    let parse_delay = |var: &str, default: &str| -> Result<DelayRange, ConfigError> {
        let raw = or_default(var, default);
        parse_delay_range(&raw).map_err(|reason| invalid(var, reason))
    };

    let webdriver_url = or_default("PRICECMP_WEBDRIVER_URL", "http://localhost:9515");
    if !is_http_url(&webdriver_url) {
        return Err(invalid(
            "PRICECMP_WEBDRIVER_URL",
            format!("expected an http(s) URL, got \"{webdriver_url}\""),
        ));
    }

    let log_level = or_default("PRICECMP_LOG_LEVEL", "info");
    let output_path = PathBuf::from(or_default(
        "PRICECMP_OUTPUT_PATH",
        "electronics_price_comparison.csv",
    ));
    let screenshot_dir = PathBuf::from(or_default("PRICECMP_SCREENSHOT_DIR", "."));
    let catalog_path = lookup("PRICECMP_CATALOG_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let headless = parse_bool("PRICECMP_HEADLESS", "true")?;
    let window_size = parse_window_size(&or_default("PRICECMP_WINDOW_SIZE", "1920,1080"))
        .map_err(|reason| invalid("PRICECMP_WINDOW_SIZE", reason))?;
    let user_agent = or_default("PRICECMP_USER_AGENT", DEFAULT_USER_AGENT);
    let debug_screenshots = parse_bool("PRICECMP_DEBUG_SCREENSHOTS", "false")?;

    let status_timeout_secs = parse_u64("PRICECMP_STATUS_TIMEOUT_SECS", "10")?;
    let rule_timeout_ms = parse_u64("PRICECMP_RULE_TIMEOUT_MS", "5000")?;
    let final_timeout_ms = parse_u64("PRICECMP_FINAL_TIMEOUT_MS", "10000")?;
    let poll_interval_ms = parse_u64("PRICECMP_POLL_INTERVAL_MS", "250")?;
    let overlay_pause_ms = parse_u64("PRICECMP_OVERLAY_PAUSE_MS", "1000")?;

    let amazon_settle = parse_delay("PRICECMP_AMAZON_SETTLE_MS", "3000-5000")?;
    let flipkart_settle = parse_delay("PRICECMP_FLIPKART_SETTLE_MS", "4000-6000")?;
    let inter_site_delay = parse_delay("PRICECMP_INTER_SITE_DELAY_MS", "5000-8000")?;
    let inter_product_delay = parse_delay("PRICECMP_INTER_PRODUCT_DELAY_MS", "5000-8000")?;

    Ok(AppConfig {
        webdriver_url,
        log_level,
        output_path,
        screenshot_dir,
        catalog_path,
        headless,
        window_size,
        user_agent,
        debug_screenshots,
        status_timeout_secs,
        rule_timeout_ms,
        final_timeout_ms,
        poll_interval_ms,
        overlay_pause_ms,
        amazon_settle,
        flipkart_settle,
        inter_site_delay,
        inter_product_delay,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parses `"MIN-MAX"` or a single `"N"` (fixed delay) in milliseconds.
pub(crate) fn parse_delay_range(raw: &str) -> Result<DelayRange, String> {
    let raw = raw.trim();
    let (min_raw, max_raw) = raw.split_once('-').unwrap_or((raw, raw));

    let min_ms = min_raw
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("bad lower bound \"{min_raw}\": {e}"))?;
    let max_ms = max_raw
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("bad upper bound \"{max_raw}\": {e}"))?;

    if min_ms > max_ms {
        return Err(format!("lower bound {min_ms} exceeds upper bound {max_ms}"));
    }

    Ok(DelayRange::new(min_ms, max_ms))
}

/// Parses `"WIDTH,HEIGHT"` (an `x` separator is also accepted).
fn parse_window_size(raw: &str) -> Result<WindowSize, String> {
    let (w, h) = raw
        .trim()
        .split_once([',', 'x'])
        .ok_or_else(|| format!("expected WIDTH,HEIGHT, got \"{raw}\""))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad width \"{w}\": {e}"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad height \"{h}\": {e}"))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be non-zero".to_string());
    }
    Ok(WindowSize { width, height })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
