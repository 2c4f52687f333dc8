//! Randomized pauses between browser actions.
//!
//! Every navigation is followed by a settle delay so dynamic content can
//! render, and consecutive navigations are spaced out to approximate a human
//! browsing cadence. There is no retry or backoff here: a pause happens once,
//! for a duration drawn uniformly from a [`DelayRange`].

use std::time::Duration;

use pricecmp_core::DelayRange;

/// Draws a duration uniformly from `range` (inclusive on both ends).
#[must_use]
pub fn jittered(range: DelayRange) -> Duration {
    if range.min_ms >= range.max_ms {
        return Duration::from_millis(range.max_ms);
    }
    Duration::from_millis(rand::random_range(range.min_ms..=range.max_ms))
}

/// Sleeps for a random duration within `range`. A zero range returns
/// immediately without yielding to the runtime.
pub async fn pause(range: DelayRange, reason: &'static str) {
    if range.is_zero() {
        return;
    }
    let delay = jittered(range);
    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    tracing::debug!(delay_ms, reason, "pausing");
    tokio::time::sleep(delay).await;
}
