//! Time-windowed trade history aggregation.
//!
//! Exchanges cap each history request to a bounded time window and partition
//! fills by category. [`Paginator`] walks every category across the requested
//! range in consecutive windows, merges the fills by id and returns them in
//! time order. Only the window size and category list differ per binding.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::models::{Category, Trade};
use crate::pacing::Pacer;
use crate::{GatewayError, Result};

pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Lookback used when no start time is given.
pub const DEFAULT_LOOKBACK_MS: u64 = 180 * DAY_MS;

/// An inclusive `[start_ms, end_ms]` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_ms: u64,
    pub end_ms: u64,
}

/// The full span a history request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start_ms: u64,
    end_ms: u64,
}

impl TimeRange {
    /// # Errors
    ///
    /// Returns [`GatewayError::Exchange`] if `start_ms > end_ms`.
    pub fn new(start_ms: u64, end_ms: u64) -> Result<Self> {
        if start_ms > end_ms {
            return Err(GatewayError::exchange(format!(
                "invalid time range: start {start_ms} is after end {end_ms}"
            )));
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Fills in missing bounds: the end defaults to `now_ms` and the start to
    /// [`DEFAULT_LOOKBACK_MS`] before the end.
    ///
    /// # Errors
    ///
    /// Same as [`TimeRange::new`].
    pub fn resolve(start_ms: Option<u64>, end_ms: Option<u64>, now_ms: u64) -> Result<Self> {
        let end = end_ms.unwrap_or(now_ms);
        let start = start_ms.unwrap_or_else(|| end.saturating_sub(DEFAULT_LOOKBACK_MS));
        Self::new(start, end)
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    /// Splits the range into windows of at most `window_ms`. Each window
    /// starts one millisecond after the previous one ends.
    pub fn windows(&self, window_ms: u64) -> Vec<TimeWindow> {
        let window_ms = window_ms.max(1);
        let mut windows = Vec::new();
        let mut start = self.start_ms;
        loop {
            let end = start.saturating_add(window_ms - 1).min(self.end_ms);
            windows.push(TimeWindow {
                start_ms: start,
                end_ms: end,
            });
            if end >= self.end_ms {
                break;
            }
            start = end + 1;
        }
        windows
    }
}

/// Fetches the fills of one category within one window.
#[async_trait]
pub trait WindowSource: Send + Sync {
    /// Returns every fill in `window`, following any per-window cursor.
    async fn fetch_window(&self, category: Category, window: TimeWindow) -> Result<Vec<Trade>>;

    /// Whether `error` means the category is unavailable to this account
    /// (not permitted, unknown category) rather than a real failure.
    fn is_category_rejection(&self, error: &GatewayError) -> bool;
}

/// Walks categories and windows sequentially.
#[derive(Debug, Clone)]
pub struct Paginator {
    window_ms: u64,
    categories: Vec<Category>,
}

impl Paginator {
    pub fn new(window_ms: u64, categories: &[Category]) -> Self {
        Self {
            window_ms,
            categories: categories.to_vec(),
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Collects every fill in `range` across all categories.
    ///
    /// Fills are deduplicated by id (a later copy replaces an earlier one)
    /// and returned sorted by timestamp, then id. A category rejection skips
    /// that category; any other error aborts the walk.
    ///
    /// # Errors
    ///
    /// Returns the first error that is not a category rejection.
    pub async fn collect<S>(
        &self,
        source: &S,
        pacer: &dyn Pacer,
        range: TimeRange,
    ) -> Result<Vec<Trade>>
    where
        S: WindowSource + ?Sized,
    {
        let windows = range.windows(self.window_ms);
        let mut merged: HashMap<String, Trade> = HashMap::new();

        for &category in &self.categories {
            for (i, window) in windows.iter().enumerate() {
                let fills = match source.fetch_window(category, *window).await {
                    Ok(fills) => fills,
                    Err(e) if source.is_category_rejection(&e) => {
                        warn!(category = %category, error = %e, "category rejected, skipping");
                        break;
                    }
                    Err(e) => return Err(e),
                };

                debug!(
                    category = %category,
                    start_ms = window.start_ms,
                    end_ms = window.end_ms,
                    count = fills.len(),
                    "fetched window"
                );
                for mut fill in fills {
                    fill.category.get_or_insert(category);
                    merged.insert(fill.id.clone(), fill);
                }

                if i + 1 < windows.len() {
                    pacer.pause().await;
                }
            }
        }

        let mut trades: Vec<Trade> = merged.into_values().collect();
        trades.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

        info!(
            count = trades.len(),
            windows = windows.len(),
            categories = self.categories.len(),
            "collected trade history"
        );
        Ok(trades)
    }
}
