//! Delay strategies between consecutive requests.
//!
//! The paginator asks a [`Pacer`] to pause between windowed requests instead
//! of sleeping inline, so tests can count pauses without waiting.

use std::time::Duration;

use async_trait::async_trait;

/// Default spacing between paginated requests.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits before the next request may be issued.
    async fn pause(&self);
}

/// Sleeps a fixed interval on every pause.
#[derive(Debug, Clone, Copy)]
pub struct FixedIntervalPacer {
    interval: Duration,
}

impl FixedIntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedIntervalPacer {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_INTERVAL)
    }
}

#[async_trait]
impl Pacer for FixedIntervalPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) {}
}
