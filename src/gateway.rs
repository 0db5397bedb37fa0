//! The exchange-neutral gateway contract.
//!
//! Callers hold an `Arc<dyn ExchangeGateway>` and never see exchange wire
//! formats. Each binding implements the network operations; the sizing and
//! risk methods are provided here and are never overridden, so every binding
//! returns identical results for identical inputs.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::symbol::{QUOTE_ASSETS, concat_symbol, split_symbol};
use crate::models::{
    Candle, CandleQuery, Category, CreateOrderRequest, MarketInfo, Order, Position, SymbolPair,
    Trade, TradeQuery, WalletBalance,
};
use crate::risk::{
    self, LossLimits, PositionSizeInput, PositionSizeResult, RiskValidationInput,
    RiskValidationResult,
};
use crate::{GatewayError, Result};

/// Outcome of [`ExchangeGateway::test_connection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCheck {
    pub server_time_ms: u64,
    /// Server time minus local time; positive when the local clock is behind.
    pub clock_skew_ms: i64,
    /// Whether a signed request was accepted. `false` when no credentials
    /// are configured.
    pub authenticated: bool,
}

/// What a binding supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeCapabilities {
    pub spot: bool,
    pub futures: bool,
    pub margin: bool,
    pub options: bool,
    pub stop_orders: bool,
    pub hedge_mode: bool,
}

/// Documented request budgets of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    pub requests_per_second: u32,
    pub orders_per_second: u32,
    /// Longest span a single history request may cover.
    pub history_window_ms: u64,
}

/// Uniform operations every exchange binding provides.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Short exchange identifier, e.g. `"bybit"`.
    fn name(&self) -> &str;

    /// Category every call on this instance is scoped to.
    fn category(&self) -> Category;

    fn capabilities(&self) -> ExchangeCapabilities;

    fn rate_limits(&self) -> RateLimits;

    /// Builds the exchange's symbol for a base/quote pair.
    fn format_symbol(&self, base: &str, quote: &str) -> String {
        concat_symbol(base, quote)
    }

    /// Splits an exchange symbol into base and quote.
    fn parse_symbol(&self, symbol: &str) -> Option<SymbolPair> {
        split_symbol(symbol, &QUOTE_ASSETS)
    }

    /// Checks reachability, clock skew and (when configured) credentials.
    async fn test_connection(&self) -> Result<ConnectionCheck>;

    async fn get_balance(&self) -> Result<WalletBalance>;

    /// Fills matching `query`, deduplicated and sorted by time.
    async fn get_trades(&self, query: &TradeQuery) -> Result<Vec<Trade>>;

    async fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>>;

    async fn get_order(&self, order_id: &str, symbol: Option<&str>) -> Result<Order>;

    /// Places an order. Never retried automatically.
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order>;

    async fn cancel_order(&self, order_id: &str, symbol: Option<&str>) -> Result<()>;

    /// Open positions; zero-size positions are never returned.
    async fn get_positions(&self, symbol: Option<&str>) -> Result<Vec<Position>>;

    async fn get_market_info(&self, symbol: &str) -> Result<MarketInfo>;

    /// Candles in ascending open-time order.
    async fn get_ohlcv(&self, query: &CandleQuery) -> Result<Vec<Candle>>;

    fn calculate_position_size(&self, input: &PositionSizeInput) -> PositionSizeResult {
        risk::calculate_position_size(input)
    }

    fn validate_risk(
        &self,
        input: &RiskValidationInput,
        limits: &LossLimits,
    ) -> RiskValidationResult {
        risk::validate_risk(input, limits)
    }
}

/// Backoff settings for [`retry_read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Whether an error is worth retrying for an idempotent read.
pub fn is_retryable(error: &GatewayError) -> bool {
    matches!(error, GatewayError::RateLimit { .. }) || error.is_timeout()
}

/// Retries an idempotent read on rate limits and timeouts.
///
/// A rate-limit `retry_after` hint wins over the computed backoff (capped at
/// `max_delay`). Only use this for reads such as `get_balance`,
/// `get_positions` or `get_market_info`; order placement must not be retried
/// blindly.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first error
/// that is not retryable.
pub async fn retry_read<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && is_retryable(&e) => {
                let delay = match &e {
                    GatewayError::RateLimit {
                        retry_after: Some(hint),
                        ..
                    } => (*hint).min(policy.max_delay),
                    _ => policy.backoff(attempt),
                };
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying read"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
