//! OHLCV candle models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time.
    pub open_time: u64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Volume in base currency.
    pub volume: Decimal,
    /// Volume in quote currency.
    pub turnover: Decimal,
}

/// Supported bar sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleInterval {
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    TwelveHours,
    OneDay,
    OneWeek,
    OneMonth,
}

impl CandleInterval {
    /// Bar length in milliseconds (a month counts as 30 days).
    pub fn duration_ms(self) -> u64 {
        const MINUTE: u64 = 60_000;
        match self {
            Self::OneMinute => MINUTE,
            Self::ThreeMinutes => 3 * MINUTE,
            Self::FiveMinutes => 5 * MINUTE,
            Self::FifteenMinutes => 15 * MINUTE,
            Self::ThirtyMinutes => 30 * MINUTE,
            Self::OneHour => 60 * MINUTE,
            Self::TwoHours => 120 * MINUTE,
            Self::FourHours => 240 * MINUTE,
            Self::SixHours => 360 * MINUTE,
            Self::TwelveHours => 720 * MINUTE,
            Self::OneDay => 1_440 * MINUTE,
            Self::OneWeek => 7 * 1_440 * MINUTE,
            Self::OneMonth => 30 * 1_440 * MINUTE,
        }
    }
}

/// Parameters for an OHLCV request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleQuery {
    pub symbol: String,
    pub interval: CandleInterval,
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
    /// Maximum number of bars; the binding caps it to its own limit.
    pub limit: Option<u32>,
}

impl CandleQuery {
    /// Most recent bars for a symbol.
    #[must_use]
    pub fn new(symbol: impl Into<String>, interval: CandleInterval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start_ms: None,
            end_ms: None,
            limit: None,
        }
    }

    /// Sets the maximum number of bars.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets an explicit time range.
    #[must_use]
    pub fn between(mut self, start_ms: u64, end_ms: u64) -> Self {
        self.start_ms = Some(start_ms);
        self.end_ms = Some(end_ms);
        self
    }
}
