//! Normalized data model shared by every binding.
//!
//! Bindings translate their wire formats into these types; callers only
//! ever see these. All money and quantity fields are [`rust_decimal::Decimal`]
//! and all timestamps are milliseconds since the Unix epoch.

pub mod add_order;
pub mod balance;
pub mod candle;
pub mod instrument;
pub mod orders;
pub mod position;
pub mod symbol;
pub mod trade;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use add_order::{CreateOrderBuilder, CreateOrderError, CreateOrderRequest};
pub use balance::{Balance, WalletBalance};
pub use candle::{Candle, CandleInterval, CandleQuery};
pub use instrument::MarketInfo;
pub use orders::Order;
pub use position::Position;
pub use symbol::SymbolPair;
pub use trade::{Trade, TradeQuery};

/// An exchange's sub-market partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Spot,
    /// Linear (USDT/USDC-margined) perpetuals and futures.
    Linear,
    /// Inverse (coin-margined) perpetuals and futures.
    Inverse,
    Option,
}

impl Category {
    /// Every category, in the order history is walked.
    pub const ALL: [Category; 4] = [
        Self::Spot,
        Self::Linear,
        Self::Inverse,
        Self::Option,
    ];

    /// Returns the lowercase wire name (`"spot"`, `"linear"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::Linear => "linear",
            Self::Inverse => "inverse",
            Self::Option => "option",
        }
    }

    /// Parses a lowercase category name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "spot" => Some(Self::Spot),
            "linear" => Some(Self::Linear),
            "inverse" => Some(Self::Inverse),
            "option" => Some(Self::Option),
            _ => None,
        }
    }

    /// Whether positions (and leverage) exist in this category.
    pub fn is_derivative(self) -> bool {
        !matches!(self, Self::Spot)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order or fill direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// How an order should be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    /// Market order released when the stop price trades.
    Stop,
    /// Limit order released when the stop price trades.
    StopLimit,
}

impl OrderType {
    /// Whether a price must accompany the order. Only market orders may
    /// omit it.
    pub fn requires_price(self) -> bool {
        !matches!(self, Self::Market)
    }

    /// Whether a stop (trigger) price must accompany the order.
    pub fn requires_stop_price(self) -> bool {
        matches!(self, Self::Stop | Self::StopLimit)
    }
}

/// Canonical order lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Open,
    Filled,
    PartiallyFilled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Whether the order can still trade.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Open | Self::PartiallyFilled)
    }
}

/// How long an order remains working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    /// Good 'til cancelled (default).
    Gtc,
    /// Immediate or cancel.
    Ioc,
    /// Fill or kill.
    Fok,
    /// Rests on the book or is cancelled.
    PostOnly,
}

/// Collateral model for a derivatives position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    Cross,
    Isolated,
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}
