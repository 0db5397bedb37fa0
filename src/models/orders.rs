//! Normalized order model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MarginMode, OrderStatus, OrderType, Side, TimeInForce};

/// An order as reported by the exchange.
///
/// Status transitions are driven by the exchange; the gateway only
/// reflects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// Limit price; `None` for market orders.
    pub price: Option<Decimal>,
    pub quantity: Decimal,
    pub filled_quantity: Decimal,
    #[serde(default)]
    pub average_price: Option<Decimal>,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    pub time_in_force: TimeInForce,
    #[serde(default)]
    pub leverage: Option<Decimal>,
    #[serde(default)]
    pub margin_mode: Option<MarginMode>,
    #[serde(default)]
    pub reduce_only: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Order {
    /// Quantity still working on the book.
    #[must_use]
    pub fn remaining_quantity(&self) -> Decimal {
        (self.quantity - self.filled_quantity).max(Decimal::ZERO)
    }
}
