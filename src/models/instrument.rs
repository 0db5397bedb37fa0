//! Trading-pair reference data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::floor_to_step;

/// Trading rules for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    /// Exchange trading status (e.g., "Trading").
    pub status: String,
    pub min_quantity: Decimal,
    pub max_quantity: Decimal,
    /// Minimum quantity increment.
    pub quantity_step: Decimal,
    /// Decimal places allowed in quantities, derived from `quantity_step`.
    pub quantity_precision: u32,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Decimal places allowed in prices, derived from `tick_size`.
    pub price_precision: u32,
    pub tick_size: Decimal,
    /// Minimum order value in quote currency.
    pub min_notional: Decimal,
    pub spot: bool,
    pub futures: bool,
    pub margin: bool,
    #[serde(default)]
    pub max_leverage: Option<Decimal>,
}

impl MarketInfo {
    /// Whether new orders are accepted.
    pub fn is_trading(&self) -> bool {
        self.status.eq_ignore_ascii_case("trading")
    }

    /// Rounds a quantity down to the symbol's step.
    #[must_use]
    pub fn round_quantity(&self, quantity: Decimal) -> Decimal {
        floor_to_step(quantity, self.quantity_step)
    }

    /// Rounds a price down to the symbol's tick.
    #[must_use]
    pub fn round_price(&self, price: Decimal) -> Decimal {
        floor_to_step(price, self.tick_size)
    }
}
