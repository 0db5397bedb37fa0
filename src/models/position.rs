//! Open position model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MarginMode, PositionSide};

/// A non-empty derivatives position. Bindings never return zero-size rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol plus position slot (e.g., `"BTCUSDT-0"`).
    pub id: String,
    pub symbol: String,
    pub side: PositionSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub leverage: Decimal,
    pub margin_mode: MarginMode,
    #[serde(default)]
    pub liquidation_price: Option<Decimal>,
    pub margin_used: Decimal,
    pub created_at: u64,
}

impl Position {
    /// Mark-to-market notional.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.quantity * self.mark_price
    }
}
