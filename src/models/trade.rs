//! Executed fill models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Category, Side};

/// A single fill. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution id, unique per exchange and market.
    pub id: String,
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fee: Decimal,
    pub fee_currency: String,
    pub timestamp: u64,
    pub is_maker: bool,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub realized_pnl: Option<Decimal>,
}

impl Trade {
    /// Price times quantity.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }
}

/// Filter for a trade-history request.
///
/// Without a time range the binding fetches the trailing 180 days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeQuery {
    pub symbol: Option<String>,
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
    /// Restricts the walk to these categories; `None` means all supported.
    pub categories: Option<Vec<Category>>,
}

impl TradeQuery {
    /// Query for a single symbol over the default range.
    #[must_use]
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Default::default()
        }
    }

    /// Sets an explicit time range.
    #[must_use]
    pub fn between(mut self, start_ms: u64, end_ms: u64) -> Self {
        self.start_ms = Some(start_ms);
        self.end_ms = Some(end_ms);
        self
    }

    /// Restricts the categories walked.
    #[must_use]
    pub fn in_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = Some(categories);
        self
    }
}
