//! Account balance models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Holdings of a single currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Currency code (e.g., "BTC", "USDT").
    pub currency: String,
    /// Total holdings; always `available + locked`.
    pub total: Decimal,
    /// Free to trade or withdraw.
    pub available: Decimal,
    /// Reserved by open orders or positions.
    pub locked: Decimal,
    /// USD valuation reported by the exchange, if any.
    pub usd_value: Option<Decimal>,
}

impl Balance {
    /// Builds a balance from a total and a locked amount.
    ///
    /// `locked` is clamped into `[0, total]` and `available` is derived,
    /// so `total == available + locked` holds exactly.
    #[must_use]
    pub fn from_total_and_locked(
        currency: impl Into<String>,
        total: Decimal,
        locked: Decimal,
        usd_value: Option<Decimal>,
    ) -> Self {
        let total = total.max(Decimal::ZERO);
        let locked = locked.max(Decimal::ZERO).min(total);
        Self {
            currency: currency.into(),
            total,
            available: total - locked,
            locked,
            usd_value,
        }
    }
}

/// Balances and margin summary for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Exchange account label (e.g., "UNIFIED").
    pub account_type: String,
    /// Per-currency balances in exchange order.
    pub balances: Vec<Balance>,
    pub total_equity_usd: Decimal,
    pub available_margin_usd: Decimal,
    /// Margin in use; never negative.
    pub used_margin_usd: Decimal,
}

impl WalletBalance {
    /// Looks up the balance of a single currency.
    pub fn balance(&self, currency: &str) -> Option<&Balance> {
        self.balances
            .iter()
            .find(|b| b.currency.eq_ignore_ascii_case(currency))
    }
}
