//! Symbol formatting and parsing.
//!
//! Most exchanges concatenate base and quote (`BTCUSDT`). Parsing matches
//! the longest known quote suffix first so `BTCUSDT` is never read as
//! `BTCUSD` + `T`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Quote assets recognized when splitting concatenated symbols.
pub const QUOTE_ASSETS: [&str; 8] = ["USDT", "USDC", "FDUSD", "USD", "EUR", "BTC", "ETH", "DAI"];

/// A base/quote asset pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolPair {
    pub base: String,
    pub quote: String,
}

impl SymbolPair {
    #[must_use]
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

impl fmt::Display for SymbolPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Joins base and quote into the concatenated upper-case form.
#[must_use]
pub fn concat_symbol(base: &str, quote: &str) -> String {
    format!("{}{}", base.trim(), quote.trim()).to_ascii_uppercase()
}

/// Splits a symbol into base and quote.
///
/// Accepts `BTCUSDT`, `BTC/USDT`, `BTC-USDT` and `BTC_USDT`. Returns `None`
/// when no known quote asset matches or the base would be empty.
#[must_use]
pub fn split_symbol(symbol: &str, quotes: &[&str]) -> Option<SymbolPair> {
    let symbol = symbol.trim().to_ascii_uppercase();

    let parts: Vec<&str> = symbol.split(['/', '-', '_']).collect();
    if parts.len() == 2 {
        let (base, quote) = (parts[0], parts[1]);
        if base.is_empty() || quote.is_empty() {
            return None;
        }
        return Some(SymbolPair::new(base, quote));
    }
    if parts.len() > 2 {
        return None;
    }

    let mut by_length: Vec<&str> = quotes.to_vec();
    by_length.sort_by_key(|q| std::cmp::Reverse(q.len()));

    by_length.into_iter().find_map(|quote| {
        let base = symbol.strip_suffix(quote)?;
        (!base.is_empty()).then(|| SymbolPair::new(base, quote))
    })
}
