//! Typed parsing of string-encoded exchange numbers.
//!
//! Exchanges send prices, quantities and fees as JSON strings. Every binding
//! goes through these helpers so the values land in [`Decimal`] without a
//! detour through `f64`.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{GatewayError, Result};

/// Parses a required decimal field.
///
/// An empty string is treated as zero, which is how several exchanges
/// encode "not applicable" for numeric fields.
///
/// # Errors
///
/// Returns [`GatewayError::Exchange`] naming the field if the value is not
/// a decimal number.
pub fn parse_decimal(field: &str, raw: &str) -> Result<Decimal> {
    Ok(parse_optional_decimal(field, raw)?.unwrap_or(Decimal::ZERO))
}

/// Parses an optional decimal field; empty strings become `None`.
///
/// # Errors
///
/// Returns [`GatewayError::Exchange`] naming the field if a non-empty value
/// is not a decimal number.
pub fn parse_optional_decimal(field: &str, raw: &str) -> Result<Option<Decimal>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    };

    parsed
        .map(|d| Some(d.normalize()))
        .map_err(|e| GatewayError::exchange(format!("invalid decimal in `{field}`: {raw:?} ({e})")))
}

/// Like [`parse_optional_decimal`] but also maps zero to `None`.
///
/// Used for fields such as liquidation price or stop-loss where the
/// exchange sends `"0"` to mean "unset".
///
/// # Errors
///
/// Same as [`parse_optional_decimal`].
pub fn parse_nonzero_decimal(field: &str, raw: &str) -> Result<Option<Decimal>> {
    Ok(parse_optional_decimal(field, raw)?.filter(|d| !d.is_zero()))
}

/// Parses a millisecond timestamp sent as a string.
///
/// # Errors
///
/// Returns [`GatewayError::Exchange`] if the value is not an unsigned integer.
pub fn parse_timestamp_ms(field: &str, raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse::<u64>().map_err(|e| {
        GatewayError::exchange(format!("invalid timestamp in `{field}`: {raw:?} ({e})"))
    })
}

/// Number of decimal places implied by a step size.
///
/// A step of `0.001` implies 3 places, `0.50` implies 1 and `10` implies 0.
#[must_use]
pub fn decimal_places(step: Decimal) -> u32 {
    step.normalize().scale()
}

/// Rounds `value` down to a multiple of `step`. A non-positive step returns
/// the value unchanged.
#[must_use]
pub fn floor_to_step(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    ((value / step).floor() * step).normalize()
}
