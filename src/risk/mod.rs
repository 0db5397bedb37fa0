//! Position sizing and pre-trade risk validation.
//!
//! Both entry points are pure: the same inputs always produce the same
//! output, and nothing here touches the network or gateway state. Order
//! flows call [`calculate_position_size`] and [`validate_risk`] with balance
//! and price data they already fetched, then submit the order only when the
//! result says so. A failed check is a normal return value, not an error.

pub mod config;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::MarginMode;
pub use config::{LossLimits, RiskConfig};

/// Inputs to [`calculate_position_size`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizeInput {
    /// Amount of account currency the trade may lose if stopped out.
    pub risk_amount: Decimal,
    pub entry_price: Decimal,
    pub stop_loss_price: Decimal,
    pub leverage: Decimal,
    pub margin_mode: MarginMode,
    pub available_margin: Decimal,
}

/// Output of [`calculate_position_size`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizeResult {
    /// Quantity in base units.
    pub position_size: Decimal,
    /// `position_size * entry_price`.
    pub order_value: Decimal,
    /// `order_value / leverage`.
    pub margin_required: Decimal,
    /// `|entry_price - stop_loss_price|`.
    pub stop_distance: Decimal,
    pub risk_amount: Decimal,
    pub leverage: Decimal,
    pub margin_mode: MarginMode,
    /// Whether the available margin covers `margin_required`.
    pub can_open: bool,
    /// Why the position cannot be opened, when `can_open` is false.
    pub reason: Option<String>,
}

/// Sizes a position so that hitting the stop loses exactly `risk_amount`.
///
/// A zero stop distance or non-positive leverage yields a result with
/// `can_open = false` instead of dividing by zero. Amounts too large for a
/// [`Decimal`] do the same, with every figure reported as zero.
pub fn calculate_position_size(input: &PositionSizeInput) -> PositionSizeResult {
    let stop_distance = input
        .entry_price
        .checked_sub(input.stop_loss_price)
        .map(|d| d.abs());
    let amounts = stop_distance.and_then(|distance| size_amounts(input, distance));
    let (position_size, order_value, margin_required) = amounts.unwrap_or_default();
    let stop_distance = stop_distance.unwrap_or_default();

    let reason = if amounts.is_none() {
        Some(format!(
            "position size overflows: risk amount {} over entry {} and stop {}",
            input.risk_amount.normalize(),
            input.entry_price.normalize(),
            input.stop_loss_price.normalize()
        ))
    } else if stop_distance.is_zero() {
        Some("stop loss equals entry price; position size would be unbounded".to_string())
    } else if position_size <= Decimal::ZERO {
        Some(format!("risk amount {} yields no position", input.risk_amount))
    } else if input.leverage <= Decimal::ZERO {
        Some(format!("leverage must be positive, got {}", input.leverage))
    } else if margin_required > input.available_margin {
        Some(format!(
            "insufficient margin: required {}, available {}",
            margin_required.round_dp(8).normalize(),
            input.available_margin.normalize()
        ))
    } else {
        None
    };

    PositionSizeResult {
        position_size,
        order_value,
        margin_required,
        stop_distance,
        risk_amount: input.risk_amount,
        leverage: input.leverage,
        margin_mode: input.margin_mode,
        can_open: reason.is_none(),
        reason,
    }
}

/// `(position_size, order_value, margin_required)`, or `None` on overflow.
fn size_amounts(
    input: &PositionSizeInput,
    stop_distance: Decimal,
) -> Option<(Decimal, Decimal, Decimal)> {
    let position_size = if stop_distance > Decimal::ZERO {
        input.risk_amount.checked_div(stop_distance)?
    } else {
        Decimal::ZERO
    };
    let order_value = position_size.checked_mul(input.entry_price)?;
    let margin_required = if input.leverage > Decimal::ZERO {
        order_value.checked_div(input.leverage)?
    } else {
        order_value
    };
    Some((position_size, order_value, margin_required))
}

/// Inputs to [`validate_risk`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskValidationInput {
    pub sizing: PositionSizeInput,
    /// Capital the loss limits are measured against.
    pub starting_capital: Decimal,
    /// Losses realized so far today, as a positive amount.
    pub current_daily_loss: Decimal,
    /// Losses realized since `starting_capital` was set, as a positive amount.
    pub total_loss: Decimal,
}

/// Normalized ratios for display. Values above 1 mean a limit was already
/// exceeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRatios {
    /// `risk_amount / starting_capital`.
    pub position_risk: Decimal,
    /// `risk_amount / available_margin`.
    pub account_risk: Decimal,
    /// `(current_daily_loss + risk_amount) / daily_limit`.
    pub daily_limit_used: Decimal,
    /// `total_loss / total_limit`.
    pub total_limit_used: Decimal,
}

/// Output of [`validate_risk`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskValidationResult {
    pub valid: bool,
    /// First failing check, when `valid` is false.
    pub reason: Option<String>,
    pub warnings: Vec<String>,
    pub position: PositionSizeResult,
    pub ratios: RiskRatios,
}

/// Checks a prospective trade against margin and loss limits.
///
/// Checks run in order and the first failure short-circuits:
/// 1. margin sufficiency (via [`calculate_position_size`])
/// 2. daily loss: `current_daily_loss + risk_amount >= capital * daily_pct`
/// 3. total loss: `total_loss >= capital * total_pct`
///
/// A warning is attached once a projected loss reaches
/// `limits.warning_ratio` of its limit.
pub fn validate_risk(input: &RiskValidationInput, limits: &LossLimits) -> RiskValidationResult {
    let position = calculate_position_size(&input.sizing);
    let risk_amount = input.sizing.risk_amount;

    let daily_limit = limits.daily_limit(input.starting_capital);
    let total_limit = limits.total_limit(input.starting_capital);
    let projected_daily = input.current_daily_loss.saturating_add(risk_amount);

    let ratios = RiskRatios {
        position_risk: safe_div(risk_amount, input.starting_capital),
        account_risk: safe_div(risk_amount, input.sizing.available_margin),
        daily_limit_used: safe_div(projected_daily, daily_limit),
        total_limit_used: safe_div(input.total_loss, total_limit),
    };

    let mut warnings = Vec::new();

    let reason = if let Some(reason) = position.reason.clone() {
        Some(reason)
    } else if projected_daily >= daily_limit {
        Some(format!(
            "daily loss limit reached: {} + {} >= {}",
            input.current_daily_loss.normalize(),
            risk_amount.normalize(),
            daily_limit.normalize()
        ))
    } else if input.total_loss >= total_limit {
        Some(format!(
            "total loss limit reached: {} >= {}",
            input.total_loss.normalize(),
            total_limit.normalize()
        ))
    } else {
        if projected_daily >= daily_limit.saturating_mul(limits.warning_ratio) {
            warnings.push(format!(
                "daily loss would reach {}% of the limit ({} of {})",
                percent(ratios.daily_limit_used),
                projected_daily.normalize(),
                daily_limit.normalize()
            ));
        }
        if input.total_loss >= total_limit.saturating_mul(limits.warning_ratio) {
            warnings.push(format!(
                "total loss is at {}% of the limit ({} of {})",
                percent(ratios.total_limit_used),
                input.total_loss.normalize(),
                total_limit.normalize()
            ));
        }
        None
    };

    RiskValidationResult {
        valid: reason.is_none(),
        reason,
        warnings,
        position,
        ratios,
    }
}

/// Division that yields zero for a zero divisor and saturates on overflow.
fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

fn percent(ratio: Decimal) -> Decimal {
    ratio.saturating_mul(Decimal::ONE_HUNDRED).round_dp(1).normalize()
}
