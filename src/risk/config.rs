//! Loss-limit configuration types and loading.

use std::fmt::Write;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::GatewayError;

/// Risk configuration loaded from `risk.json`.
///
/// Every field is optional in the file; missing fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub loss_limits: LossLimits,
}

/// Capital-relative loss limits applied by [`super::validate_risk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossLimits {
    /// Maximum daily loss as a fraction of starting capital.
    #[serde(default = "default_daily_pct")]
    pub max_daily_loss_pct: Decimal,
    /// Maximum cumulative loss as a fraction of starting capital.
    #[serde(default = "default_total_pct")]
    pub max_total_loss_pct: Decimal,
    /// Fraction of a limit at which a warning is emitted.
    #[serde(default = "default_warning_ratio")]
    pub warning_ratio: Decimal,
}

fn default_daily_pct() -> Decimal {
    Decimal::new(5, 2)
}

fn default_total_pct() -> Decimal {
    Decimal::new(10, 2)
}

fn default_warning_ratio() -> Decimal {
    Decimal::new(8, 1)
}

impl Default for LossLimits {
    fn default() -> Self {
        Self {
            max_daily_loss_pct: default_daily_pct(),
            max_total_loss_pct: default_total_pct(),
            warning_ratio: default_warning_ratio(),
        }
    }
}

impl LossLimits {
    /// Checks every fraction lies in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] naming the first out-of-range field.
    pub fn validate(&self) -> crate::Result<()> {
        let fields = [
            ("max_daily_loss_pct", self.max_daily_loss_pct),
            ("max_total_loss_pct", self.max_total_loss_pct),
            ("warning_ratio", self.warning_ratio),
        ];
        for (name, value) in fields {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(GatewayError::Config(format!(
                    "{name} must be within (0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Daily loss limit in account currency for `capital`.
    pub fn daily_limit(&self, capital: Decimal) -> Decimal {
        capital.saturating_mul(self.max_daily_loss_pct)
    }

    /// Cumulative loss limit in account currency for `capital`.
    pub fn total_limit(&self, capital: Decimal) -> Decimal {
        capital.saturating_mul(self.max_total_loss_pct)
    }
}

impl RiskConfig {
    /// Loads risk configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or holds
    /// out-of-range limits.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            GatewayError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.loss_limits.validate()?;
        Ok(config)
    }

    /// Returns a human-readable description of the limits.
    pub fn describe_limits(&self) -> String {
        let limits = &self.loss_limits;
        let mut out = String::from("Risk limits:\n");

        let _ = writeln!(
            out,
            "  max_daily_loss: {}% of capital",
            as_percent(limits.max_daily_loss_pct)
        );
        let _ = writeln!(
            out,
            "  max_total_loss: {}% of capital",
            as_percent(limits.max_total_loss_pct)
        );
        let _ = writeln!(
            out,
            "  warn at: {}% of a limit",
            as_percent(limits.warning_ratio)
        );

        out
    }
}

fn as_percent(fraction: Decimal) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED).normalize()
}
