//! Application configuration loaded from environment variables.
//!
//! Credentials are optional (public market data works without them), but when
//! one is set both must be present:
//! - `BYBIT_API_KEY`: API key for request signing
//! - `BYBIT_API_SECRET`: API secret for request signing
//!
//! Optional overrides:
//! - `BYBIT_TESTNET`: `true`/`1` targets the testnet endpoint
//! - `BYBIT_BASE_URL`: explicit REST endpoint, wins over `BYBIT_TESTNET`
//! - `BYBIT_RECV_WINDOW`: receive window in milliseconds (default 5000)
//! - `BYBIT_ACCOUNT_TYPE`: wallet account type (default `UNIFIED`)
//! - `BYBIT_CATEGORY`: `spot`, `linear`, `inverse` or `option` (default `linear`)
//! - `TRADEGATE_RISK_CONFIG`: path to a loss-limit JSON file

use std::fmt;
use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::auth::DEFAULT_RECV_WINDOW_MS;
use crate::credentials::Credentials;
use crate::models::Category;
use crate::risk::config::RiskConfig;
use crate::{GatewayError, Result};

/// Default wallet account type.
pub const DEFAULT_ACCOUNT_TYPE: &str = "UNIFIED";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub bybit: BybitSettings,
    pub risk_config_path: Option<PathBuf>,
}

impl AppConfig {
    /// Loads loss limits from `risk_config_path`, or the defaults when no
    /// path is configured.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the file cannot be read or parsed.
    pub fn risk_config(&self) -> Result<RiskConfig> {
        match &self.risk_config_path {
            Some(path) => RiskConfig::load(path),
            None => Ok(RiskConfig::default()),
        }
    }
}

/// Bybit connection settings.
pub struct BybitSettings {
    pub base_url: Option<String>,
    pub testnet: bool,
    pub recv_window_ms: u64,
    pub account_type: String,
    pub category: Category,
    pub api_key: Option<String>,
    pub api_secret: Option<Zeroizing<String>>,
}

impl BybitSettings {
    /// Builds [`Credentials`] when a key pair is configured.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the configured values are blank.
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => Ok(Some(
                Credentials::new(key, secret)?.with_testnet(self.testnet),
            )),
            _ => Ok(None),
        }
    }
}

impl fmt::Debug for BybitSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BybitSettings")
            .field("base_url", &self.base_url)
            .field("testnet", &self.testnet)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("account_type", &self.account_type)
            .field("category", &self.category)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`GatewayError::Config`] if only one of the two credential
/// variables is set or an override cannot be parsed.
pub fn fetch_config() -> Result<AppConfig> {
    let api_key = non_empty_var("BYBIT_API_KEY");
    let api_secret = non_empty_var("BYBIT_API_SECRET");

    match (&api_key, &api_secret) {
        (Some(_), None) => {
            return Err(GatewayError::Config(
                "BYBIT_API_KEY is set but BYBIT_API_SECRET is missing".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(GatewayError::Config(
                "BYBIT_API_SECRET is set but BYBIT_API_KEY is missing".to_string(),
            ));
        }
        _ => {}
    }

    let testnet = match non_empty_var("BYBIT_TESTNET") {
        Some(raw) => parse_bool("BYBIT_TESTNET", &raw)?,
        None => false,
    };

    let recv_window_ms = match non_empty_var("BYBIT_RECV_WINDOW") {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                return Err(GatewayError::Config(format!(
                    "BYBIT_RECV_WINDOW must be a positive integer, got {raw:?}"
                )));
            }
        },
        None => DEFAULT_RECV_WINDOW_MS,
    };

    let category = match non_empty_var("BYBIT_CATEGORY") {
        Some(raw) => Category::from_name(&raw).ok_or_else(|| {
            GatewayError::Config(format!("BYBIT_CATEGORY is not a known category: {raw:?}"))
        })?,
        None => Category::Linear,
    };

    Ok(AppConfig {
        bybit: BybitSettings {
            base_url: non_empty_var("BYBIT_BASE_URL"),
            testnet,
            recv_window_ms,
            account_type: non_empty_var("BYBIT_ACCOUNT_TYPE")
                .unwrap_or_else(|| DEFAULT_ACCOUNT_TYPE.to_string()),
            category,
            api_key,
            api_secret: api_secret.map(Zeroizing::new),
        },
        risk_config_path: non_empty_var("TRADEGATE_RISK_CONFIG").map(PathBuf::from),
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GatewayError::Config(format!(
            "{name} must be a boolean, got {raw:?}"
        ))),
    }
}
