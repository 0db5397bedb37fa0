//! Crate-level error types.
//!
//! [`GatewayError`] is the canonical error every binding converts its native
//! failures into. Callers above the gateway match on the variant (or on
//! [`ErrorKind`]) and never see raw JSON or exchange-specific codes.

use std::time::Duration;

use rust_decimal::Decimal;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Canonical error kinds shared by all bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authentication,
    InsufficientBalance,
    RateLimit,
    Order,
    Exchange,
    Config,
}

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Invalid key, secret or signature, IP not allowlisted, or missing
    /// API permissions. Never retried automatically.
    #[error("authentication failed: {message}")]
    Authentication { code: Option<i64>, message: String },

    /// The account cannot fund the request.
    #[error("insufficient balance: {message}")]
    InsufficientBalance {
        required: Option<Decimal>,
        available: Option<Decimal>,
        message: String,
    },

    /// Request was throttled. Safe to retry after `retry_after`.
    #[error("rate limited: {message}")]
    RateLimit {
        retry_after: Option<Duration>,
        message: String,
    },

    /// Order not found, already filled or cancelled, or rejected before
    /// submission.
    #[error("order error{}: {message}", id_suffix(.order_id))]
    Order {
        order_id: Option<String>,
        message: String,
    },

    /// Catch-all carrying the exchange's raw code when one exists.
    #[error("exchange error{}: {message}", code_suffix(.code))]
    Exchange { code: Option<i64>, message: String },

    /// The request did not complete within its deadline. Reported as
    /// [`ErrorKind::Exchange`].
    #[error("request timed out: {0}")]
    Timeout(String),

    /// A configuration value could not be found, read, or deserialized.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Returns the canonical kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::Order { .. } => ErrorKind::Order,
            Self::Exchange { .. } | Self::Timeout(_) => ErrorKind::Exchange,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Native exchange code, if the error came from an exchange response.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Authentication { code, .. } | Self::Exchange { code, .. } => *code,
            _ => None,
        }
    }

    /// Builds an [`GatewayError::Exchange`] without a native code.
    pub fn exchange(message: impl Into<String>) -> Self {
        Self::Exchange {
            code: None,
            message: message.into(),
        }
    }

    /// Builds a [`GatewayError::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Builds an [`GatewayError::Order`] for the given order id.
    pub fn order(order_id: Option<&str>, message: impl Into<String>) -> Self {
        Self::Order {
            order_id: order_id.map(String::from),
            message: message.into(),
        }
    }

    /// Whether the call timed out in transit.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

fn id_suffix(order_id: &Option<String>) -> String {
    order_id
        .as_deref()
        .map(|id| format!(" ({id})"))
        .unwrap_or_default()
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(" {c}")).unwrap_or_default()
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::exchange(format!("malformed response: {e}"))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(e.to_string())
        } else {
            Self::exchange(format!("transport failure: {e}"))
        }
    }
}
