//! Bybit V5 `retCode` to [`GatewayError`] mapping.
//!
//! Each native code maps to exactly one kind. Codes not listed fall through
//! to [`GatewayError::Exchange`] with the code preserved.

use std::time::Duration;

use crate::GatewayError;
use crate::error::ErrorKind;

/// Leverage already at the requested value; treated as success.
pub const LEVERAGE_NOT_MODIFIED: i64 = 110043;
/// Position already in the requested margin mode; treated as success.
pub const MARGIN_MODE_NOT_MODIFIED: i64 = 110026;
/// Order does not exist or is too late to cancel.
pub const ORDER_NOT_EXISTS: i64 = 110001;

const AUTHENTICATION: &[i64] = &[
    10003, // invalid API key
    10004, // signature mismatch
    10005, // permission denied
    10007, // user authentication failed
    10009, // IP banned
    10010, // IP not in allowlist
    33004, // API key expired
];

const RATE_LIMIT: &[i64] = &[
    10006, // too many visits
    10018, // IP rate limit exceeded
];

const INSUFFICIENT_BALANCE: &[i64] = &[
    110004, // wallet balance insufficient
    110007, // available balance insufficient
    110012, // insufficient available balance
    110045, // wallet balance insufficient
    170131, // spot: balance insufficient
];

const ORDER: &[i64] = &[
    110001, // order does not exist
    110008, // order already finished
    110010, // order already cancelled
    170213, // spot: order does not exist
];

/// Native kind for a code, without building an error.
pub fn kind_for_code(code: i64) -> ErrorKind {
    if AUTHENTICATION.contains(&code) {
        ErrorKind::Authentication
    } else if RATE_LIMIT.contains(&code) {
        ErrorKind::RateLimit
    } else if INSUFFICIENT_BALANCE.contains(&code) {
        ErrorKind::InsufficientBalance
    } else if ORDER.contains(&code) {
        ErrorKind::Order
    } else {
        ErrorKind::Exchange
    }
}

/// Converts a non-zero `retCode` into the canonical error.
///
/// `order_id` is attached to order errors when the call concerned a specific
/// order.
pub fn map_ret_code(code: i64, message: &str, order_id: Option<&str>) -> GatewayError {
    let message = if message.is_empty() {
        format!("bybit retCode {code}")
    } else {
        message.to_string()
    };

    match kind_for_code(code) {
        ErrorKind::Authentication => GatewayError::Authentication {
            code: Some(code),
            message,
        },
        ErrorKind::RateLimit => GatewayError::RateLimit {
            retry_after: None,
            message,
        },
        ErrorKind::InsufficientBalance => GatewayError::InsufficientBalance {
            required: None,
            available: None,
            message,
        },
        ErrorKind::Order => GatewayError::order(order_id, message),
        ErrorKind::Exchange | ErrorKind::Config => GatewayError::Exchange {
            code: Some(code),
            message,
        },
    }
}

/// Converts a non-2xx HTTP status that carried no usable envelope.
pub fn map_http_status(status: u16, body: &str, retry_after: Option<Duration>) -> GatewayError {
    let message = format!("HTTP {status}: {}", snippet(body));
    match status {
        429 => GatewayError::RateLimit {
            retry_after,
            message,
        },
        401 | 403 => GatewayError::Authentication {
            code: None,
            message,
        },
        _ => GatewayError::exchange(message),
    }
}

/// Whether an error from a history request means the category is not
/// available to this account.
pub fn is_category_rejection(error: &GatewayError) -> bool {
    match error {
        GatewayError::Authentication {
            code: Some(10005), ..
        } => true,
        GatewayError::Exchange {
            code: Some(10001),
            message,
        } => message.to_ascii_lowercase().contains("category"),
        GatewayError::Exchange {
            code: Some(10024), ..
        } => true,
        _ => false,
    }
}

fn snippet(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(200) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}
