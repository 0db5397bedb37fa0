//! Uniform trading gateway over exchange REST dialects.
//!
//! Callers program against [`ExchangeGateway`]: balances, fills, orders,
//! positions, instruments and candles come back in one normalized model
//! regardless of the exchange. Position sizing and loss-limit checks live
//! in [`risk`] and give the same answers on every binding.
//!
//! [`bybit::BybitGateway`] is the Bybit V5 binding.

pub mod auth;
pub mod bybit;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod models;
pub mod numeric;
pub mod pacing;
pub mod paginator;
pub mod risk;
pub mod transport;

pub use bybit::{BybitConfig, BybitGateway};
pub use credentials::Credentials;
pub use error::{ErrorKind, GatewayError, Result};
pub use gateway::{ConnectionCheck, ExchangeCapabilities, ExchangeGateway, RateLimits};
