//! Order placement request and its builder.
//!
//! [`CreateOrderRequest`] is the exchange-neutral description of a new
//! order. Bindings translate it into their own field names. Build it through
//! [`CreateOrderBuilder`] so the per-type requirements are checked before
//! anything reaches the network.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MarginMode, OrderType, Side, TimeInForce};
use crate::GatewayError;

/// Parameters for a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    /// Required unless `order_type` is market.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Trigger price for stop and stop-limit orders.
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default)]
    pub leverage: Option<Decimal>,
    #[serde(default)]
    pub margin_mode: Option<MarginMode>,
    /// Caller-supplied idempotency key.
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub reduce_only: bool,
    /// Route to a hedge-mode position slot instead of the one-way slot.
    #[serde(default)]
    pub hedge_mode: bool,
}

impl CreateOrderRequest {
    /// Checks the request against the per-type requirements.
    ///
    /// # Errors
    ///
    /// Returns the first [`CreateOrderError`] found.
    pub fn validate(&self) -> Result<(), CreateOrderError> {
        if self.symbol.trim().is_empty() {
            return Err(CreateOrderError::MissingSymbol);
        }

        if self.quantity <= Decimal::ZERO {
            return Err(CreateOrderError::NonPositiveQuantity(self.quantity));
        }

        if self.order_type.requires_price() && self.price.is_none() {
            return Err(CreateOrderError::MissingPrice(self.order_type));
        }

        if self.order_type.requires_stop_price() && self.stop_price.is_none() {
            return Err(CreateOrderError::MissingStopPrice(self.order_type));
        }

        let prices = [
            ("price", self.price),
            ("stop_price", self.stop_price),
            ("stop_loss", self.stop_loss),
            ("take_profit", self.take_profit),
        ];
        for (field, value) in prices {
            if let Some(value) = value
                && value <= Decimal::ZERO
            {
                return Err(CreateOrderError::NonPositivePrice { field, value });
            }
        }

        if let Some(leverage) = self.leverage
            && leverage <= Decimal::ZERO
        {
            return Err(CreateOrderError::NonPositiveLeverage(leverage));
        }

        Ok(())
    }
}

/// Builder for constructing validated order requests.
#[derive(Debug, Clone)]
pub struct CreateOrderBuilder {
    request: CreateOrderRequest,
}

impl CreateOrderBuilder {
    /// Creates a builder with the required fields.
    #[must_use]
    pub fn new(order_type: OrderType, side: Side, symbol: &str, quantity: Decimal) -> Self {
        Self {
            request: CreateOrderRequest {
                symbol: symbol.to_string(),
                side,
                order_type,
                quantity,
                price: None,
                stop_price: None,
                stop_loss: None,
                take_profit: None,
                time_in_force: None,
                leverage: None,
                margin_mode: None,
                client_order_id: None,
                reduce_only: false,
                hedge_mode: false,
            },
        }
    }

    /// Market order.
    #[must_use]
    pub fn market(side: Side, symbol: &str, quantity: Decimal) -> Self {
        Self::new(OrderType::Market, side, symbol, quantity)
    }

    /// Limit order at `price`.
    #[must_use]
    pub fn limit(side: Side, symbol: &str, quantity: Decimal, price: Decimal) -> Self {
        Self::new(OrderType::Limit, side, symbol, quantity).with_price(price)
    }

    /// Stop order at `price` released when `stop_price` trades.
    #[must_use]
    pub fn stop(
        side: Side,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self::new(OrderType::Stop, side, symbol, quantity)
            .with_price(price)
            .with_stop_price(stop_price)
    }

    /// Stop-limit order resting at `price` once `stop_price` trades.
    #[must_use]
    pub fn stop_limit(
        side: Side,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self::new(OrderType::StopLimit, side, symbol, quantity)
            .with_price(price)
            .with_stop_price(stop_price)
    }

    /// Sets the limit price.
    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.request.price = Some(price);
        self
    }

    /// Sets the trigger price.
    #[must_use]
    pub fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.request.stop_price = Some(stop_price);
        self
    }

    /// Attaches a stop-loss to the resulting position.
    #[must_use]
    pub fn with_stop_loss(mut self, stop_loss: Decimal) -> Self {
        self.request.stop_loss = Some(stop_loss);
        self
    }

    /// Attaches a take-profit to the resulting position.
    #[must_use]
    pub fn with_take_profit(mut self, take_profit: Decimal) -> Self {
        self.request.take_profit = Some(take_profit);
        self
    }

    /// Sets the time in force.
    #[must_use]
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.request.time_in_force = Some(tif);
        self
    }

    /// Sets leverage; applied before the order on derivatives markets.
    #[must_use]
    pub fn with_leverage(mut self, leverage: Decimal) -> Self {
        self.request.leverage = Some(leverage);
        self
    }

    /// Sets the margin mode; applied before the order on derivatives markets.
    #[must_use]
    pub fn with_margin_mode(mut self, mode: MarginMode) -> Self {
        self.request.margin_mode = Some(mode);
        self
    }

    /// Sets the client order id.
    #[must_use]
    pub fn with_client_order_id(mut self, id: &str) -> Self {
        self.request.client_order_id = Some(id.to_string());
        self
    }

    /// Marks the order reduce-only.
    #[must_use]
    pub fn reduce_only(mut self) -> Self {
        self.request.reduce_only = true;
        self
    }

    /// Routes the order to a hedge-mode position slot.
    #[must_use]
    pub fn hedge_mode(mut self) -> Self {
        self.request.hedge_mode = true;
        self
    }

    /// Validates and returns the request.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing for the order type.
    pub fn build(self) -> Result<CreateOrderRequest, CreateOrderError> {
        self.request.validate()?;
        Ok(self.request)
    }
}

/// Errors that can occur when building an order request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOrderError {
    MissingSymbol,
    NonPositiveQuantity(Decimal),
    /// A price is required for this order type.
    MissingPrice(OrderType),
    /// A stop price is required for this order type.
    MissingStopPrice(OrderType),
    NonPositivePrice {
        field: &'static str,
        value: Decimal,
    },
    NonPositiveLeverage(Decimal),
}

impl std::fmt::Display for CreateOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSymbol => write!(f, "symbol is required"),
            Self::NonPositiveQuantity(q) => write!(f, "quantity must be positive, got {q}"),
            Self::MissingPrice(ot) => write!(f, "price required for {ot:?} orders"),
            Self::MissingStopPrice(ot) => write!(f, "stop_price required for {ot:?} orders"),
            Self::NonPositivePrice { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::NonPositiveLeverage(l) => write!(f, "leverage must be positive, got {l}"),
        }
    }
}

impl std::error::Error for CreateOrderError {}

impl From<CreateOrderError> for GatewayError {
    fn from(e: CreateOrderError) -> Self {
        GatewayError::order(None, e.to_string())
    }
}
