//! Bybit V5 JSON shapes and their translation into normalized models.
//!
//! Every numeric field arrives as a string and goes through
//! [`crate::numeric`]. Fields Bybit omits for some categories default to
//! empty strings so one struct serves spot and derivatives alike.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::models::symbol::{QUOTE_ASSETS, split_symbol};
use crate::models::{
    Balance, Candle, Category, MarginMode, MarketInfo, Order, OrderStatus, OrderType, Position,
    PositionSide, Side, TimeInForce, Trade, WalletBalance,
};
use crate::numeric::{
    decimal_places, parse_decimal, parse_nonzero_decimal, parse_optional_decimal,
    parse_timestamp_ms,
};
use crate::{GatewayError, Result};

/// Outer `{retCode, retMsg, result, time}` envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub ret_code: i64,
    #[serde(default)]
    pub ret_msg: String,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub time: Option<u64>,
}

impl Envelope {
    /// Decodes `result` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Exchange`] if the payload does not match.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.result)?)
    }
}

/// Any `{list: [...], nextPageCursor}` result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: DeserializeOwned"))]
pub struct ListResult<T> {
    #[serde(default)]
    pub list: Vec<T>,
    #[serde(default)]
    pub next_page_cursor: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    pub time_second: String,
    #[serde(default)]
    pub time_nano: String,
}

impl ServerTime {
    /// Server time in milliseconds, preferring nanosecond precision.
    pub fn millis(&self) -> Result<u64> {
        if !self.time_nano.is_empty() {
            let nanos = parse_timestamp_ms("timeNano", &self.time_nano)?;
            return Ok(nanos / 1_000_000);
        }
        Ok(parse_timestamp_ms("timeSecond", &self.time_second)? * 1_000)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAccount {
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub total_equity: String,
    #[serde(default)]
    pub total_margin_balance: String,
    #[serde(default)]
    pub total_available_balance: String,
    #[serde(default)]
    pub coin: Vec<WireCoin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCoin {
    pub coin: String,
    #[serde(default)]
    pub wallet_balance: String,
    #[serde(default)]
    pub locked: String,
    #[serde(rename = "totalOrderIM", default)]
    pub total_order_im: String,
    #[serde(default)]
    pub usd_value: String,
}

/// Margin figures of a wallet, with used margin derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginSummary {
    pub total_equity: Decimal,
    pub available_margin: Decimal,
    /// `total_margin_balance - available_margin` before clamping.
    pub raw_used_margin: Decimal,
}

impl WireAccount {
    pub fn margin_summary(&self) -> Result<MarginSummary> {
        let total_margin = parse_decimal("totalMarginBalance", &self.total_margin_balance)?;
        let available_margin =
            parse_decimal("totalAvailableBalance", &self.total_available_balance)?;
        Ok(MarginSummary {
            total_equity: parse_decimal("totalEquity", &self.total_equity)?,
            available_margin,
            raw_used_margin: total_margin.saturating_sub(available_margin),
        })
    }

    /// Converts to a [`WalletBalance`] using a summary already taken from
    /// this account, clamping used margin at zero.
    pub fn into_wallet(self, account_type: &str, summary: MarginSummary) -> Result<WalletBalance> {
        let balances = self
            .coin
            .into_iter()
            .map(WireCoin::into_balance)
            .collect::<Result<Vec<_>>>()?;

        Ok(WalletBalance {
            account_type: if self.account_type.is_empty() {
                account_type.to_string()
            } else {
                self.account_type
            },
            balances,
            total_equity_usd: summary.total_equity,
            available_margin_usd: summary.available_margin,
            used_margin_usd: summary.raw_used_margin.max(Decimal::ZERO),
        })
    }
}

impl WireCoin {
    pub fn into_balance(self) -> Result<Balance> {
        let total = parse_decimal("walletBalance", &self.wallet_balance)?;
        let locked = parse_decimal("locked", &self.locked)?
            .saturating_add(parse_decimal("totalOrderIM", &self.total_order_im)?);
        let usd_value = parse_optional_decimal("usdValue", &self.usd_value)?;
        Ok(Balance::from_total_and_locked(
            self.coin, total, locked, usd_value,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireExecution {
    pub exec_id: String,
    #[serde(default)]
    pub order_id: String,
    pub symbol: String,
    pub side: String,
    pub exec_price: String,
    pub exec_qty: String,
    #[serde(default)]
    pub exec_fee: String,
    #[serde(default)]
    pub fee_currency: String,
    pub exec_time: String,
    #[serde(default)]
    pub is_maker: bool,
    #[serde(default)]
    pub exec_type: String,
    #[serde(default)]
    pub exec_pnl: String,
}

impl WireExecution {
    /// Whether this row is a fill rather than funding, settlement or delivery.
    pub fn is_fill(&self) -> bool {
        self.exec_type.is_empty() || self.exec_type == "Trade"
    }

    pub fn into_trade(self, category: Category) -> Result<Trade> {
        let fee_currency = if self.fee_currency.is_empty() {
            split_symbol(&self.symbol, &QUOTE_ASSETS)
                .map(|pair| pair.quote)
                .unwrap_or_default()
        } else {
            self.fee_currency
        };

        Ok(Trade {
            id: self.exec_id,
            order_id: self.order_id,
            side: parse_side(&self.side)?,
            price: parse_decimal("execPrice", &self.exec_price)?,
            quantity: parse_decimal("execQty", &self.exec_qty)?,
            fee: parse_decimal("execFee", &self.exec_fee)?,
            fee_currency,
            timestamp: parse_timestamp_ms("execTime", &self.exec_time)?,
            is_maker: self.is_maker,
            category: Some(category),
            realized_pnl: parse_optional_decimal("execPnl", &self.exec_pnl)?,
            symbol: self.symbol,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrder {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub order_status: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub qty: String,
    #[serde(default)]
    pub cum_exec_qty: String,
    #[serde(default)]
    pub avg_price: String,
    #[serde(default)]
    pub trigger_price: String,
    #[serde(default)]
    pub stop_loss: String,
    #[serde(default)]
    pub take_profit: String,
    #[serde(default)]
    pub time_in_force: String,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub updated_time: String,
}

impl WireOrder {
    pub fn into_order(self) -> Result<Order> {
        let stop_price = parse_nonzero_decimal("triggerPrice", &self.trigger_price)?;
        let order_type = match (self.order_type.as_str(), stop_price.is_some()) {
            ("Market", false) => OrderType::Market,
            ("Limit", false) => OrderType::Limit,
            ("Market", true) => OrderType::Stop,
            ("Limit", true) => OrderType::StopLimit,
            (other, _) => {
                return Err(GatewayError::exchange(format!(
                    "unknown order type {other:?}"
                )));
            }
        };

        Ok(Order {
            id: self.order_id,
            client_order_id: Some(self.order_link_id).filter(|s| !s.is_empty()),
            side: parse_side(&self.side)?,
            order_type,
            status: parse_order_status(&self.order_status)?,
            price: parse_nonzero_decimal("price", &self.price)?,
            quantity: parse_decimal("qty", &self.qty)?,
            filled_quantity: parse_decimal("cumExecQty", &self.cum_exec_qty)?,
            average_price: parse_nonzero_decimal("avgPrice", &self.avg_price)?,
            stop_price,
            stop_loss: parse_nonzero_decimal("stopLoss", &self.stop_loss)?,
            take_profit: parse_nonzero_decimal("takeProfit", &self.take_profit)?,
            time_in_force: parse_time_in_force(&self.time_in_force),
            leverage: None,
            margin_mode: None,
            reduce_only: self.reduce_only,
            created_at: parse_timestamp_ms("createdTime", &self.created_time)?,
            updated_at: parse_timestamp_ms("updatedTime", &self.updated_time)?,
            symbol: self.symbol,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePosition {
    #[serde(default)]
    pub position_idx: u8,
    pub symbol: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub avg_price: String,
    #[serde(default)]
    pub mark_price: String,
    #[serde(default)]
    pub unrealised_pnl: String,
    #[serde(default)]
    pub cum_realised_pnl: String,
    #[serde(default)]
    pub leverage: String,
    /// 0 = cross, 1 = isolated.
    #[serde(default)]
    pub trade_mode: u8,
    #[serde(default)]
    pub liq_price: String,
    #[serde(rename = "positionIM", default)]
    pub position_im: String,
    #[serde(default)]
    pub created_time: String,
}

impl WirePosition {
    /// Converts a row, returning `None` for a flat (zero-size) slot.
    pub fn into_position(self) -> Result<Option<Position>> {
        let quantity = parse_decimal("size", &self.size)?;
        if quantity.is_zero() {
            return Ok(None);
        }

        let side = match self.side.as_str() {
            "Buy" => PositionSide::Long,
            "Sell" => PositionSide::Short,
            other => {
                return Err(GatewayError::exchange(format!(
                    "unknown position side {other:?} for {}",
                    self.symbol
                )));
            }
        };

        Ok(Some(Position {
            id: format!("{}-{}", self.symbol, self.position_idx),
            side,
            quantity,
            entry_price: parse_decimal("avgPrice", &self.avg_price)?,
            mark_price: parse_decimal("markPrice", &self.mark_price)?,
            unrealized_pnl: parse_decimal("unrealisedPnl", &self.unrealised_pnl)?,
            realized_pnl: parse_decimal("cumRealisedPnl", &self.cum_realised_pnl)?,
            leverage: parse_decimal("leverage", &self.leverage)?,
            margin_mode: if self.trade_mode == 1 {
                MarginMode::Isolated
            } else {
                MarginMode::Cross
            },
            liquidation_price: parse_nonzero_decimal("liqPrice", &self.liq_price)?,
            margin_used: parse_decimal("positionIM", &self.position_im)?,
            created_at: parse_timestamp_ms("createdTime", &self.created_time)?,
            symbol: self.symbol,
        }))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizeFilter {
    #[serde(default)]
    pub base_precision: String,
    #[serde(default)]
    pub qty_step: String,
    #[serde(default)]
    pub min_order_qty: String,
    #[serde(default)]
    pub max_order_qty: String,
    #[serde(default)]
    pub min_order_amt: String,
    #[serde(default)]
    pub min_notional_value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    #[serde(default)]
    pub min_price: String,
    #[serde(default)]
    pub max_price: String,
    #[serde(default)]
    pub tick_size: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageFilter {
    #[serde(default)]
    pub max_leverage: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireInstrument {
    pub symbol: String,
    #[serde(default)]
    pub base_coin: String,
    #[serde(default)]
    pub quote_coin: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub margin_trading: String,
    #[serde(default)]
    pub lot_size_filter: LotSizeFilter,
    #[serde(default)]
    pub price_filter: PriceFilter,
    #[serde(default)]
    pub leverage_filter: LeverageFilter,
}

impl WireInstrument {
    pub fn into_market_info(self, category: Category) -> Result<MarketInfo> {
        let lot = &self.lot_size_filter;
        let quantity_step = if lot.qty_step.is_empty() {
            parse_decimal("basePrecision", &lot.base_precision)?
        } else {
            parse_decimal("qtyStep", &lot.qty_step)?
        };
        let tick_size = parse_decimal("tickSize", &self.price_filter.tick_size)?;
        let min_notional = if lot.min_notional_value.is_empty() {
            parse_decimal("minOrderAmt", &lot.min_order_amt)?
        } else {
            parse_decimal("minNotionalValue", &lot.min_notional_value)?
        };

        let spot = category == Category::Spot;
        let margin = if spot {
            !matches!(self.margin_trading.as_str(), "" | "none")
        } else {
            true
        };

        Ok(MarketInfo {
            min_quantity: parse_decimal("minOrderQty", &lot.min_order_qty)?,
            max_quantity: parse_decimal("maxOrderQty", &lot.max_order_qty)?,
            quantity_precision: decimal_places(quantity_step),
            quantity_step,
            min_price: parse_decimal("minPrice", &self.price_filter.min_price)?,
            max_price: parse_decimal("maxPrice", &self.price_filter.max_price)?,
            price_precision: decimal_places(tick_size),
            tick_size,
            min_notional,
            spot,
            futures: matches!(category, Category::Linear | Category::Inverse),
            margin,
            max_leverage: parse_nonzero_decimal(
                "maxLeverage",
                &self.leverage_filter.max_leverage,
            )?,
            symbol: self.symbol,
            base_asset: self.base_coin,
            quote_asset: self.quote_coin,
            status: self.status,
        })
    }
}

/// `[startTime, open, high, low, close, volume, turnover]`
pub type WireKline = Vec<String>;

pub fn kline_to_candle(row: &[String]) -> Result<Candle> {
    let [start, open, high, low, close, volume, turnover, ..] = row else {
        return Err(GatewayError::exchange(format!(
            "kline row has {} fields, expected 7",
            row.len()
        )));
    };
    Ok(Candle {
        open_time: parse_timestamp_ms("startTime", start)?,
        open: parse_decimal("open", open)?,
        high: parse_decimal("high", high)?,
        low: parse_decimal("low", low)?,
        close: parse_decimal("close", close)?,
        volume: parse_decimal("volume", volume)?,
        turnover: parse_decimal("turnover", turnover)?,
    })
}

pub fn parse_side(raw: &str) -> Result<Side> {
    match raw {
        "Buy" => Ok(Side::Buy),
        "Sell" => Ok(Side::Sell),
        other => Err(GatewayError::exchange(format!("unknown side {other:?}"))),
    }
}

pub fn side_name(side: Side) -> &'static str {
    match side {
        Side::Buy => "Buy",
        Side::Sell => "Sell",
    }
}

/// Maps Bybit's order status vocabulary onto [`OrderStatus`].
pub fn parse_order_status(raw: &str) -> Result<OrderStatus> {
    match raw {
        "Created" => Ok(OrderStatus::Pending),
        "New" | "Untriggered" | "Triggered" | "Active" => Ok(OrderStatus::Open),
        "PartiallyFilled" => Ok(OrderStatus::PartiallyFilled),
        "Filled" => Ok(OrderStatus::Filled),
        "Cancelled" | "Deactivated" | "PartiallyFilledCanceled" => Ok(OrderStatus::Cancelled),
        "Rejected" => Ok(OrderStatus::Rejected),
        other => Err(GatewayError::exchange(format!(
            "unknown order status {other:?}"
        ))),
    }
}

/// Unknown or empty values read as good-til-cancelled.
pub fn parse_time_in_force(raw: &str) -> TimeInForce {
    match raw {
        "IOC" => TimeInForce::Ioc,
        "FOK" => TimeInForce::Fok,
        "PostOnly" => TimeInForce::PostOnly,
        _ => TimeInForce::Gtc,
    }
}

pub fn time_in_force_name(tif: TimeInForce) -> &'static str {
    match tif {
        TimeInForce::Gtc => "GTC",
        TimeInForce::Ioc => "IOC",
        TimeInForce::Fok => "FOK",
        TimeInForce::PostOnly => "PostOnly",
    }
}
