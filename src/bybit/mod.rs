//! Bybit V5 REST binding.
//!
//! One [`BybitGateway`] is scoped to one [`Category`]. Use
//! [`BybitGateway::for_category`] to get a sibling for another category that
//! shares the same transport and credentials.
//!
//! Requests are signed with [`crate::auth::Signer`], sent through an
//! injected [`HttpTransport`] and decoded from the `{retCode, retMsg,
//! result}` envelope. Non-zero codes go through [`errors::map_ret_code`].

pub mod errors;
pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::auth::{DEFAULT_RECV_WINDOW_MS, Signer, canonical_query, timestamp_ms};
use crate::config::{BybitSettings, DEFAULT_ACCOUNT_TYPE};
use crate::credentials::Credentials;
use crate::gateway::{ConnectionCheck, ExchangeCapabilities, ExchangeGateway, RateLimits};
use crate::models::{
    Candle, CandleInterval, CandleQuery, Category, CreateOrderRequest, MarginMode, MarketInfo,
    Order, OrderStatus, OrderType, Position, Side, TimeInForce, Trade, TradeQuery, WalletBalance,
};
use crate::numeric::parse_decimal;
use crate::pacing::{FixedIntervalPacer, Pacer};
use crate::paginator::{DAY_MS, Paginator, TimeRange, TimeWindow, WindowSource};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::{GatewayError, Result};
use errors::{LEVERAGE_NOT_MODIFIED, MARGIN_MODE_NOT_MODIFIED, map_http_status, map_ret_code};
use wire::{
    CreatedOrder, Envelope, ListResult, ServerTime, WireAccount, WireExecution, WireInstrument,
    WireKline, WireOrder, WirePosition,
};

pub const MAINNET_URL: &str = "https://api.bybit.com";
pub const TESTNET_URL: &str = "https://api-testnet.bybit.com";

/// Longest span `/v5/execution/list` accepts per request.
pub const HISTORY_WINDOW_MS: u64 = 7 * DAY_MS;

/// Cursor pages followed within one window before giving up.
pub const MAX_PAGES_PER_WINDOW: usize = 50;

const READ_TIMEOUT: Duration = Duration::from_secs(15);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Settle coin used when listing linear orders or positions without a symbol.
const LINEAR_SETTLE_COIN: &str = "USDT";

/// Connection settings for [`BybitGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BybitConfig {
    pub base_url: String,
    pub recv_window_ms: u64,
    pub account_type: String,
    pub read_timeout: Duration,
    /// Used for order placement, candles and history.
    pub write_timeout: Duration,
    pub history_window_ms: u64,
    pub max_pages_per_window: usize,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            base_url: MAINNET_URL.to_string(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            account_type: DEFAULT_ACCOUNT_TYPE.to_string(),
            read_timeout: READ_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
            history_window_ms: HISTORY_WINDOW_MS,
            max_pages_per_window: MAX_PAGES_PER_WINDOW,
        }
    }
}

impl BybitConfig {
    pub fn testnet() -> Self {
        Self {
            base_url: TESTNET_URL.to_string(),
            ..Self::default()
        }
    }

    /// Builds a config from environment settings. An explicit base URL wins
    /// over the testnet flag.
    pub fn from_settings(settings: &BybitSettings) -> Self {
        let base_url = match &settings.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if settings.testnet => TESTNET_URL.to_string(),
            None => MAINNET_URL.to_string(),
        };
        Self {
            base_url,
            recv_window_ms: settings.recv_window_ms,
            account_type: settings.account_type.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

/// Bybit V5 implementation of [`ExchangeGateway`].
#[derive(Clone)]
pub struct BybitGateway {
    config: BybitConfig,
    credentials: Option<Credentials>,
    signer: Option<Signer>,
    category: Category,
    transport: Arc<dyn HttpTransport>,
    pacer: Arc<dyn Pacer>,
}

impl BybitGateway {
    /// Creates a gateway with a `reqwest` transport and the default pacer.
    ///
    /// Without credentials only public endpoints work; signed calls fail with
    /// [`GatewayError::Authentication`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the HTTP client cannot be built.
    pub fn new(
        config: BybitConfig,
        credentials: Option<Credentials>,
        category: Category,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(config, credentials, category, transport))
    }

    /// Creates a gateway over an existing transport.
    pub fn with_transport(
        config: BybitConfig,
        credentials: Option<Credentials>,
        category: Category,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let signer = credentials
            .as_ref()
            .map(|c| Signer::from_credentials(c).with_recv_window(config.recv_window_ms));
        Self {
            config,
            credentials,
            signer,
            category,
            transport,
            pacer: Arc::new(FixedIntervalPacer::default()),
        }
    }

    /// Replaces the pacer used between history windows.
    #[must_use]
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// A gateway for `category` sharing this one's transport and credentials.
    #[must_use]
    pub fn for_category(&self, category: Category) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    pub fn config(&self) -> &BybitConfig {
        &self.config
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn signer(&self) -> Result<&Signer> {
        self.signer.as_ref().ok_or_else(|| GatewayError::Authentication {
            code: None,
            message: "no API credentials configured".to_string(),
        })
    }

    fn url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{path}", self.config.base_url)
        } else {
            format!("{}{path}?{query}", self.config.base_url)
        }
    }

    async fn public_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T> {
        let request = HttpRequest::get(self.url(path, &canonical_query(params)), timeout);
        self.execute(request, None).await?.into_result()
    }

    async fn signed_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T> {
        let signed = self.signer()?.sign_get(params, timestamp_ms())?;
        let mut request = HttpRequest::get(self.url(path, &signed.payload), timeout);
        for (name, value) in &signed.headers {
            request = request.with_header(name, value);
        }
        self.execute(request, None).await?.into_result()
    }

    async fn signed_post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &[(&str, Value)],
        timeout: Duration,
        order_id: Option<&str>,
    ) -> Result<T> {
        let signed = self.signer()?.sign_post(body, timestamp_ms())?;
        let mut request = HttpRequest::post(self.url(path, ""), signed.payload, timeout);
        for (name, value) in &signed.headers {
            request = request.with_header(name, value);
        }
        self.execute(request, order_id).await?.into_result()
    }

    async fn execute(&self, request: HttpRequest, order_id: Option<&str>) -> Result<Envelope> {
        let path = request.path().to_string();
        debug!(category = %self.category, path = %path, "bybit request");

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            // A throttled or rejected request may still carry an envelope.
            if let Ok(envelope) = serde_json::from_str::<Envelope>(&response.body)
                && envelope.ret_code != 0
                && response.status != 429
            {
                return Err(map_ret_code(envelope.ret_code, &envelope.ret_msg, order_id));
            }
            return Err(map_http_status(
                response.status,
                &response.body,
                retry_after_hint(&response),
            ));
        }

        let envelope: Envelope = serde_json::from_str(&response.body)?;
        if envelope.ret_code != 0 {
            debug!(
                path = %path,
                ret_code = envelope.ret_code,
                ret_msg = %envelope.ret_msg,
                "bybit error"
            );
            return Err(match map_ret_code(envelope.ret_code, &envelope.ret_msg, order_id) {
                GatewayError::RateLimit { message, .. } => GatewayError::RateLimit {
                    retry_after: retry_after_hint(&response),
                    message,
                },
                other => other,
            });
        }
        Ok(envelope)
    }

    /// Follows `nextPageCursor` until exhausted or the page cap is hit.
    async fn signed_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(&str, String)>,
        timeout: Duration,
    ) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        let mut cursor = String::new();
        for _ in 0..self.config.max_pages_per_window {
            let mut page_params = params.clone();
            if !cursor.is_empty() {
                page_params.push(("cursor", cursor.clone()));
            }
            let page: ListResult<T> = self.signed_get(path, &page_params, timeout).await?;
            rows.extend(page.list);
            if page.next_page_cursor.is_empty() {
                return Ok(rows);
            }
            cursor = page.next_page_cursor;
        }
        warn!(
            path,
            pages = self.config.max_pages_per_window,
            "page cap reached, results truncated"
        );
        Ok(rows)
    }

    fn category_params(&self) -> Vec<(&'static str, String)> {
        vec![("category", self.category.as_str().to_string())]
    }

    /// Adds `symbol`, or the settle coin linear listings require without one.
    fn scope_params(&self, params: &mut Vec<(&'static str, String)>, symbol: Option<&str>) {
        match symbol.map(str::trim).filter(|s| !s.is_empty()) {
            Some(symbol) => params.push(("symbol", symbol.to_string())),
            None if self.category == Category::Linear => {
                params.push(("settleCoin", LINEAR_SETTLE_COIN.to_string()));
            }
            None => {}
        }
    }

    async fn fetch_orders(
        &self,
        path: &str,
        order_id: &str,
        symbol: Option<&str>,
    ) -> Result<Vec<WireOrder>> {
        let mut params = self.category_params();
        params.push(("orderId", order_id.to_string()));
        if let Some(symbol) = symbol.map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("symbol", symbol.to_string()));
        }
        let page: ListResult<WireOrder> =
            self.signed_get(path, &params, self.config.read_timeout).await?;
        Ok(page.list)
    }

    async fn set_leverage(&self, symbol: &str, leverage: Decimal) -> Result<()> {
        let leverage = leverage.normalize().to_string();
        let body = [
            ("category", json!(self.category.as_str())),
            ("symbol", json!(symbol)),
            ("buyLeverage", json!(leverage)),
            ("sellLeverage", json!(leverage)),
        ];
        let timeout = self.config.write_timeout;
        match self
            .signed_post::<Value>("/v5/position/set-leverage", &body, timeout, None)
            .await
        {
            Ok(_) => {
                info!(symbol, leverage = %leverage, "leverage set");
                Ok(())
            }
            Err(e) if e.code() == Some(LEVERAGE_NOT_MODIFIED) => {
                debug!(symbol, leverage = %leverage, "leverage unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn switch_margin_mode(
        &self,
        symbol: &str,
        mode: MarginMode,
        leverage: Option<Decimal>,
    ) -> Result<()> {
        let leverage = match leverage {
            Some(leverage) => leverage,
            None => self.current_leverage(symbol).await?,
        };
        let leverage = leverage.normalize().to_string();
        let trade_mode = match mode {
            MarginMode::Cross => 0,
            MarginMode::Isolated => 1,
        };
        let body = [
            ("category", json!(self.category.as_str())),
            ("symbol", json!(symbol)),
            ("tradeMode", json!(trade_mode)),
            ("buyLeverage", json!(leverage)),
            ("sellLeverage", json!(leverage)),
        ];
        let timeout = self.config.write_timeout;
        match self
            .signed_post::<Value>("/v5/position/switch-isolated", &body, timeout, None)
            .await
        {
            Ok(_) => {
                info!(symbol, mode = ?mode, "margin mode switched");
                Ok(())
            }
            Err(e) if e.code() == Some(MARGIN_MODE_NOT_MODIFIED) => {
                debug!(symbol, mode = ?mode, "margin mode unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Leverage of the symbol's first position slot, flat or not.
    async fn current_leverage(&self, symbol: &str) -> Result<Decimal> {
        let mut params = self.category_params();
        params.push(("symbol", symbol.to_string()));
        let page: ListResult<WirePosition> = self
            .signed_get("/v5/position/list", &params, self.config.read_timeout)
            .await?;
        let row = page.list.first().ok_or_else(|| {
            GatewayError::exchange(format!("no position slot reported for {symbol}"))
        })?;
        parse_decimal("leverage", &row.leverage)
    }

    fn order_body(&self, request: &CreateOrderRequest) -> Vec<(&'static str, Value)> {
        let derivative = self.category.is_derivative();
        let (order_type, sends_price) = match request.order_type {
            OrderType::Market | OrderType::Stop => ("Market", false),
            OrderType::Limit | OrderType::StopLimit => ("Limit", true),
        };

        let mut body = vec![
            ("category", json!(self.category.as_str())),
            ("symbol", json!(request.symbol)),
            ("side", json!(wire::side_name(request.side))),
            ("orderType", json!(order_type)),
            ("qty", json!(request.quantity.normalize().to_string())),
        ];

        if sends_price && let Some(price) = request.price {
            body.push(("price", json!(price.normalize().to_string())));
        }

        if let Some(stop_price) = request.stop_price
            && request.order_type.requires_stop_price()
        {
            body.push(("triggerPrice", json!(stop_price.normalize().to_string())));
            if derivative {
                // 1: triggers on a rise, 2: on a fall
                let direction = match request.side {
                    Side::Buy => 1,
                    Side::Sell => 2,
                };
                body.push(("triggerDirection", json!(direction)));
            } else {
                body.push(("orderFilter", json!("StopOrder")));
            }
        }

        if let Some(tif) = request.time_in_force {
            body.push(("timeInForce", json!(wire::time_in_force_name(tif))));
        }
        if let Some(stop_loss) = request.stop_loss {
            body.push(("stopLoss", json!(stop_loss.normalize().to_string())));
        }
        if let Some(take_profit) = request.take_profit {
            body.push(("takeProfit", json!(take_profit.normalize().to_string())));
        }
        if let Some(client_id) = &request.client_order_id {
            body.push(("orderLinkId", json!(client_id)));
        }

        if derivative {
            body.push(("positionIdx", json!(position_idx(request))));
            if request.reduce_only {
                body.push(("reduceOnly", json!(true)));
            }
        }

        body
    }
}

/// One-way mode uses slot 0. Hedge mode uses 1 for the long slot and 2 for
/// the short slot; a reduce-only order targets the slot it closes.
pub fn position_idx(request: &CreateOrderRequest) -> u8 {
    if !request.hedge_mode {
        return 0;
    }
    let opens_long = match request.side {
        Side::Buy => !request.reduce_only,
        Side::Sell => request.reduce_only,
    };
    if opens_long { 1 } else { 2 }
}

/// Bybit's kline interval code.
pub fn interval_code(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::OneMinute => "1",
        CandleInterval::ThreeMinutes => "3",
        CandleInterval::FiveMinutes => "5",
        CandleInterval::FifteenMinutes => "15",
        CandleInterval::ThirtyMinutes => "30",
        CandleInterval::OneHour => "60",
        CandleInterval::TwoHours => "120",
        CandleInterval::FourHours => "240",
        CandleInterval::SixHours => "360",
        CandleInterval::TwelveHours => "720",
        CandleInterval::OneDay => "D",
        CandleInterval::OneWeek => "W",
        CandleInterval::OneMonth => "M",
    }
}

/// Retry hint from `Retry-After` (seconds) or the limit-reset timestamp.
fn retry_after_hint(response: &HttpResponse) -> Option<Duration> {
    if let Some(secs) = response
        .header("Retry-After")
        .and_then(|v| v.trim().parse::<u64>().ok())
    {
        return Some(Duration::from_secs(secs));
    }
    response
        .header("X-Bapi-Limit-Reset-Timestamp")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|reset_ms| Duration::from_millis(reset_ms.saturating_sub(timestamp_ms())))
}

/// Walks `/v5/execution/list` for one symbol filter.
struct ExecutionSource<'a> {
    gateway: &'a BybitGateway,
    symbol: Option<&'a str>,
}

#[async_trait]
impl WindowSource for ExecutionSource<'_> {
    async fn fetch_window(&self, category: Category, window: TimeWindow) -> Result<Vec<Trade>> {
        let mut params = vec![
            ("category", category.as_str().to_string()),
            ("startTime", window.start_ms.to_string()),
            ("endTime", window.end_ms.to_string()),
            ("limit", "100".to_string()),
        ];
        if let Some(symbol) = self.symbol {
            params.push(("symbol", symbol.to_string()));
        }

        let rows: Vec<WireExecution> = self
            .gateway
            .signed_list("/v5/execution/list", params, self.gateway.config.write_timeout)
            .await?;

        rows.into_iter()
            .filter(WireExecution::is_fill)
            .map(|row| row.into_trade(category))
            .collect()
    }

    fn is_category_rejection(&self, error: &GatewayError) -> bool {
        errors::is_category_rejection(error)
    }
}

#[async_trait]
impl ExchangeGateway for BybitGateway {
    fn name(&self) -> &str {
        "bybit"
    }

    fn category(&self) -> Category {
        self.category
    }

    fn capabilities(&self) -> ExchangeCapabilities {
        ExchangeCapabilities {
            spot: true,
            futures: true,
            margin: true,
            options: true,
            stop_orders: true,
            hedge_mode: true,
        }
    }

    fn rate_limits(&self) -> RateLimits {
        RateLimits {
            requests_per_second: 10,
            orders_per_second: 10,
            history_window_ms: self.config.history_window_ms,
        }
    }

    async fn test_connection(&self) -> Result<ConnectionCheck> {
        let local_ms = timestamp_ms();
        let time: ServerTime = self
            .public_get("/v5/market/time", &[], self.config.read_timeout)
            .await?;
        let server_time_ms = time.millis()?;
        let clock_skew_ms = server_time_ms as i64 - local_ms as i64;

        if clock_skew_ms.unsigned_abs() > self.config.recv_window_ms {
            warn!(
                clock_skew_ms,
                recv_window_ms = self.config.recv_window_ms,
                "local clock is outside the receive window; signed requests will be rejected"
            );
        }

        let authenticated = if self.signer.is_some() {
            self.signed_get::<Value>("/v5/account/info", &[], self.config.read_timeout)
                .await?;
            true
        } else {
            false
        };

        info!(server_time_ms, clock_skew_ms, authenticated, "bybit connection ok");
        Ok(ConnectionCheck {
            server_time_ms,
            clock_skew_ms,
            authenticated,
        })
    }

    async fn get_balance(&self) -> Result<WalletBalance> {
        let params = [("accountType", self.config.account_type.clone())];
        let page: ListResult<WireAccount> = self
            .signed_get("/v5/account/wallet-balance", &params, self.config.read_timeout)
            .await?;
        let account = page.list.into_iter().next().ok_or_else(|| {
            GatewayError::exchange(format!(
                "no {} wallet returned",
                self.config.account_type
            ))
        })?;

        let summary = account.margin_summary()?;
        if summary.raw_used_margin < Decimal::ZERO {
            warn!(
                used_margin = %summary.raw_used_margin,
                "negative used margin reported, clamping to zero"
            );
        }

        let wallet = account.into_wallet(&self.config.account_type, summary)?;
        info!(
            account_type = %wallet.account_type,
            coins = wallet.balances.len(),
            "fetched wallet balance"
        );
        Ok(wallet)
    }

    async fn get_trades(&self, query: &TradeQuery) -> Result<Vec<Trade>> {
        let range = TimeRange::resolve(query.start_ms, query.end_ms, timestamp_ms())?;
        let categories = query
            .categories
            .clone()
            .unwrap_or_else(|| Category::ALL.to_vec());
        let paginator = Paginator::new(self.config.history_window_ms, &categories);
        let source = ExecutionSource {
            gateway: self,
            symbol: query.symbol.as_deref(),
        };
        paginator.collect(&source, self.pacer.as_ref(), range).await
    }

    async fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>> {
        let mut params = self.category_params();
        self.scope_params(&mut params, symbol);
        params.push(("limit", "50".to_string()));

        let rows: Vec<WireOrder> = self
            .signed_list("/v5/order/realtime", params, self.config.read_timeout)
            .await?;
        rows.into_iter().map(WireOrder::into_order).collect()
    }

    async fn get_order(&self, order_id: &str, symbol: Option<&str>) -> Result<Order> {
        let mut rows = self.fetch_orders("/v5/order/realtime", order_id, symbol).await?;
        if rows.is_empty() {
            rows = self.fetch_orders("/v5/order/history", order_id, symbol).await?;
        }
        match rows.into_iter().next() {
            Some(row) => row.into_order(),
            None => Err(GatewayError::order(Some(order_id), "order not found")),
        }
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order> {
        request.validate()?;

        if self.category.is_derivative() {
            if let Some(leverage) = request.leverage {
                self.set_leverage(&request.symbol, leverage).await?;
            }
            if let Some(mode) = request.margin_mode {
                self.switch_margin_mode(&request.symbol, mode, request.leverage)
                    .await?;
            }
        } else if request.leverage.is_some() || request.margin_mode.is_some() {
            debug!(symbol = %request.symbol, "leverage and margin mode ignored for spot");
        }

        let body = self.order_body(request);
        let created: CreatedOrder = self
            .signed_post(
                "/v5/order/create",
                &body,
                self.config.write_timeout,
                request.client_order_id.as_deref(),
            )
            .await?;

        info!(
            symbol = %request.symbol,
            side = ?request.side,
            order_type = ?request.order_type,
            order_id = %created.order_id,
            "order placed"
        );

        let now = timestamp_ms();
        Ok(Order {
            id: created.order_id,
            client_order_id: Some(created.order_link_id)
                .filter(|s| !s.is_empty())
                .or_else(|| request.client_order_id.clone()),
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            status: OrderStatus::Pending,
            price: request.price,
            quantity: request.quantity,
            filled_quantity: Decimal::ZERO,
            average_price: None,
            stop_price: request.stop_price,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            time_in_force: request.time_in_force.unwrap_or(TimeInForce::Gtc),
            leverage: request.leverage,
            margin_mode: request.margin_mode,
            reduce_only: request.reduce_only,
            created_at: now,
            updated_at: now,
        })
    }

    async fn cancel_order(&self, order_id: &str, symbol: Option<&str>) -> Result<()> {
        let Some(symbol) = symbol.map(str::trim).filter(|s| !s.is_empty()) else {
            return Err(GatewayError::order(
                Some(order_id),
                "symbol is required to cancel an order",
            ));
        };

        let body = [
            ("category", json!(self.category.as_str())),
            ("symbol", json!(symbol)),
            ("orderId", json!(order_id)),
        ];
        let timeout = self.config.write_timeout;
        self.signed_post::<Value>("/v5/order/cancel", &body, timeout, Some(order_id))
            .await?;
        info!(symbol, order_id, "order cancelled");
        Ok(())
    }

    async fn get_positions(&self, symbol: Option<&str>) -> Result<Vec<Position>> {
        if !self.category.is_derivative() {
            return Ok(Vec::new());
        }

        let mut params = self.category_params();
        self.scope_params(&mut params, symbol);
        params.push(("limit", "200".to_string()));

        let rows: Vec<WirePosition> = self
            .signed_list("/v5/position/list", params, self.config.read_timeout)
            .await?;

        let mut positions = Vec::new();
        for row in rows {
            if let Some(position) = row.into_position()? {
                positions.push(position);
            }
        }
        Ok(positions)
    }

    async fn get_market_info(&self, symbol: &str) -> Result<MarketInfo> {
        let mut params = self.category_params();
        params.push(("symbol", symbol.to_string()));
        let page: ListResult<WireInstrument> = self
            .public_get("/v5/market/instruments-info", &params, self.config.read_timeout)
            .await?;
        match page.list.into_iter().next() {
            Some(instrument) => instrument.into_market_info(self.category),
            None => Err(GatewayError::exchange(format!(
                "symbol not found: {symbol} ({})",
                self.category
            ))),
        }
    }

    async fn get_ohlcv(&self, query: &CandleQuery) -> Result<Vec<Candle>> {
        if self.category == Category::Option {
            return Err(GatewayError::exchange("klines are not available for options"));
        }

        let mut params = self.category_params();
        params.push(("symbol", query.symbol.clone()));
        params.push(("interval", interval_code(query.interval).to_string()));
        if let Some(start) = query.start_ms {
            params.push(("start", start.to_string()));
        }
        if let Some(end) = query.end_ms {
            params.push(("end", end.to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.clamp(1, 1000).to_string()));
        }

        let page: ListResult<WireKline> = self
            .public_get("/v5/market/kline", &params, self.config.write_timeout)
            .await?;
        let mut candles = page
            .list
            .iter()
            .map(|row| wire::kline_to_candle(row))
            .collect::<Result<Vec<_>>>()?;
        candles.reverse();
        Ok(candles)
    }
}
