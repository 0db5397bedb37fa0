//! Bybit gateway tests against a scripted transport.
//!
//! Every response is a recorded-shape fixture; no network access.

mod common;

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use tradegate::auth::{HEADER_API_KEY, HEADER_RECV_WINDOW, HEADER_SIGN, HEADER_TIMESTAMP, sign};
use tradegate::models::{
    CandleInterval, CandleQuery, Category, CreateOrderBuilder, MarginMode, OrderStatus, OrderType,
    PositionSide, Side, TimeInForce, TradeQuery,
};
use tradegate::paginator::DAY_MS;
use tradegate::transport::{HttpMethod, HttpResponse};
use tradegate::{ErrorKind, ExchangeGateway, GatewayError};

use common::{
    ScriptedTransport, TEST_API_KEY, TEST_API_SECRET, body_json, empty_list, error_envelope,
    gateway, ok_envelope, public_gateway, query_param,
};

const NOW: u64 = 1_700_000_000_000;

// ---------------------------------------------------------------------------
// connection and signing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_connection_without_credentials_is_public_only() {
    let transport = ScriptedTransport::new();
    transport.on_fixture("/v5/market/time", include_str!("fixtures/server_time.json"));
    let gw = public_gateway(Category::Linear, transport.clone());

    let check = gw.test_connection().await.unwrap();

    assert_eq!(check.server_time_ms, 1_700_000_000_123);
    assert!(!check.authenticated);
    assert_eq!(transport.requests().len(), 1);
    assert!(transport.requests()[0].header(HEADER_SIGN).is_none());
}

#[tokio::test]
async fn test_connection_with_credentials_signs_account_info() {
    let transport = ScriptedTransport::new();
    transport
        .on_fixture("/v5/market/time", include_str!("fixtures/server_time.json"))
        .on_fixture("/v5/account/info", include_str!("fixtures/account_info.json"));
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let check = gw.test_connection().await.unwrap();
    assert!(check.authenticated);

    let info = &transport.requests_to("/v5/account/info")[0];
    assert_eq!(info.header(HEADER_API_KEY), Some(TEST_API_KEY));
    assert_eq!(info.header(HEADER_RECV_WINDOW), Some("5000"));

    let timestamp: u64 = info.header(HEADER_TIMESTAMP).unwrap().parse().unwrap();
    let expected = sign(TEST_API_SECRET, timestamp, TEST_API_KEY, 5000, "").unwrap();
    assert_eq!(info.header(HEADER_SIGN), Some(expected.as_str()));
}

#[tokio::test]
async fn signed_query_matches_sent_query() {
    let transport = ScriptedTransport::new();
    transport.on_fixture(
        "/v5/account/wallet-balance",
        include_str!("fixtures/wallet_balance.json"),
    );
    let (gw, _) = gateway(Category::Linear, transport.clone());

    gw.get_balance().await.unwrap();

    let request = &transport.requests()[0];
    let (_, query) = request.path().split_once('?').unwrap();
    assert_eq!(query, "accountType=UNIFIED");
    let timestamp: u64 = request.header(HEADER_TIMESTAMP).unwrap().parse().unwrap();
    let expected = sign(TEST_API_SECRET, timestamp, TEST_API_KEY, 5000, query).unwrap();
    assert_eq!(request.header(HEADER_SIGN), Some(expected.as_str()));
}

#[tokio::test]
async fn signed_call_without_credentials_never_hits_the_network() {
    let transport = ScriptedTransport::new();
    let gw = public_gateway(Category::Linear, transport.clone());

    let err = gw.get_balance().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(transport.requests().is_empty());
}

// ---------------------------------------------------------------------------
// balance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_balance_normalizes_wallet() {
    let transport = ScriptedTransport::new();
    transport.on_fixture(
        "/v5/account/wallet-balance",
        include_str!("fixtures/wallet_balance.json"),
    );
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let wallet = gw.get_balance().await.unwrap();

    assert_eq!(wallet.account_type, "UNIFIED");
    assert_eq!(wallet.total_equity_usd, dec!(10500.25));
    assert_eq!(wallet.available_margin_usd, dec!(9800.5));
    assert_eq!(wallet.used_margin_usd, dec!(500));

    let usdt = wallet.balance("usdt").unwrap();
    assert_eq!(usdt.total, dec!(8000));
    assert_eq!(usdt.locked, dec!(200));
    assert_eq!(usdt.available, dec!(7800));
    assert_eq!(usdt.usd_value, Some(dec!(8000.1)));

    for balance in &wallet.balances {
        assert_eq!(balance.total, balance.available + balance.locked);
    }
}

#[tokio::test]
async fn get_balance_clamps_negative_used_margin() {
    let transport = ScriptedTransport::new();
    transport.on_fixture(
        "/v5/account/wallet-balance",
        include_str!("fixtures/wallet_negative_margin.json"),
    );
    let (gw, _) = gateway(Category::Linear, transport);

    let wallet = gw.get_balance().await.unwrap();

    assert_eq!(wallet.used_margin_usd, Decimal::ZERO);
    let usdc = wallet.balance("USDC").unwrap();
    assert_eq!(usdc.locked, Decimal::ZERO);
    assert_eq!(usdc.available, dec!(1000));
}

#[tokio::test]
async fn get_balance_with_no_account_is_an_exchange_error() {
    let transport = ScriptedTransport::new();
    transport.on("/v5/account/wallet-balance", empty_list());
    let (gw, _) = gateway(Category::Linear, transport);

    let err = gw.get_balance().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Exchange);
}

// ---------------------------------------------------------------------------
// trade history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_trades_follows_cursor_and_keeps_only_fills() {
    let transport = ScriptedTransport::new();
    transport
        .on_fixture("/v5/execution/list", include_str!("fixtures/executions_page1.json"))
        .on_fixture("/v5/execution/list", include_str!("fixtures/executions_page2.json"));
    let (gw, pacer) = gateway(Category::Linear, transport.clone());

    let query = TradeQuery::for_symbol("BTCUSDT")
        .between(NOW - DAY_MS, NOW)
        .in_categories(vec![Category::Linear]);
    let trades = gw.get_trades(&query).await.unwrap();

    let ids: Vec<&str> = trades.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["e-1", "e-2"]);
    assert!(trades.iter().all(|t| t.category == Some(Category::Linear)));
    assert_eq!(trades[0].fee_currency, "USDT");
    assert_eq!(trades[0].price, dec!(36990.5));
    assert_eq!(trades[0].realized_pnl, Some(dec!(1.25)));
    assert!(trades[1].is_maker);

    let requests = transport.requests_to("/v5/execution/list");
    assert_eq!(requests.len(), 2);
    assert_eq!(query_param(&requests[0], "cursor"), None);
    assert_eq!(query_param(&requests[1], "cursor").as_deref(), Some("page-2"));
    assert_eq!(query_param(&requests[0], "symbol").as_deref(), Some("BTCUSDT"));
    assert_eq!(query_param(&requests[0], "category").as_deref(), Some("linear"));
    assert_eq!(pacer.count(), 0);
}

#[tokio::test]
async fn get_trades_walks_seven_day_windows_with_pauses() {
    let transport = ScriptedTransport::new();
    transport.on("/v5/execution/list", empty_list());
    let (gw, pacer) = gateway(Category::Linear, transport.clone());

    let start = NOW - 21 * DAY_MS;
    let query = TradeQuery::default()
        .between(start, NOW)
        .in_categories(vec![Category::Linear]);
    let trades = gw.get_trades(&query).await.unwrap();
    assert!(trades.is_empty());

    let requests = transport.requests_to("/v5/execution/list");
    // 21 days + 1 ms spans four windows
    assert_eq!(requests.len(), 4);
    assert_eq!(pacer.count(), 3);

    let bounds: Vec<(u64, u64)> = requests
        .iter()
        .map(|r| {
            let start = query_param(r, "startTime").unwrap().parse().unwrap();
            let end = query_param(r, "endTime").unwrap().parse().unwrap();
            (start, end)
        })
        .collect();
    assert_eq!(bounds[0].0, start);
    assert_eq!(bounds.last().unwrap().1, NOW);
    for (s, e) in &bounds {
        assert!(e - s < 7 * DAY_MS);
    }
    for pair in bounds.windows(2) {
        assert_eq!(pair[1].0, pair[0].1 + 1);
    }
}

#[tokio::test]
async fn get_trades_skips_rejected_categories() {
    let transport = ScriptedTransport::new();
    transport
        .on_fixture("/v5/execution/list", include_str!("fixtures/executions_spot.json"))
        .on(
            "/v5/execution/list",
            error_envelope(10001, "category only support linear or option"),
        );
    let (gw, _) = gateway(Category::Spot, transport.clone());

    let query = TradeQuery::default()
        .between(NOW - DAY_MS, NOW)
        .in_categories(vec![Category::Spot, Category::Inverse]);
    let trades = gw.get_trades(&query).await.unwrap();

    let ids: Vec<&str> = trades.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["e-3", "e-2"]);
    assert_eq!(trades[0].fee_currency, "ETH");
    assert!(trades.iter().all(|t| t.category == Some(Category::Spot)));
}

#[tokio::test]
async fn get_trades_propagates_real_failures() {
    let transport = ScriptedTransport::new();
    transport.on("/v5/execution/list", error_envelope(10003, "API key is invalid."));
    let (gw, _) = gateway(Category::Linear, transport);

    let err = gw
        .get_trades(&TradeQuery::default().between(NOW - DAY_MS, NOW))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Authentication { code: Some(10003), .. }));
}

#[tokio::test]
async fn get_trades_rejects_inverted_range() {
    let transport = ScriptedTransport::new();
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let err = gw
        .get_trades(&TradeQuery::default().between(NOW, NOW - 1))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Exchange);
    assert!(transport.requests().is_empty());
}

// ---------------------------------------------------------------------------
// orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_open_orders_uses_settle_coin_for_linear() {
    let transport = ScriptedTransport::new();
    transport.on_fixture("/v5/order/realtime", include_str!("fixtures/open_orders.json"));
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let orders = gw.get_open_orders(None).await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(query_param(request, "settleCoin").as_deref(), Some("USDT"));
    assert_eq!(query_param(request, "symbol"), None);

    assert_eq!(orders.len(), 2);
    let limit = &orders[0];
    assert_eq!(limit.order_type, OrderType::Limit);
    assert_eq!(limit.status, OrderStatus::PartiallyFilled);
    assert_eq!(limit.time_in_force, TimeInForce::PostOnly);
    assert_eq!(limit.client_order_id.as_deref(), Some("my-limit-1"));
    assert_eq!(limit.price, Some(dec!(1600)));
    assert_eq!(limit.remaining_quantity(), dec!(0.06));
    assert_eq!(limit.take_profit, Some(dec!(1800)));
    assert_eq!(limit.stop_loss, Some(dec!(1500)));
    assert_eq!(limit.stop_price, None);

    let stop = &orders[1];
    assert_eq!(stop.order_type, OrderType::Stop);
    assert_eq!(stop.status, OrderStatus::Open);
    assert_eq!(stop.stop_price, Some(dec!(35000)));
    assert_eq!(stop.price, None);
    assert_eq!(stop.average_price, None);
    assert!(stop.reduce_only);
    assert!(stop.client_order_id.is_none());
}

#[tokio::test]
async fn get_open_orders_with_symbol_skips_settle_coin() {
    let transport = ScriptedTransport::new();
    transport.on("/v5/order/realtime", empty_list());
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let orders = gw.get_open_orders(Some("ETHUSDT")).await.unwrap();

    assert!(orders.is_empty());
    let request = &transport.requests()[0];
    assert_eq!(query_param(request, "symbol").as_deref(), Some("ETHUSDT"));
    assert_eq!(query_param(request, "settleCoin"), None);
}

#[tokio::test]
async fn get_order_falls_back_to_history() {
    let transport = ScriptedTransport::new();
    transport
        .on("/v5/order/realtime", empty_list())
        .on_fixture("/v5/order/history", include_str!("fixtures/order_history.json"));
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let order = gw.get_order("hist-1", Some("BTCUSDT")).await.unwrap();

    assert_eq!(order.id, "hist-1");
    assert_eq!(order.status, OrderStatus::Filled);
    assert_eq!(order.average_price, Some(dec!(35999.5)));
    assert_eq!(order.remaining_quantity(), Decimal::ZERO);
    assert_eq!(transport.requests_to("/v5/order/history").len(), 1);
    assert_eq!(
        query_param(&transport.requests()[0], "orderId").as_deref(),
        Some("hist-1")
    );
}

#[tokio::test]
async fn get_order_not_found_is_an_order_error() {
    let transport = ScriptedTransport::new();
    transport
        .on("/v5/order/realtime", empty_list())
        .on("/v5/order/history", empty_list());
    let (gw, _) = gateway(Category::Linear, transport);

    let err = gw.get_order("missing-1", None).await.unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Order { order_id: Some(ref id), .. } if id == "missing-1"
    ));
}

#[tokio::test]
async fn create_limit_order_on_linear_sets_leverage_and_margin_mode() {
    let transport = ScriptedTransport::new();
    transport
        .on(
            "/v5/position/set-leverage",
            error_envelope(110043, "leverage not modified"),
        )
        .on("/v5/position/switch-isolated", ok_envelope(json!({})))
        .on_fixture("/v5/order/create", include_str!("fixtures/create_order.json"));
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let request = CreateOrderBuilder::limit(Side::Buy, "BTCUSDT", dec!(0.01), dec!(37000))
        .with_leverage(dec!(10))
        .with_margin_mode(MarginMode::Isolated)
        .with_time_in_force(TimeInForce::PostOnly)
        .with_stop_loss(dec!(36000))
        .with_client_order_id("client-42")
        .build()
        .unwrap();
    let order = gw.create_order(&request).await.unwrap();

    assert_eq!(order.id, "1321052653536515584");
    assert_eq!(order.client_order_id.as_deref(), Some("client-42"));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.filled_quantity, Decimal::ZERO);
    assert_eq!(order.leverage, Some(dec!(10)));
    assert_eq!(order.created_at, order.updated_at);

    let paths: Vec<String> = transport
        .requests()
        .iter()
        .map(|r| r.path().to_string())
        .collect();
    assert_eq!(
        paths,
        [
            "/v5/position/set-leverage",
            "/v5/position/switch-isolated",
            "/v5/order/create"
        ]
    );

    let switch = body_json(&transport.requests()[1]);
    assert_eq!(switch["tradeMode"], 1);
    assert_eq!(switch["buyLeverage"], "10");

    let create = &transport.requests()[2];
    assert_eq!(create.method, HttpMethod::Post);
    assert_eq!(create.timeout, Duration::from_secs(30));
    let body = body_json(create);
    assert_eq!(body["category"], "linear");
    assert_eq!(body["side"], "Buy");
    assert_eq!(body["orderType"], "Limit");
    assert_eq!(body["qty"], "0.01");
    assert_eq!(body["price"], "37000");
    assert_eq!(body["timeInForce"], "PostOnly");
    assert_eq!(body["stopLoss"], "36000");
    assert_eq!(body["orderLinkId"], "client-42");
    assert_eq!(body["positionIdx"], 0);
    assert!(body.get("triggerPrice").is_none());
    assert!(body.get("reduceOnly").is_none());

    let timestamp: u64 = create.header(HEADER_TIMESTAMP).unwrap().parse().unwrap();
    let expected = sign(
        TEST_API_SECRET,
        timestamp,
        TEST_API_KEY,
        5000,
        create.body.as_deref().unwrap(),
    )
    .unwrap();
    assert_eq!(create.header(HEADER_SIGN), Some(expected.as_str()));
}

#[tokio::test]
async fn create_stop_order_on_spot_uses_order_filter() {
    let transport = ScriptedTransport::new();
    transport.on_fixture("/v5/order/create", include_str!("fixtures/create_order.json"));
    let (gw, _) = gateway(Category::Spot, transport.clone());

    let request =
        CreateOrderBuilder::stop(Side::Sell, "BTCUSDT", dec!(0.5), dec!(35000), dec!(35100))
            .with_leverage(dec!(5))
            .build()
            .unwrap();
    let order = gw.create_order(&request).await.unwrap();
    assert_eq!(order.order_type, OrderType::Stop);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1, "leverage is not set for spot");
    let body = body_json(&requests[0]);
    assert_eq!(body["orderType"], "Market");
    assert_eq!(body["triggerPrice"], "35100");
    assert_eq!(body["orderFilter"], "StopOrder");
    assert!(body.get("price").is_none());
    assert!(body.get("positionIdx").is_none());
    assert!(body.get("triggerDirection").is_none());
}

#[tokio::test]
async fn create_hedge_mode_stop_limit_sets_trigger_direction_and_slot() {
    let transport = ScriptedTransport::new();
    transport.on_fixture("/v5/order/create", include_str!("fixtures/create_order.json"));
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let request =
        CreateOrderBuilder::stop_limit(Side::Sell, "ETHUSDT", dec!(1), dec!(1990), dec!(2000))
            .hedge_mode()
            .reduce_only()
            .build()
            .unwrap();
    gw.create_order(&request).await.unwrap();

    let body = body_json(&transport.requests()[0]);
    assert_eq!(body["orderType"], "Limit");
    assert_eq!(body["price"], "1990");
    assert_eq!(body["triggerPrice"], "2000");
    assert_eq!(body["triggerDirection"], 2);
    assert_eq!(body["positionIdx"], 1);
    assert_eq!(body["reduceOnly"], true);
}

#[tokio::test]
async fn create_order_validation_fails_before_the_network() {
    let transport = ScriptedTransport::new();
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let mut request = CreateOrderBuilder::market(Side::Buy, "BTCUSDT", dec!(1))
        .build()
        .unwrap();
    request.order_type = OrderType::Limit;

    let err = gw.create_order(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Order);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn create_order_maps_insufficient_balance() {
    let transport = ScriptedTransport::new();
    transport.on(
        "/v5/order/create",
        error_envelope(110007, "ab not enough for new order"),
    );
    let (gw, _) = gateway(Category::Linear, transport);

    let request = CreateOrderBuilder::market(Side::Buy, "BTCUSDT", dec!(100))
        .build()
        .unwrap();
    let err = gw.create_order(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
}

#[tokio::test]
async fn create_order_surfaces_leverage_failures() {
    let transport = ScriptedTransport::new();
    transport.on(
        "/v5/position/set-leverage",
        error_envelope(10001, "leverage invalid"),
    );
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let request = CreateOrderBuilder::market(Side::Buy, "BTCUSDT", dec!(1))
        .with_leverage(dec!(500))
        .build()
        .unwrap();
    let err = gw.create_order(&request).await.unwrap_err();

    assert_eq!(err.code(), Some(10001));
    assert!(transport.requests_to("/v5/order/create").is_empty());
}

#[tokio::test]
async fn cancel_order_requires_a_symbol() {
    let transport = ScriptedTransport::new();
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let err = gw.cancel_order("abc", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Order);
    let err = gw.cancel_order("abc", Some("  ")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Order);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn cancel_order_posts_and_maps_missing_orders() {
    let transport = ScriptedTransport::new();
    transport
        .on(
            "/v5/order/cancel",
            ok_envelope(json!({ "orderId": "abc", "orderLinkId": "" })),
        )
        .on(
            "/v5/order/cancel",
            error_envelope(110001, "order not exists or too late to cancel"),
        );
    let (gw, _) = gateway(Category::Linear, transport.clone());

    gw.cancel_order("abc", Some("BTCUSDT")).await.unwrap();
    let body = body_json(&transport.requests()[0]);
    assert_eq!(body["orderId"], "abc");
    assert_eq!(body["symbol"], "BTCUSDT");
    assert_eq!(body["category"], "linear");

    let err = gw.cancel_order("gone", Some("BTCUSDT")).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Order { order_id: Some(ref id), .. } if id == "gone"
    ));
}

// ---------------------------------------------------------------------------
// positions, instruments, candles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_positions_drops_flat_rows() {
    let transport = ScriptedTransport::new();
    transport.on_fixture("/v5/position/list", include_str!("fixtures/positions.json"));
    let (gw, _) = gateway(Category::Linear, transport.clone());

    let positions = gw.get_positions(None).await.unwrap();

    assert_eq!(positions.len(), 2);
    assert!(positions.iter().all(|p| p.quantity > Decimal::ZERO));

    let btc = &positions[0];
    assert_eq!(btc.id, "BTCUSDT-0");
    assert_eq!(btc.side, PositionSide::Long);
    assert_eq!(btc.margin_mode, MarginMode::Cross);
    assert_eq!(btc.liquidation_price, Some(dec!(32500.5)));
    assert_eq!(btc.margin_used, dec!(54.3));

    let eth = &positions[1];
    assert_eq!(eth.id, "ETHUSDT-2");
    assert_eq!(eth.side, PositionSide::Short);
    assert_eq!(eth.margin_mode, MarginMode::Isolated);

    let request = &transport.requests()[0];
    assert_eq!(query_param(request, "settleCoin").as_deref(), Some("USDT"));
}

#[tokio::test]
async fn get_positions_on_spot_is_empty() {
    let transport = ScriptedTransport::new();
    let (gw, _) = gateway(Category::Spot, transport.clone());

    assert!(gw.get_positions(None).await.unwrap().is_empty());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn get_market_info_for_spot_and_linear() {
    let transport = ScriptedTransport::new();
    transport.on_fixture(
        "/v5/market/instruments-info",
        include_str!("fixtures/instruments_spot.json"),
    );
    let spot = public_gateway(Category::Spot, transport.clone());

    let info = spot.get_market_info("BTCUSDT").await.unwrap();
    assert!(info.spot && info.margin && !info.futures);
    assert_eq!(info.quantity_step, dec!(0.000001));
    assert_eq!(info.quantity_precision, 6);
    assert_eq!(info.price_precision, 2);
    assert_eq!(info.min_notional, dec!(1));
    assert_eq!(info.max_leverage, None);
    assert!(info.is_trading());
    assert!(transport.requests()[0].header(HEADER_SIGN).is_none());

    let transport = ScriptedTransport::new();
    transport.on_fixture(
        "/v5/market/instruments-info",
        include_str!("fixtures/instruments_linear.json"),
    );
    let linear = public_gateway(Category::Linear, transport);

    let info = linear.get_market_info("BTCUSDT").await.unwrap();
    assert!(info.futures && !info.spot);
    assert_eq!(info.quantity_precision, 3);
    assert_eq!(info.tick_size, dec!(0.1));
    assert_eq!(info.price_precision, 1);
    assert_eq!(info.min_notional, dec!(5));
    assert_eq!(info.max_leverage, Some(dec!(100)));
    assert_eq!(info.round_quantity(dec!(0.0129)), dec!(0.012));
}

#[tokio::test]
async fn get_market_info_unknown_symbol() {
    let transport = ScriptedTransport::new();
    transport.on("/v5/market/instruments-info", empty_list());
    let gw = public_gateway(Category::Linear, transport);

    let err = gw.get_market_info("NOPEUSDT").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Exchange);
    assert!(err.to_string().contains("NOPEUSDT"));
}

#[tokio::test]
async fn get_ohlcv_returns_ascending_candles() {
    let transport = ScriptedTransport::new();
    transport.on_fixture("/v5/market/kline", include_str!("fixtures/kline.json"));
    let gw = public_gateway(Category::Linear, transport.clone());

    let query = CandleQuery::new("BTCUSDT", CandleInterval::OneMinute).with_limit(5000);
    let candles = gw.get_ohlcv(&query).await.unwrap();

    let times: Vec<u64> = candles.iter().map(|c| c.open_time).collect();
    assert_eq!(times, [1_700_000_000_000, 1_700_000_060_000, 1_700_000_120_000]);
    assert_eq!(candles[2].close, dec!(37040.5));
    assert_eq!(candles[0].turnover, dec!(370050.75));

    let request = &transport.requests()[0];
    assert_eq!(query_param(request, "interval").as_deref(), Some("1"));
    assert_eq!(query_param(request, "limit").as_deref(), Some("1000"));
}

#[tokio::test]
async fn get_ohlcv_is_unsupported_for_options() {
    let transport = ScriptedTransport::new();
    let gw = public_gateway(Category::Option, transport.clone());

    let query = CandleQuery::new("BTC-29DEC23-40000-C", CandleInterval::OneHour);
    assert!(gw.get_ohlcv(&query).await.is_err());
    assert!(transport.requests().is_empty());
}

// ---------------------------------------------------------------------------
// transport failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn http_429_is_a_rate_limit_with_hint() {
    let transport = ScriptedTransport::new();
    transport.on(
        "/v5/market/time",
        HttpResponse {
            status: 429,
            headers: vec![("Retry-After".into(), "2".into())],
            body: "Too Many Requests".into(),
        },
    );
    let gw = public_gateway(Category::Linear, transport);

    let err = gw.test_connection().await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::RateLimit { retry_after: Some(d), .. } if d == Duration::from_secs(2)
    ));
}

#[tokio::test]
async fn ret_code_rate_limit_carries_reset_hint() {
    let transport = ScriptedTransport::new();
    let mut response = error_envelope(10006, "Too many visits!");
    let reset = tradegate::auth::timestamp_ms() + 30_000;
    response
        .headers
        .push(("X-Bapi-Limit-Reset-Timestamp".into(), reset.to_string()));
    transport.on("/v5/position/list", response);
    let (gw, _) = gateway(Category::Linear, transport);

    let err = gw.get_positions(Some("BTCUSDT")).await.unwrap_err();
    match err {
        GatewayError::RateLimit {
            retry_after: Some(hint),
            ..
        } => assert!(hint <= Duration::from_secs(30)),
        other => panic!("expected rate limit with hint, got {other:?}"),
    }
}

#[tokio::test]
async fn http_403_is_an_authentication_error() {
    let transport = ScriptedTransport::new();
    transport.on(
        "/v5/account/wallet-balance",
        HttpResponse {
            status: 403,
            headers: Vec::new(),
            body: "<html>forbidden</html>".into(),
        },
    );
    let (gw, _) = gateway(Category::Linear, transport);

    let err = gw.get_balance().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[tokio::test]
async fn malformed_body_is_an_exchange_error() {
    let transport = ScriptedTransport::new();
    transport.on("/v5/market/time", HttpResponse::ok("not json"));
    let gw = public_gateway(Category::Linear, transport);

    let err = gw.test_connection().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Exchange);
    assert!(err.to_string().contains("malformed response"));
}

#[tokio::test]
async fn for_category_shares_transport() {
    let transport = ScriptedTransport::new();
    transport.on("/v5/order/realtime", empty_list());
    let (linear, _) = gateway(Category::Linear, transport.clone());
    let inverse = linear.for_category(Category::Inverse);

    assert_eq!(inverse.category(), Category::Inverse);
    assert!(inverse.has_credentials());
    inverse.get_open_orders(None).await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(query_param(request, "category").as_deref(), Some("inverse"));
    assert_eq!(query_param(request, "settleCoin"), None);
}

#[test]
fn symbol_helpers_use_concatenated_form() {
    let transport = ScriptedTransport::new();
    let gw = public_gateway(Category::Spot, transport);

    assert_eq!(gw.name(), "bybit");
    assert_eq!(gw.format_symbol("btc", "usdt"), "BTCUSDT");
    let pair = gw.parse_symbol("ETHUSDC").unwrap();
    assert_eq!((pair.base.as_str(), pair.quote.as_str()), ("ETH", "USDC"));
    assert!(gw.capabilities().hedge_mode);
    assert_eq!(gw.rate_limits().history_window_ms, 7 * DAY_MS);
}
