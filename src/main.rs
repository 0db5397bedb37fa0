use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use tradegate::auth::timestamp_ms;
use tradegate::config::fetch_config;
use tradegate::gateway::{RetryPolicy, retry_read};
use tradegate::models::{MarginMode, TradeQuery};
use tradegate::paginator::DAY_MS;
use tradegate::risk::{PositionSizeInput, RiskValidationInput};
use tradegate::{BybitConfig, BybitGateway, ExchangeGateway, GatewayError};

#[tokio::main]
async fn main() -> Result<(), GatewayError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let app_config = fetch_config()?;
    let risk_config = app_config.risk_config()?;
    info!("{}", risk_config.describe_limits().trim_end());

    let credentials = app_config.bybit.credentials()?;
    let gateway: Arc<dyn ExchangeGateway> = Arc::new(BybitGateway::new(
        BybitConfig::from_settings(&app_config.bybit),
        credentials,
        app_config.bybit.category,
    )?);

    let check = gateway.test_connection().await?;
    info!(
        exchange = gateway.name(),
        category = %gateway.category(),
        server_time_ms = check.server_time_ms,
        clock_skew_ms = check.clock_skew_ms,
        authenticated = check.authenticated,
        "connected"
    );

    if !check.authenticated {
        warn!("no API credentials configured; skipping account queries");
        return Ok(());
    }

    let policy = RetryPolicy::default();
    let wallet = retry_read(&policy, "get_balance", || gateway.get_balance()).await?;
    for balance in &wallet.balances {
        info!(
            currency = %balance.currency,
            total = %balance.total,
            available = %balance.available,
            locked = %balance.locked,
            "balance"
        );
    }

    let now = timestamp_ms();
    let query = TradeQuery::default().between(now.saturating_sub(7 * DAY_MS), now);
    let trades = gateway.get_trades(&query).await?;
    info!(count = trades.len(), "fills over the last 7 days");

    // Size a 1% risk trade against the live margin and check it against the limits.
    let equity = wallet.total_equity_usd;
    let sizing = PositionSizeInput {
        risk_amount: equity / Decimal::ONE_HUNDRED,
        entry_price: Decimal::ONE_HUNDRED,
        stop_loss_price: Decimal::from(98),
        leverage: Decimal::from(10),
        margin_mode: MarginMode::Isolated,
        available_margin: wallet.available_margin_usd,
    };
    let position = gateway.calculate_position_size(&sizing);
    info!(
        size = %position.position_size,
        margin = %position.margin_required,
        can_open = position.can_open,
        "sample position size"
    );
    let verdict = gateway.validate_risk(
        &RiskValidationInput {
            sizing,
            starting_capital: equity,
            current_daily_loss: Decimal::ZERO,
            total_loss: Decimal::ZERO,
        },
        &risk_config.loss_limits,
    );
    info!(
        valid = verdict.valid,
        reason = verdict.reason.as_deref().unwrap_or("-"),
        warnings = verdict.warnings.len(),
        "sample risk check"
    );

    Ok(())
}
