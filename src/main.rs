//! Upbit client demo entry point
//!
//! 1. Loads `.env`, logging and optional `config.yaml`
//! 2. Prints a public market snapshot
//! 3. Prints a private account snapshot when credentials are configured

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};
use upbit_client::adapters::upbit::{CandleQuery, TradesQuery, UpbitClient};
use upbit_client::config::{self, logging::init_logging, AppConfig};

const CONFIG_PATH: &str = "config.yaml";
const DEMO_MARKET: &str = "KRW-BTC";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let path = Path::new(CONFIG_PATH);
    let file_config = if path.exists() {
        config::load_config(path).context("loading config.yaml")?
    } else {
        info!("No {} found, using defaults", CONFIG_PATH);
        AppConfig::default()
    };
    let app_config = file_config.merge_env();
    app_config.validate().context("validating merged configuration")?;

    let client = UpbitClient::new(app_config.upbit)?;

    // Public snapshot
    let markets = client.market_all().await?;
    info!(count = markets.len(), "📊 Markets listed");
    let krw: Vec<&str> = markets
        .iter()
        .filter(|m| m.quote_currency() == "KRW")
        .take(3)
        .map(|m| m.market.as_str())
        .collect();
    info!(sample = ?krw, "KRW market sample");

    let candles = client
        .candles_minutes(1, DEMO_MARKET, &CandleQuery::count(5))
        .await?;
    if let Some(latest) = candles.first() {
        info!(
            market = DEMO_MARKET,
            time_utc = %latest.candle_date_time_utc,
            close = %latest.trade_price,
            "Latest 1m candle"
        );
    }

    let books = client.orderbook(&[DEMO_MARKET], None).await?;
    if let Some(book) = books.first() {
        info!(
            market = %book.market,
            best_bid = ?book.best_bid(),
            best_ask = ?book.best_ask(),
            "Orderbook top"
        );
    }

    let trades = client.trades_ticks(DEMO_MARKET, &TradesQuery::count(3)).await?;
    if let Some(trade) = trades.first() {
        info!(
            market = DEMO_MARKET,
            price = %trade.trade_price,
            volume = %trade.trade_volume,
            side = ?trade.ask_bid,
            "Most recent trade"
        );
    }

    // Private snapshot
    if !client.has_credentials() {
        warn!("UPBIT_ACCESS_KEY / UPBIT_SECRET_KEY not set, skipping private snapshot");
        return Ok(());
    }

    let accounts = client.accounts().await?;
    if let Some(account) = accounts.first() {
        info!(
            currency = %account.currency,
            balance = %account.balance,
            locked = %account.locked,
            "💰 Account sample"
        );
    }

    let chance = client.orders_chance(DEMO_MARKET).await?;
    info!(market = %chance["market"]["id"], "Order chance retrieved");

    Ok(())
}
