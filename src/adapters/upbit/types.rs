//! Upbit response types
//!
//! Typed views of the quotation and trading responses the client reads most
//! often. Fields the exchange may omit or null are `Option`, so new or
//! missing fields never break deserialization. Less common endpoints return
//! raw `serde_json::Value`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Entry of `/v1/market/all`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    /// Market code, e.g. `KRW-BTC`
    pub market: String,
    pub korean_name: String,
    pub english_name: String,
    #[serde(default)]
    pub market_warning: Option<String>,
    #[serde(default)]
    pub market_event: Option<serde_json::Value>,
}

impl MarketInfo {
    /// Quote currency prefix (`KRW`, `BTC`, `USDT`)
    pub fn quote_currency(&self) -> &str {
        self.market.split('-').next().unwrap_or_default()
    }
}

/// Current price snapshot from `/v1/ticker`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub market: String,
    pub trade_price: Decimal,
    #[serde(default)]
    pub opening_price: Option<Decimal>,
    #[serde(default)]
    pub high_price: Option<Decimal>,
    #[serde(default)]
    pub low_price: Option<Decimal>,
    #[serde(default)]
    pub prev_closing_price: Option<Decimal>,
    /// `RISE`, `EVEN` or `FALL`
    #[serde(default)]
    pub change: Option<String>,
    #[serde(default)]
    pub signed_change_rate: Option<Decimal>,
    #[serde(default)]
    pub trade_volume: Option<Decimal>,
    #[serde(default)]
    pub acc_trade_price_24h: Option<Decimal>,
    #[serde(default)]
    pub acc_trade_volume_24h: Option<Decimal>,
    #[serde(default)]
    pub trade_timestamp: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// One price level of an orderbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookUnit {
    pub ask_price: Decimal,
    pub bid_price: Decimal,
    pub ask_size: Decimal,
    pub bid_size: Decimal,
}

/// Orderbook snapshot from `/v1/orderbook`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orderbook {
    pub market: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub total_ask_size: Option<Decimal>,
    #[serde(default)]
    pub total_bid_size: Option<Decimal>,
    #[serde(default)]
    pub orderbook_units: Vec<OrderbookUnit>,
    /// Price grouping unit; 0 means ungrouped
    #[serde(default)]
    pub level: Option<Decimal>,
}

impl Orderbook {
    pub fn best_bid(&self) -> Option<Decimal> {
        self.orderbook_units.first().map(|u| u.bid_price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.orderbook_units.first().map(|u| u.ask_price)
    }

    /// Best ask minus best bid
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()? - self.best_bid()?)
    }
}

/// Candle of any period (minutes, days, weeks, months, years)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub market: String,
    pub candle_date_time_utc: String,
    #[serde(default)]
    pub candle_date_time_kst: Option<String>,
    pub opening_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub trade_price: Decimal,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub candle_acc_trade_price: Option<Decimal>,
    #[serde(default)]
    pub candle_acc_trade_volume: Option<Decimal>,
    /// Minute candles only
    #[serde(default)]
    pub unit: Option<u32>,
    /// Week/month/year candles only
    #[serde(default)]
    pub first_day_of_period: Option<String>,
}

/// Executed trade from `/v1/trades/ticks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTick {
    pub market: String,
    #[serde(default)]
    pub trade_date_utc: Option<String>,
    #[serde(default)]
    pub trade_time_utc: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub trade_price: Decimal,
    pub trade_volume: Decimal,
    /// `ASK` or `BID`: the taker side
    #[serde(default)]
    pub ask_bid: Option<String>,
    #[serde(default)]
    pub sequential_id: Option<i64>,
}

/// Balance entry from `/v1/accounts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub currency: String,
    pub balance: Decimal,
    pub locked: Decimal,
    #[serde(default)]
    pub avg_buy_price: Option<Decimal>,
    #[serde(default)]
    pub avg_buy_price_modified: Option<bool>,
    #[serde(default)]
    pub unit_currency: Option<String>,
}

impl Account {
    pub fn total(&self) -> Decimal {
        self.balance + self.locked
    }
}

/// Order as returned by order placement, cancellation and lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub uuid: String,
    pub side: String,
    pub ord_type: String,
    pub market: String,
    pub state: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<Decimal>,
    #[serde(default)]
    pub remaining_volume: Option<Decimal>,
    #[serde(default)]
    pub executed_volume: Option<Decimal>,
    #[serde(default)]
    pub reserved_fee: Option<Decimal>,
    #[serde(default)]
    pub paid_fee: Option<Decimal>,
    #[serde(default)]
    pub locked: Option<Decimal>,
    #[serde(default)]
    pub trades_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub time_in_force: Option<String>,
}
