//! Upbit Request Types
//!
//! Typed parameter sets for each endpoint family. Every struct documents
//! its optional fields and converts itself into [`Params`], the flat
//! mapping that gets signed and sent.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

use super::params::{ParamValue, Params};

/// Minute candle units accepted by `/v1/candles/minutes/{unit}`
pub const MINUTE_CANDLE_UNITS: [u32; 8] = [1, 3, 5, 10, 15, 30, 60, 240];

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn insert_list(params: &mut Params, key: &str, values: &[String]) {
    if !values.is_empty() {
        params.insert(key, values);
    }
}

// =============================================================================
// Enums
// =============================================================================

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Wire representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for ParamValue {
            fn from(value: $name) -> Self {
                ParamValue::Text(value.as_str().to_string())
            }
        }
    };
}

wire_enum!(
    /// Order side: `bid` buys, `ask` sells
    OrderSide { Bid => "bid", Ask => "ask" }
);

wire_enum!(
    /// Order type. `price` is a market buy by quote amount, `market` a
    /// market sell by volume, `best` a best-price order with IOC/FOK.
    OrdType { Limit => "limit", Price => "price", Market => "market", Best => "best" }
);

wire_enum!(
    TimeInForce { Ioc => "ioc", Fok => "fok", PostOnly => "post_only" }
);

wire_enum!(
    /// Self-match prevention mode
    SmpType { Reduce => "reduce", CancelMaker => "cancel_maker", CancelTaker => "cancel_taker" }
);

wire_enum!(
    OrderBy { Asc => "asc", Desc => "desc" }
);

wire_enum!(
    OrderState { Wait => "wait", Watch => "watch", Done => "done", Cancel => "cancel" }
);

wire_enum!(
    /// Subscription payload format for WebSocket streams
    #[derive(Default)]
    StreamFormat { #[default] Default => "DEFAULT", Simple => "SIMPLE" }
);

// =============================================================================
// Quotation queries
// =============================================================================

/// Optional fields for minute/week/month/year candles
#[derive(Debug, Clone, Default)]
pub struct CandleQuery {
    /// Last candle time (exclusive); latest when absent
    pub to: Option<DateTime<Utc>>,
    /// Number of candles (max 200)
    pub count: Option<u32>,
}

impl CandleQuery {
    pub fn count(count: u32) -> Self {
        Self {
            count: Some(count),
            ..Default::default()
        }
    }

    pub fn to_params(&self, market: &str) -> Params {
        let mut params = Params::new();
        params.insert("market", market);
        params.insert_opt("to", self.to.as_ref().map(format_time));
        params.insert_opt("count", self.count);
        params
    }
}

/// Optional fields for day candles
#[derive(Debug, Clone, Default)]
pub struct DayCandleQuery {
    pub to: Option<DateTime<Utc>>,
    pub count: Option<u32>,
    /// Quote currency to convert closing prices into (e.g. `KRW`)
    pub converting_price_unit: Option<String>,
}

impl DayCandleQuery {
    pub fn to_params(&self, market: &str) -> Params {
        let mut params = Params::new();
        params.insert("market", market);
        params.insert_opt("to", self.to.as_ref().map(format_time));
        params.insert_opt("count", self.count);
        params.insert_opt("convertingPriceUnit", self.converting_price_unit.as_deref());
        params
    }
}

/// Optional fields for recent trade ticks
#[derive(Debug, Clone, Default)]
pub struct TradesQuery {
    /// Last trade time of day, `HHmmss` or `HH:mm:ss` (UTC)
    pub to: Option<String>,
    pub count: Option<u32>,
    /// Pagination cursor (`sequential_id` of the last tick)
    pub cursor: Option<String>,
    /// Look back 1..=7 days
    pub days_ago: Option<u32>,
}

impl TradesQuery {
    pub fn count(count: u32) -> Self {
        Self {
            count: Some(count),
            ..Default::default()
        }
    }

    pub fn to_params(&self, market: &str) -> Params {
        let mut params = Params::new();
        params.insert("market", market);
        params.insert_opt("to", self.to.as_deref());
        params.insert_opt("count", self.count);
        params.insert_opt("cursor", self.cursor.as_deref());
        params.insert_opt("daysAgo", self.days_ago);
        params
    }
}

// =============================================================================
// Orders
// =============================================================================

/// New order request
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub market: String,
    pub side: OrderSide,
    pub ord_type: OrdType,
    /// Base-currency volume (limit, market sell, best ask)
    pub volume: Option<Decimal>,
    /// Price per unit (limit) or quote amount (price, best bid)
    pub price: Option<Decimal>,
    /// Client-chosen unique identifier
    pub identifier: Option<String>,
    pub time_in_force: Option<TimeInForce>,
    pub smp_type: Option<SmpType>,
}

impl PlaceOrder {
    /// Limit order
    pub fn limit(market: impl Into<String>, side: OrderSide, volume: Decimal, price: Decimal) -> Self {
        Self {
            market: market.into(),
            side,
            ord_type: OrdType::Limit,
            volume: Some(volume),
            price: Some(price),
            identifier: None,
            time_in_force: None,
            smp_type: None,
        }
    }

    /// Market buy spending `quote_amount` of the quote currency
    pub fn market_buy(market: impl Into<String>, quote_amount: Decimal) -> Self {
        Self {
            market: market.into(),
            side: OrderSide::Bid,
            ord_type: OrdType::Price,
            volume: None,
            price: Some(quote_amount),
            identifier: None,
            time_in_force: None,
            smp_type: None,
        }
    }

    /// Market sell of `volume` base currency
    pub fn market_sell(market: impl Into<String>, volume: Decimal) -> Self {
        Self {
            market: market.into(),
            side: OrderSide::Ask,
            ord_type: OrdType::Market,
            volume: Some(volume),
            price: None,
            identifier: None,
            time_in_force: None,
            smp_type: None,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    pub fn with_smp_type(mut self, smp: SmpType) -> Self {
        self.smp_type = Some(smp);
        self
    }

    /// Check the field combination required by `ord_type`
    pub fn validate(&self) -> ExchangeResult<()> {
        let missing = |field: &str| {
            Err(ExchangeError::InvalidParameters(format!(
                "{} order requires {}",
                self.ord_type, field
            )))
        };

        match self.ord_type {
            OrdType::Limit => {
                if self.volume.is_none() {
                    return missing("volume");
                }
                if self.price.is_none() {
                    return missing("price");
                }
            }
            OrdType::Price => {
                if self.side != OrderSide::Bid {
                    return Err(ExchangeError::InvalidParameters(
                        "price order must be a bid".to_string(),
                    ));
                }
                if self.price.is_none() {
                    return missing("price");
                }
            }
            OrdType::Market => {
                if self.side != OrderSide::Ask {
                    return Err(ExchangeError::InvalidParameters(
                        "market order must be an ask".to_string(),
                    ));
                }
                if self.volume.is_none() {
                    return missing("volume");
                }
            }
            OrdType::Best => {
                if !matches!(self.time_in_force, Some(TimeInForce::Ioc) | Some(TimeInForce::Fok)) {
                    return missing("time_in_force ioc or fok");
                }
            }
        }

        if self.time_in_force == Some(TimeInForce::PostOnly) && self.ord_type != OrdType::Limit {
            return Err(ExchangeError::InvalidParameters(
                "post_only is only valid for limit orders".to_string(),
            ));
        }

        Ok(())
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("market", self.market.as_str());
        params.insert("side", self.side);
        params.insert("ord_type", self.ord_type);
        params.insert_opt("volume", self.volume);
        params.insert_opt("price", self.price);
        params.insert_opt("identifier", self.identifier.as_deref());
        params.insert_opt("time_in_force", self.time_in_force);
        params.insert_opt("smp_type", self.smp_type);
        params
    }
}

/// Reference to a single order by exchange uuid or client identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    Uuid(String),
    Identifier(String),
}

impl OrderRef {
    pub fn uuid(uuid: impl Into<String>) -> Self {
        OrderRef::Uuid(uuid.into())
    }

    pub fn identifier(identifier: impl Into<String>) -> Self {
        OrderRef::Identifier(identifier.into())
    }

    pub fn to_params(&self) -> ExchangeResult<Params> {
        let (key, value) = match self {
            OrderRef::Uuid(v) => ("uuid", v),
            OrderRef::Identifier(v) => ("identifier", v),
        };
        if value.is_empty() {
            return Err(ExchangeError::InvalidParameters(format!("{} cannot be empty", key)));
        }
        Ok(Params::new().with(key, value.as_str()))
    }
}

/// Filters for `/v1/orders/open`
#[derive(Debug, Clone, Default)]
pub struct OpenOrdersQuery {
    pub market: Option<String>,
    pub state: Option<OrderState>,
    pub states: Vec<OrderState>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub order_by: Option<OrderBy>,
}

impl OpenOrdersQuery {
    pub fn market(market: impl Into<String>) -> Self {
        Self {
            market: Some(market.into()),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert_opt("market", self.market.as_deref());
        params.insert_opt("state", self.state);
        let states: Vec<String> = self.states.iter().map(|s| s.as_str().to_string()).collect();
        insert_list(&mut params, "states", &states);
        params.insert_opt("page", self.page);
        params.insert_opt("limit", self.limit);
        params.insert_opt("order_by", self.order_by);
        params
    }
}

/// Filters for `/v1/orders/closed`
#[derive(Debug, Clone, Default)]
pub struct ClosedOrdersQuery {
    pub market: Option<String>,
    pub state: Option<OrderState>,
    pub states: Vec<OrderState>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub order_by: Option<OrderBy>,
    pub page: Option<u32>,
}

impl ClosedOrdersQuery {
    pub fn to_params(&self) -> ExchangeResult<Params> {
        if let (Some(start), Some(end)) = (&self.start_time, &self.end_time) {
            if start > end {
                return Err(ExchangeError::InvalidParameters(
                    "start_time must not be after end_time".to_string(),
                ));
            }
        }

        let mut params = Params::new();
        params.insert_opt("market", self.market.as_deref());
        params.insert_opt("state", self.state);
        let states: Vec<String> = self.states.iter().map(|s| s.as_str().to_string()).collect();
        insert_list(&mut params, "states", &states);
        params.insert_opt("start_time", self.start_time.as_ref().map(format_time));
        params.insert_opt("end_time", self.end_time.as_ref().map(format_time));
        params.insert_opt("limit", self.limit);
        params.insert_opt("order_by", self.order_by);
        params.insert_opt("page", self.page);
        Ok(params)
    }
}

/// Lookup for `/v1/orders/uuids`
#[derive(Debug, Clone, Default)]
pub struct OrdersByIdsQuery {
    pub market: Option<String>,
    pub uuids: Vec<String>,
    pub identifiers: Vec<String>,
    pub order_by: Option<OrderBy>,
}

impl OrdersByIdsQuery {
    pub fn uuids<I, S>(uuids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uuids: uuids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert_opt("market", self.market.as_deref());
        insert_list(&mut params, "uuids", &self.uuids);
        insert_list(&mut params, "identifiers", &self.identifiers);
        params.insert_opt("order_by", self.order_by);
        params
    }
}

// =============================================================================
// Deposits / withdrawals
// =============================================================================

/// Filters for deposit and withdrawal listings
#[derive(Debug, Clone, Default)]
pub struct TransferQuery {
    pub currency: Option<String>,
    pub state: Option<String>,
    pub uuids: Vec<String>,
    pub txids: Vec<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub order_by: Option<OrderBy>,
}

impl TransferQuery {
    pub fn currency(currency: impl Into<String>) -> Self {
        Self {
            currency: Some(currency.into()),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert_opt("currency", self.currency.as_deref());
        params.insert_opt("state", self.state.as_deref());
        insert_list(&mut params, "uuids", &self.uuids);
        insert_list(&mut params, "txids", &self.txids);
        params.insert_opt("limit", self.limit);
        params.insert_opt("page", self.page);
        params.insert_opt("order_by", self.order_by);
        params
    }
}

/// Digital asset withdrawal to an allow-listed address
#[derive(Debug, Clone)]
pub struct WithdrawCoin {
    pub currency: String,
    pub amount: Decimal,
    pub address: String,
    pub net_type: Option<String>,
    /// Destination tag / memo for chains that need one
    pub secondary_address: Option<String>,
}

impl WithdrawCoin {
    pub fn new(currency: impl Into<String>, amount: Decimal, address: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            amount,
            address: address.into(),
            net_type: None,
            secondary_address: None,
        }
    }

    pub fn with_net_type(mut self, net_type: impl Into<String>) -> Self {
        self.net_type = Some(net_type.into());
        self
    }

    pub fn with_secondary_address(mut self, secondary: impl Into<String>) -> Self {
        self.secondary_address = Some(secondary.into());
        self
    }

    pub fn to_params(&self) -> ExchangeResult<Params> {
        if self.amount <= Decimal::ZERO {
            return Err(ExchangeError::InvalidParameters(
                "withdraw amount must be positive".to_string(),
            ));
        }
        let mut params = Params::new();
        params.insert("currency", self.currency.as_str());
        params.insert("amount", self.amount);
        params.insert("address", self.address.as_str());
        params.insert_opt("net_type", self.net_type.as_deref());
        params.insert_opt("secondary_address", self.secondary_address.as_deref());
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_enums() {
        assert_eq!(OrderSide::Bid.as_str(), "bid");
        assert_eq!(OrdType::Price.to_string(), "price");
        assert_eq!(TimeInForce::PostOnly.as_str(), "post_only");
        assert_eq!(SmpType::CancelMaker.as_str(), "cancel_maker");
        assert_eq!(StreamFormat::default().as_str(), "DEFAULT");
        assert_eq!(serde_json::to_string(&OrderState::Wait).unwrap(), "\"wait\"");
    }

    #[test]
    fn test_place_limit_order_params() {
        let order = PlaceOrder::limit("KRW-BTC", OrderSide::Bid, Decimal::new(1, 2), Decimal::new(100_000_000, 0))
            .with_identifier("my-order-1")
            .with_time_in_force(TimeInForce::PostOnly);
        assert!(order.validate().is_ok());
        assert_eq!(
            order.to_params().canonical_query().unwrap(),
            "identifier=my-order-1&market=KRW-BTC&ord_type=limit&price=100000000&side=bid&time_in_force=post_only&volume=0.01"
        );
    }

    #[test]
    fn test_place_order_validation() {
        let mut order = PlaceOrder::limit("KRW-BTC", OrderSide::Ask, Decimal::ONE, Decimal::ONE);
        order.price = None;
        assert!(matches!(order.validate(), Err(ExchangeError::InvalidParameters(_))));

        let mut buy = PlaceOrder::market_buy("KRW-BTC", Decimal::new(5000, 0));
        assert!(buy.validate().is_ok());
        buy.side = OrderSide::Ask;
        assert!(buy.validate().is_err());

        let sell = PlaceOrder::market_sell("KRW-BTC", Decimal::ONE).with_time_in_force(TimeInForce::PostOnly);
        assert!(sell.validate().is_err());

        let mut best = PlaceOrder::market_sell("KRW-BTC", Decimal::ONE);
        best.ord_type = OrdType::Best;
        assert!(best.validate().is_err());
        assert!(best.with_time_in_force(TimeInForce::Ioc).validate().is_ok());
    }

    #[test]
    fn test_order_ref_params() {
        assert_eq!(
            OrderRef::uuid("abc").to_params().unwrap().canonical_query().unwrap(),
            "uuid=abc"
        );
        assert_eq!(
            OrderRef::identifier("id-1").to_params().unwrap().canonical_query().unwrap(),
            "identifier=id-1"
        );
        assert!(OrderRef::uuid("").to_params().is_err());
    }

    #[test]
    fn test_candle_query_params() {
        let query = CandleQuery {
            to: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            count: Some(5),
        };
        assert_eq!(
            query.to_params("KRW-BTC").canonical_query().unwrap(),
            "count=5&market=KRW-BTC&to=2024-01-02T03%3A04%3A05Z"
        );
    }

    #[test]
    fn test_trades_query_uses_camel_case_days_ago() {
        let query = TradesQuery {
            days_ago: Some(2),
            ..TradesQuery::count(3)
        };
        assert_eq!(
            query.to_params("KRW-ETH").canonical_query().unwrap(),
            "count=3&daysAgo=2&market=KRW-ETH"
        );
    }

    #[test]
    fn test_open_orders_states_repeat() {
        let query = OpenOrdersQuery {
            states: vec![OrderState::Watch, OrderState::Wait],
            ..OpenOrdersQuery::market("KRW-BTC")
        };
        assert_eq!(
            query.to_params().canonical_query().unwrap(),
            "market=KRW-BTC&states=watch&states=wait"
        );
    }

    #[test]
    fn test_closed_orders_time_range_validation() {
        let query = ClosedOrdersQuery {
            start_time: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(query.to_params().is_err());
    }

    #[test]
    fn test_orders_by_ids_preserves_order() {
        let query = OrdersByIdsQuery::uuids(["u1", "u2"]);
        assert_eq!(query.to_params().canonical_query().unwrap(), "uuids=u1&uuids=u2");
    }

    #[test]
    fn test_empty_queries_have_no_params() {
        assert!(TransferQuery::default().to_params().is_empty());
        assert!(OpenOrdersQuery::default().to_params().is_empty());
    }

    #[test]
    fn test_withdraw_coin_params() {
        let withdraw = WithdrawCoin::new("BTC", Decimal::new(5, 3), "bc1qaddress").with_net_type("BTC");
        assert_eq!(
            withdraw.to_params().unwrap().canonical_query().unwrap(),
            "address=bc1qaddress&amount=0.005&currency=BTC&net_type=BTC"
        );

        let zero = WithdrawCoin::new("BTC", Decimal::ZERO, "bc1qaddress");
        assert!(zero.to_params().is_err());
    }
}
