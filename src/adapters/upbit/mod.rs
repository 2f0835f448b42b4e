//! Upbit exchange client
//!
//! REST quotation, trading and wallet endpoints plus WebSocket streams for
//! the Upbit Open API. Private calls are authenticated with HS256 bearer
//! tokens built by [`signing::JwtSigner`].

pub mod adapter;
pub mod config;
pub mod params;
pub mod requests;
pub mod signing;
pub mod types;
pub mod websocket;

pub use adapter::{BodyEncoding, UpbitClient};
pub use config::UpbitConfig;
pub use params::{ParamValue, Params};
pub use requests::{
    CandleQuery, ClosedOrdersQuery, DayCandleQuery, OpenOrdersQuery, OrdType, OrderBy, OrderRef,
    OrderSide, OrderState, OrdersByIdsQuery, PlaceOrder, SmpType, StreamFormat, TimeInForce,
    TradesQuery, TransferQuery, WithdrawCoin, MINUTE_CANDLE_UNITS,
};
pub use signing::{AuthHeaders, Claims, Credentials, JwtSigner, QueryHasher, Sha512Hasher};
pub use types::{Account, Candle, MarketInfo, Order, Orderbook, OrderbookUnit, Ticker, TradeTick};
pub use websocket::{build_subscription, SubscriptionType, UpbitWebSocket, DEFAULT_PING_INTERVAL};
