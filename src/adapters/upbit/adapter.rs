//! Upbit REST client
//!
//! `UpbitClient` owns the configuration, the request signer and one pooled
//! HTTP client. Every endpoint goes through [`UpbitClient::request`], which
//! signs private calls exactly once and sends the same canonical query
//! string that was hashed into the token.
//!
//! Mutating endpoints (orders, cancellations, withdrawals) check the
//! trading guard before building or signing anything.

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::shared::create_http_client;
use crate::config::logging::sanitize;

use super::config::UpbitConfig;
use super::params::Params;
use super::requests::{
    CandleQuery, ClosedOrdersQuery, DayCandleQuery, OpenOrdersQuery, OrderBy, OrderRef,
    OrdersByIdsQuery, PlaceOrder, TradesQuery, TransferQuery, WithdrawCoin, MINUTE_CANDLE_UNITS,
};
use super::signing::{AuthHeaders, Credentials, JwtSigner};
use super::types::{Account, Candle, MarketInfo, Order, Orderbook, Ticker, TradeTick};
use super::websocket::UpbitWebSocket;

/// How POST parameters travel in the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    /// `application/json` object of the parameters
    #[default]
    Json,
    /// `application/x-www-form-urlencoded` canonical query string
    Form,
}

fn join_codes(field: &str, codes: &[&str]) -> ExchangeResult<String> {
    if codes.is_empty() || codes.iter().any(|c| c.trim().is_empty()) {
        return Err(ExchangeError::InvalidParameters(format!(
            "{} must contain at least one non-empty code",
            field
        )));
    }
    Ok(codes.join(","))
}

fn ensure_positive(field: &str, amount: Decimal) -> ExchangeResult<()> {
    if amount <= Decimal::ZERO {
        return Err(ExchangeError::InvalidParameters(format!(
            "{} must be positive (got {})",
            field, amount
        )));
    }
    Ok(())
}

/// Upbit Open API client
#[derive(Debug, Clone)]
pub struct UpbitClient {
    config: UpbitConfig,
    signer: JwtSigner,
    http: reqwest::Client,
}

impl UpbitClient {
    /// Build a client from `config`.
    ///
    /// The configuration is validated first, so values merged from the
    /// environment are checked too. Missing credentials are not an error
    /// here; private calls fail with `MissingCredentials` when attempted.
    pub fn new(config: UpbitConfig) -> ExchangeResult<Self> {
        config
            .validate()
            .map_err(|e| ExchangeError::InvalidParameters(e.to_string()))?;
        let credentials =
            Credentials::resolve(config.access_key.as_deref(), config.secret_key.as_deref());
        let http = create_http_client(&config)?;

        if credentials.is_complete() {
            tracing::info!(
                phase = "init",
                base_url = %config.rest_base_url(),
                trading_enabled = config.enable_trading,
                access_key = %sanitize(credentials.access_key()),
                "Upbit client ready"
            );
        } else {
            tracing::info!(
                phase = "init",
                base_url = %config.rest_base_url(),
                "Upbit client ready (public endpoints only)"
            );
        }

        Ok(Self {
            config,
            signer: JwtSigner::new(credentials),
            http,
        })
    }

    /// Client configured from `UPBIT_*` environment variables
    pub fn from_env() -> ExchangeResult<Self> {
        Self::new(UpbitConfig::from_env())
    }

    pub fn config(&self) -> &UpbitConfig {
        &self.config
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.has_credentials()
    }

    pub fn trading_enabled(&self) -> bool {
        self.config.enable_trading
    }

    /// Signed `Authorization` header for `params`
    pub fn signed_headers(&self, params: &Params) -> ExchangeResult<AuthHeaders> {
        self.signer.sign(params)
    }

    fn ensure_trading_enabled(&self, action: &'static str) -> ExchangeResult<()> {
        if !self.config.enable_trading {
            tracing::warn!(action, "Blocked mutating call: trading guard is disarmed");
            return Err(ExchangeError::TradingDisabled(action));
        }
        Ok(())
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Send one request and decode the response.
    ///
    /// GET/DELETE carry `params` as the canonical query string. POST carries
    /// them as a JSON object or, with [`BodyEncoding::Form`], as the
    /// canonical query string in a form body. Status >= 400 becomes
    /// `ExchangeError::Api`; a non-JSON success body is decoded from a JSON
    /// string holding the text.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        private: bool,
        encoding: BodyEncoding,
    ) -> ExchangeResult<T> {
        let empty = Params::new();
        let params = params.unwrap_or(&empty);

        let auth = if private {
            Some(self.signer.sign(params)?)
        } else {
            None
        };

        let mut url = format!("{}{}", self.config.rest_base_url(), path);
        let sends_query = method == Method::GET || method == Method::DELETE;
        if sends_query && !params.is_empty() {
            url.push('?');
            url.push_str(&params.canonical_query()?);
        }

        let mut builder = self.http.request(method.clone(), &url);
        if let Some(auth) = &auth {
            builder = builder.headers(auth.to_header_map()?);
        }
        if !sends_query {
            builder = match encoding {
                BodyEncoding::Json => builder.json(&params.to_json_body()?),
                BodyEncoding::Form => builder
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(params.canonical_query()?),
            };
        }

        tracing::debug!(method = %method, path, private, params = params.len(), "Upbit request");

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().starts_with("application/json"))
            .unwrap_or(false);
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        tracing::debug!(status = status.as_u16(), path, bytes = body.len(), "Upbit response");

        if status.as_u16() >= 400 {
            let payload = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
            tracing::warn!(status = status.as_u16(), method = %method, path, payload = %payload, "Upbit API error");
            return Err(ExchangeError::Api {
                status: status.as_u16(),
                payload,
            });
        }

        let decoded = if is_json {
            serde_json::from_str::<T>(&body)
        } else {
            serde_json::from_value::<T>(Value::String(body))
        };
        decoded.map_err(|e| {
            ExchangeError::InvalidResponse(format!("{} {}: {}", method, path, e))
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> ExchangeError {
        if err.is_timeout() {
            ExchangeError::NetworkTimeout(self.config.timeout().as_millis() as u64)
        } else {
            ExchangeError::ConnectionFailed(err.without_url().to_string())
        }
    }

    async fn get_public<T: DeserializeOwned>(&self, path: &str, params: Option<&Params>) -> ExchangeResult<T> {
        self.request(Method::GET, path, params, false, BodyEncoding::Json).await
    }

    async fn get_private<T: DeserializeOwned>(&self, path: &str, params: Option<&Params>) -> ExchangeResult<T> {
        self.request(Method::GET, path, params, true, BodyEncoding::Json).await
    }

    async fn post_private<T: DeserializeOwned>(&self, path: &str, params: &Params) -> ExchangeResult<T> {
        self.request(Method::POST, path, Some(params), true, BodyEncoding::Json).await
    }

    async fn delete_private<T: DeserializeOwned>(&self, path: &str, params: &Params) -> ExchangeResult<T> {
        self.request(Method::DELETE, path, Some(params), true, BodyEncoding::Json).await
    }

    // =========================================================================
    // Quotation (public)
    // =========================================================================

    /// All tradable markets (`/v1/market/all`)
    pub async fn market_all(&self) -> ExchangeResult<Vec<MarketInfo>> {
        self.get_public("/v1/market/all", None).await
    }

    /// Current price for one or more markets (`/v1/ticker`)
    pub async fn ticker(&self, markets: &[&str]) -> ExchangeResult<Vec<Ticker>> {
        let params = Params::new().with("markets", join_codes("markets", markets)?);
        self.get_public("/v1/ticker", Some(&params)).await
    }

    /// Tickers for every market quoted in the given currencies (`/v1/ticker/all`)
    pub async fn ticker_by_quotes(&self, quote_currencies: &[&str]) -> ExchangeResult<Vec<Ticker>> {
        let params = Params::new().with(
            "quoteCurrencies",
            join_codes("quote_currencies", quote_currencies)?,
        );
        self.get_public("/v1/ticker/all", Some(&params)).await
    }

    /// Orderbook snapshots, optionally grouped by price `level`
    pub async fn orderbook(&self, markets: &[&str], level: Option<Decimal>) -> ExchangeResult<Vec<Orderbook>> {
        let mut params = Params::new().with("markets", join_codes("markets", markets)?);
        params.insert_opt("level", level);
        self.get_public("/v1/orderbook", Some(&params)).await
    }

    /// Price grouping levels supported per market
    pub async fn supported_orderbook_levels(&self) -> ExchangeResult<Value> {
        self.get_public("/v1/orderbook/supported_levels", None).await
    }

    pub async fn trades_ticks(&self, market: &str, query: &TradesQuery) -> ExchangeResult<Vec<TradeTick>> {
        self.get_public("/v1/trades/ticks", Some(&query.to_params(market))).await
    }

    /// Minute candles; `unit` must be one of [`MINUTE_CANDLE_UNITS`]
    pub async fn candles_minutes(&self, unit: u32, market: &str, query: &CandleQuery) -> ExchangeResult<Vec<Candle>> {
        if !MINUTE_CANDLE_UNITS.contains(&unit) {
            return Err(ExchangeError::InvalidParameters(format!(
                "minute candle unit {} not in {:?}",
                unit, MINUTE_CANDLE_UNITS
            )));
        }
        let path = format!("/v1/candles/minutes/{}", unit);
        self.get_public(&path, Some(&query.to_params(market))).await
    }

    pub async fn candles_days(&self, market: &str, query: &DayCandleQuery) -> ExchangeResult<Vec<Candle>> {
        self.get_public("/v1/candles/days", Some(&query.to_params(market))).await
    }

    pub async fn candles_weeks(&self, market: &str, query: &CandleQuery) -> ExchangeResult<Vec<Candle>> {
        self.get_public("/v1/candles/weeks", Some(&query.to_params(market))).await
    }

    pub async fn candles_months(&self, market: &str, query: &CandleQuery) -> ExchangeResult<Vec<Candle>> {
        self.get_public("/v1/candles/months", Some(&query.to_params(market))).await
    }

    pub async fn candles_years(&self, market: &str, query: &CandleQuery) -> ExchangeResult<Vec<Candle>> {
        self.get_public("/v1/candles/years", Some(&query.to_params(market))).await
    }

    /// Deposit/withdrawal status per currency and network
    pub async fn wallet_status(&self) -> ExchangeResult<Value> {
        self.get_public("/v1/status/wallet", None).await
    }

    // =========================================================================
    // Account & orders (private)
    // =========================================================================

    pub async fn accounts(&self) -> ExchangeResult<Vec<Account>> {
        self.get_private("/v1/accounts", None).await
    }

    /// Fees, limits and balances relevant to ordering on `market`
    pub async fn orders_chance(&self, market: &str) -> ExchangeResult<Value> {
        let params = Params::new().with("market", market);
        self.get_private("/v1/orders/chance", Some(&params)).await
    }

    /// Place a new order. Requires `enable_trading`.
    pub async fn place_order(&self, order: &PlaceOrder) -> ExchangeResult<Order> {
        self.ensure_trading_enabled("place_order")?;
        order.validate()?;
        tracing::info!(
            market = %order.market,
            side = %order.side,
            ord_type = %order.ord_type,
            "Placing Upbit order"
        );
        self.post_private("/v1/orders", &order.to_params()).await
    }

    /// Cancel one order. Requires `enable_trading`.
    pub async fn cancel_order(&self, order: &OrderRef) -> ExchangeResult<Order> {
        self.ensure_trading_enabled("cancel_order")?;
        let params = order.to_params()?;
        self.delete_private("/v1/order", &params).await
    }

    pub async fn order(&self, order: &OrderRef) -> ExchangeResult<Order> {
        let params = order.to_params()?;
        self.get_private("/v1/order", Some(&params)).await
    }

    pub async fn orders_open(&self, query: &OpenOrdersQuery) -> ExchangeResult<Vec<Order>> {
        self.get_private("/v1/orders/open", Some(&query.to_params())).await
    }

    pub async fn orders_closed(&self, query: &ClosedOrdersQuery) -> ExchangeResult<Vec<Order>> {
        let params = query.to_params()?;
        self.get_private("/v1/orders/closed", Some(&params)).await
    }

    pub async fn orders_by_ids(&self, query: &OrdersByIdsQuery) -> ExchangeResult<Vec<Order>> {
        if query.uuids.is_empty() && query.identifiers.is_empty() {
            return Err(ExchangeError::InvalidParameters(
                "orders_by_ids needs uuids or identifiers".to_string(),
            ));
        }
        self.get_private("/v1/orders/uuids", Some(&query.to_params())).await
    }

    /// Cancel up to `count` open orders on `market`. Requires `enable_trading`.
    pub async fn cancel_orders_batch(&self, market: &str, count: u32, order_by: OrderBy) -> ExchangeResult<Value> {
        self.ensure_trading_enabled("cancel_orders_batch")?;
        let params = Params::new()
            .with("market", market)
            .with("count", count)
            .with("order_by", order_by);
        self.delete_private("/v1/orders", &params).await
    }

    /// Cancel the listed orders on `market`. Requires `enable_trading`.
    pub async fn cancel_orders_list(
        &self,
        market: &str,
        uuids: &[String],
        identifiers: &[String],
    ) -> ExchangeResult<Value> {
        self.ensure_trading_enabled("cancel_orders_list")?;
        let mut params = Params::new().with("market", market);
        if !uuids.is_empty() {
            params.insert("uuids", uuids);
        }
        if !identifiers.is_empty() {
            params.insert("identifiers", identifiers);
        }
        self.delete_private("/v1/orders/list", &params).await
    }

    /// API keys of the account with their expiry
    pub async fn api_keys(&self) -> ExchangeResult<Value> {
        self.get_private("/v1/api_keys", None).await
    }

    // =========================================================================
    // Deposits & withdrawals (private)
    // =========================================================================

    pub async fn withdraws(&self, query: &TransferQuery) -> ExchangeResult<Value> {
        self.get_private("/v1/withdraws", Some(&query.to_params())).await
    }

    /// Withdraw a digital asset. Requires `enable_trading`.
    pub async fn withdraw(&self, request: &WithdrawCoin) -> ExchangeResult<Value> {
        self.ensure_trading_enabled("withdraw")?;
        let params = request.to_params()?;
        tracing::info!(currency = %request.currency, amount = %request.amount, "Requesting Upbit withdrawal");
        self.post_private("/v1/withdraws/coin", &params).await
    }

    /// Withdraw KRW to the registered bank account. Requires `enable_trading`.
    pub async fn withdraw_krw(&self, amount: Decimal) -> ExchangeResult<Value> {
        self.ensure_trading_enabled("withdraw_krw")?;
        ensure_positive("amount", amount)?;
        let params = Params::new().with("amount", amount);
        self.post_private("/v1/withdraws/krw", &params).await
    }

    pub async fn withdraw_allowlisted_addresses(&self) -> ExchangeResult<Value> {
        self.get_private("/v1/withdraws/coin_addresses", None).await
    }

    pub async fn deposits(&self, query: &TransferQuery) -> ExchangeResult<Value> {
        self.get_private("/v1/deposits", Some(&query.to_params())).await
    }

    /// Request a KRW deposit from the registered bank account
    pub async fn deposit_krw(&self, amount: Decimal) -> ExchangeResult<Value> {
        ensure_positive("amount", amount)?;
        let params = Params::new().with("amount", amount);
        self.post_private("/v1/deposits/krw", &params).await
    }

    /// Ask the exchange to issue a deposit address (issued asynchronously)
    pub async fn generate_deposit_address(&self, currency: &str, net_type: Option<&str>) -> ExchangeResult<Value> {
        let mut params = Params::new().with("currency", currency);
        params.insert_opt("net_type", net_type);
        self.post_private("/v1/deposits/generate_coin_address", &params).await
    }

    pub async fn deposit_addresses(&self, currency: Option<&str>, net_type: Option<&str>) -> ExchangeResult<Value> {
        let mut params = Params::new();
        params.insert_opt("currency", currency);
        params.insert_opt("net_type", net_type);
        self.get_private("/v1/deposits/coin_addresses", Some(&params)).await
    }

    pub async fn deposit_address_by_uuid(&self, uuid: &str) -> ExchangeResult<Value> {
        let params = Params::new().with("uuid", uuid);
        self.get_private("/v1/deposits/coin_address", Some(&params)).await
    }

    pub async fn deposit_verify_by_uuid(&self, uuid: &str) -> ExchangeResult<Value> {
        let params = Params::new().with("uuid", uuid);
        self.post_private("/v1/deposits/verify", &params).await
    }

    pub async fn deposit_verify_by_txid(&self, txid: &str, currency: &str) -> ExchangeResult<Value> {
        let params = Params::new().with("txid", txid).with("currency", currency);
        self.post_private("/v1/deposits/verify_txid", &params).await
    }

    pub async fn deposit_available_info(&self, currency: &str) -> ExchangeResult<Value> {
        let params = Params::new().with("currency", currency);
        self.get_private("/v1/deposits/coin_availability", Some(&params)).await
    }

    // =========================================================================
    // WebSocket
    // =========================================================================

    /// Handle for the public quotation stream
    pub fn ws_public(&self) -> UpbitWebSocket {
        UpbitWebSocket::public(self.config.ws_public_url())
    }

    /// Handle for the private `myOrder` / `myAsset` stream; each handshake
    /// signs its own token over an empty parameter set
    pub fn ws_private(&self) -> ExchangeResult<UpbitWebSocket> {
        UpbitWebSocket::private(self.config.ws_private_url(), self.signer.clone())
    }
}
