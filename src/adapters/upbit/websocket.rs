//! Upbit WebSocket streams
//!
//! Public quotation streams (`ticker`, `trade`, `orderbook`) and the
//! private `myOrder` / `myAsset` streams share one message format: a JSON
//! array holding a ticket, the subscription types and a format field.
//! Frames arrive as binary JSON and are handed to the caller unparsed.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::shared::{connect_tls_with_request, TlsWebSocketStream};

use super::params::Params;
use super::requests::StreamFormat;
use super::signing::{AuthHeaders, JwtSigner};

/// Interval between client pings
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(15);

// =============================================================================
// Subscription messages
// =============================================================================

/// One subscription entry, e.g. `{"type":"ticker","codes":["KRW-BTC"]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionType {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_only_snapshot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_only_realtime: Option<bool>,
}

impl SubscriptionType {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            codes: None,
            is_only_snapshot: None,
            is_only_realtime: None,
        }
    }

    pub fn with_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn ticker<I: IntoIterator<Item = S>, S: Into<String>>(codes: I) -> Self {
        Self::new("ticker").with_codes(codes)
    }

    pub fn trade<I: IntoIterator<Item = S>, S: Into<String>>(codes: I) -> Self {
        Self::new("trade").with_codes(codes)
    }

    pub fn orderbook<I: IntoIterator<Item = S>, S: Into<String>>(codes: I) -> Self {
        Self::new("orderbook").with_codes(codes)
    }

    /// Own order events (private stream); all markets when no codes are set
    pub fn my_order() -> Self {
        Self::new("myOrder")
    }

    /// Own balance changes (private stream)
    pub fn my_asset() -> Self {
        Self::new("myAsset")
    }

    pub fn snapshot_only(mut self) -> Self {
        self.is_only_snapshot = Some(true);
        self
    }

    pub fn realtime_only(mut self) -> Self {
        self.is_only_realtime = Some(true);
        self
    }
}

/// Build the subscription array: `[{"ticket"}, ...types, {"format"}]`.
///
/// A random UUID ticket is used when none is given.
pub fn build_subscription(
    types: &[SubscriptionType],
    ticket: Option<&str>,
    format: StreamFormat,
) -> ExchangeResult<Value> {
    let ticket = ticket
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut message = Vec::with_capacity(types.len() + 2);
    message.push(serde_json::json!({ "ticket": ticket }));
    for entry in types {
        let value = serde_json::to_value(entry).map_err(|e| {
            ExchangeError::EncodingFailure(format!("subscription '{}': {}", entry.kind, e))
        })?;
        message.push(value);
    }
    message.push(serde_json::json!({ "format": format.as_str() }));
    Ok(Value::Array(message))
}

// =============================================================================
// Connection handle
// =============================================================================

/// A WebSocket endpoint plus the signer for private handshakes
///
/// Private streams sign a new token on every `connect`, so a handle can be
/// reused across reconnects without replaying a nonce.
#[derive(Debug, Clone)]
pub struct UpbitWebSocket {
    url: String,
    signer: Option<JwtSigner>,
}

impl UpbitWebSocket {
    /// Unauthenticated handle for public quotation streams
    pub fn public(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            signer: None,
        }
    }

    /// Handle whose handshakes carry a token over an empty parameter set
    pub fn private(url: impl Into<String>, signer: JwtSigner) -> ExchangeResult<Self> {
        if !signer.has_credentials() {
            return Err(ExchangeError::MissingCredentials);
        }
        Ok(Self {
            url: url.into(),
            signer: Some(signer),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_private(&self) -> bool {
        self.signer.is_some()
    }

    /// Signed header for one handshake; `None` for public streams
    pub fn handshake_auth(&self) -> ExchangeResult<Option<AuthHeaders>> {
        self.signer
            .as_ref()
            .map(|signer| signer.sign(&Params::new()))
            .transpose()
    }

    /// Open the connection, attaching a freshly signed `Authorization`
    /// header for private streams
    pub async fn connect(&self) -> ExchangeResult<TlsWebSocketStream> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| ExchangeError::ConnectionFailed(format!("Invalid WebSocket URL {}: {}", self.url, e)))?;

        if let Some(auth) = self.handshake_auth()? {
            let value = HeaderValue::from_str(auth.authorization())
                .map_err(|e| ExchangeError::EncodingFailure(format!("Invalid header value: {}", e)))?;
            request.headers_mut().insert("Authorization", value);
        }

        tracing::info!(url = %self.url, private = self.is_private(), "Connecting to Upbit WebSocket");
        connect_tls_with_request(request).await
    }

    /// Connect, send `messages` as one text frame and deliver every data
    /// frame to `on_message` until the server closes the stream.
    ///
    /// A ping goes out every `ping_interval`. There is no reconnect; the
    /// caller decides whether to call `run` again.
    pub async fn run<F>(&self, messages: &Value, mut on_message: F, ping_interval: Duration) -> ExchangeResult<()>
    where
        F: FnMut(&[u8]),
    {
        if ping_interval.is_zero() {
            return Err(ExchangeError::InvalidParameters(
                "ping_interval must be greater than zero".to_string(),
            ));
        }

        let ws = self.connect().await?;
        let (mut write, mut read) = ws.split();

        write
            .send(Message::Text(messages.to_string()))
            .await
            .map_err(|e| ExchangeError::WebSocket(Box::new(e)))?;
        tracing::debug!(url = %self.url, "Subscription sent");

        let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + ping_interval, ping_interval);

        loop {
            tokio::select! {
                _ = ping.tick() => {
                    write
                        .send(Message::Ping(Vec::new()))
                        .await
                        .map_err(|e| ExchangeError::WebSocket(Box::new(e)))?;
                }
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Binary(data))) => on_message(&data),
                        Some(Ok(Message::Text(text))) => on_message(text.as_bytes()),
                        Some(Ok(Message::Close(reason))) => {
                            tracing::info!(url = %self.url, reason = ?reason, "Upbit WebSocket closed by server");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(ExchangeError::WebSocket(Box::new(e))),
                        None => break,
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

    #[test]
    fn test_build_subscription_layout() {
        let message = build_subscription(
            &[SubscriptionType::ticker(["KRW-BTC", "KRW-ETH"])],
            Some("test-ticket"),
            StreamFormat::Simple,
        )
        .unwrap();
        assert_eq!(
            message,
            serde_json::json!([
                {"ticket": "test-ticket"},
                {"type": "ticker", "codes": ["KRW-BTC", "KRW-ETH"]},
                {"format": "SIMPLE"}
            ])
        );
    }

    #[test]
    fn test_build_subscription_generates_ticket() {
        let message = build_subscription(
            &[SubscriptionType::my_order(), SubscriptionType::my_asset()],
            None,
            StreamFormat::Default,
        )
        .unwrap();
        let items = message.as_array().unwrap();
        assert_eq!(items.len(), 4);
        let ticket = items[0]["ticket"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(ticket).is_ok());
        assert_eq!(items[1], serde_json::json!({"type": "myOrder"}));
        assert_eq!(items[3], serde_json::json!({"format": "DEFAULT"}));
    }

    #[test]
    fn test_subscription_flags_serialize_snake_case() {
        let sub = SubscriptionType::orderbook(["KRW-BTC"]).snapshot_only();
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["is_only_snapshot"], true);
        assert!(json.get("is_only_realtime").is_none());
    }

    #[tokio::test]
    async fn test_run_rejects_zero_ping_interval() {
        let ws = UpbitWebSocket::public("ws://127.0.0.1:1");
        let err = ws
            .run(&Value::Array(vec![]), |_| {}, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_run_sends_subscription_and_delivers_frames() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen_auth: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let seen_auth_server = Arc::clone(&seen_auth);

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                *seen_auth_server.lock().unwrap() = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Ok(resp)
            };
            let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();
            let first = ws.next().await.unwrap().unwrap();
            let subscription: Value = serde_json::from_str(first.to_text().unwrap()).unwrap();
            ws.send(Message::Binary(br#"{"type":"ticker","code":"KRW-BTC"}"#.to_vec()))
                .await
                .unwrap();
            ws.send(Message::Text(r#"{"status":"UP"}"#.to_string())).await.unwrap();
            ws.close(None).await.unwrap();
            subscription
        });

        let ws = UpbitWebSocket::public(format!("ws://{}", addr));
        let messages =
            build_subscription(&[SubscriptionType::ticker(["KRW-BTC"])], Some("t1"), StreamFormat::Default)
                .unwrap();
        let mut received = Vec::new();
        ws.run(&messages, |frame| received.push(frame.to_vec()), DEFAULT_PING_INTERVAL)
            .await
            .unwrap();

        let subscription = server.await.unwrap();
        assert_eq!(subscription, messages);
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], br#"{"type":"ticker","code":"KRW-BTC"}"#.to_vec());
        assert!(seen_auth.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_private_handshakes_sign_fresh_tokens() {
        use crate::adapters::upbit::signing::{verify_request, Credentials};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let mut tokens = Vec::new();
            for _ in 0..2 {
                let (stream, _) = listener.accept().await.unwrap();
                let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
                let seen_cb = Arc::clone(&seen);
                let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    *seen_cb.lock().unwrap() = req
                        .headers()
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    Ok(resp)
                };
                let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();
                let _subscription = ws.next().await.unwrap().unwrap();
                ws.close(None).await.unwrap();
                let token = seen.lock().unwrap().take();
                tokens.push(token);
            }
            tokens
        });

        let signer = JwtSigner::new(Credentials::new("ws-access", "ws-secret"));
        let ws = UpbitWebSocket::private(format!("ws://{}", addr), signer).unwrap();
        let messages = build_subscription(&[SubscriptionType::my_order()], Some("t1"), StreamFormat::Default).unwrap();
        ws.run(&messages, |_| {}, DEFAULT_PING_INTERVAL).await.unwrap();
        ws.run(&messages, |_| {}, DEFAULT_PING_INTERVAL).await.unwrap();

        let tokens = server.await.unwrap();
        let first = tokens[0].as_deref().and_then(|v| v.strip_prefix("Bearer ")).unwrap();
        let second = tokens[1].as_deref().and_then(|v| v.strip_prefix("Bearer ")).unwrap();
        assert_ne!(first, second);

        let claims_1 = verify_request(first, "ws-secret", &Params::new()).unwrap();
        let claims_2 = verify_request(second, "ws-secret", &Params::new()).unwrap();
        assert_eq!(claims_1.access_key, "ws-access");
        assert_ne!(claims_1.nonce, claims_2.nonce);
        assert!(claims_1.query_hash.is_none());
    }

    #[test]
    fn test_private_handle_requires_credentials() {
        use crate::adapters::upbit::signing::Credentials;

        let signer = JwtSigner::new(Credentials::new("", ""));
        let err = UpbitWebSocket::private("ws://127.0.0.1:1", signer).unwrap_err();
        assert!(matches!(err, ExchangeError::MissingCredentials));
        assert!(UpbitWebSocket::public("ws://127.0.0.1:1").handshake_auth().unwrap().is_none());
    }
}
