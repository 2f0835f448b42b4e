//! TLS WebSocket connection helpers

use tokio_tungstenite::tungstenite::http::Request;
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

/// WebSocket stream over TCP, TLS-wrapped for `wss://` URLs
pub type TlsWebSocketStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

fn tls_connector() -> ExchangeResult<Connector> {
    let tls = native_tls::TlsConnector::builder()
        .min_protocol_version(Some(native_tls::Protocol::Tlsv12))
        .build()
        .map_err(|e| ExchangeError::ConnectionFailed(format!("TLS error: {}", e)))?;
    Ok(Connector::NativeTls(tls))
}

/// Connect with a prepared handshake request (extra headers such as `Authorization`)
pub async fn connect_tls_with_request(request: Request<()>) -> ExchangeResult<TlsWebSocketStream> {
    let (ws_stream, response) =
        connect_async_tls_with_config(request, None, false, Some(tls_connector()?))
            .await
            .map_err(|e| ExchangeError::WebSocket(Box::new(e)))?;

    tracing::debug!(status = %response.status(), "WebSocket handshake complete");
    Ok(ws_stream)
}
