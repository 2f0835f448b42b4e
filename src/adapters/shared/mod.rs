//! Transport helpers shared by the REST and WebSocket halves of the client

pub mod http;
pub mod websocket;

pub use http::create_http_client;
pub use websocket::{connect_tls_with_request, TlsWebSocketStream};
