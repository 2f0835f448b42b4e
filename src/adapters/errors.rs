//! Exchange adapter error types
//!
//! All exchange-related errors are wrapped in ExchangeError enum
//! which implements thiserror for consistent error handling.

use thiserror::Error;

/// Exchange-specific error types for client operations
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Access key or secret key absent at signing time
    #[error("Missing credentials: access_key and secret_key are required for private requests")]
    MissingCredentials,

    /// Parameter value cannot be represented in the canonical query string
    #[error("Encoding failure: {0}")]
    EncodingFailure(String),

    /// Mutating call attempted while the trading guard is disarmed
    #[error("Trading disabled: {0} requires enable_trading = true")]
    TradingDisabled(&'static str),

    /// Bearer token failed structural, signature, or query-hash checks
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Caller supplied an invalid combination of parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Exchange answered with an HTTP error status
    #[error("Upbit API error {status}: {payload}")]
    Api {
        status: u16,
        payload: serde_json::Value,
    },

    /// Connection to exchange failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Network operation timed out
    #[error("Network timeout after {0}ms")]
    NetworkTimeout(u64),

    /// Invalid or unexpected response from exchange
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// WebSocket protocol error (boxed to reduce enum size)
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),
}

impl ExchangeError {
    /// True for errors raised locally before any request reached the network
    pub fn is_pre_flight(&self) -> bool {
        matches!(
            self,
            ExchangeError::MissingCredentials
                | ExchangeError::EncodingFailure(_)
                | ExchangeError::TradingDisabled(_)
                | ExchangeError::InvalidParameters(_)
        )
    }
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_display() {
        let err = ExchangeError::MissingCredentials;
        assert!(err.to_string().contains("access_key and secret_key"));
    }

    #[test]
    fn test_encoding_failure_display() {
        let err = ExchangeError::EncodingFailure("nested object for key 'x'".to_string());
        assert_eq!(err.to_string(), "Encoding failure: nested object for key 'x'");
    }

    #[test]
    fn test_trading_disabled_display() {
        let err = ExchangeError::TradingDisabled("place_order");
        assert_eq!(
            err.to_string(),
            "Trading disabled: place_order requires enable_trading = true"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ExchangeError::Api {
            status: 401,
            payload: serde_json::json!({"error": {"name": "invalid_query_payload"}}),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Upbit API error 401"), "Got: {}", msg);
        assert!(msg.contains("invalid_query_payload"), "Got: {}", msg);
    }

    #[test]
    fn test_network_timeout_display() {
        let err = ExchangeError::NetworkTimeout(30000);
        assert_eq!(err.to_string(), "Network timeout after 30000ms");
    }

    #[test]
    fn test_pre_flight_classification() {
        assert!(ExchangeError::MissingCredentials.is_pre_flight());
        assert!(ExchangeError::EncodingFailure("x".into()).is_pre_flight());
        assert!(ExchangeError::TradingDisabled("withdraw").is_pre_flight());
        assert!(!ExchangeError::ConnectionFailed("refused".into()).is_pre_flight());
        assert!(!ExchangeError::Api { status: 500, payload: serde_json::Value::Null }.is_pre_flight());
    }
}
