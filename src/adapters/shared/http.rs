//! Shared HTTP client builder

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::upbit::UpbitConfig;

/// Connection timeout (milliseconds)
const HTTP_CONNECT_TIMEOUT_MS: u64 = 5000;
/// Max idle connections per host in the pool
const HTTP_POOL_MAX_IDLE: usize = 8;
/// How long idle connections stay pooled (seconds)
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 60;
/// TCP keepalive interval (seconds)
const HTTP_TCP_KEEPALIVE_SECS: u64 = 30;

/// Build the REST client: request timeout and User-Agent from `config`,
/// `Accept: application/json` on every request.
pub fn create_http_client(config: &UpbitConfig) -> ExchangeResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let user_agent = HeaderValue::from_str(&config.user_agent)
        .map_err(|e| ExchangeError::InvalidParameters(format!("Invalid user agent: {}", e)))?;
    headers.insert(USER_AGENT, user_agent);

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .tcp_keepalive(Duration::from_secs(HTTP_TCP_KEEPALIVE_SECS))
        .build()
        .map_err(|e| ExchangeError::ConnectionFailed(format!("HTTP client build failed: {}", e)))?;

    tracing::debug!(
        phase = "init",
        base_url = %config.rest_base_url(),
        timeout_s = config.timeout_secs,
        connect_timeout_ms = HTTP_CONNECT_TIMEOUT_MS,
        "HTTP client configured"
    );
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_http_client_default_config() {
        assert!(create_http_client(&UpbitConfig::default()).is_ok());
    }

    #[test]
    fn test_create_http_client_rejects_bad_user_agent() {
        let config = UpbitConfig {
            user_agent: "bad\nagent".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_http_client(&config),
            Err(ExchangeError::InvalidParameters(_))
        ));
    }
}
