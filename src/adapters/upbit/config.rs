//! Upbit Configuration
//!
//! Connection settings for the Upbit Open API including environment loading.
//! Credentials are never read from YAML; they come from explicit values or
//! the `UPBIT_ACCESS_KEY` / `UPBIT_SECRET_KEY` environment variables.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::logging::SanitizedValue;
use crate::error::AppError;

use super::signing::{ACCESS_KEY_ENV, SECRET_KEY_ENV};

// =============================================================================
// Constants
// =============================================================================

/// Default REST endpoint (regional hosts such as sg-api.upbit.com also work)
pub const DEFAULT_BASE_URL: &str = "https://api.upbit.com";

/// Default WebSocket endpoint; the private stream lives under `/private`
pub const DEFAULT_WS_URL: &str = "wss://api.upbit.com/websocket/v1";

/// Default HTTP request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("upbit_client/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Upbit client
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpbitConfig {
    /// Explicit access key; falls back to `UPBIT_ACCESS_KEY` when absent
    #[serde(skip)]
    pub access_key: Option<String>,
    /// Explicit secret key; falls back to `UPBIT_SECRET_KEY` when absent
    #[serde(skip)]
    pub secret_key: Option<String>,
    /// REST base URL
    pub base_url: String,
    /// WebSocket base URL
    pub ws_url: String,
    /// Arms order placement, cancellation and withdrawals
    pub enable_trading: bool,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every REST request
    pub user_agent: String,
}

impl Default for UpbitConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            enable_trading: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl UpbitConfig {
    /// Create configuration from environment variables over the defaults
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Override fields with any `UPBIT_*` environment variables that are set
    pub fn merge_env(mut self) -> Self {
        fn non_empty(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.is_empty())
        }

        if let Some(v) = non_empty(ACCESS_KEY_ENV) {
            self.access_key = Some(v);
        }
        if let Some(v) = non_empty(SECRET_KEY_ENV) {
            self.secret_key = Some(v);
        }
        if let Some(v) = non_empty("UPBIT_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = non_empty("UPBIT_WS_URL") {
            self.ws_url = v;
        }
        if let Some(v) = non_empty("UPBIT_ENABLE_TRADING") {
            self.enable_trading = v == "true" || v == "1";
        }
        if let Some(v) = non_empty("UPBIT_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %v, "Ignoring unparsable UPBIT_TIMEOUT_SECS"),
            }
        }
        self
    }

    /// Set explicit credentials
    pub fn with_credentials(mut self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Arm or disarm the trading guard
    pub fn with_trading(mut self, enabled: bool) -> Self {
        self.enable_trading = enabled;
        self
    }

    /// Point REST calls at another host (e.g. a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// REST base URL without trailing slash
    pub fn rest_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Public WebSocket URL
    pub fn ws_public_url(&self) -> String {
        self.ws_url.trim_end_matches('/').to_string()
    }

    /// Private (myOrder / myAsset) WebSocket URL
    pub fn ws_private_url(&self) -> String {
        format!("{}/private", self.ws_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        let base = self.rest_base_url();
        if base.is_empty() {
            return Err(AppError::Config("upbit.base_url cannot be empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "upbit.base_url must be an http(s) URL (got {})",
                base
            )));
        }
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(AppError::Config(format!(
                "upbit.ws_url must be a ws(s) URL (got {})",
                self.ws_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("upbit.timeout_secs must be > 0".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::Config("upbit.user_agent cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for UpbitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = self
            .access_key
            .as_deref()
            .map(|k| SanitizedValue::new(k).to_string());
        f.debug_struct("UpbitConfig")
            .field("access_key", &access)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "REDACTED"))
            .field("base_url", &self.base_url)
            .field("ws_url", &self.ws_url)
            .field("enable_trading", &self.enable_trading)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
