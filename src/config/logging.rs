//! Logging setup for upbit_client
//!
//! Structured `tracing` output, JSON by default and human-readable when
//! `LOG_FORMAT=pretty`, plus helpers that keep keys and tokens out of logs.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | `upbit_client=info` | Level filter |
//! | `LOG_FORMAT` | `json` | `json` or `pretty` |
//!
//! ```rust,ignore
//! use upbit_client::config::logging::{init_logging, sanitize};
//!
//! init_logging();
//! tracing::info!(access_key = %sanitize(&key), "Client ready");
//! // access_key = "abcd...REDACTED"
//! ```

use std::env;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt as ts_fmt, prelude::*, EnvFilter};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_LEVEL: &str = "upbit_client=info";

/// Number of leading characters a long secret keeps when displayed
const VISIBLE_PREFIX: usize = 4;

/// Display wrapper that redacts a secret.
///
/// Values longer than 8 characters keep their first four characters
/// (`abcd...REDACTED`), shorter values are replaced entirely.
#[derive(Clone, Copy)]
pub struct SanitizedValue<'a>(&'a str);

impl<'a> SanitizedValue<'a> {
    pub fn new(value: &'a str) -> Self {
        Self(value)
    }
}

impl fmt::Display for SanitizedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.chars().count() > 8 {
            let prefix: String = self.0.chars().take(VISIBLE_PREFIX).collect();
            write!(f, "{}...REDACTED", prefix)
        } else {
            f.write_str("REDACTED")
        }
    }
}

impl fmt::Debug for SanitizedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SanitizedValue(***)")
    }
}

/// Shorthand for [`SanitizedValue::new`]
pub fn sanitize(value: &str) -> SanitizedValue<'_> {
    SanitizedValue::new(value)
}

/// Logging output settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `upbit_client=debug`
    pub level_filter: String,
    pub use_pretty_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level_filter: DEFAULT_LOG_LEVEL.to_string(),
            use_pretty_format: false,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT`
    pub fn from_env() -> Self {
        let level_filter = env::var("RUST_LOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let use_pretty_format = env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("pretty"))
            .unwrap_or(false);

        Self {
            level_filter,
            use_pretty_format,
        }
    }
}

/// Install the global subscriber from environment settings.
///
/// Later calls are no-ops.
pub fn init_logging() {
    init_logging_with_config(LoggingConfig::from_env());
}

/// Install the global subscriber with explicit settings
pub fn init_logging_with_config(config: LoggingConfig) {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let env_filter = EnvFilter::try_new(&config.level_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    // try_init: a subscriber installed by the host application wins
    let result = if config.use_pretty_format {
        tracing_subscriber::registry()
            .with(ts_fmt::layer().pretty().with_target(true))
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(ts_fmt::layer().json().with_target(true).with_current_span(true))
            .with(env_filter)
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already set, keeping it");
    }
}
