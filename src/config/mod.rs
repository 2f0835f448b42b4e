//! Configuration: YAML loading, validation and logging setup
//!
//! - `AppConfig` wraps the Upbit client settings
//! - `load_config` / `load_config_from_str` parse and validate YAML
//! - `logging` installs the tracing subscriber and redaction helpers

mod loader;
pub mod logging;
mod types;

pub use types::AppConfig;

pub use loader::{load_config, load_config_from_str};
