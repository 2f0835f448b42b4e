//! Configuration types loaded from YAML

use serde::{Deserialize, Serialize};

use crate::adapters::upbit::UpbitConfig;
use crate::error::AppError;

/// Root configuration document
///
/// ```yaml
/// upbit:
///   base_url: https://api.upbit.com
///   enable_trading: false
///   timeout_secs: 10
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub upbit: UpbitConfig,
}

impl AppConfig {
    /// Apply `UPBIT_*` environment overrides (including credentials)
    pub fn merge_env(mut self) -> Self {
        self.upbit = self.upbit.merge_env();
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.upbit.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.upbit.enable_trading);
    }

    #[test]
    fn test_app_config_propagates_upbit_errors() {
        let mut config = AppConfig::default();
        config.upbit.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
