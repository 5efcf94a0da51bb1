//! Configuration for survey settlement

use crate::calculator::{FeePolicy, SettlementCalculator};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Settlement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Fee configuration
    pub fee: FeeConfig,

    /// Cancellation configuration
    pub cancellation: CancellationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "survey-settlement".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            fee: FeeConfig::default(),
            cancellation: CancellationConfig::default(),
        }
    }
}

/// Fee configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Platform fee rate on refunded rewards (0.0 - 1.0)
    /// Also inflates per-response cost when deriving capacity
    pub fee_rate: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            fee_rate: FeePolicy::default().fee_rate(),
        }
    }
}

impl FeeConfig {
    /// Build the fee policy
    pub fn policy(&self) -> crate::Result<FeePolicy> {
        FeePolicy::new(self.fee_rate)
    }
}

/// Cancellation request configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationConfig {
    /// Reject requests without a reason
    pub require_reason: bool,
}

impl Default for CancellationConfig {
    fn default() -> Self {
        Self {
            require_reason: true,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(name) = std::env::var("SETTLEMENT_SERVICE_NAME") {
            config.service_name = name;
        }

        if let Ok(rate) = std::env::var("SETTLEMENT_FEE_RATE") {
            config.fee.fee_rate = Decimal::from_str(rate.trim()).map_err(|e| {
                crate::Error::Config(format!("Invalid SETTLEMENT_FEE_RATE {:?}: {}", rate, e))
            })?;
        }

        if let Ok(flag) = std::env::var("SETTLEMENT_REQUIRE_REASON") {
            config.cancellation.require_reason = flag.trim().parse().map_err(|_| {
                crate::Error::Config(format!("Invalid SETTLEMENT_REQUIRE_REASON {:?}", flag))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> crate::Result<()> {
        self.fee.policy().map(|_| ())
    }

    /// Build a calculator for the configured fee policy
    pub fn calculator(&self) -> crate::Result<SettlementCalculator> {
        Ok(SettlementCalculator::new(self.fee.policy()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "survey-settlement");
        assert_eq!(config.fee.fee_rate, Decimal::new(1, 1));
        assert!(config.cancellation.require_reason);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.fee.fee_rate = Decimal::new(15, 2);

        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
service_name = "admin-dashboard"
service_version = "1.2.0"

[fee]
fee_rate = "0.2"

[cancellation]
require_reason = false
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.service_name, "admin-dashboard");
        assert_eq!(config.fee.fee_rate, Decimal::new(2, 1));
        assert!(!config.cancellation.require_reason);
        assert_eq!(
            config.calculator().unwrap().policy().capacity_markup(),
            Decimal::new(12, 1)
        );
    }

    #[test]
    fn test_from_file_rejects_bad_rate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
service_name = "admin-dashboard"
service_version = "1.2.0"

[fee]
fee_rate = "1.5"

[cancellation]
require_reason = true
"#
        )
        .unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_config_from_env() {
        const VARS: [&str; 3] = [
            "SETTLEMENT_SERVICE_NAME",
            "SETTLEMENT_FEE_RATE",
            "SETTLEMENT_REQUIRE_REASON",
        ];
        let clear = || VARS.iter().for_each(|v| std::env::remove_var(v));

        clear();
        assert_eq!(Config::from_env().unwrap(), Config::default());

        std::env::set_var("SETTLEMENT_SERVICE_NAME", "admin-dashboard");
        std::env::set_var("SETTLEMENT_FEE_RATE", " 0.15 ");
        std::env::set_var("SETTLEMENT_REQUIRE_REASON", "false");
        let config = Config::from_env().unwrap();
        assert_eq!(config.service_name, "admin-dashboard");
        assert_eq!(config.fee.fee_rate, Decimal::new(15, 2));
        assert!(!config.cancellation.require_reason);

        std::env::set_var("SETTLEMENT_FEE_RATE", "1.5");
        assert!(matches!(Config::from_env(), Err(crate::Error::Config(_))));

        std::env::set_var("SETTLEMENT_FEE_RATE", "abc");
        assert!(matches!(Config::from_env(), Err(crate::Error::Config(_))));

        std::env::set_var("SETTLEMENT_FEE_RATE", "0.1");
        std::env::set_var("SETTLEMENT_REQUIRE_REASON", "maybe");
        assert!(matches!(Config::from_env(), Err(crate::Error::Config(_))));

        clear();
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/settlement.toml").unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
