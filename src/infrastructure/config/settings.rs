//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. Every
//! section is optional; missing sections take their defaults.
//!
//! # Example
//!
//! ```no_run
//! use assetflow::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("assetflow.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;

use super::logging::LoggingConfig;
use crate::application::{AllocationPolicy, PricingLimits, StakingPolicy};
use crate::error::{ConfigError, Result};
use crate::infrastructure::price_table::{
    default_base_prices, BasePriceEntry, BasePriceTable, DEFAULT_FALLBACK_PRICE,
};
use crate::infrastructure::rules::{BuiltinRuleSource, TomlRuleSource};
use crate::port::outbound::RuleSource;

/// Where rules come from and how many versions stay addressable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// TOML rule file. The builtin rules are used when absent.
    pub path: Option<PathBuf>,
    pub retain_versions: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: None,
            retain_versions: 4,
        }
    }
}

impl RulesConfig {
    /// Rule source for this configuration.
    #[must_use]
    pub fn source(&self) -> Box<dyn RuleSource> {
        match &self.path {
            Some(path) => Box::new(TomlRuleSource::new(path.clone())),
            None => Box::new(BuiltinRuleSource),
        }
    }
}

/// Pricing limits plus the base-price table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    #[serde(flatten)]
    pub limits: PricingLimits,
    pub base_prices: Vec<BasePriceEntry>,
    pub fallback_base_price: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            limits: PricingLimits::default(),
            base_prices: default_base_prices(),
            fallback_base_price: DEFAULT_FALLBACK_PRICE,
        }
    }
}

impl PricingConfig {
    pub fn price_table(&self) -> Result<BasePriceTable> {
        BasePriceTable::new(self.base_prices.iter().cloned(), self.fallback_base_price)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging and tracing configuration.
    pub logging: LoggingConfig,
    pub rules: RulesConfig,
    pub pricing: PricingConfig,
    /// Ownership allocation and royalty payout coefficients.
    pub collaboration: AllocationPolicy,
    /// Staking bounds, APR cap and early-exit penalty.
    pub staking: StakingPolicy,
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check that values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        self.logging.validate()?;

        if self.rules.retain_versions == 0 {
            return Err(invalid("rules.retain_versions", "must be at least 1"));
        }

        let limits = &self.pricing.limits;
        if limits.category_ceiling <= Decimal::ONE {
            return Err(invalid("pricing.category_ceiling", "must be greater than 1"));
        }
        if limits.max_product < limits.category_ceiling {
            return Err(invalid("pricing.max_product", "must be >= category_ceiling"));
        }
        if limits.confidence_penalty < Decimal::ZERO || limits.confidence_penalty > Decimal::ONE {
            return Err(invalid("pricing.confidence_penalty", "must be between 0 and 1"));
        }
        if limits.confidence_floor < Decimal::ZERO || limits.confidence_floor > Decimal::ONE {
            return Err(invalid("pricing.confidence_floor", "must be between 0 and 1"));
        }
        if self.pricing.fallback_base_price <= Decimal::ZERO {
            return Err(invalid("pricing.fallback_base_price", "must be greater than 0"));
        }
        if self.pricing.base_prices.iter().any(|e| e.price <= Decimal::ZERO) {
            return Err(invalid("pricing.base_prices", "every price must be greater than 0"));
        }

        let collab = &self.collaboration;
        if collab.share_scale == 0 || collab.share_scale > 18 {
            return Err(invalid("collaboration.share_scale", "must be between 1 and 18"));
        }
        if collab.payout_scale > 18 {
            return Err(invalid("collaboration.payout_scale", "must be at most 18"));
        }
        if collab.reputation_floor < Decimal::ZERO || collab.reputation_span < Decimal::ZERO {
            return Err(invalid(
                "collaboration.reputation_floor",
                "reputation floor and span must be 0 or greater",
            ));
        }

        let staking = &self.staking;
        if staking.min_principal <= Decimal::ZERO {
            return Err(invalid("staking.min_principal", "must be greater than 0"));
        }
        if staking.max_principal < staking.min_principal {
            return Err(invalid("staking.max_principal", "must be >= min_principal"));
        }
        if staking.min_lock_days > staking.max_lock_days {
            return Err(invalid("staking.min_lock_days", "must be <= max_lock_days"));
        }
        if staking.early_exit_multiplier < Decimal::ZERO
            || staking.early_exit_multiplier > Decimal::ONE
        {
            return Err(invalid("staking.early_exit_multiplier", "must be between 0 and 1"));
        }
        if staking.max_apr <= Decimal::ZERO {
            return Err(invalid("staking.max_apr", "must be greater than 0"));
        }
        if staking.reward_scale > 28 {
            return Err(invalid("staking.reward_scale", "must be at most 28"));
        }
        if staking.seconds_per_year == 0 {
            return Err(invalid("staking.seconds_per_year", "must be greater than 0"));
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.staking.max_apr, dec!(0.5));
        assert_eq!(config.pricing.limits.category_ceiling, dec!(5));
        assert!(config.rules.path.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse_toml(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [pricing]
            category_ceiling = 3
            confidence_penalty = "0.2"
            fallback_base_price = "2"

            [[pricing.base_prices]]
            asset_type = "digital"
            region = "Pune"
            price = "4.5"

            [staking]
            max_apr = "0.3"
            early_exit_multiplier = "0.8"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.format, "json");
        assert_eq!(config.pricing.limits.category_ceiling, dec!(3));
        assert_eq!(config.pricing.limits.confidence_penalty, dec!(0.2));
        assert_eq!(config.pricing.limits.max_product, dec!(100));
        assert_eq!(config.pricing.base_prices.len(), 1);
        assert_eq!(config.pricing.base_prices[0].region.as_str(), "pune");
        assert_eq!(config.staking.max_apr, dec!(0.3));
        assert_eq!(config.staking.min_principal, dec!(0.1));
    }

    #[test]
    fn rejects_out_of_range_values() {
        for (toml, field) in [
            ("[pricing]\ncategory_ceiling = 1", "pricing.category_ceiling"),
            ("[staking]\nearly_exit_multiplier = \"1.5\"", "staking.early_exit_multiplier"),
            ("[staking]\nmin_lock_days = 10\nmax_lock_days = 5", "staking.min_lock_days"),
            ("[collaboration]\nshare_scale = 0", "collaboration.share_scale"),
            ("[rules]\nretain_versions = 0", "rules.retain_versions"),
            ("[logging]\nformat = \"xml\"", "logging.format"),
        ] {
            match Config::parse_toml(toml) {
                Err(Error::Config(ConfigError::InvalidValue { field: f, .. })) => {
                    assert_eq!(f, field);
                }
                other => panic!("expected InvalidValue for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Config::parse_toml("[staking"),
            Err(Error::Config(ConfigError::Parse(_)))
        ));
    }
}
