//! Handler for the `check-config` command.

use std::path::Path;

use super::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::infrastructure::config::settings::Config;

/// Validate configuration and rule source, then print a summary.
pub fn execute(config: &Config, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => output::section(&format!("Configuration: {}", path.display())),
        None => output::section("Configuration: built-in defaults"),
    }

    let services = Services::from_config(config)?;
    let rules = services.rules.latest()?;

    let rule_source = config
        .rules
        .path
        .as_ref()
        .map_or_else(|| "builtin".to_string(), |p| p.display().to_string());
    output::key_value("Rule source", rule_source);
    output::key_value("Rule set version", rules.version());
    output::key_value("Rules", rules.len());
    output::key_value("Base prices", services.prices.len());
    output::key_value("Category ceiling", config.pricing.limits.category_ceiling);
    output::key_value("Share scale", config.collaboration.share_scale);
    output::key_value("Max APR", config.staking.max_apr);
    output::key_value(
        "Lock days",
        format!("{}-{}", config.staking.min_lock_days, config.staking.max_lock_days),
    );
    println!();
    output::ok("Configuration is valid");
    Ok(())
}
