//! Handler for the `estimate` command.

use tracing::debug;

use super::{output, EstimateArgs};
use crate::domain::PriceFacts;
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::infrastructure::config::settings::Config;

/// Estimate a price and print the estimate as JSON.
pub fn execute(config: &Config, args: &EstimateArgs) -> Result<()> {
    let services = Services::from_config(config)?;

    let facts = args.features.iter().fold(
        PriceFacts::new(args.asset_type, args.region.as_str(), args.reputation, args.demand),
        |facts, feature| facts.with_feature(feature.trim()),
    );
    debug!(facts = ?facts, "Estimating price");

    let estimate = services.pricing.estimate(&facts, &services.prices)?;
    output::json(&estimate)
}
