//! Handler for the `split` command.

use serde::Serialize;

use super::{output, SplitArgs};
use crate::application::CollaborationOptimizer;
use crate::domain::{OwnershipProposal, RevenueDistribution};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

#[derive(Serialize)]
struct SplitReport {
    shares: OwnershipProposal,
    #[serde(skip_serializing_if = "Option::is_none")]
    distribution: Option<RevenueDistribution>,
}

/// Allocate shares (and optionally distribute revenue) and print as JSON.
pub fn execute(config: &Config, args: &SplitArgs) -> Result<()> {
    let optimizer = CollaborationOptimizer::new(config.collaboration.clone());
    let shares = optimizer.allocate(&args.creators)?;

    let distribution = match (args.revenue, args.royalty_rate) {
        (Some(revenue), Some(rate)) => Some(optimizer.distribute(&shares, revenue, rate)?),
        _ => None,
    };

    output::json(&SplitReport {
        shares,
        distribution,
    })
}
