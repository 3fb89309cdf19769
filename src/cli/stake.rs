//! Handler for the `stake-preview` command.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{output, StakePreviewArgs};
use crate::domain::{AprTier, AssetType};
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::infrastructure::config::settings::Config;

#[derive(Serialize)]
struct StakePreview {
    asset_type: AssetType,
    principal: Decimal,
    lock_days: u32,
    apr: AprTier,
    projected_reward: Decimal,
}

/// Resolve the APR for a prospective stake and print the projection.
pub fn execute_preview(config: &Config, args: &StakePreviewArgs) -> Result<()> {
    let services = Services::from_config(config)?;
    let (apr, projected_reward) =
        services
            .staking
            .preview(args.asset_type, args.principal, args.lock_days)?;

    output::json(&StakePreview {
        asset_type: args.asset_type,
        principal: args.principal,
        lock_days: args.lock_days,
        apr,
        projected_reward,
    })
}
