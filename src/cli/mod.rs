//! Command-line interface definitions.

pub mod check;
pub mod estimate;
pub mod output;
pub mod split;
pub mod stake;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::domain::{AssetType, Creator};
use crate::infrastructure::config::settings::Config;

/// Assetflow - rule-driven pricing, ownership splits and staking rewards.
#[derive(Parser, Debug)]
#[command(name = "assetflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate the price of an asset
    Estimate(EstimateArgs),

    /// Propose an ownership split between creators
    Split(SplitArgs),

    /// Preview the APR and projected reward of a stake
    StakePreview(StakePreviewArgs),

    /// Validate the configuration and rule source
    CheckConfig,
}

/// Arguments for the `estimate` subcommand.
#[derive(Parser, Debug)]
pub struct EstimateArgs {
    /// Asset type (nft, phygital, digital, real_world_asset)
    #[arg(long)]
    pub asset_type: AssetType,

    /// Market region
    #[arg(long)]
    pub region: String,

    /// Creator reputation (0-100)
    #[arg(long)]
    pub reputation: Decimal,

    /// Demand level (0-1)
    #[arg(long)]
    pub demand: Decimal,

    /// Utility feature; repeat for several
    #[arg(long = "feature")]
    pub features: Vec<String>,
}

/// Arguments for the `split` subcommand.
#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// Creator as `id:skill_weight:reputation`; repeat for each creator
    #[arg(long = "creator", required = true, value_parser = parse_creator)]
    pub creators: Vec<Creator>,

    /// Revenue to distribute by the resulting shares
    #[arg(long, requires = "royalty_rate")]
    pub revenue: Option<Decimal>,

    /// Royalty rate applied to the revenue (0-1)
    #[arg(long, requires = "revenue")]
    pub royalty_rate: Option<Decimal>,
}

/// Arguments for the `stake-preview` subcommand.
#[derive(Parser, Debug)]
pub struct StakePreviewArgs {
    /// Asset type (nft, phygital, digital, real_world_asset)
    #[arg(long)]
    pub asset_type: AssetType,

    /// Principal to stake
    #[arg(long)]
    pub principal: Decimal,

    /// Lock period in days
    #[arg(long)]
    pub lock_days: u32,
}

fn parse_creator(s: &str) -> Result<Creator, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [id, skill, reputation] = parts.as_slice() else {
        return Err(format!("expected id:skill_weight:reputation, got '{s}'"));
    };
    if id.is_empty() {
        return Err("creator id must not be empty".to_string());
    }
    let skill: Decimal = skill
        .parse()
        .map_err(|e| format!("invalid skill weight '{skill}': {e}"))?;
    let reputation: Decimal = reputation
        .parse()
        .map_err(|e| format!("invalid reputation '{reputation}': {e}"))?;
    Ok(Creator::new(*id, skill, reputation))
}

/// Load configuration, install logging and run the selected command.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(cli.config.as_ref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.format = "json".to_string();
    }
    config.validate()?;
    config.init_logging();

    match &cli.command {
        Commands::Estimate(args) => estimate::execute(&config, args)?,
        Commands::Split(args) => split::execute(&config, args)?,
        Commands::StakePreview(args) => stake::execute_preview(&config, args)?,
        Commands::CheckConfig => check::execute(&config, cli.config.as_deref())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_creator_triples() {
        let creator = parse_creator("alice:2.5:80").unwrap();
        assert_eq!(creator.id.as_str(), "alice");
        assert_eq!(creator.skill_weight, dec!(2.5));
        assert_eq!(creator.reputation, dec!(80));

        assert!(parse_creator("alice:2.5").is_err());
        assert!(parse_creator(":1:1").is_err());
        assert!(parse_creator("alice:x:1").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
