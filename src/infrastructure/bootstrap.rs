//! Composition root: builds the services from configuration.

use std::sync::Arc;

use tracing::info;

use super::clock::SystemClock;
use super::config::settings::Config;
use super::price_table::BasePriceTable;
use crate::application::{CollaborationOptimizer, PricingEngine, RuleEngine, StakingLedger};
use crate::error::Result;
use crate::port::outbound::Clock;

/// Fully wired services sharing one rule engine.
pub struct Services {
    pub rules: Arc<RuleEngine>,
    pub pricing: PricingEngine,
    pub prices: BasePriceTable,
    pub collaboration: CollaborationOptimizer,
    pub staking: Arc<StakingLedger>,
}

impl Services {
    /// Wire services using the system clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Wire services with an explicit clock and load the initial rule set.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let rules = Arc::new(RuleEngine::new(config.rules.retain_versions));
        let source = config.rules.source();
        rules.refresh(source.as_ref())?;
        info!(
            source = source.name(),
            version = rules.latest_version(),
            "Rules loaded"
        );

        Ok(Self {
            pricing: PricingEngine::new(Arc::clone(&rules), config.pricing.limits.clone()),
            prices: config.pricing.price_table()?,
            collaboration: CollaborationOptimizer::new(config.collaboration.clone()),
            staking: Arc::new(StakingLedger::new(
                Arc::clone(&rules),
                config.staking.clone(),
                clock,
            )),
            rules,
        })
    }
}
