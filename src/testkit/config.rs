//! Canonical service wiring for tests.
//!
//! Single source of truth for engines built over the builtin knowledge base,
//! so individual tests don't assemble slightly different stacks.

use std::sync::Arc;

use crate::application::{
    AllocationPolicy, CollaborationOptimizer, PricingEngine, PricingLimits, RuleEngine,
    StakingLedger, StakingPolicy,
};
use crate::domain::RuleSet;
use crate::infrastructure::rules::builtin_rule_set;

use super::clock::ManualClock;

/// Rule engine preloaded with `set`.
pub fn rule_engine(set: RuleSet) -> Arc<RuleEngine> {
    Arc::new(RuleEngine::with_rule_set(set, 4))
}

/// Rule engine preloaded with the builtin rules.
///
/// # Panics
///
/// Panics if the builtin rule set is invalid.
pub fn builtin_rules() -> Arc<RuleEngine> {
    match builtin_rule_set() {
        Ok(set) => rule_engine(set),
        Err(e) => panic!("builtin rules invalid: {e}"),
    }
}

/// Pricing engine with default limits.
pub fn pricing(rules: Arc<RuleEngine>) -> PricingEngine {
    PricingEngine::new(rules, PricingLimits::default())
}

/// Optimizer with default policy.
pub fn optimizer() -> CollaborationOptimizer {
    CollaborationOptimizer::new(AllocationPolicy::default())
}

/// Ledger with default policy and a manual clock.
pub fn ledger(rules: Arc<RuleEngine>) -> (StakingLedger, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let ledger = StakingLedger::new(rules, StakingPolicy::default(), clock.clone());
    (ledger, clock)
}
