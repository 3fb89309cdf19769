//! Builders for domain primitives used across tests.
//!
//! Keeps rule and input construction out of test bodies so tests focus on
//! assertions.

use rust_decimal::Decimal;

use crate::domain::{
    AssetId, AssetType, Creator, Effect, OwnerId, PriceFacts, Predicate, Rule, RuleSet,
    StakeRequest,
};

/// Creator with the given skill weight and reputation.
pub fn creator(id: &str, skill_weight: Decimal, reputation: Decimal) -> Creator {
    Creator::new(id, skill_weight, reputation)
}

/// Price facts without utility features.
pub fn price_facts(
    asset_type: AssetType,
    region: &str,
    reputation: Decimal,
    demand: Decimal,
) -> PriceFacts {
    PriceFacts::new(asset_type, region, reputation, demand)
}

/// Unconditional multiplier rule.
pub fn always_multiplier(id: &str, name: &str, factor: Decimal) -> Rule {
    Rule::new(id, name, Predicate::Always, Effect::Multiplier(factor))
}

/// Unconditional rate rule.
pub fn always_rate(id: &str, name: &str, rate: Decimal) -> Rule {
    Rule::new(id, name, Predicate::Always, Effect::Rate(rate))
}

/// Multiplier rule matching one text value.
pub fn text_multiplier(id: &str, name: &str, field: &str, value: &str, factor: Decimal) -> Rule {
    Rule::new(
        id,
        name,
        Predicate::Equals {
            field: field.into(),
            value: value.into(),
        },
        Effect::Multiplier(factor),
    )
}

/// Rule set that must be valid.
///
/// # Panics
///
/// Panics on duplicate ids or rule versions ahead of `version`.
pub fn rule_set(version: u64, rules: Vec<Rule>) -> RuleSet {
    match RuleSet::new(version, rules) {
        Ok(set) => set,
        Err(e) => panic!("invalid test rule set: {e}"),
    }
}

/// Stake request for an `nft` asset.
pub fn stake_request(owner: &str, principal: Decimal, lock_days: u32) -> StakeRequest {
    StakeRequest {
        owner: OwnerId::new(owner),
        asset: AssetId::new(format!("{owner}-asset")),
        asset_type: AssetType::Nft,
        principal,
        lock_days,
    }
}
