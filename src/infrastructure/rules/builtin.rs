//! Default knowledge base compiled into the binary.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::application::{APR_BASE_RULE, APR_MULTIPLIER_RULE};
use crate::domain::{fields, AssetType, Effect, PriceCategory, Predicate, Rule, RuleSet};
use crate::error::Result;
use crate::port::outbound::RuleSource;

/// Version carried by the builtin rule set.
pub const BUILTIN_VERSION: u64 = 1;

/// Rule source serving [`builtin_rule_set`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRuleSource;

impl RuleSource for BuiltinRuleSource {
    fn name(&self) -> &str {
        "builtin"
    }

    fn fetch(&self) -> Result<RuleSet> {
        builtin_rule_set()
    }
}

/// Pricing multipliers and staking APR rules.
pub fn builtin_rule_set() -> Result<RuleSet> {
    let mut rules = Vec::new();
    rules.extend(type_rules());
    rules.extend(region_rules());
    rules.extend(reputation_rules());
    rules.extend(demand_rules());
    rules.extend(utility_rules());
    rules.extend(staking_rules());
    Ok(RuleSet::new(BUILTIN_VERSION, rules)?)
}

fn multiplier(id: &str, category: PriceCategory, predicate: Predicate, factor: Decimal) -> Rule {
    Rule::new(id, category.rule_name(), predicate, Effect::Multiplier(factor))
}

fn text_is(field: &str, value: &str) -> Predicate {
    Predicate::Equals {
        field: field.into(),
        value: value.into(),
    }
}

fn above(field: &str, value: Decimal) -> Predicate {
    Predicate::Above {
        field: field.into(),
        value,
    }
}

fn at_least(field: &str, value: Decimal) -> Predicate {
    Predicate::AtLeast {
        field: field.into(),
        value,
    }
}

fn below(field: &str, value: Decimal) -> Predicate {
    Predicate::Below {
        field: field.into(),
        value,
    }
}

/// `low < field <= high`
fn above_up_to(field: &str, low: Decimal, high: Decimal) -> Predicate {
    Predicate::All {
        of: vec![
            above(field, low),
            Predicate::Not {
                predicate: Box::new(above(field, high)),
            },
        ],
    }
}

fn type_rules() -> Vec<Rule> {
    [
        (AssetType::Nft, dec!(1.0)),
        (AssetType::Digital, dec!(0.9)),
        (AssetType::Phygital, dec!(1.2)),
        (AssetType::RealWorldAsset, dec!(1.5)),
    ]
    .into_iter()
    .map(|(asset_type, factor)| {
        multiplier(
            &format!("type.{asset_type}"),
            PriceCategory::TypeMultiplier,
            text_is(fields::ASSET_TYPE, asset_type.as_str()),
            factor,
        )
    })
    .collect()
}

fn region_rules() -> Vec<Rule> {
    [
        ("mumbai", dec!(1.2)),
        ("delhi", dec!(1.1)),
        ("bangalore", dec!(1.3)),
        ("global", dec!(1.0)),
    ]
    .into_iter()
    .map(|(region, factor)| {
        multiplier(
            &format!("region.{region}"),
            PriceCategory::RegionMultiplier,
            text_is(fields::REGION, region),
            factor,
        )
    })
    .collect()
}

fn reputation_rules() -> Vec<Rule> {
    let field = fields::CREATOR_REPUTATION;
    let category = PriceCategory::ReputationMultiplier;
    vec![
        multiplier("reputation.elite", category, above(field, dec!(80)), dec!(1.3)),
        multiplier(
            "reputation.established",
            category,
            above_up_to(field, dec!(60), dec!(80)),
            dec!(1.1),
        ),
        multiplier(
            "reputation.rising",
            category,
            above_up_to(field, dec!(40), dec!(60)),
            dec!(1.0),
        ),
        multiplier(
            "reputation.new",
            category,
            Predicate::Not {
                predicate: Box::new(above(field, dec!(40))),
            },
            dec!(0.8),
        ),
    ]
}

fn demand_rules() -> Vec<Rule> {
    let field = fields::DEMAND_LEVEL;
    let category = PriceCategory::DemandMultiplier;
    vec![
        multiplier("demand.high", category, at_least(field, dec!(0.7)), dec!(1.3)),
        multiplier(
            "demand.medium",
            category,
            Predicate::All {
                of: vec![at_least(field, dec!(0.3)), below(field, dec!(0.7))],
            },
            dec!(1.0),
        ),
        multiplier("demand.low", category, below(field, dec!(0.3)), dec!(0.7)),
    ]
}

fn utility_rules() -> Vec<Rule> {
    [
        ("streaming_rights", dec!(1.2)),
        ("revenue_share", dec!(1.5)),
        ("exclusive_access", dec!(1.3)),
        ("commercial_license", dec!(1.4)),
    ]
    .into_iter()
    .map(|(feature, factor)| {
        multiplier(
            &format!("utility.{feature}"),
            PriceCategory::UtilityBonus,
            Predicate::HasFlag {
                field: fields::UTILITY_FEATURES.into(),
                flag: feature.into(),
            },
            factor,
        )
    })
    .collect()
}

fn staking_rules() -> Vec<Rule> {
    let lock = fields::LOCK_DAYS;
    let mut rules = vec![
        Rule::new("apr.base", APR_BASE_RULE, Predicate::Always, Effect::Rate(dec!(0.12))),
        Rule::new(
            "apr.lock.quarter",
            APR_MULTIPLIER_RULE,
            Predicate::All {
                of: vec![at_least(lock, dec!(90)), below(lock, dec!(365))],
            },
            Effect::Multiplier(dec!(1.5)),
        ),
        Rule::new(
            "apr.lock.year",
            APR_MULTIPLIER_RULE,
            at_least(lock, dec!(365)),
            Effect::Multiplier(dec!(2.1)),
        ),
    ];

    rules.extend(
        [
            (AssetType::Digital, dec!(1.1)),
            (AssetType::Phygital, dec!(1.3)),
            (AssetType::RealWorldAsset, dec!(1.8)),
        ]
        .into_iter()
        .map(|(asset_type, factor)| {
            Rule::new(
                format!("apr.risk.{asset_type}"),
                APR_MULTIPLIER_RULE,
                text_is(fields::ASSET_TYPE, asset_type.as_str()),
                Effect::Multiplier(factor),
            )
        }),
    );
    rules
}
