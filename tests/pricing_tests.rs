//! Pricing integration tests over the builtin knowledge base.

mod support;

use assetflow::domain::{AssetType, PriceCategory, Region};
use assetflow::error::{Error, ValidationError};
use assetflow::infrastructure::cache::EstimateCache;
use assetflow::infrastructure::price_table::BasePriceTable;
use assetflow::testkit::config::{builtin_rules, pricing};
use assetflow::testkit::domain::{always_multiplier, price_facts, rule_set};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn baseline_nft_in_mumbai() {
    let engine = pricing(builtin_rules());
    let facts = price_facts(AssetType::Nft, "mumbai", dec!(50), dec!(0.5));

    let estimate = engine.estimate(&facts, &BasePriceTable::default()).unwrap();

    assert_eq!(estimate.base_price, dec!(2.0));
    assert_eq!(estimate.final_price, dec!(2.4));
    assert_eq!(estimate.skipped_categories, vec![PriceCategory::UtilityBonus]);
    assert_eq!(estimate.confidence, dec!(0.85));
}

#[test]
fn every_category_contributes() {
    let engine = pricing(builtin_rules());
    let facts = price_facts(AssetType::Phygital, "delhi", dec!(85), dec!(0.8))
        .with_feature("revenue_share")
        .with_feature("exclusive_access");

    let estimate = engine.estimate(&facts, &BasePriceTable::default()).unwrap();

    let ids: Vec<String> = estimate
        .applied_multipliers
        .iter()
        .map(|m| m.rule_id.to_string())
        .collect();
    assert_eq!(
        ids,
        [
            "type.phygital",
            "region.delhi",
            "reputation.elite",
            "demand.high",
            "utility.exclusive_access",
            "utility.revenue_share",
        ]
    );
    assert_eq!(estimate.base_price, dec!(3.2));
    assert_eq!(estimate.final_price, dec!(13.920192));
    assert_eq!(estimate.final_price, estimate.base_price * estimate.total_multiplier());
    assert_eq!(estimate.confidence, Decimal::ONE);
}

#[test]
fn unknown_region_uses_fallback_and_lowers_confidence() {
    let engine = pricing(builtin_rules());
    let facts = price_facts(AssetType::Nft, "Pune", dec!(20), dec!(0.1));

    let estimate = engine.estimate(&facts, &BasePriceTable::default()).unwrap();

    assert_eq!(estimate.base_price, dec!(1));
    // 1.0 type * 0.8 reputation * 0.7 demand
    assert_eq!(estimate.final_price, dec!(0.56));
    assert_eq!(
        estimate.skipped_categories,
        vec![PriceCategory::RegionMultiplier, PriceCategory::UtilityBonus]
    );
    assert_eq!(estimate.confidence, dec!(0.70));
}

#[test]
fn valid_facts_always_give_positive_price_and_bounded_confidence() {
    let engine = pricing(builtin_rules());
    let table = BasePriceTable::default();

    for asset_type in [
        AssetType::Nft,
        AssetType::Phygital,
        AssetType::Digital,
        AssetType::RealWorldAsset,
    ] {
        for region in ["mumbai", "delhi", "bangalore", "global", "nowhere"] {
            for reputation in [dec!(0), dec!(41), dec!(61), dec!(100)] {
                for demand in [dec!(0), dec!(0.3), dec!(1)] {
                    let facts = price_facts(asset_type, region, reputation, demand)
                        .with_feature("streaming_rights");
                    let estimate = engine.estimate(&facts, &table).unwrap();
                    assert!(estimate.final_price > Decimal::ZERO);
                    assert!(estimate.confidence >= dec!(0.1));
                    assert!(estimate.confidence <= Decimal::ONE);
                }
            }
        }
    }
}

#[test]
fn zero_base_price_fails() {
    let engine = pricing(builtin_rules());
    let facts = price_facts(AssetType::Nft, "mumbai", dec!(50), dec!(0.5));
    let zero = |_: AssetType, _: &Region| Decimal::ZERO;

    assert!(matches!(
        engine.estimate(&facts, &zero),
        Err(Error::Validation(ValidationError::InvalidBasePrice { .. }))
    ));
}

#[test]
fn cache_is_keyed_by_version() {
    let rules = builtin_rules();
    let engine = pricing(rules.clone());
    let table = BasePriceTable::default();
    let cache = EstimateCache::new();
    let facts = price_facts(AssetType::Digital, "global", dec!(70), dec!(0.5));

    let v1 = rules.latest_version().unwrap();
    let first = cache
        .get_or_estimate(&facts, v1, || engine.estimate_at(v1, &facts, &table))
        .unwrap();

    rules
        .install(rule_set(
            v1 + 1,
            vec![always_multiplier("type.any", "type_multiplier", dec!(2))],
        ))
        .unwrap();
    let v2 = rules.latest_version().unwrap();
    let second = cache
        .get_or_estimate(&facts, v2, || engine.estimate_at(v2, &facts, &table))
        .unwrap();

    assert_ne!(first.final_price, second.final_price);
    assert_eq!(second.final_price, dec!(3.0));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.invalidate_below(v2), 1);
    assert_eq!(cache.get(&facts, v2), Some(second));
}
