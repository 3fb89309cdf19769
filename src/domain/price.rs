//! Price inputs and estimates.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, AssetType, Factor, Facts, Region, RuleId};
use crate::error::ValidationError;

/// Fact field names shared with rule predicates.
pub mod fields {
    pub const ASSET_TYPE: &str = "asset_type";
    pub const REGION: &str = "region";
    pub const CREATOR_REPUTATION: &str = "creator_reputation";
    pub const DEMAND_LEVEL: &str = "demand_level";
    pub const UTILITY_FEATURES: &str = "utility_features";
    pub const PRINCIPAL: &str = "principal";
    pub const LOCK_DAYS: &str = "lock_days";
}

/// Input for one price estimate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceFacts {
    pub asset_type: AssetType,
    pub region: Region,
    /// Creator reputation in `0..=100`.
    pub creator_reputation: Decimal,
    /// Demand level in `0..=1`.
    pub demand_level: Decimal,
    #[serde(default)]
    pub utility_features: BTreeSet<String>,
}

impl PriceFacts {
    pub fn new(
        asset_type: AssetType,
        region: impl Into<Region>,
        creator_reputation: Decimal,
        demand_level: Decimal,
    ) -> Self {
        Self {
            asset_type,
            region: region.into(),
            creator_reputation,
            demand_level,
            utility_features: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.utility_features.insert(feature.into());
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range(
            "creator_reputation",
            self.creator_reputation,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        )?;
        check_range("demand_level", self.demand_level, Decimal::ZERO, Decimal::ONE)
    }

    /// Rule facts for these inputs.
    #[must_use]
    pub fn to_facts(&self) -> Facts {
        Facts::new()
            .with_text(fields::ASSET_TYPE, self.asset_type.as_str())
            .with_text(fields::REGION, self.region.as_str())
            .with_number(fields::CREATOR_REPUTATION, self.creator_reputation)
            .with_number(fields::DEMAND_LEVEL, self.demand_level)
            .with_flags(fields::UTILITY_FEATURES, self.utility_features.iter().cloned())
    }
}

pub(crate) fn check_range(
    field: &'static str,
    value: Decimal,
    min: Decimal,
    max: Decimal,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Multiplier category, applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory {
    TypeMultiplier,
    RegionMultiplier,
    ReputationMultiplier,
    DemandMultiplier,
    UtilityBonus,
}

impl PriceCategory {
    pub const ALL: [PriceCategory; 5] = [
        PriceCategory::TypeMultiplier,
        PriceCategory::RegionMultiplier,
        PriceCategory::ReputationMultiplier,
        PriceCategory::DemandMultiplier,
        PriceCategory::UtilityBonus,
    ];

    /// Rule name queried for this category.
    #[must_use]
    pub const fn rule_name(&self) -> &'static str {
        match self {
            PriceCategory::TypeMultiplier => "type_multiplier",
            PriceCategory::RegionMultiplier => "region_multiplier",
            PriceCategory::ReputationMultiplier => "reputation_multiplier",
            PriceCategory::DemandMultiplier => "demand_multiplier",
            PriceCategory::UtilityBonus => "utility_bonus",
        }
    }
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule_name())
    }
}

/// One factor applied to the base price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedMultiplier {
    pub category: PriceCategory,
    pub rule_id: RuleId,
    /// Effective factor (after the category ceiling).
    pub factor: Factor,
    /// Whether the rule's factor was reduced by the category ceiling.
    pub clamped: bool,
}

/// Result of a price estimate.
///
/// `final_price == base_price * Π(applied_multipliers.factor)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceEstimate {
    pub rule_set_version: u64,
    pub base_price: Amount,
    pub applied_multipliers: Vec<AppliedMultiplier>,
    pub final_price: Amount,
    /// In `confidence_floor..=1`.
    pub confidence: Decimal,
    pub skipped_categories: Vec<PriceCategory>,
}

impl PriceEstimate {
    /// Product of all applied factors.
    #[must_use]
    pub fn total_multiplier(&self) -> Factor {
        self.applied_multipliers
            .iter()
            .fold(Decimal::ONE, |acc, m| acc * m.factor)
    }
}
