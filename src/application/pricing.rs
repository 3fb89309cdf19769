//! Price estimation from base price and rule-supplied multipliers.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{debug, error, warn};

use super::rules::RuleEngine;
use crate::domain::{AppliedMultiplier, PriceCategory, PriceEstimate, PriceFacts, RuleSet};
use crate::error::{InvariantViolation, Result, ValidationError};
use crate::port::outbound::BasePriceLookup;

/// Limits and coefficients for price composition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PricingLimits {
    /// Maximum product of the factors within one category.
    pub category_ceiling: Decimal,
    /// Maximum running product across all categories.
    pub max_product: Decimal,
    /// Confidence lost per category with no applicable rule.
    pub confidence_penalty: Decimal,
    /// Lowest confidence reported.
    pub confidence_floor: Decimal,
}

impl Default for PricingLimits {
    fn default() -> Self {
        Self {
            category_ceiling: dec!(5),
            max_product: dec!(100),
            confidence_penalty: dec!(0.15),
            confidence_floor: dec!(0.1),
        }
    }
}

/// Stateless price estimator.
///
/// Each call evaluates every category against a single rule-set snapshot.
/// Results are not cached here.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    rules: Arc<RuleEngine>,
    limits: PricingLimits,
}

impl PricingEngine {
    #[must_use]
    pub fn new(rules: Arc<RuleEngine>, limits: PricingLimits) -> Self {
        Self { rules, limits }
    }

    #[must_use]
    pub fn limits(&self) -> &PricingLimits {
        &self.limits
    }

    /// Estimate against the latest rule set.
    pub fn estimate<L>(&self, facts: &PriceFacts, lookup: &L) -> Result<PriceEstimate>
    where
        L: BasePriceLookup + ?Sized,
    {
        let rule_set = self.rules.latest()?;
        self.estimate_with(&rule_set, facts, lookup)
    }

    /// Estimate against a specific rule-set version.
    pub fn estimate_at<L>(
        &self,
        version: u64,
        facts: &PriceFacts,
        lookup: &L,
    ) -> Result<PriceEstimate>
    where
        L: BasePriceLookup + ?Sized,
    {
        let rule_set = self.rules.snapshot(version)?;
        self.estimate_with(&rule_set, facts, lookup)
    }

    /// Estimate against an already-held snapshot.
    pub fn estimate_with<L>(
        &self,
        rule_set: &RuleSet,
        facts: &PriceFacts,
        lookup: &L,
    ) -> Result<PriceEstimate>
    where
        L: BasePriceLookup + ?Sized,
    {
        facts.validate()?;

        let base_price = lookup.base_price(facts.asset_type, &facts.region);
        if base_price <= Decimal::ZERO {
            return Err(ValidationError::InvalidBasePrice {
                asset_type: facts.asset_type,
                region: facts.region.to_string(),
                price: base_price,
            }
            .into());
        }

        let version = rule_set.version();
        let rule_facts = facts.to_facts();
        let ceiling = self.limits.category_ceiling;

        let mut product = Decimal::ONE;
        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for category in PriceCategory::ALL {
            let mut category_product = Decimal::ONE;
            let mut matched = 0usize;

            for m in rule_set.evaluate(category.rule_name(), &rule_facts) {
                let Some(factor) = m.effect.multiplier() else {
                    warn!(
                        rule_id = %m.rule_id,
                        %category,
                        "Ignoring non-multiplier effect in price category",
                    );
                    continue;
                };

                if factor <= Decimal::ZERO {
                    error!(
                        rule_id = %m.rule_id,
                        %factor,
                        version,
                        facts = ?facts,
                        "Rule produced a non-positive price factor"
                    );
                    return Err(InvariantViolation::NonPositiveFactor {
                        rule_id: m.rule_id,
                        factor,
                    }
                    .into());
                }

                let (effective, clamped) = match category_product.checked_mul(factor) {
                    Some(next) if next <= ceiling => (factor, false),
                    _ => match ceiling.checked_div(category_product) {
                        Some(headroom) => (headroom, true),
                        None => {
                            error!(
                                %category_product,
                                rule_id = %m.rule_id,
                                version,
                                facts = ?facts,
                                "Category headroom is not representable"
                            );
                            return Err(InvariantViolation::PriceOverflow {
                                product: category_product,
                                ceiling,
                            }
                            .into());
                        }
                    },
                };
                if clamped {
                    warn!(
                        rule_id = %m.rule_id,
                        %category,
                        %factor,
                        %effective,
                        "Category factor clamped to ceiling"
                    );
                }

                category_product =
                    positive_product(category_product * effective, version, facts)?;
                product = match product.checked_mul(effective) {
                    Some(p) if p <= self.limits.max_product => positive_product(p, version, facts)?,
                    overflowed => {
                        let product = overflowed.unwrap_or(Decimal::MAX);
                        error!(
                            %product,
                            ceiling = %self.limits.max_product,
                            rule_id = %m.rule_id,
                            version,
                            facts = ?facts,
                            "Price multiplier product exceeds sanity ceiling"
                        );
                        return Err(InvariantViolation::PriceOverflow {
                            product,
                            ceiling: self.limits.max_product,
                        }
                        .into());
                    }
                };

                debug!(
                    rule_id = %m.rule_id,
                    %category,
                    factor = %effective,
                    "Applied price factor",
                );
                applied.push(AppliedMultiplier {
                    category,
                    rule_id: m.rule_id,
                    factor: effective,
                    clamped,
                });
                matched += 1;
            }

            if matched == 0 {
                skipped.push(category);
            }
        }

        let Some(final_price) = base_price.checked_mul(product) else {
            error!(%base_price, %product, version, facts = ?facts, "Final price overflowed");
            return Err(InvariantViolation::PriceOverflow {
                product,
                ceiling: self.limits.max_product,
            }
            .into());
        };
        let final_price = positive_product(final_price, version, facts)?;

        let penalty = self.limits.confidence_penalty * Decimal::from(skipped.len());
        let confidence = (Decimal::ONE - penalty).max(self.limits.confidence_floor);

        Ok(PriceEstimate {
            rule_set_version: version,
            base_price,
            applied_multipliers: applied,
            final_price,
            confidence,
            skipped_categories: skipped,
        })
    }
}

/// Rejects a product that rounded down to zero at decimal precision.
fn positive_product(product: Decimal, version: u64, facts: &PriceFacts) -> Result<Decimal> {
    if product > Decimal::ZERO {
        return Ok(product);
    }
    error!(%product, version, facts = ?facts, "Price multiplier product underflowed");
    Err(InvariantViolation::PriceUnderflow { product }.into())
}
