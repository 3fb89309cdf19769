//! Fair-share ownership allocation and royalty distribution.
//!
//! Raw score per creator is `skill_weight * (reputation_floor +
//! reputation_span * reputation / 100)`. Shares are the normalized scores,
//! truncated to `share_scale` places; the truncation residue goes to the
//! creator with the largest raw score (lowest id on ties), so shares always
//! sum to exactly one.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{debug, error};

use crate::domain::{
    largest_entry, truncate, Amount, Creator, CreatorId, OwnershipProposal, Rate,
    RevenueDistribution, Share,
};
use crate::error::{Result, ValidationError};

/// Coefficients for share allocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AllocationPolicy {
    /// Decimal places kept in each share.
    pub share_scale: u32,
    /// Reputation factor at reputation 0.
    pub reputation_floor: Decimal,
    /// Extra reputation factor gained at reputation 100.
    pub reputation_span: Decimal,
    /// Decimal places kept in each royalty payout.
    pub payout_scale: u32,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            share_scale: 6,
            reputation_floor: dec!(0.5),
            reputation_span: dec!(0.5),
            payout_scale: 6,
        }
    }
}

/// Stateless ownership allocator.
#[derive(Debug, Clone, Default)]
pub struct CollaborationOptimizer {
    policy: AllocationPolicy,
}

impl CollaborationOptimizer {
    #[must_use]
    pub fn new(policy: AllocationPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    /// Raw (unnormalized) score of one creator.
    pub fn raw_score(&self, creator: &Creator) -> Result<Decimal> {
        let reputation_factor = self
            .policy
            .reputation_span
            .checked_mul(creator.reputation / Decimal::ONE_HUNDRED)
            .and_then(|boost| boost.checked_add(self.policy.reputation_floor))
            .ok_or(ValidationError::Overflow { field: "reputation" })?;
        let score = creator
            .skill_weight
            .checked_mul(reputation_factor)
            .ok_or(ValidationError::Overflow { field: "skill_weight" })?;
        Ok(score)
    }

    /// Compute an ownership split for `creators`.
    ///
    /// Falls back to an equal split when every raw score is zero.
    pub fn allocate(&self, creators: &[Creator]) -> Result<OwnershipProposal> {
        if creators.is_empty() {
            return Err(ValidationError::EmptyCreatorSet.into());
        }

        let mut seen = BTreeSet::new();
        for creator in creators {
            creator.validate()?;
            if !seen.insert(&creator.id) {
                return Err(ValidationError::DuplicateCreator {
                    id: creator.id.clone(),
                }
                .into());
            }
        }

        let raw = creators
            .iter()
            .map(|c| Ok((c.id.clone(), self.raw_score(c)?)))
            .collect::<Result<BTreeMap<CreatorId, Decimal>>>()?;
        let total = checked_sum(raw.values(), "skill_weight")?;
        let scale = self.policy.share_scale;

        let mut shares: BTreeMap<CreatorId, Share> = if total.is_zero() {
            debug!(creators = raw.len(), "All raw scores zero; splitting equally");
            let equal = truncate(Decimal::ONE / Decimal::from(raw.len()), scale);
            raw.keys().map(|id| (id.clone(), equal)).collect()
        } else {
            raw.iter()
                .map(|(id, score)| (id.clone(), truncate(*score / total, scale)))
                .collect()
        };

        let residue = Decimal::ONE - checked_sum(shares.values(), "share")?;
        if !residue.is_zero() {
            if let Some(share) = largest_entry(&raw).and_then(|(id, _)| shares.get_mut(id)) {
                *share += residue;
            }
        }

        OwnershipProposal::try_new(shares).map_err(|violation| {
            error!(creators = ?creators, error = %violation, "Allocation broke share invariants");
            violation.into()
        })
    }

    /// Split `revenue * royalty_rate` across the owners of `proposal`.
    ///
    /// Payouts are truncated to `payout_scale` places and the residue goes to
    /// the largest share, so payouts sum exactly to the pool.
    pub fn distribute(
        &self,
        proposal: &OwnershipProposal,
        revenue: Amount,
        royalty_rate: Rate,
    ) -> Result<RevenueDistribution> {
        if revenue < Decimal::ZERO {
            return Err(ValidationError::Negative {
                field: "revenue",
                value: revenue,
            }
            .into());
        }
        if royalty_rate < Decimal::ZERO || royalty_rate > Decimal::ONE {
            return Err(ValidationError::OutOfRange {
                field: "royalty_rate",
                value: royalty_rate,
                min: Decimal::ZERO,
                max: Decimal::ONE,
            }
            .into());
        }

        let scale = self.policy.payout_scale;
        let pool = revenue
            .checked_mul(royalty_rate)
            .map(|pool| truncate(pool, scale))
            .ok_or(ValidationError::Overflow { field: "revenue" })?;

        let mut payouts = proposal
            .iter()
            .map(|(id, share)| {
                let payout = pool
                    .checked_mul(*share)
                    .ok_or(ValidationError::Overflow { field: "revenue" })?;
                Ok((id.clone(), truncate(payout, scale)))
            })
            .collect::<Result<BTreeMap<CreatorId, Amount>>>()?;

        let paid = checked_sum(payouts.values(), "revenue")?;
        if let Some((largest, _)) = proposal.largest() {
            if let Some(payout) = payouts.get_mut(largest) {
                *payout = (pool - paid)
                    .checked_add(*payout)
                    .ok_or(ValidationError::Overflow { field: "revenue" })?;
            }
        }

        Ok(RevenueDistribution { pool, payouts })
    }
}

fn checked_sum<'a>(
    values: impl IntoIterator<Item = &'a Decimal>,
    field: &'static str,
) -> Result<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value))
        .ok_or_else(|| ValidationError::Overflow { field }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn creator(id: &str, weight: Decimal, reputation: Decimal) -> Creator {
        Creator::new(id, weight, reputation)
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = CollaborationOptimizer::default().allocate(&[]).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::EmptyCreatorSet)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = CollaborationOptimizer::default()
            .allocate(&[
                creator("a", dec!(1), dec!(50)),
                creator("a", dec!(2), dec!(50)),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::DuplicateCreator { .. })
        ));
    }

    #[test]
    fn reputation_boost_is_capped_at_half() {
        let optimizer = CollaborationOptimizer::default();
        assert_eq!(optimizer.raw_score(&creator("a", dec!(2), dec!(0))).unwrap(), dec!(1.0));
        assert_eq!(optimizer.raw_score(&creator("a", dec!(2), dec!(100))).unwrap(), dec!(2.0));
    }

    #[test]
    fn shares_follow_scores() {
        let proposal = CollaborationOptimizer::default()
            .allocate(&[
                creator("a", dec!(3), dec!(100)),
                creator("b", dec!(1), dec!(100)),
            ])
            .unwrap();
        assert_eq!(proposal.share(&"a".into()), Some(dec!(0.75)));
        assert_eq!(proposal.share(&"b".into()), Some(dec!(0.25)));
    }

    #[test]
    fn residue_goes_to_largest_share() {
        let proposal = CollaborationOptimizer::default()
            .allocate(&[
                creator("a", dec!(1), dec!(0)),
                creator("b", dec!(1), dec!(0)),
                creator("c", dec!(1), dec!(0)),
            ])
            .unwrap();
        assert_eq!(proposal.share(&"a".into()), Some(dec!(0.333334)));
        assert_eq!(proposal.share(&"b".into()), Some(dec!(0.333333)));
        assert_eq!(proposal.share(&"c".into()), Some(dec!(0.333333)));
        assert_eq!(proposal.total(), Decimal::ONE);
    }

    #[test]
    fn residue_follows_raw_score_when_truncated_shares_tie() {
        let proposal = CollaborationOptimizer::default()
            .allocate(&[
                creator("a", dec!(1), dec!(100)),
                creator("b", dec!(1.0000001), dec!(100)),
                creator("c", dec!(1), dec!(100)),
            ])
            .unwrap();
        assert_eq!(proposal.share(&"a".into()), Some(dec!(0.333333)));
        assert_eq!(proposal.share(&"b".into()), Some(dec!(0.333334)));
        assert_eq!(proposal.share(&"c".into()), Some(dec!(0.333333)));
    }

    #[test]
    fn oversized_weights_are_rejected() {
        let err = CollaborationOptimizer::default()
            .allocate(&[
                creator("a", dec!(50000000000000000000000000000), dec!(100)),
                creator("b", dec!(50000000000000000000000000000), dec!(100)),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::Overflow {
                field: "skill_weight"
            })
        ));
    }

    #[test]
    fn maximal_revenue_does_not_panic() {
        let optimizer = CollaborationOptimizer::default();
        let proposal = optimizer
            .allocate(&[
                creator("a", dec!(1), dec!(0)),
                creator("b", dec!(1), dec!(0)),
                creator("c", dec!(1), dec!(0)),
            ])
            .unwrap();

        match optimizer.distribute(&proposal, Decimal::MAX, Decimal::ONE) {
            Ok(distribution) => {
                let paid = checked_sum(distribution.payouts.values(), "revenue").unwrap();
                assert_eq!(paid, distribution.pool);
            }
            Err(err) => assert!(matches!(
                err,
                Error::Validation(ValidationError::Overflow { field: "revenue" })
            )),
        }
    }

    #[test]
    fn zero_weights_split_equally() {
        let proposal = CollaborationOptimizer::default()
            .allocate(&[
                creator("x", dec!(0), dec!(90)),
                creator("y", dec!(0), dec!(10)),
            ])
            .unwrap();
        assert_eq!(proposal.share(&"x".into()), Some(dec!(0.5)));
        assert_eq!(proposal.share(&"y".into()), Some(dec!(0.5)));
    }

    #[test]
    fn input_order_does_not_change_shares() {
        let optimizer = CollaborationOptimizer::default();
        let forward = optimizer
            .allocate(&[
                creator("a", dec!(2), dec!(40)),
                creator("b", dec!(5), dec!(70)),
                creator("c", dec!(1), dec!(95)),
            ])
            .unwrap();
        let reversed = optimizer
            .allocate(&[
                creator("c", dec!(1), dec!(95)),
                creator("b", dec!(5), dec!(70)),
                creator("a", dec!(2), dec!(40)),
            ])
            .unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn distribution_conserves_pool() {
        let optimizer = CollaborationOptimizer::default();
        let proposal = optimizer
            .allocate(&[
                creator("a", dec!(1), dec!(0)),
                creator("b", dec!(1), dec!(0)),
                creator("c", dec!(1), dec!(0)),
            ])
            .unwrap();

        let distribution = optimizer.distribute(&proposal, dec!(100), dec!(0.1)).unwrap();
        assert_eq!(distribution.pool, dec!(10));
        assert_eq!(distribution.total(), dec!(10));
        assert!(distribution.payouts.values().all(|p| *p >= Decimal::ZERO));
    }

    #[test]
    fn distribution_validates_inputs() {
        let optimizer = CollaborationOptimizer::default();
        let proposal = optimizer.allocate(&[creator("a", dec!(1), dec!(0))]).unwrap();

        assert!(optimizer.distribute(&proposal, dec!(-1), dec!(0.1)).is_err());
        assert!(optimizer.distribute(&proposal, dec!(10), dec!(1.5)).is_err());
    }
}
