//! Co-creator inputs and ownership proposals.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::price::check_range;
use super::{Amount, CreatorId, Share};
use crate::error::{InvariantViolation, ValidationError};

/// Tolerance accepted when validating a proposal built elsewhere.
pub const SHARE_EPSILON: Decimal = dec!(0.000001);

/// One co-creator of a multi-party asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: CreatorId,
    /// Relative skill contribution, `>= 0`.
    pub skill_weight: Decimal,
    /// Reputation in `0..=100`.
    pub reputation: Decimal,
}

impl Creator {
    pub fn new(id: impl Into<CreatorId>, skill_weight: Decimal, reputation: Decimal) -> Self {
        Self {
            id: id.into(),
            skill_weight,
            reputation,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.skill_weight < Decimal::ZERO {
            return Err(ValidationError::Negative {
                field: "skill_weight",
                value: self.skill_weight,
            });
        }
        check_range(
            "reputation",
            self.reputation,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        )
    }
}

/// Ownership split: creator → share, shares summing to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<CreatorId, Share>", into = "BTreeMap<CreatorId, Share>")]
pub struct OwnershipProposal {
    shares: BTreeMap<CreatorId, Share>,
}

impl OwnershipProposal {
    /// Build a proposal from explicit shares, checking the invariants.
    pub fn try_new(shares: BTreeMap<CreatorId, Share>) -> Result<Self, InvariantViolation> {
        let proposal = Self { shares };
        proposal.validate()?;
        Ok(proposal)
    }

    /// Check non-negativity and that shares sum to 1 within [`SHARE_EPSILON`].
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if let Some((id, share)) = self.shares.iter().find(|(_, s)| **s < Decimal::ZERO) {
            return Err(InvariantViolation::NegativeShare {
                id: id.clone(),
                share: *share,
            });
        }
        let total = self.total();
        if (total - Decimal::ONE).abs() > SHARE_EPSILON {
            return Err(InvariantViolation::ShareSumMismatch { total });
        }
        Ok(())
    }

    #[must_use]
    pub fn share(&self, id: &CreatorId) -> Option<Share> {
        self.shares.get(id).copied()
    }

    #[must_use]
    pub fn shares(&self) -> &BTreeMap<CreatorId, Share> {
        &self.shares
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CreatorId, &Share)> {
        self.shares.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Sum of all shares.
    #[must_use]
    pub fn total(&self) -> Share {
        self.shares.values().sum()
    }

    /// Largest share; ties go to the lowest creator id.
    #[must_use]
    pub fn largest(&self) -> Option<(&CreatorId, Share)> {
        largest_entry(&self.shares).map(|(id, share)| (id, *share))
    }
}

impl TryFrom<BTreeMap<CreatorId, Share>> for OwnershipProposal {
    type Error = InvariantViolation;

    fn try_from(shares: BTreeMap<CreatorId, Share>) -> Result<Self, Self::Error> {
        Self::try_new(shares)
    }
}

impl From<OwnershipProposal> for BTreeMap<CreatorId, Share> {
    fn from(proposal: OwnershipProposal) -> Self {
        proposal.shares
    }
}

/// Largest value in an id-ordered map; ties resolve to the lowest id because
/// iteration is ascending and only a strictly greater value replaces the best.
pub(crate) fn largest_entry<V: PartialOrd>(
    map: &BTreeMap<CreatorId, V>,
) -> Option<(&CreatorId, &V)> {
    map.iter().fold(None, |best, (id, value)| match best {
        Some((_, best_value)) if value <= best_value => best,
        _ => Some((id, value)),
    })
}

/// Royalty pool split across owners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueDistribution {
    /// `revenue * royalty_rate`.
    pub pool: Amount,
    pub payouts: BTreeMap<CreatorId, Amount>,
}

impl RevenueDistribution {
    /// Sum of payouts. Always equals `pool`.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.payouts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shares(entries: &[(&str, Decimal)]) -> BTreeMap<CreatorId, Share> {
        entries
            .iter()
            .map(|(id, s)| (CreatorId::from(*id), *s))
            .collect()
    }

    #[test]
    fn try_new_accepts_exact_split() {
        let proposal =
            OwnershipProposal::try_new(shares(&[("a", dec!(0.25)), ("b", dec!(0.75))])).unwrap();
        assert_eq!(proposal.total(), Decimal::ONE);
        assert_eq!(proposal.share(&CreatorId::from("a")), Some(dec!(0.25)));
    }

    #[test]
    fn try_new_rejects_bad_sum_and_negative_share() {
        let err = OwnershipProposal::try_new(shares(&[("a", dec!(0.5)), ("b", dec!(0.4))]));
        assert!(matches!(err, Err(InvariantViolation::ShareSumMismatch { .. })));

        let err = OwnershipProposal::try_new(shares(&[("a", dec!(1.2)), ("b", dec!(-0.2))]));
        assert!(matches!(err, Err(InvariantViolation::NegativeShare { .. })));
    }

    #[test]
    fn largest_breaks_ties_by_lowest_id() {
        let proposal = OwnershipProposal::try_new(shares(&[
            ("c", dec!(0.4)),
            ("b", dec!(0.4)),
            ("a", dec!(0.2)),
        ]))
        .unwrap();
        assert_eq!(proposal.largest(), Some((&CreatorId::from("b"), dec!(0.4))));
    }

    #[test]
    fn creator_validation() {
        assert!(Creator::new("a", dec!(0), dec!(0)).validate().is_ok());
        assert!(matches!(
            Creator::new("a", dec!(-1), dec!(50)).validate(),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            Creator::new("a", dec!(1), dec!(120)).validate(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn proposal_round_trips_through_json() {
        let json = r#"{"alice":"0.6","bob":"0.4"}"#;
        let proposal: OwnershipProposal = serde_json::from_str(json).unwrap();
        assert_eq!(proposal.len(), 2);

        let bad: Result<OwnershipProposal, _> = serde_json::from_str(r#"{"alice":"0.6"}"#);
        assert!(bad.is_err());
    }
}
