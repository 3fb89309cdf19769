use rust_decimal::Decimal;

use assetflow::domain::{OwnershipProposal, StakePosition};

pub fn assert_decimal_near(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

/// `total_accrued == total_claimed + accrued_unclaimed`, exactly.
pub fn assert_conserved(stake: &StakePosition) {
    assert_eq!(
        stake.total_accrued(),
        stake.total_claimed() + stake.accrued_unclaimed(),
        "conservation broken for {}",
        stake.stake_id()
    );
}

/// Shares are non-negative and sum to exactly one.
pub fn assert_valid_shares(proposal: &OwnershipProposal) {
    assert!(
        proposal.iter().all(|(_, share)| *share >= Decimal::ZERO),
        "negative share in {proposal:?}"
    );
    assert_eq!(proposal.total(), Decimal::ONE, "shares do not sum to one");
}
