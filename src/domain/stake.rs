//! Stake positions and the records produced by staking operations.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, AssetId, AssetType, OwnerId, Rate, RuleId, StakeId};
use crate::error::InvariantViolation;

/// Lifecycle of a stake: `Active → Unstaking → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeStatus {
    Active,
    Unstaking,
    Closed,
}

impl fmt::Display for StakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StakeStatus::Active => "active",
            StakeStatus::Unstaking => "unstaking",
            StakeStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// How a stake left `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitMode {
    /// Lock period elapsed.
    Matured,
    /// Forced exit before the lock elapsed; principal is penalized.
    Early,
}

/// Input for opening a stake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRequest {
    pub owner: OwnerId,
    pub asset: AssetId,
    pub asset_type: AssetType,
    pub principal: Amount,
    pub lock_days: u32,
}

/// APR resolved from the staking rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AprTier {
    pub rate: Rate,
    /// Rules that contributed, base rule first.
    pub rule_ids: Vec<RuleId>,
    /// Whether `max_apr` reduced the rate.
    pub capped: bool,
}

/// A stake position.
///
/// Fields are read-only outside the crate; only the staking ledger mutates
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakePosition {
    pub(crate) stake_id: StakeId,
    pub(crate) owner_id: OwnerId,
    pub(crate) asset_id: AssetId,
    pub(crate) asset_type: AssetType,
    pub(crate) principal: Amount,
    pub(crate) apr_tier: Rate,
    pub(crate) lock_days: u32,
    pub(crate) start_time: DateTime<Utc>,
    pub(crate) last_accrual_time: DateTime<Utc>,
    pub(crate) accrued_unclaimed: Amount,
    pub(crate) total_accrued: Amount,
    pub(crate) total_claimed: Amount,
    pub(crate) status: StakeStatus,
    #[serde(default)]
    pub(crate) exit_mode: Option<ExitMode>,
}

impl StakePosition {
    #[must_use]
    pub fn stake_id(&self) -> &StakeId {
        &self.stake_id
    }

    #[must_use]
    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    #[must_use]
    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    #[must_use]
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    #[must_use]
    pub fn principal(&self) -> Amount {
        self.principal
    }

    #[must_use]
    pub fn apr_tier(&self) -> Rate {
        self.apr_tier
    }

    #[must_use]
    pub fn lock_days(&self) -> u32 {
        self.lock_days
    }

    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub fn last_accrual_time(&self) -> DateTime<Utc> {
        self.last_accrual_time
    }

    #[must_use]
    pub fn accrued_unclaimed(&self) -> Amount {
        self.accrued_unclaimed
    }

    /// Sum of every accrual ever produced for this stake.
    #[must_use]
    pub fn total_accrued(&self) -> Amount {
        self.total_accrued
    }

    /// Sum of every reward paid out (claims and the unstake payout).
    #[must_use]
    pub fn total_claimed(&self) -> Amount {
        self.total_claimed
    }

    #[must_use]
    pub fn status(&self) -> StakeStatus {
        self.status
    }

    #[must_use]
    pub fn exit_mode(&self) -> Option<ExitMode> {
        self.exit_mode
    }

    /// Instant the lock period ends.
    #[must_use]
    pub fn unlocks_at(&self) -> DateTime<Utc> {
        self.start_time + Duration::days(i64::from(self.lock_days))
    }

    /// Whether the lock period is still running at `now`.
    #[must_use]
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        now < self.unlocks_at()
    }

    /// `total_accrued == total_claimed + accrued_unclaimed`.
    pub fn check_conservation(&self) -> Result<(), InvariantViolation> {
        if self.total_accrued != self.total_claimed + self.accrued_unclaimed {
            return Err(InvariantViolation::ConservationMismatch {
                stake_id: self.stake_id.clone(),
                accrued: self.total_accrued,
                claimed: self.total_claimed,
                unclaimed: self.accrued_unclaimed,
            });
        }
        Ok(())
    }
}

/// Append-only record of one accrual step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardAccrual {
    pub stake_id: StakeId,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub amount: Amount,
}

/// Record of a reward claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub stake_id: StakeId,
    pub amount: Amount,
    pub claimed_at: DateTime<Utc>,
}

/// Single payout produced when a stake closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnstakePayout {
    pub stake_id: StakeId,
    pub owner_id: OwnerId,
    pub exit_mode: ExitMode,
    /// Principal after any early-exit penalty.
    pub principal_returned: Amount,
    pub penalty: Amount,
    /// Unclaimed reward paid with the principal.
    pub reward_paid: Amount,
    /// Accrual run as part of the exit.
    pub final_accrual: RewardAccrual,
    pub closed_at: DateTime<Utc>,
}

impl UnstakePayout {
    /// Principal returned plus reward paid.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.principal_returned + self.reward_paid
    }
}

/// Zero-amount accrual covering an empty period.
pub(crate) fn empty_accrual(stake_id: &StakeId, at: DateTime<Utc>) -> RewardAccrual {
    RewardAccrual {
        stake_id: stake_id.clone(),
        period_start: at,
        period_end: at,
        amount: Decimal::ZERO,
    }
}
