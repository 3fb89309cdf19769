//! Stake positions, time-accrued rewards and the claim ledger.
//!
//! Every mutating operation works on a copy of the position, checks the
//! conservation invariant `total_accrued == total_claimed + accrued_unclaimed`
//! on the copy, and only then writes it back. A violation leaves the caller's
//! position untouched.
//!
//! Callers must serialize mutating calls per stake (see
//! [`StakeRegistry`](crate::infrastructure::registry::StakeRegistry)).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::rules::RuleEngine;
use crate::domain::{
    empty_accrual, fields, truncate, Amount, AprTier, AssetType, ClaimReceipt, ExitMode, Facts,
    Rate, RewardAccrual, StakeId, StakePosition, StakeRequest, StakeStatus, UnstakePayout,
};
use crate::error::{ConfigurationError, InvariantViolation, Result, StateError, ValidationError};
use crate::port::outbound::Clock;

/// Rule name supplying the base APR (`rate` effect, first match wins).
pub const APR_BASE_RULE: &str = "staking_apr_base";
/// Rule name supplying APR adjustments (`multiplier` effects, all apply).
pub const APR_MULTIPLIER_RULE: &str = "staking_apr_multiplier";

const SECONDS_PER_DAY: i64 = 86_400;

/// Bounds and coefficients for staking.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StakingPolicy {
    pub min_principal: Amount,
    pub max_principal: Amount,
    pub min_lock_days: u32,
    pub max_lock_days: u32,
    /// Fraction of principal returned on a forced early exit.
    pub early_exit_multiplier: Decimal,
    /// Upper bound on the resolved APR.
    pub max_apr: Rate,
    /// Decimal places kept in each accrual.
    pub reward_scale: u32,
    pub seconds_per_year: u64,
}

impl Default for StakingPolicy {
    fn default() -> Self {
        Self {
            min_principal: dec!(0.1),
            max_principal: dec!(100000),
            min_lock_days: 0,
            max_lock_days: 365,
            early_exit_multiplier: dec!(0.9),
            max_apr: dec!(0.5),
            reward_scale: 12,
            seconds_per_year: 31_536_000,
        }
    }
}

/// Staking operations over caller-held positions.
pub struct StakingLedger {
    rules: Arc<RuleEngine>,
    policy: StakingPolicy,
    clock: Arc<dyn Clock>,
}

impl StakingLedger {
    #[must_use]
    pub fn new(rules: Arc<RuleEngine>, policy: StakingPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules,
            policy,
            clock,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &StakingPolicy {
        &self.policy
    }

    /// Resolve the APR for a prospective stake from the latest rules.
    pub fn apr_tier(
        &self,
        asset_type: AssetType,
        principal: Amount,
        lock_days: u32,
    ) -> Result<AprTier> {
        let rule_set = self.rules.latest()?;
        let facts = Facts::new()
            .with_text(fields::ASSET_TYPE, asset_type.as_str())
            .with_number(fields::PRINCIPAL, principal)
            .with_number(fields::LOCK_DAYS, Decimal::from(lock_days));

        let (base_id, mut rate) = rule_set
            .evaluate(APR_BASE_RULE, &facts)
            .into_iter()
            .find_map(|m| m.effect.rate().map(|r| (m.rule_id, r)))
            .ok_or_else(|| ConfigurationError::MissingRule {
                rule_name: APR_BASE_RULE.to_string(),
            })?;

        if rate < Decimal::ZERO {
            error!(rule_id = %base_id, %rate, facts = ?facts, "Negative base APR");
            return Err(InvariantViolation::NonPositiveFactor {
                rule_id: base_id,
                factor: rate,
            }
            .into());
        }

        let mut rule_ids = vec![base_id];
        for m in rule_set.evaluate(APR_MULTIPLIER_RULE, &facts) {
            let Some(factor) = m.effect.multiplier() else {
                continue;
            };
            if factor <= Decimal::ZERO {
                error!(
                    rule_id = %m.rule_id,
                    %factor,
                    facts = ?facts,
                    "Non-positive APR multiplier",
                );
                return Err(InvariantViolation::NonPositiveFactor {
                    rule_id: m.rule_id,
                    factor,
                }
                .into());
            }
            rate *= factor;
            rule_ids.push(m.rule_id);
        }

        let capped = rate > self.policy.max_apr;
        if capped {
            rate = self.policy.max_apr;
        }

        Ok(AprTier {
            rate,
            rule_ids,
            capped,
        })
    }

    /// APR and full-lock reward for prospective terms, without opening a stake.
    pub fn preview(
        &self,
        asset_type: AssetType,
        principal: Amount,
        lock_days: u32,
    ) -> Result<(AprTier, Amount)> {
        self.validate_terms(principal, lock_days)?;
        let tier = self.apr_tier(asset_type, principal, lock_days)?;
        let reward = self.projected_reward(principal, tier.rate, lock_days);
        Ok((tier, reward))
    }

    /// Open a new position.
    pub fn open_stake(&self, request: StakeRequest) -> Result<StakePosition> {
        self.validate_terms(request.principal, request.lock_days)?;

        let tier = self.apr_tier(request.asset_type, request.principal, request.lock_days)?;
        let now = self.clock.now();

        let position = StakePosition {
            stake_id: StakeId::generate(),
            owner_id: request.owner,
            asset_id: request.asset,
            asset_type: request.asset_type,
            principal: request.principal,
            apr_tier: tier.rate,
            lock_days: request.lock_days,
            start_time: now,
            last_accrual_time: now,
            accrued_unclaimed: Decimal::ZERO,
            total_accrued: Decimal::ZERO,
            total_claimed: Decimal::ZERO,
            status: StakeStatus::Active,
            exit_mode: None,
        };

        info!(
            stake_id = %position.stake_id,
            owner_id = %position.owner_id,
            asset_id = %position.asset_id,
            principal = %position.principal,
            apr = %position.apr_tier,
            lock_days = position.lock_days,
            "Stake opened"
        );
        Ok(position)
    }

    /// Accrue rewards for the time since the last accrual.
    ///
    /// Calling twice at the same instant yields a zero second accrual.
    pub fn accrue(&self, stake: &mut StakePosition) -> Result<RewardAccrual> {
        ensure_accruing(stake)?;
        let now = self.clock.now();
        self.commit(stake, |working| Ok(self.accrue_at(working, now)))
    }

    /// Pay out everything accrued so far.
    pub fn claim(&self, stake: &mut StakePosition) -> Result<ClaimReceipt> {
        ensure_open(stake)?;
        if stake.accrued_unclaimed.is_zero() {
            return Err(StateError::NothingToClaim {
                stake_id: stake.stake_id.clone(),
            }
            .into());
        }

        let now = self.clock.now();
        let receipt = self.commit(stake, |working| {
            let amount = working.accrued_unclaimed;
            working.total_claimed += amount;
            working.accrued_unclaimed = Decimal::ZERO;
            Ok(ClaimReceipt {
                stake_id: working.stake_id.clone(),
                amount,
                claimed_at: now,
            })
        })?;

        info!(stake_id = %receipt.stake_id, amount = %receipt.amount, "Rewards claimed");
        Ok(receipt)
    }

    /// Stop accrual and move `Active → Unstaking`.
    ///
    /// Fails with `LockupActive` while locked unless `force` is set; a forced
    /// early exit is penalized when the stake closes.
    pub fn begin_unstake(&self, stake: &mut StakePosition, force: bool) -> Result<RewardAccrual> {
        ensure_accruing(stake)?;
        let now = self.clock.now();
        let locked = self.check_lockup(stake, now, force)?;

        let accrual = self.commit(stake, |working| {
            let accrual = self.accrue_at(working, now);
            working.status = StakeStatus::Unstaking;
            working.exit_mode = Some(if locked { ExitMode::Early } else { ExitMode::Matured });
            Ok(accrual)
        })?;

        info!(stake_id = %stake.stake_id, exit_mode = ?stake.exit_mode, "Stake unstaking");
        Ok(accrual)
    }

    /// Close the stake, returning principal plus unclaimed reward.
    ///
    /// From `Active`, the stake closes directly only when the lock has
    /// elapsed; a forced early exit passes through `Unstaking` first. From
    /// `Unstaking`, the exit mode chosen by [`begin_unstake`](Self::begin_unstake)
    /// applies and `force` is ignored.
    pub fn unstake(&self, stake: &mut StakePosition, force: bool) -> Result<UnstakePayout> {
        ensure_open(stake)?;
        let now = self.clock.now();

        let payout = match stake.status {
            StakeStatus::Active => {
                let locked = self.check_lockup(stake, now, force)?;
                self.commit(stake, |working| {
                    let final_accrual = self.accrue_at(working, now);
                    if locked {
                        working.status = StakeStatus::Unstaking;
                        working.exit_mode = Some(ExitMode::Early);
                        info!(stake_id = %working.stake_id, "Stake unstaking (forced early exit)");
                    }
                    Ok(self.close(working, final_accrual, now))
                })?
            }
            _ => self.commit(stake, |working| {
                let final_accrual = empty_accrual(&working.stake_id, working.last_accrual_time);
                Ok(self.close(working, final_accrual, now))
            })?,
        };

        info!(
            stake_id = %payout.stake_id,
            exit_mode = ?payout.exit_mode,
            principal_returned = %payout.principal_returned,
            penalty = %payout.penalty,
            reward_paid = %payout.reward_paid,
            "Stake closed"
        );
        Ok(payout)
    }

    /// Reward `accrue` would add now, without mutating anything.
    #[must_use]
    pub fn pending_reward(&self, stake: &StakePosition) -> Amount {
        if stake.status != StakeStatus::Active {
            return Decimal::ZERO;
        }
        self.reward_between(stake, stake.last_accrual_time, self.clock.now())
    }

    /// Reward over a full lock period at a fixed APR.
    #[must_use]
    pub fn projected_reward(&self, principal: Amount, apr: Rate, lock_days: u32) -> Amount {
        let seconds = Decimal::from(i64::from(lock_days) * SECONDS_PER_DAY);
        self.reward_for(principal, apr, seconds)
    }

    fn validate_terms(&self, principal: Amount, lock_days: u32) -> Result<()> {
        let reason = if principal <= Decimal::ZERO {
            Some("must be positive".to_string())
        } else if principal < self.policy.min_principal {
            Some(format!("below minimum {}", self.policy.min_principal))
        } else if principal > self.policy.max_principal {
            Some(format!("above maximum {}", self.policy.max_principal))
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ValidationError::InvalidPrincipal { principal, reason }.into());
        }

        let (min, max) = (self.policy.min_lock_days, self.policy.max_lock_days);
        if lock_days < min || lock_days > max {
            return Err(ValidationError::InvalidLockDuration { lock_days, min, max }.into());
        }
        Ok(())
    }

    /// Returns whether the stake is still locked; errors if locked and not forced.
    fn check_lockup(&self, stake: &StakePosition, now: DateTime<Utc>, force: bool) -> Result<bool> {
        let locked = stake.is_locked(now);
        if locked && !force {
            return Err(StateError::LockupActive {
                stake_id: stake.stake_id.clone(),
                unlocks_at: stake.unlocks_at(),
            }
            .into());
        }
        Ok(locked)
    }

    fn accrue_at(&self, stake: &mut StakePosition, now: DateTime<Utc>) -> RewardAccrual {
        let start = stake.last_accrual_time;
        if now <= start {
            if now < start {
                warn!(
                    stake_id = %stake.stake_id,
                    %now,
                    last_accrual = %start,
                    "Clock moved backwards; accruing nothing",
                );
            }
            return empty_accrual(&stake.stake_id, start);
        }

        let amount = self.reward_between(stake, start, now);
        stake.accrued_unclaimed += amount;
        stake.total_accrued += amount;
        stake.last_accrual_time = now;

        RewardAccrual {
            stake_id: stake.stake_id.clone(),
            period_start: start,
            period_end: now,
            amount,
        }
    }

    fn reward_between(
        &self,
        stake: &StakePosition,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Amount {
        let millis = (to - from).num_milliseconds().max(0);
        let seconds = Decimal::new(millis, 3);
        self.reward_for(stake.principal, stake.apr_tier, seconds)
    }

    fn reward_for(&self, principal: Amount, apr: Rate, seconds: Decimal) -> Amount {
        let per_year = Decimal::from(self.policy.seconds_per_year);
        truncate(principal * apr * seconds / per_year, self.policy.reward_scale)
    }

    fn close(
        &self,
        stake: &mut StakePosition,
        final_accrual: RewardAccrual,
        now: DateTime<Utc>,
    ) -> UnstakePayout {
        let exit_mode = stake.exit_mode.unwrap_or(ExitMode::Matured);
        let principal_returned = match exit_mode {
            ExitMode::Matured => stake.principal,
            ExitMode::Early => truncate(
                stake.principal * self.policy.early_exit_multiplier,
                self.policy.reward_scale,
            ),
        };
        let reward_paid = stake.accrued_unclaimed;

        stake.total_claimed += reward_paid;
        stake.accrued_unclaimed = Decimal::ZERO;
        stake.status = StakeStatus::Closed;
        stake.exit_mode = Some(exit_mode);

        UnstakePayout {
            stake_id: stake.stake_id.clone(),
            owner_id: stake.owner_id.clone(),
            exit_mode,
            principal_returned,
            penalty: stake.principal - principal_returned,
            reward_paid,
            final_accrual,
            closed_at: now,
        }
    }

    /// Apply `op` to a copy of `stake` and write it back only if the copy
    /// still conserves rewards.
    fn commit<T>(
        &self,
        stake: &mut StakePosition,
        op: impl FnOnce(&mut StakePosition) -> Result<T>,
    ) -> Result<T> {
        let mut working = stake.clone();
        let out = op(&mut working)?;
        if let Err(violation) = working.check_conservation() {
            error!(
                before = ?stake,
                after = ?working,
                error = %violation,
                "Stake conservation violated",
            );
            return Err(violation.into());
        }
        *stake = working;
        Ok(out)
    }
}

/// Verify a position against its persisted accrual and claim logs.
///
/// `sum(accruals) == sum(claims) + unstake reward + accrued_unclaimed`, and
/// the position's own totals must agree with the logs.
pub fn audit(
    stake: &StakePosition,
    accruals: &[RewardAccrual],
    claims: &[ClaimReceipt],
    payout: Option<&UnstakePayout>,
) -> Result<()> {
    let accrued: Decimal = accruals
        .iter()
        .filter(|a| a.stake_id == stake.stake_id)
        .map(|a| a.amount)
        .sum();
    let claimed: Decimal = claims
        .iter()
        .filter(|c| c.stake_id == stake.stake_id)
        .map(|c| c.amount)
        .sum::<Decimal>()
        + payout.map_or(Decimal::ZERO, |p| p.reward_paid);

    let consistent = accrued == claimed + stake.accrued_unclaimed
        && accrued == stake.total_accrued
        && claimed == stake.total_claimed;

    if !consistent {
        let violation = InvariantViolation::ConservationMismatch {
            stake_id: stake.stake_id.clone(),
            accrued,
            claimed,
            unclaimed: stake.accrued_unclaimed,
        };
        error!(
            stake = ?stake,
            accruals = accruals.len(),
            claims = claims.len(),
            error = %violation,
            "Stake audit failed",
        );
        return Err(violation.into());
    }
    Ok(())
}

fn ensure_open(stake: &StakePosition) -> Result<()> {
    if stake.status == StakeStatus::Closed {
        return Err(StateError::StakeClosed {
            stake_id: stake.stake_id.clone(),
        }
        .into());
    }
    Ok(())
}

fn ensure_accruing(stake: &StakePosition) -> Result<()> {
    ensure_open(stake)?;
    if stake.status != StakeStatus::Active {
        return Err(StateError::NotAccruing {
            stake_id: stake.stake_id.clone(),
            status: stake.status,
        }
        .into());
    }
    Ok(())
}
