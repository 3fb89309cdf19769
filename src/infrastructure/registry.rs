//! In-memory stake registry.
//!
//! Each stake lives behind its own mutex, so mutations of one stake are
//! serialized while different stakes proceed in parallel. The registry keeps
//! each stake's accrual and claim log for [`audit`].

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::application::{audit, StakingLedger};
use crate::domain::{
    ClaimReceipt, OwnerId, RewardAccrual, StakeId, StakePosition, StakeRequest, StakeStatus,
    UnstakePayout,
};
use crate::error::{Result, StateError};

#[derive(Debug)]
struct StakeEntry {
    position: StakePosition,
    accruals: Vec<RewardAccrual>,
    claims: Vec<ClaimReceipt>,
    payout: Option<UnstakePayout>,
}

impl StakeEntry {
    fn record_accrual(&mut self, accrual: &RewardAccrual) {
        if !accrual.amount.is_zero() {
            self.accruals.push(accrual.clone());
        }
    }
}

/// Concurrent owner of stake positions.
pub struct StakeRegistry {
    ledger: Arc<StakingLedger>,
    stakes: DashMap<StakeId, Arc<Mutex<StakeEntry>>>,
}

impl StakeRegistry {
    #[must_use]
    pub fn new(ledger: Arc<StakingLedger>) -> Self {
        Self {
            ledger,
            stakes: DashMap::new(),
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &StakingLedger {
        &self.ledger
    }

    pub fn open(&self, request: StakeRequest) -> Result<StakePosition> {
        let position = self.ledger.open_stake(request)?;
        let entry = StakeEntry {
            position: position.clone(),
            accruals: Vec::new(),
            claims: Vec::new(),
            payout: None,
        };
        self.stakes
            .insert(position.stake_id().clone(), Arc::new(Mutex::new(entry)));
        Ok(position)
    }

    pub fn accrue(&self, stake_id: &StakeId) -> Result<RewardAccrual> {
        self.with_entry(stake_id, |ledger, entry| {
            let accrual = ledger.accrue(&mut entry.position)?;
            entry.record_accrual(&accrual);
            Ok(accrual)
        })
    }

    pub fn claim(&self, stake_id: &StakeId) -> Result<ClaimReceipt> {
        self.with_entry(stake_id, |ledger, entry| {
            let receipt = ledger.claim(&mut entry.position)?;
            entry.claims.push(receipt.clone());
            Ok(receipt)
        })
    }

    pub fn begin_unstake(&self, stake_id: &StakeId, force: bool) -> Result<RewardAccrual> {
        self.with_entry(stake_id, |ledger, entry| {
            let accrual = ledger.begin_unstake(&mut entry.position, force)?;
            entry.record_accrual(&accrual);
            Ok(accrual)
        })
    }

    pub fn unstake(&self, stake_id: &StakeId, force: bool) -> Result<UnstakePayout> {
        self.with_entry(stake_id, |ledger, entry| {
            let payout = ledger.unstake(&mut entry.position, force)?;
            entry.record_accrual(&payout.final_accrual);
            entry.payout = Some(payout.clone());
            Ok(payout)
        })
    }

    /// Accrue every active stake in stake-id order.
    ///
    /// Stops at the first failure; stakes accrued before it keep their accrual.
    pub fn accrue_all(&self) -> Result<Vec<RewardAccrual>> {
        let mut ids: Vec<StakeId> = self.stakes.iter().map(|e| e.key().clone()).collect();
        ids.sort();

        let mut accruals = Vec::new();
        for id in ids {
            let accrual = self.with_entry(&id, |ledger, entry| {
                if entry.position.status() != StakeStatus::Active {
                    return Ok(None);
                }
                let accrual = ledger.accrue(&mut entry.position)?;
                entry.record_accrual(&accrual);
                Ok(Some(accrual))
            })?;
            accruals.extend(accrual);
        }
        Ok(accruals)
    }

    /// Snapshot of one position.
    pub fn position(&self, stake_id: &StakeId) -> Result<StakePosition> {
        let entry = self.entry(stake_id)?;
        let position = entry.lock().position.clone();
        Ok(position)
    }

    /// Positions owned by `owner`, ordered by start time.
    #[must_use]
    pub fn positions_of(&self, owner: &OwnerId) -> Vec<StakePosition> {
        let entries: Vec<_> = self.stakes.iter().map(|e| Arc::clone(e.value())).collect();
        let mut positions: Vec<StakePosition> = entries
            .iter()
            .map(|entry| entry.lock().position.clone())
            .filter(|p| p.owner_id() == owner)
            .collect();
        positions.sort_by(|a, b| {
            a.start_time()
                .cmp(&b.start_time())
                .then_with(|| a.stake_id().cmp(b.stake_id()))
        });
        positions
    }

    /// Check one stake against its recorded accruals and claims.
    pub fn audit(&self, stake_id: &StakeId) -> Result<()> {
        let entry = self.entry(stake_id)?;
        let entry = entry.lock();
        audit(
            &entry.position,
            &entry.accruals,
            &entry.claims,
            entry.payout.as_ref(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    fn entry(&self, stake_id: &StakeId) -> Result<Arc<Mutex<StakeEntry>>> {
        self.stakes
            .get(stake_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| {
                StateError::UnknownStake {
                    stake_id: stake_id.clone(),
                }
                .into()
            })
    }

    fn with_entry<T>(
        &self,
        stake_id: &StakeId,
        op: impl FnOnce(&StakingLedger, &mut StakeEntry) -> Result<T>,
    ) -> Result<T> {
        let entry = self.entry(stake_id)?;
        let mut guard = entry.lock();
        op(self.ledger.as_ref(), &mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{RuleEngine, StakingPolicy};
    use crate::domain::{AssetId, AssetType};
    use crate::error::Error;
    use crate::infrastructure::rules::builtin_rule_set;
    use crate::testkit::clock::ManualClock;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn registry() -> (StakeRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let rules = Arc::new(RuleEngine::with_rule_set(builtin_rule_set().unwrap(), 2));
        let ledger = StakingLedger::new(rules, StakingPolicy::default(), clock.clone());
        (StakeRegistry::new(Arc::new(ledger)), clock)
    }

    fn request(owner: &str) -> StakeRequest {
        StakeRequest {
            owner: OwnerId::new(owner),
            asset: AssetId::new("asset-1"),
            asset_type: AssetType::Nft,
            principal: dec!(500),
            lock_days: 0,
        }
    }

    #[test]
    fn unknown_stake_is_a_state_error() {
        let (registry, _) = registry();
        assert!(matches!(
            registry.accrue(&StakeId::new("missing")),
            Err(Error::State(StateError::UnknownStake { .. }))
        ));
    }

    #[test]
    fn log_survives_full_lifecycle_audit() {
        let (registry, clock) = registry();
        let id = registry.open(request("alice")).unwrap().stake_id().clone();

        clock.advance(Duration::days(10));
        registry.accrue(&id).unwrap();
        registry.claim(&id).unwrap();
        clock.advance(Duration::days(5));
        registry.begin_unstake(&id, false).unwrap();
        registry.unstake(&id, false).unwrap();

        registry.audit(&id).unwrap();
        assert_eq!(registry.position(&id).unwrap().status(), StakeStatus::Closed);
    }

    #[test]
    fn accrue_all_skips_stakes_that_are_not_active() {
        let (registry, clock) = registry();
        let open = registry.open(request("alice")).unwrap().stake_id().clone();
        let closed = registry.open(request("bob")).unwrap().stake_id().clone();

        clock.advance(Duration::days(1));
        registry.unstake(&closed, false).unwrap();
        clock.advance(Duration::days(1));

        let accruals = registry.accrue_all().unwrap();
        assert_eq!(accruals.len(), 1);
        assert_eq!(accruals[0].stake_id, open);
        assert!(accruals[0].amount > rust_decimal::Decimal::ZERO);
        registry.audit(&open).unwrap();
        registry.audit(&closed).unwrap();
    }

    #[test]
    fn positions_are_listed_per_owner() {
        let (registry, _) = registry();
        registry.open(request("alice")).unwrap();
        registry.open(request("bob")).unwrap();
        registry.open(request("alice")).unwrap();

        assert_eq!(registry.positions_of(&OwnerId::new("alice")).len(), 2);
        assert_eq!(registry.len(), 3);
    }
}
