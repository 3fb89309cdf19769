//! Caller-owned cache of price estimates.
//!
//! Estimates are pure functions of `(facts, rule_set_version, base price)`,
//! so entries keyed by facts and version stay valid until the caller's base
//! prices change or the version is retired.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::domain::{PriceEstimate, PriceFacts};
use crate::error::Result;

type Key = (PriceFacts, u64);

/// Thread-safe map of `(PriceFacts, version) → PriceEstimate`.
#[derive(Debug, Default)]
pub struct EstimateCache {
    entries: RwLock<HashMap<Key, PriceEstimate>>,
}

impl EstimateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, facts: &PriceFacts, version: u64) -> Option<PriceEstimate> {
        self.entries.read().get(&(facts.clone(), version)).cloned()
    }

    /// Store an estimate under its own rule-set version.
    pub fn insert(&self, facts: PriceFacts, estimate: PriceEstimate) {
        let version = estimate.rule_set_version;
        self.entries.write().insert((facts, version), estimate);
    }

    /// Return the cached estimate or compute and store it.
    ///
    /// `estimate` runs without the lock held; concurrent misses for the same
    /// key may both compute, and the results are identical. A result computed
    /// against a different version than `version` is returned uncached.
    pub fn get_or_estimate<F>(
        &self,
        facts: &PriceFacts,
        version: u64,
        estimate: F,
    ) -> Result<PriceEstimate>
    where
        F: FnOnce() -> Result<PriceEstimate>,
    {
        if let Some(hit) = self.get(facts, version) {
            return Ok(hit);
        }
        let computed = estimate()?;
        if computed.rule_set_version != version {
            warn!(
                requested = version,
                computed = computed.rule_set_version,
                "Estimate version differs from requested version; not caching"
            );
            return Ok(computed);
        }
        self.insert(facts.clone(), computed.clone());
        Ok(computed)
    }

    /// Drop entries computed against versions older than `version`.
    pub fn invalidate_below(&self, version: u64) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(_, v), _| *v >= version);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(version, removed, "Invalidated cached estimates");
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
