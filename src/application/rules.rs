//! Versioned rule-set holder with reload-then-swap semantics.
//!
//! Loaded rule sets are immutable `Arc<RuleSet>` snapshots. Readers clone the
//! `Arc` under a short read lock and evaluate without holding it, so an
//! evaluation always completes against the version it started with, even if
//! a newer version is installed meanwhile.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::{Facts, RuleMatch, RuleSet};
use crate::error::{ConfigurationError, Result};
use crate::port::outbound::RuleSource;

/// Outcome of [`RuleEngine::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A newer version was installed.
    Installed(u64),
    /// The source still serves the loaded version.
    Unchanged(u64),
}

#[derive(Debug, Default)]
struct Loaded {
    latest: Option<Arc<RuleSet>>,
    history: BTreeMap<u64, Arc<RuleSet>>,
}

/// Owner of the loaded rule sets.
#[derive(Debug)]
pub struct RuleEngine {
    loaded: RwLock<Loaded>,
    retain_versions: usize,
}

impl RuleEngine {
    /// Create an empty engine keeping at most `retain_versions` versions
    /// addressable (at least one).
    #[must_use]
    pub fn new(retain_versions: usize) -> Self {
        Self {
            loaded: RwLock::new(Loaded::default()),
            retain_versions: retain_versions.max(1),
        }
    }

    /// Create an engine with `rule_set` already installed.
    #[must_use]
    pub fn with_rule_set(rule_set: RuleSet, retain_versions: usize) -> Self {
        let engine = Self::new(retain_versions);
        let version = rule_set.version();
        let set = Arc::new(rule_set);
        {
            let mut loaded = engine.loaded.write();
            loaded.history.insert(version, Arc::clone(&set));
            loaded.latest = Some(set);
        }
        engine
    }

    /// Install a new rule set. Its version must be newer than the latest.
    pub fn install(&self, rule_set: RuleSet) -> Result<u64> {
        let version = rule_set.version();
        let rules = rule_set.len();
        let set = Arc::new(rule_set);

        let evicted = {
            let mut loaded = self.loaded.write();
            if let Some(current) = &loaded.latest {
                if version <= current.version() {
                    return Err(ConfigurationError::StaleRuleSet {
                        offered: version,
                        current: current.version(),
                    }
                    .into());
                }
            }
            loaded.history.insert(version, Arc::clone(&set));
            loaded.latest = Some(set);

            let mut evicted = Vec::new();
            while loaded.history.len() > self.retain_versions {
                if let Some((old, _)) = loaded.history.pop_first() {
                    evicted.push(old);
                }
            }
            evicted
        };

        info!(version, rules, evicted = ?evicted, "Rule set installed");
        Ok(version)
    }

    /// Fetch from `source` and install the result if it is newer.
    ///
    /// The fetch runs outside any lock.
    pub fn refresh(&self, source: &dyn RuleSource) -> Result<RefreshOutcome> {
        let rule_set = source.fetch()?;
        let offered = rule_set.version();

        if self.latest_version() == Some(offered) {
            debug!(source = source.name(), version = offered, "Rule set unchanged");
            return Ok(RefreshOutcome::Unchanged(offered));
        }

        self.install(rule_set).map(RefreshOutcome::Installed)
    }

    /// Snapshot of the newest rule set.
    pub fn latest(&self) -> Result<Arc<RuleSet>> {
        self.loaded
            .read()
            .latest
            .clone()
            .ok_or_else(|| ConfigurationError::NoRuleSetLoaded.into())
    }

    #[must_use]
    pub fn latest_version(&self) -> Option<u64> {
        self.loaded.read().latest.as_ref().map(|set| set.version())
    }

    /// Snapshot of a specific version.
    pub fn snapshot(&self, version: u64) -> Result<Arc<RuleSet>> {
        self.loaded
            .read()
            .history
            .get(&version)
            .cloned()
            .ok_or_else(|| ConfigurationError::RuleSetUnavailable { version }.into())
    }

    /// Versions still addressable, ascending.
    #[must_use]
    pub fn loaded_versions(&self) -> Vec<u64> {
        self.loaded.read().history.keys().copied().collect()
    }

    /// Matching rules named `rule_name` in the given version.
    ///
    /// Deterministic for identical `(version, rule_name, facts)`.
    pub fn evaluate(&self, version: u64, rule_name: &str, facts: &Facts) -> Result<Vec<RuleMatch>> {
        let set = self.snapshot(version)?;
        Ok(set.evaluate(rule_name, facts))
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(4)
    }
}
