//! Application services: rule evaluation, pricing, allocation and staking.
//!
//! Services hold no mutable domain state of their own apart from the
//! [`RuleEngine`]'s loaded rule sets; positions and proposals are owned by
//! callers.

pub mod collaboration;
pub mod pricing;
pub mod rules;
pub mod staking;

pub use collaboration::{AllocationPolicy, CollaborationOptimizer};
pub use pricing::{PricingEngine, PricingLimits};
pub use rules::{RefreshOutcome, RuleEngine};
pub use staking::{audit, StakingLedger, StakingPolicy, APR_BASE_RULE, APR_MULTIPLIER_RULE};
