//! Assetflow - pricing, ownership splits and staking rewards for tradable
//! digital assets.
//!
//! The crate is a synchronous core driven by a versioned table of symbolic
//! rules. Callers own all persistent state; the core computes prices,
//! ownership proposals and reward accruals deterministically from its
//! inputs, the rule-set version, and the clock.
//!
//! # Architecture
//!
//! - **`domain`** - Value types: facts, rules, estimates, proposals, stakes
//! - **`application`** - The four services
//!   - `RuleEngine` - Versioned rule sets with reload-then-swap
//!   - `PricingEngine` - Base price times per-category multipliers
//!   - `CollaborationOptimizer` - Fair-share ownership and royalty splits
//!   - `StakingLedger` - Stake lifecycle, accrual and claims
//! - **`port`** - Collaborator contracts: rule source, base prices, clock
//! - **`infrastructure`** - Config, rule sources, price table, registry
//!
//! # Modules
//!
//! - [`domain`] - Value types and invariants
//! - [`application`] - Services
//! - [`port`] - Outbound ports
//! - [`infrastructure`] - Adapters and wiring
//! - [`error`] - Error types for the crate
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use assetflow::application::{PricingEngine, PricingLimits, RuleEngine};
//! use assetflow::domain::{AssetType, PriceFacts};
//! use assetflow::infrastructure::price_table::BasePriceTable;
//! use assetflow::infrastructure::rules::builtin_rule_set;
//! use rust_decimal_macros::dec;
//!
//! # fn main() -> assetflow::error::Result<()> {
//! let rules = Arc::new(RuleEngine::with_rule_set(builtin_rule_set()?, 4));
//! let pricing = PricingEngine::new(rules, PricingLimits::default());
//! let facts = PriceFacts::new(AssetType::Nft, "mumbai", dec!(85), dec!(0.8));
//! let estimate = pricing.estimate(&facts, &BasePriceTable::default())?;
//! println!("{}", estimate.final_price);
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
