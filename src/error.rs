//! Error types for the crate.
//!
//! Errors are grouped by how a caller is expected to react:
//!
//! - [`ValidationError`] and [`StateError`] are recoverable and surfaced to the
//!   requester as-is.
//! - [`ConfigurationError`] means the evaluation cannot run at all (no rule set,
//!   stale reload). Callers must not fall back to stale data.
//! - [`InvariantViolation`] means a computed result would break a guaranteed
//!   invariant. The operation refuses to return a result.
//! - [`ConfigError`] covers the settings file.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{AssetType, CreatorId, RuleId, StakeId, StakeStatus};

/// Bad input shape or range.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid principal {principal}: {reason}")]
    InvalidPrincipal { principal: Decimal, reason: String },

    #[error("lock duration {lock_days} days outside {min}..={max}")]
    InvalidLockDuration { lock_days: u32, min: u32, max: u32 },

    #[error("creator set cannot be empty")]
    EmptyCreatorSet,

    #[error("creator '{id}' appears more than once")]
    DuplicateCreator { id: CreatorId },

    #[error("base price for {asset_type}/{region} must be positive, got {price}")]
    InvalidBasePrice {
        asset_type: AssetType,
        region: String,
        price: Decimal,
    },

    #[error("{field} = {value} outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} is too large to compute with")]
    Overflow { field: &'static str },
}

/// Missing or unusable rule data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("rule set version {version} is not loaded")]
    RuleSetUnavailable { version: u64 },

    #[error("no rule set has been loaded")]
    NoRuleSetLoaded,

    #[error("rule set version {offered} is not newer than loaded version {current}")]
    StaleRuleSet { offered: u64, current: u64 },

    #[error("rule id '{id}' is defined more than once")]
    DuplicateRuleId { id: RuleId },

    #[error("rule '{id}' has version {rule_version}, newer than its rule set ({set_version})")]
    RuleVersionAhead {
        id: RuleId,
        rule_version: u64,
        set_version: u64,
    },

    #[error("no '{rule_name}' rule matched")]
    MissingRule { rule_name: String },

    #[error("rule source failed: {0}")]
    RuleSource(String),
}

/// A computed result would break a guaranteed invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("price multiplier product {product} exceeds ceiling {ceiling}")]
    PriceOverflow { product: Decimal, ceiling: Decimal },

    #[error("price multiplier product {product} underflowed to a non-positive value")]
    PriceUnderflow { product: Decimal },

    #[error("rule '{rule_id}' produced non-positive factor {factor}")]
    NonPositiveFactor { rule_id: RuleId, factor: Decimal },

    #[error(
        "conservation broken for stake {stake_id}: accrued {accrued} != claimed {claimed} + unclaimed {unclaimed}"
    )]
    ConservationMismatch {
        stake_id: StakeId,
        accrued: Decimal,
        claimed: Decimal,
        unclaimed: Decimal,
    },

    #[error("ownership shares sum to {total}, expected 1")]
    ShareSumMismatch { total: Decimal },

    #[error("ownership share for '{id}' is negative: {share}")]
    NegativeShare { id: CreatorId, share: Decimal },
}

/// Operation not valid for the current state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("stake {stake_id} is locked until {unlocks_at}")]
    LockupActive {
        stake_id: StakeId,
        unlocks_at: DateTime<Utc>,
    },

    #[error("stake {stake_id} has nothing to claim")]
    NothingToClaim { stake_id: StakeId },

    #[error("stake {stake_id} is closed")]
    StakeClosed { stake_id: StakeId },

    #[error("stake {stake_id} is {status} and no longer accrues")]
    NotAccruing {
        stake_id: StakeId,
        status: StakeStatus,
    },

    #[error("unknown stake {stake_id}")]
    UnknownStake { stake_id: StakeId },
}

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the caller can recover by fixing its input or waiting.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::State(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
