//! Numeric types for amounts, factors and shares.
//!
//! Everything is a [`Decimal`] so ledger sums are exact.

use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary amount (prices, principal, rewards).
pub type Amount = Decimal;

/// Dimensionless multiplier applied to a price.
pub type Factor = Decimal;

/// Annual rate, e.g. `0.12` for 12% APR.
pub type Rate = Decimal;

/// Ownership fraction in `0..=1`.
pub type Share = Decimal;

/// Round toward zero to `scale` decimal places.
///
/// Used wherever a fixed-precision value is handed out, so the core never
/// pays more than it computed.
#[must_use]
pub fn truncate(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::ToZero)
}
