//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`] - `ManualClock`, a [`Clock`](crate::port::outbound::Clock)
//!   advanced by hand.
//! - [`domain`] - Builders for creators, price facts and rules.
//! - [`config`] - Canonical service wiring over the builtin rules.

pub mod clock;
pub mod config;
pub mod domain;
