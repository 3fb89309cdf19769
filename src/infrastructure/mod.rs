//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, rule sources, base prices, time, and
//! caller-side state holders.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for service wiring
//! - [`cache`] - Price estimate cache
//! - [`clock`] - System clock
//! - [`config`] - Configuration loading and validation
//! - [`price_table`] - Base-price table
//! - [`registry`] - In-memory stake registry
//! - [`rules`] - Builtin and file-backed rule sources

pub mod bootstrap;
pub mod cache;
pub mod clock;
pub mod config;
pub mod price_table;
pub mod registry;
pub mod rules;
