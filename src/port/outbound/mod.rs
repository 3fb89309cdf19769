//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the data the core consumes but never fetches
//! itself: rule sets, base prices and the current time.

pub mod clock;
pub mod price;
pub mod rules;

pub use clock::Clock;
pub use price::BasePriceLookup;
pub use rules::RuleSource;
