//! Rule-source port.

use crate::domain::RuleSet;
use crate::error::Result;

/// Supplies the current rule set as versioned data.
///
/// Versions must increase monotonically between successive fetches that
/// carry different rules.
pub trait RuleSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Load the current rule set.
    fn fetch(&self) -> Result<RuleSet>;
}
