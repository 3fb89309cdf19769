//! Time source port.

use chrono::{DateTime, Utc};

/// Supplies the current instant to time-dependent operations.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
