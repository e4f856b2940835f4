//! Clock port
//!
//! Log timestamps are read through [`IClock`] rather than from the system
//! clock directly so that tests can pin them.

use chrono::{DateTime, Utc};

/// Source of the current UTC time
pub trait IClock: Send + Sync {
    /// Returns the current time
    fn now(&self) -> DateTime<Utc>;
}
