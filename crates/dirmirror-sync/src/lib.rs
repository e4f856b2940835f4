//! dirmirror sync - one-way tree mirror
//!
//! Provides:
//! - Per-entry change classification by modification time
//! - Recursive mirroring of one directory pair
//! - A fixed-interval scheduler that isolates failed passes
//!
//! ## Modules
//!
//! - [`comparator`] - Decides the [`SyncAction`](dirmirror_core::domain::SyncAction) for each entry
//! - [`mirror`] - Tree mirror applying copy, delete and recurse actions
//! - [`scheduler`] - Periodic pass loop with cancellation
//! - [`filesystem`] - Local filesystem adapter (staged copies, mtime replication)

pub mod comparator;
pub mod filesystem;
pub mod mirror;
pub mod scheduler;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// A source directory links back to one of its own ancestors
    #[error("Directory cycle detected at {0}")]
    CycleDetected(PathBuf),

    /// The source tree is deeper than the configured limit
    #[error("Maximum directory depth {max_depth} exceeded at {path}")]
    DepthExceeded {
        /// Directory that would have been entered
        path: PathBuf,
        /// Configured limit
        max_depth: usize,
    },

    /// One or more entry operations failed; the rest of the pass completed
    #[error("{} operation(s) failed: {}", .failures.len(), .failures.join("; "))]
    PassIncomplete {
        /// One message per failed operation, in the order they occurred
        failures: Vec<String>,
    },
}
