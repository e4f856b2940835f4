//! Domain entities and business logic
//!
//! This module contains the core domain types for dirmirror:
//! - Validated path newtype
//! - Directory entry snapshots used for comparison
//! - Sync action classification
//! - Mirror policies
//! - Operator log records
//! - Domain-specific error types

pub mod action;
pub mod entry;
pub mod errors;
pub mod log_record;
pub mod newtypes;
pub mod policy;

// Re-export commonly used types
pub use action::SyncAction;
pub use entry::{DirectoryEntry, DirectoryListing, FileEntry};
pub use errors::DomainError;
pub use log_record::{LogRecord, LOG_FILE_NAME, TIMESTAMP_FORMAT};
pub use newtypes::SyncPath;
pub use policy::{ErrorPolicy, OrphanDirectoryPolicy};
