//! Entry comparator
//!
//! Pure classification of directory entries into [`SyncAction`]s. Only
//! presence and modification time are consulted; size and content never
//! are, so an edit that keeps the timestamp is not detected.

use dirmirror_core::domain::{action::SyncAction, entry::FileEntry};

/// Classifies a source file against its same-named replica file, if any.
///
/// Equal timestamps count as unchanged: only a replica strictly older than
/// the source is overwritten.
pub fn decide(source: &FileEntry, replica: Option<&FileEntry>) -> SyncAction {
    match replica {
        None => SyncAction::Create,
        Some(replica) if replica.modified < source.modified => SyncAction::Overwrite,
        Some(_) => SyncAction::Skip,
    }
}

/// Classifies a replica file by whether the source still has that name.
pub fn decide_replica_file(source: Option<&FileEntry>) -> SyncAction {
    match source {
        Some(_) => SyncAction::Skip,
        None => SyncAction::Delete,
    }
}

/// Classifies a source subdirectory by whether the replica already has it.
pub fn decide_subdirectory(replica_exists: bool) -> SyncAction {
    if replica_exists {
        SyncAction::RecurseExisting
    } else {
        SyncAction::RecurseCreate
    }
}
