//! Sync action classification
//!
//! Every file and subdirectory visited during a pass is classified into
//! exactly one [`SyncAction`]. Actions are computed fresh on every pass
//! and never persisted.

use serde::{Deserialize, Serialize};

/// What the mirror has to do for one entry of a directory pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Source file has no replica counterpart; copy without overwriting
    Create,
    /// Replica file is older than the source file; copy with overwrite
    Overwrite,
    /// Replica file is at least as new as the source file
    Skip,
    /// Replica file has no source counterpart
    Delete,
    /// Source subdirectory is missing in the replica; create it, then descend
    RecurseCreate,
    /// Source subdirectory already exists in the replica; descend
    RecurseExisting,
}

impl SyncAction {
    /// Returns true if carrying out the action changes the replica
    ///
    /// Every mutating action produces exactly one log record.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        match self {
            SyncAction::Create
            | SyncAction::Overwrite
            | SyncAction::Delete
            | SyncAction::RecurseCreate => true,
            SyncAction::Skip | SyncAction::RecurseExisting => false,
        }
    }

    /// Returns true if the copy for this action may replace an existing file
    #[must_use]
    pub fn allows_overwrite(&self) -> bool {
        matches!(self, SyncAction::Overwrite)
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncAction::Create => "create",
            SyncAction::Overwrite => "overwrite",
            SyncAction::Skip => "skip",
            SyncAction::Delete => "delete",
            SyncAction::RecurseCreate => "recurse_create",
            SyncAction::RecurseExisting => "recurse_existing",
        };
        write!(f, "{}", s)
    }
}
