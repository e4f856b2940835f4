//! Local filesystem port (driven/secondary port)
//!
//! This module defines the filesystem operations the mirror needs:
//! listing a directory, copying a file with an overwrite
//! flag, deleting files, and creating or removing directories.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific.
//! - The filesystem is the sole source of truth; implementations must not
//!   cache anything between calls.
//! - All paths are `SyncPath` instances, which are guaranteed to be absolute.

use std::path::PathBuf;

use crate::domain::{entry::DirectoryListing, newtypes::SyncPath};

// ============================================================================
// ILocalFileSystem trait
// ============================================================================

/// Port trait for local filesystem operations
///
/// ## Implementation Notes
///
/// - `list_directory` follows symbolic links to classify entries and skips
///   anything that is neither a regular file nor a directory.
/// - `copy_file` must replicate the source modification time onto the
///   target so that an unchanged file compares equal on the next pass.
#[async_trait::async_trait]
pub trait ILocalFileSystem: Send + Sync {
    /// Lists the direct files and subdirectories of a directory
    ///
    /// # Errors
    /// Returns an error if the directory doesn't exist or cannot be read
    async fn list_directory(&self, path: &SyncPath) -> anyhow::Result<DirectoryListing>;

    /// Copies a file's bytes and modification time from `from` to `to`
    ///
    /// # Arguments
    /// * `from` - Existing source file
    /// * `to` - Target path
    /// * `overwrite` - When false the copy fails if `to` already exists
    async fn copy_file(&self, from: &SyncPath, to: &SyncPath, overwrite: bool)
        -> anyhow::Result<()>;

    /// Deletes a single file
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be deleted
    async fn delete_file(&self, path: &SyncPath) -> anyhow::Result<()>;

    /// Creates a single directory; the parent must already exist
    async fn create_directory(&self, path: &SyncPath) -> anyhow::Result<()>;

    /// Removes a directory and everything beneath it
    async fn remove_directory(&self, path: &SyncPath) -> anyhow::Result<()>;

    /// Resolves a path to its canonical form, following symbolic links
    ///
    /// Used to recognise a directory reached twice through links.
    async fn canonicalize(&self, path: &SyncPath) -> anyhow::Result<PathBuf>;
}
