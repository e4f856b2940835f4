//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`ILocalFileSystem`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Staged copies**: Bytes are copied to a uniquely named hidden sibling
//!   (`.dirmirror-XXXXXX.tmp`, created exclusively so it never replaces an
//!   existing file), the source timestamps are applied, and only then is the
//!   file renamed into place. A crash mid-copy leaves a stray temporary that
//!   the next pass sweeps as an orphan, never a truncated file with a fresh
//!   timestamp.
//! - **No-overwrite creates**: When `overwrite` is false the final rename
//!   refuses to replace a target that appeared in the meantime.
//! - **Symlinks**: Listing follows links to classify entries; dangling links
//!   and special files are left out.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use dirmirror_core::{
    domain::{
        entry::{DirectoryEntry, DirectoryListing, FileEntry},
        newtypes::SyncPath,
    },
    ports::local_filesystem::ILocalFileSystem,
};
use filetime::FileTime;
use tracing::{debug, instrument};

/// Prefix of the temporary siblings used while copying.
const STAGING_PREFIX: &str = ".dirmirror-";

/// Suffix of the temporary siblings used while copying.
const STAGING_SUFFIX: &str = ".tmp";

// ============================================================================
// LocalFileSystemAdapter struct
// ============================================================================

/// Adapter that bridges the [`ILocalFileSystem`] port to the real filesystem.
///
/// This is a zero-sized struct because all operations derive their context
/// from the [`SyncPath`] arguments.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Copies `from` into a fresh temporary sibling of `to`, applies the source
/// permissions and timestamps, then moves it onto `to`.
///
/// The temporary file is removed on every error path.
fn stage_and_place(from: &Path, to: &Path, overwrite: bool) -> anyhow::Result<()> {
    let dir = to
        .parent()
        .with_context(|| format!("'{}' has no parent folder", to.display()))?;
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(STAGING_SUFFIX)
        .tempfile_in(dir)
        .with_context(|| format!("cannot create staging file in '{}'", dir.display()))?;
    debug!(staging = %staged.path().display(), "copying to staging file");

    let mut source = File::open(from)?;
    let metadata = source.metadata()?;
    std::io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().set_permissions(metadata.permissions())?;
    filetime::set_file_handle_times(
        staged.as_file(),
        Some(FileTime::from_last_access_time(&metadata)),
        Some(FileTime::from_last_modification_time(&metadata)),
    )?;

    if overwrite {
        staged.persist(to).map_err(|e| e.error)?;
    } else {
        staged.persist_noclobber(to).map_err(|e| e.error)?;
    }
    Ok(())
}

/// Converts the modification time reported by `metadata` to UTC.
fn modified_utc(metadata: &std::fs::Metadata) -> std::io::Result<DateTime<Utc>> {
    metadata.modified().map(DateTime::<Utc>::from)
}

// ============================================================================
// ILocalFileSystem implementation
// ============================================================================

#[async_trait::async_trait]
impl ILocalFileSystem for LocalFileSystemAdapter {
    #[instrument(skip(self), fields(path = %path))]
    async fn list_directory(&self, path: &SyncPath) -> anyhow::Result<DirectoryListing> {
        let mut files = Vec::new();
        let mut directories = Vec::new();

        let mut entries = tokio::fs::read_dir(path.as_path()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let entry_path = path.join(&name)?;

            // Follow symlinks so a linked file or directory is treated as its target.
            let metadata = match tokio::fs::metadata(entry_path.as_path()).await {
                Ok(m) => m,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(entry = %entry_path, "skipping dangling or vanished entry");
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("cannot stat '{entry_path}'"));
                }
            };

            if metadata.is_file() {
                let modified = modified_utc(&metadata)
                    .with_context(|| format!("cannot read modification time of '{entry_path}'"))?;
                files.push(FileEntry::new(name, entry_path, modified, metadata.len()));
            } else if metadata.is_dir() {
                directories.push(DirectoryEntry::new(name, entry_path));
            } else {
                debug!(entry = %entry_path, "skipping special file");
            }
        }

        debug!(
            files = files.len(),
            directories = directories.len(),
            "directory listed"
        );
        Ok(DirectoryListing::new(files, directories))
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    async fn copy_file(
        &self,
        from: &SyncPath,
        to: &SyncPath,
        overwrite: bool,
    ) -> anyhow::Result<()> {
        let (source, target) = (from.as_path().to_path_buf(), to.as_path().to_path_buf());
        tokio::task::spawn_blocking(move || stage_and_place(&source, &target, overwrite)).await??;

        debug!("copy finished");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn delete_file(&self, path: &SyncPath) -> anyhow::Result<()> {
        tokio::fs::remove_file(path.as_path()).await?;
        debug!("file deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn create_directory(&self, path: &SyncPath) -> anyhow::Result<()> {
        tokio::fs::create_dir(path.as_path()).await?;
        debug!("directory created");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn remove_directory(&self, path: &SyncPath) -> anyhow::Result<()> {
        tokio::fs::remove_dir_all(path.as_path()).await?;
        debug!("directory removed");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn canonicalize(&self, path: &SyncPath) -> anyhow::Result<PathBuf> {
        Ok(tokio::fs::canonicalize(path.as_path()).await?)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
