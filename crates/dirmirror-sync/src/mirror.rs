//! Tree mirror
//!
//! The [`TreeMirror`] makes one replica directory tree match one source
//! directory tree. Each directory level is handled in a fixed order:
//!
//! 1. **Copy**: every source file missing from the replica is copied, every
//!    replica file older than its source file is overwritten.
//! 2. **Sweep**: every replica file without a same-named source file is deleted.
//!    With [`OrphanDirectoryPolicy::Remove`] replica-only subdirectories are
//!    removed here too.
//! 3. **Recurse**: every source subdirectory is created in the replica if
//!    absent and then mirrored the same way.
//!
//! Every mutation is reported through the [`ILogSink`]; skipped files are not.
//!
//! ## Failures
//!
//! With [`ErrorPolicy::Abort`] the first failed operation ends the pass and
//! is returned. With [`ErrorPolicy::Continue`] failed operations are
//! collected, independent entries are still processed, and the pass ends
//! with [`SyncError::PassIncomplete`]. A directory that cannot be listed
//! skips only its own subtree.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use dirmirror_core::{
    config::{SyncSettings, DEFAULT_MAX_DEPTH},
    domain::{
        action::SyncAction,
        entry::{DirectoryEntry, DirectoryListing, FileEntry},
        newtypes::SyncPath,
        policy::{ErrorPolicy, OrphanDirectoryPolicy},
    },
    ports::{local_filesystem::ILocalFileSystem, log_sink::ILogSink},
};
use tracing::{debug, info, warn};

use crate::{comparator, SyncError};

// ============================================================================
// MirrorOptions / PassSummary
// ============================================================================

/// Policies applied by the mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorOptions {
    pub orphan_directories: OrphanDirectoryPolicy,
    pub on_error: ErrorPolicy,
    /// Levels below the root the mirror may descend
    pub max_depth: usize,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            orphan_directories: OrphanDirectoryPolicy::default(),
            on_error: ErrorPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<&SyncSettings> for MirrorOptions {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            orphan_directories: settings.orphan_directories,
            on_error: settings.on_error,
            max_depth: settings.max_depth,
        }
    }
}

/// Counts of what a completed pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Files copied into the replica for the first time
    pub copied: u32,
    /// Replica files replaced by a newer source file
    pub overwritten: u32,
    /// Orphan replica files deleted
    pub deleted: u32,
    /// Replica subdirectories created
    pub directories_created: u32,
    /// Orphan replica subdirectories removed
    pub directories_removed: u32,
    /// Files already up to date
    pub skipped: u32,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl PassSummary {
    /// Number of log records the pass produced
    pub fn mutations(&self) -> u32 {
        self.copied
            + self.overwritten
            + self.deleted
            + self.directories_created
            + self.directories_removed
    }
}

/// Mutable state threaded through one pass
#[derive(Default)]
struct Pass {
    summary: PassSummary,
    failures: Vec<String>,
    /// Canonical paths of the source directories currently being mirrored
    ancestors: Vec<PathBuf>,
}

type LevelFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

// ============================================================================
// TreeMirror
// ============================================================================

/// Recursive one-way mirror of a directory pair
pub struct TreeMirror {
    fs: Arc<dyn ILocalFileSystem>,
    sink: Arc<dyn ILogSink>,
    options: MirrorOptions,
}

impl TreeMirror {
    /// Creates a mirror over the given filesystem, reporting to `sink`
    pub fn new(
        fs: Arc<dyn ILocalFileSystem>,
        sink: Arc<dyn ILogSink>,
        options: MirrorOptions,
    ) -> Self {
        Self { fs, sink, options }
    }

    /// Runs one full pass making `replica` match `source`
    ///
    /// # Errors
    /// Returns the first failure under [`ErrorPolicy::Abort`], or
    /// [`SyncError::PassIncomplete`] under [`ErrorPolicy::Continue`] if any
    /// operation failed. Failing to list the root pair is always returned
    /// directly. Work done before a failure is kept.
    pub async fn mirror(&self, source: &SyncPath, replica: &SyncPath) -> Result<PassSummary> {
        let started = Instant::now();
        let mut pass = Pass::default();

        let root = self
            .fs
            .canonicalize(source)
            .await
            .with_context(|| format!("cannot resolve source folder '{source}'"))?;
        pass.ancestors.push(root);

        self.mirror_level(source, replica, 0, &mut pass).await?;

        pass.summary.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            copied = pass.summary.copied,
            overwritten = pass.summary.overwritten,
            deleted = pass.summary.deleted,
            directories_created = pass.summary.directories_created,
            directories_removed = pass.summary.directories_removed,
            skipped = pass.summary.skipped,
            failures = pass.failures.len(),
            duration_ms = pass.summary.duration_ms,
            "Mirror pass finished"
        );

        if pass.failures.is_empty() {
            Ok(pass.summary)
        } else {
            Err(SyncError::PassIncomplete {
                failures: pass.failures,
            }
            .into())
        }
    }

    /// Mirrors one directory level, then recurses
    ///
    /// Boxed because async recursion needs an indirection.
    fn mirror_level<'a>(
        &'a self,
        source: &'a SyncPath,
        replica: &'a SyncPath,
        depth: usize,
        pass: &'a mut Pass,
    ) -> LevelFuture<'a> {
        Box::pin(async move {
            debug!(%source, %replica, depth, "mirroring directory");

            let source_listing = self
                .fs
                .list_directory(source)
                .await
                .with_context(|| format!("cannot list source folder '{source}'"))?;
            let replica_listing = self
                .fs
                .list_directory(replica)
                .await
                .with_context(|| format!("cannot list replica folder '{replica}'"))?;

            // 1. copy / overwrite
            for file in &source_listing.files {
                let action = comparator::decide(file, replica_listing.file(file.name()));
                let result = self
                    .apply_file_action(action, Some(file), replica, &file.name, pass)
                    .await;
                self.settle(result, pass)?;
            }

            // 2. orphan sweep
            for file in &replica_listing.files {
                let action = comparator::decide_replica_file(source_listing.file(file.name()));
                let result = self
                    .apply_file_action(action, None, replica, &file.name, pass)
                    .await;
                self.settle(result, pass)?;
            }
            if self.options.orphan_directories == OrphanDirectoryPolicy::Remove {
                let result = self
                    .remove_orphan_directories(&source_listing, &replica_listing, replica, pass)
                    .await;
                self.settle(result, pass)?;
            }

            // 3. recurse
            for dir in &source_listing.directories {
                let result = self
                    .descend(dir, &replica_listing, replica, depth + 1, pass)
                    .await;
                self.settle(result, pass)?;
            }

            Ok(())
        })
    }

    /// Carries out a file-level action inside `replica_dir`
    ///
    /// `source` is the source file for Create/Overwrite and `None` for the
    /// sweep.
    async fn apply_file_action(
        &self,
        action: SyncAction,
        source: Option<&FileEntry>,
        replica_dir: &SyncPath,
        name: &std::ffi::OsStr,
        pass: &mut Pass,
    ) -> Result<()> {
        let target = replica_dir.join(name)?;
        if action.is_mutation() {
            debug!(%target, %action, "applying action");
        }

        match (action, source) {
            (SyncAction::Create | SyncAction::Overwrite, Some(source)) => {
                self.fs
                    .copy_file(&source.path, &target, action.allows_overwrite())
                    .await
                    .with_context(|| format!("cannot copy '{}' to '{target}'", source.path))?;

                if action == SyncAction::Create {
                    pass.summary.copied += 1;
                    self.sink
                        .record(&format!("The '{}' was copied to '{target}'", source.path));
                } else {
                    pass.summary.overwritten += 1;
                    self.sink.record(&format!(
                        "The '{}' was modified. Replicating the modification in '{target}'",
                        source.path
                    ));
                }
            }
            (SyncAction::Delete, _) => {
                self.fs
                    .delete_file(&target)
                    .await
                    .with_context(|| format!("cannot delete '{target}'"))?;

                pass.summary.deleted += 1;
                self.sink
                    .record(&format!("The '{target}' was deleted in '{replica_dir}'"));
            }
            (SyncAction::Skip, Some(_)) => pass.summary.skipped += 1,
            // Skip in the sweep means the file is kept; counted in step 1.
            (SyncAction::Skip, None) => {}
            (SyncAction::Create | SyncAction::Overwrite, None) => {
                debug!(%target, %action, "copy action without a source file ignored");
            }
            (SyncAction::RecurseCreate | SyncAction::RecurseExisting, _) => {
                debug!(%target, %action, "directory action ignored for a file");
            }
        }

        Ok(())
    }

    /// Removes replica subdirectories whose name is not a source subdirectory
    async fn remove_orphan_directories(
        &self,
        source_listing: &DirectoryListing,
        replica_listing: &DirectoryListing,
        replica_dir: &SyncPath,
        pass: &mut Pass,
    ) -> Result<()> {
        for dir in &replica_listing.directories {
            if source_listing.has_directory(&dir.name) {
                continue;
            }

            let result = self
                .fs
                .remove_directory(&dir.path)
                .await
                .with_context(|| format!("cannot remove folder '{}'", dir.path));
            if result.is_ok() {
                pass.summary.directories_removed += 1;
                self.sink.record(&format!(
                    "The subfolder '{}' was deleted in '{replica_dir}'",
                    dir.name.to_string_lossy()
                ));
            }
            self.settle(result, pass)?;
        }
        Ok(())
    }

    /// Creates the replica counterpart of a source subdirectory if needed
    /// and mirrors into it
    async fn descend(
        &self,
        dir: &DirectoryEntry,
        replica_listing: &DirectoryListing,
        replica_dir: &SyncPath,
        depth: usize,
        pass: &mut Pass,
    ) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(SyncError::DepthExceeded {
                path: dir.path.as_path().to_path_buf(),
                max_depth: self.options.max_depth,
            }
            .into());
        }

        let real = self
            .fs
            .canonicalize(&dir.path)
            .await
            .with_context(|| format!("cannot resolve source folder '{}'", dir.path))?;
        if pass.ancestors.contains(&real) {
            return Err(SyncError::CycleDetected(dir.path.as_path().to_path_buf()).into());
        }

        let target = replica_dir.join(&dir.name)?;
        match comparator::decide_subdirectory(replica_listing.has_directory(&dir.name)) {
            SyncAction::RecurseCreate => {
                self.fs
                    .create_directory(&target)
                    .await
                    .with_context(|| format!("cannot create folder '{target}'"))?;

                pass.summary.directories_created += 1;
                self.sink.record(&format!(
                    "The subfolder '{}' was created in '{replica_dir}'",
                    dir.name.to_string_lossy()
                ));
            }
            SyncAction::RecurseExisting => {}
            other => debug!(%target, action = %other, "file action ignored for a folder"),
        }

        pass.ancestors.push(real);
        let result = self.mirror_level(&dir.path, &target, depth, pass).await;
        pass.ancestors.pop();
        result
    }

    /// Applies the error policy to the outcome of one operation
    fn settle(&self, result: Result<()>, pass: &mut Pass) -> Result<()> {
        match (result, self.options.on_error) {
            (Ok(()), _) => Ok(()),
            (Err(e), ErrorPolicy::Abort) => Err(e),
            (Err(e), ErrorPolicy::Continue) => {
                warn!(error = %format!("{e:#}"), "Mirror operation failed, continuing pass");
                pass.failures.push(format!("{e:#}"));
                Ok(())
            }
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
