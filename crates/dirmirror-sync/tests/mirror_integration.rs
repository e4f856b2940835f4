//! Integration test: TreeMirror → real filesystem → log.txt
//!
//! Mirrors temporary directory trees with the real filesystem adapter and a
//! FileLogSink pinned to a fixed clock, then checks both the replica tree and
//! the lines written to the operator log.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use dirmirror_audit::{FileLogSink, FixedClock};
use dirmirror_core::domain::{
    newtypes::SyncPath,
    policy::{ErrorPolicy, OrphanDirectoryPolicy},
};
use dirmirror_sync::{
    filesystem::LocalFileSystemAdapter,
    mirror::{MirrorOptions, PassSummary, TreeMirror},
};
use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;

const STAMP: &str = "03/02/2024 08:30:00";

struct Harness {
    _dir: TempDir,
    source: SyncPath,
    replica: SyncPath,
    logs: PathBuf,
    mirror: TreeMirror,
}

impl Harness {
    fn new(options: MirrorOptions) -> Self {
        let dir = TempDir::new().unwrap();
        let base = dir.path().canonicalize().unwrap();
        for name in ["source", "replica", "logs"] {
            std::fs::create_dir(base.join(name)).unwrap();
        }

        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap(),
        ));
        let sink = FileLogSink::new(&base.join("logs"), clock).with_console(io::sink());
        let mirror = TreeMirror::new(
            Arc::new(LocalFileSystemAdapter::new()),
            Arc::new(sink),
            options,
        );

        Self {
            source: SyncPath::new(base.join("source")).unwrap(),
            replica: SyncPath::new(base.join("replica")).unwrap(),
            logs: base.join("logs").join("log.txt"),
            mirror,
            _dir: dir,
        }
    }

    async fn pass(&self) -> anyhow::Result<PassSummary> {
        self.mirror.mirror(&self.source, &self.replica).await
    }

    fn src(&self, rel: &str) -> PathBuf {
        self.source.as_path().join(rel)
    }

    fn dst(&self, rel: &str) -> PathBuf {
        self.replica.as_path().join(rel)
    }

    fn log_lines(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.logs) {
            Ok(text) => text.lines().map(str::to_owned).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => panic!("cannot read log: {e}"),
        }
    }
}

fn write(path: &Path, contents: &str, mtime: i64) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

/// Relative path → file contents (`None` for directories)
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    let mut out = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            let rel = path.strip_prefix(root).unwrap().to_path_buf();
            if path.is_dir() {
                out.insert(rel, None);
                stack.push(path);
            } else {
                out.insert(rel, Some(std::fs::read(&path).unwrap()));
            }
        }
    }
    out
}

fn mtime(path: &Path) -> FileTime {
    FileTime::from_last_modification_time(&std::fs::metadata(path).unwrap())
}

#[tokio::test]
async fn test_documented_scenario_and_quiet_second_pass() {
    let h = Harness::new(MirrorOptions::default());
    write(&h.src("a.txt"), "v2", 2_000);
    write(&h.src("sub/b.txt"), "b", 1_500);
    write(&h.dst("a.txt"), "v1", 1_000);
    write(&h.dst("orphan.txt"), "o", 1_000);

    let summary = h.pass().await.unwrap();

    assert_eq!(summary.overwritten, 1);
    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.directories_created, 1);
    assert_eq!(summary.copied, 1);
    assert_eq!(
        h.log_lines(),
        vec![
            format!(
                "The '{}' was modified. Replicating the modification in '{}' - {STAMP}",
                h.src("a.txt").display(),
                h.dst("a.txt").display()
            ),
            format!(
                "The '{}' was deleted in '{}' - {STAMP}",
                h.dst("orphan.txt").display(),
                h.replica
            ),
            format!("The subfolder 'sub' was created in '{}' - {STAMP}", h.replica),
            format!(
                "The '{}' was copied to '{}' - {STAMP}",
                h.src("sub/b.txt").display(),
                h.dst("sub/b.txt").display()
            ),
        ]
    );

    let second = h.pass().await.unwrap();
    assert_eq!(second.mutations(), 0);
    assert_eq!(h.log_lines().len(), 4);
}

#[tokio::test]
async fn test_replica_converges_to_source() {
    let h = Harness::new(MirrorOptions::default());
    write(&h.src("top.txt"), "top", 1_000);
    write(&h.src("l1/one.txt"), "one", 1_000);
    write(&h.src("l1/l2/two.txt"), "two", 1_000);
    write(&h.src("l1/l2/l3/three.txt"), "three", 1_000);
    std::fs::create_dir_all(h.src("empty/nested")).unwrap();
    write(&h.dst("l1/stale.txt"), "stale", 1_000);
    write(&h.dst("l1/l2/two.txt"), "old two", 500);

    h.pass().await.unwrap();

    assert_eq!(snapshot(h.source.as_path()), snapshot(h.replica.as_path()));
    assert_eq!(mtime(&h.dst("l1/l2/l3/three.txt")), FileTime::from_unix_time(1_000, 0));
}

#[tokio::test]
async fn test_equal_timestamps_are_not_copied() {
    let h = Harness::new(MirrorOptions::default());
    write(&h.src("same.txt"), "source bytes", 1_000);
    write(&h.dst("same.txt"), "replica bytes", 1_000);

    let summary = h.pass().await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(std::fs::read_to_string(h.dst("same.txt")).unwrap(), "replica bytes");
    assert!(h.log_lines().is_empty());
}

#[tokio::test]
async fn test_source_file_named_like_staging_file_converges() {
    let h = Harness::new(MirrorOptions::default());
    write(&h.src("foo"), "foo body", 1_000);
    write(&h.src(".dirmirror-foo.tmp"), "hidden body", 1_000);

    let first = h.pass().await.unwrap();
    assert_eq!(first.copied, 2);
    assert_eq!(first.deleted, 0);

    let second = h.pass().await.unwrap();
    assert_eq!(second.mutations(), 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(h.log_lines().len(), 2);

    assert_eq!(std::fs::read_to_string(h.dst("foo")).unwrap(), "foo body");
    assert_eq!(
        std::fs::read_to_string(h.dst(".dirmirror-foo.tmp")).unwrap(),
        "hidden body"
    );
    assert_eq!(snapshot(h.source.as_path()), snapshot(h.replica.as_path()));
}

#[tokio::test]
async fn test_later_source_edit_is_replicated() {
    let h = Harness::new(MirrorOptions::default());
    write(&h.src("doc.txt"), "draft", 1_000);
    h.pass().await.unwrap();

    write(&h.src("doc.txt"), "final", 3_000);
    let summary = h.pass().await.unwrap();

    assert_eq!(summary.overwritten, 1);
    assert_eq!(std::fs::read_to_string(h.dst("doc.txt")).unwrap(), "final");
    assert_eq!(mtime(&h.dst("doc.txt")), FileTime::from_unix_time(3_000, 0));
}

#[tokio::test]
async fn test_deleted_source_file_is_swept_in_subdirectory() {
    let h = Harness::new(MirrorOptions::default());
    write(&h.src("sub/keep.txt"), "k", 1_000);
    write(&h.src("sub/drop.txt"), "d", 1_000);
    h.pass().await.unwrap();

    std::fs::remove_file(h.src("sub/drop.txt")).unwrap();
    let summary = h.pass().await.unwrap();

    assert_eq!(summary.deleted, 1);
    assert!(h.dst("sub/keep.txt").exists());
    assert!(!h.dst("sub/drop.txt").exists());
    let last = h.log_lines().pop().unwrap();
    assert_eq!(
        last,
        format!(
            "The '{}' was deleted in '{}' - {STAMP}",
            h.dst("sub/drop.txt").display(),
            h.dst("sub").display()
        )
    );
}

#[tokio::test]
async fn test_removed_source_directory_pruned_only_with_remove_policy() {
    let keep = Harness::new(MirrorOptions::default());
    write(&keep.src("gone/file.txt"), "f", 1_000);
    keep.pass().await.unwrap();
    std::fs::remove_dir_all(keep.src("gone")).unwrap();
    keep.pass().await.unwrap();
    assert!(keep.dst("gone/file.txt").exists());

    let prune = Harness::new(MirrorOptions {
        orphan_directories: OrphanDirectoryPolicy::Remove,
        ..MirrorOptions::default()
    });
    write(&prune.src("gone/file.txt"), "f", 1_000);
    prune.pass().await.unwrap();
    std::fs::remove_dir_all(prune.src("gone")).unwrap();
    let summary = prune.pass().await.unwrap();

    assert_eq!(summary.directories_removed, 1);
    assert!(!prune.dst("gone").exists());
    assert_eq!(
        prune.log_lines().pop().unwrap(),
        format!("The subfolder 'gone' was deleted in '{}' - {STAMP}", prune.replica)
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_subdirectory_does_not_stop_siblings() {
    use std::os::unix::fs::PermissionsExt;

    let h = Harness::new(MirrorOptions {
        on_error: ErrorPolicy::Continue,
        ..MirrorOptions::default()
    });
    write(&h.src("a_locked/secret.txt"), "s", 1_000);
    write(&h.src("b_open/visible.txt"), "v", 1_000);
    write(&h.src("z.txt"), "z", 1_000);
    std::fs::set_permissions(h.src("a_locked"), std::fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not apply to root.
    let locked = std::fs::read_dir(h.src("a_locked")).is_err();
    let result = h.pass().await;
    std::fs::set_permissions(h.src("a_locked"), std::fs::Permissions::from_mode(0o755)).unwrap();

    assert!(h.dst("b_open/visible.txt").exists());
    assert!(h.dst("z.txt").exists());
    if locked {
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("a_locked"));
        assert!(!h.dst("a_locked/secret.txt").exists());

        // The next pass recovers once access is restored.
        h.pass().await.unwrap();
        assert!(h.dst("a_locked/secret.txt").exists());
    } else {
        result.unwrap();
    }
}

#[tokio::test]
async fn test_empty_trees_produce_no_log() {
    let h = Harness::new(MirrorOptions::default());

    let summary = h.pass().await.unwrap();

    assert_eq!(summary, PassSummary { duration_ms: summary.duration_ms, ..PassSummary::default() });
    assert!(!h.logs.exists());
}
