//! Directory entry snapshots
//!
//! [`FileEntry`] and [`DirectoryEntry`] are read from the filesystem at the
//! start of each directory level and discarded afterwards. A source file
//! and a replica file are the same entry when their names are equal.

use std::ffi::{OsStr, OsString};

use chrono::{DateTime, Utc};

use super::newtypes::SyncPath;

/// A regular file found while listing a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Name within the parent directory
    pub name: OsString,
    /// Full path to the file
    pub path: SyncPath,
    /// Last modification time, full filesystem precision
    pub modified: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Creates a new `FileEntry`
    pub fn new(
        name: impl Into<OsString>,
        path: SyncPath,
        modified: DateTime<Utc>,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            modified,
            size,
        }
    }

    /// Returns the entry name
    pub fn name(&self) -> &OsStr {
        &self.name
    }
}

/// A subdirectory found while listing a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Name within the parent directory
    pub name: OsString,
    /// Full path to the directory
    pub path: SyncPath,
}

impl DirectoryEntry {
    /// Creates a new `DirectoryEntry`
    pub fn new(name: impl Into<OsString>, path: SyncPath) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

/// Direct children of one directory, split by kind
///
/// Both lists are sorted by name. Entries that are neither regular files
/// nor directories are not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub files: Vec<FileEntry>,
    pub directories: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    /// Builds a listing, sorting both lists by name
    pub fn new(mut files: Vec<FileEntry>, mut directories: Vec<DirectoryEntry>) -> Self {
        files.sort_by(|a, b| a.name.cmp(&b.name));
        directories.sort_by(|a, b| a.name.cmp(&b.name));
        Self { files, directories }
    }

    /// Looks up a file by name
    pub fn file(&self, name: &OsStr) -> Option<&FileEntry> {
        self.files
            .binary_search_by(|f| f.name.as_os_str().cmp(name))
            .ok()
            .map(|i| &self.files[i])
    }

    /// Returns true if a subdirectory with this name is listed
    pub fn has_directory(&self, name: &OsStr) -> bool {
        self.directories
            .binary_search_by(|d| d.name.as_os_str().cmp(name))
            .is_ok()
    }

    /// Returns true if nothing is listed
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file(name: &str) -> FileEntry {
        let path = SyncPath::new(PathBuf::from("/src").join(name)).unwrap();
        FileEntry::new(name, path, Utc::now(), 0)
    }

    fn dir(name: &str) -> DirectoryEntry {
        let path = SyncPath::new(PathBuf::from("/src").join(name)).unwrap();
        DirectoryEntry::new(name, path)
    }

    #[test]
    fn test_listing_is_sorted() {
        let listing = DirectoryListing::new(
            vec![file("c.txt"), file("a.txt"), file("b.txt")],
            vec![dir("zeta"), dir("alpha")],
        );
        let names: Vec<_> = listing.files.iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
        assert_eq!(listing.directories[0].name, "alpha");
    }

    #[test]
    fn test_lookup_by_name() {
        let listing = DirectoryListing::new(vec![file("a.txt"), file("b.txt")], vec![dir("sub")]);
        assert!(listing.file(OsStr::new("b.txt")).is_some());
        assert!(listing.file(OsStr::new("sub")).is_none());
        assert!(listing.has_directory(OsStr::new("sub")));
        assert!(!listing.has_directory(OsStr::new("a.txt")));
    }

    #[test]
    fn test_empty_listing() {
        assert!(DirectoryListing::default().is_empty());
    }
}
