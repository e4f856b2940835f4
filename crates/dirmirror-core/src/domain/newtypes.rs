//! Domain newtypes with validation
//!
//! Paths handed to the mirror are wrapped in [`SyncPath`], which guarantees
//! at construction time that they are absolute and free of `.`/`..`
//! components.

use std::ffi::OsStr;
use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Path types
// ============================================================================

/// A validated absolute path on the local filesystem
///
/// SyncPath ensures the path is:
/// - Absolute (starts with /)
/// - Normalized (no . or .. components)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct SyncPath(PathBuf);

impl SyncPath {
    /// Create a new SyncPath, validating it is absolute
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is not absolute
    pub fn new(path: PathBuf) -> Result<Self, DomainError> {
        if !path.is_absolute() {
            return Err(DomainError::InvalidPath(format!(
                "Path must be absolute: {}",
                path.display()
            )));
        }

        // We don't use fs::canonicalize() as the path might not exist yet
        let normalized = Self::normalize_path(&path)?;
        Ok(Self(normalized))
    }

    /// Get the inner path reference
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Convert to owned PathBuf
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Final component of the path, if any
    #[must_use]
    pub fn file_name(&self) -> Option<&OsStr> {
        self.0.file_name()
    }

    /// Join a single directory entry name to this SyncPath
    ///
    /// # Errors
    /// Returns error if the name is empty, a `.`/`..` component, or
    /// contains a path separator
    pub fn join(&self, name: impl AsRef<OsStr>) -> Result<Self, DomainError> {
        let name = name.as_ref();
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(c)), None) if c == name => {}
            _ => {
                return Err(DomainError::InvalidName(
                    name.to_string_lossy().into_owned(),
                ))
            }
        }

        Ok(Self(self.0.join(name)))
    }

    /// Normalize a path by resolving . and .. components
    fn normalize_path(path: &Path) -> Result<PathBuf, DomainError> {
        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::Prefix(p) => normalized.push(p.as_os_str()),
                Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(DomainError::InvalidPath(
                            "Path escapes root via ..".to_string(),
                        ));
                    }
                }
                Component::Normal(c) => normalized.push(c),
            }
        }

        Ok(normalized)
    }
}

impl Display for SyncPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl TryFrom<PathBuf> for SyncPath {
    type Error = DomainError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<SyncPath> for PathBuf {
    fn from(sync_path: SyncPath) -> Self {
        sync_path.0
    }
}

impl AsRef<Path> for SyncPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
