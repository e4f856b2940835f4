//! Mirror policies
//!
//! Behaviors that differ between deployments are selected by small closed
//! enums rather than flags scattered across the mirror.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// What to do with replica subdirectories that no longer exist in the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanDirectoryPolicy {
    /// Leave them in place; only orphan files are swept
    #[default]
    Keep,
    /// Delete them recursively and log the removal
    Remove,
}

impl fmt::Display for OrphanDirectoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrphanDirectoryPolicy::Keep => write!(f, "keep"),
            OrphanDirectoryPolicy::Remove => write!(f, "remove"),
        }
    }
}

impl FromStr for OrphanDirectoryPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(OrphanDirectoryPolicy::Keep),
            "remove" => Ok(OrphanDirectoryPolicy::Remove),
            other => Err(DomainError::InvalidPolicy {
                setting: "orphan directory policy",
                value: other.to_string(),
                expected: "keep, remove",
            }),
        }
    }
}

/// How a pass reacts to a failed copy, delete or directory operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Record the failure, finish the rest of the pass, then report all failures
    #[default]
    Continue,
    /// Stop the pass at the first failure
    Abort,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Continue => write!(f, "continue"),
            ErrorPolicy::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continue" => Ok(ErrorPolicy::Continue),
            "abort" => Ok(ErrorPolicy::Abort),
            other => Err(DomainError::InvalidPolicy {
                setting: "error policy",
                value: other.to_string(),
                expected: "continue, abort",
            }),
        }
    }
}
