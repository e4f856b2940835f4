//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! such as path validation and policy parsing failures.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid entry name (empty, `.`/`..`, or containing a separator)
    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    /// Unknown value for a policy setting
    #[error("Invalid {setting} '{value}'; valid options: {expected}")]
    InvalidPolicy {
        /// Name of the setting being parsed
        setting: &'static str,
        /// The rejected value
        value: String,
        /// Comma-separated list of accepted values
        expected: &'static str,
    },
}
