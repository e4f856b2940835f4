//! Operator log records
//!
//! A [`LogRecord`] is one human-readable line in `log.txt`: the message
//! followed by the UTC time it was emitted.

use chrono::{DateTime, Utc};

/// chrono format string for record timestamps (`MM/dd/yyyy HH:mm:ss`)
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Name of the log file created inside the configured log directory
pub const LOG_FILE_NAME: &str = "log.txt";

/// A single write-once log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    message: String,
    timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Creates a record for `message` stamped at `timestamp`
    pub fn new(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            timestamp,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Renders the record as it appears in the log file and on the console
    ///
    /// The line has no trailing newline.
    pub fn line(&self) -> String {
        format!("{} - {}", self.message, self.timestamp.format(TIMESTAMP_FORMAT))
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line())
    }
}
