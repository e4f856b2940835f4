//! FileLogSink - operator log with console echo
//!
//! Implements [`ILogSink`] by appending each record as one line to
//! `<log dir>/log.txt` and writing the identical line to the console.
//! Failures to write the file are reported on the console only and
//! never propagated, so a broken log directory cannot abort a pass.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dirmirror_core::{
    domain::log_record::{LogRecord, LOG_FILE_NAME},
    ports::{clock::IClock, log_sink::ILogSink},
};
use tracing::warn;

/// Append-only log file plus console echo.
pub struct FileLogSink {
    log_file: PathBuf,
    clock: Arc<dyn IClock>,
    console: Mutex<Box<dyn Write + Send>>,
}

impl FileLogSink {
    /// Creates a sink writing to `log.txt` inside `log_directory`.
    ///
    /// The file is not touched until the first record. Echoes go to stdout.
    pub fn new(log_directory: &Path, clock: Arc<dyn IClock>) -> Self {
        Self {
            log_file: log_directory.join(LOG_FILE_NAME),
            clock,
            console: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Replaces the console writer.
    pub fn with_console(mut self, console: impl Write + Send + 'static) -> Self {
        self.console = Mutex::new(Box::new(console));
        self
    }

    /// Full path of the log file.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Appends `line` to the log file.
    ///
    /// The file is reopened for every record so that rotation or deletion
    /// by another process is picked up.
    ///
    /// This is a synchronous `std::fs` write on the calling task, also when
    /// called from the async mirror. Records are a single short line per
    /// replica mutation, and each one is on disk before the mirror moves to
    /// the next entry, so the log order always matches the order of the
    /// changes.
    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        writeln!(file, "{line}")
    }

    fn echo(&self, line: &str) {
        let result = match self.console.lock() {
            Ok(mut console) => writeln!(console, "{line}").and_then(|()| console.flush()),
            Err(poisoned) => {
                let mut console = poisoned.into_inner();
                writeln!(console, "{line}").and_then(|()| console.flush())
            }
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to echo log record to console");
        }
    }
}

impl ILogSink for FileLogSink {
    fn record(&self, message: &str) {
        let line = LogRecord::new(message, self.clock.now()).line();

        if let Err(e) = self.append(&line) {
            warn!(
                log_file = %self.log_file.display(),
                error = %e,
                "Failed to append log record"
            );
            self.echo(&format!(
                "Failed to write log record to '{}': {e}",
                self.log_file.display()
            ));
        }

        self.echo(&line);
    }
}

impl std::fmt::Debug for FileLogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogSink")
            .field("log_file", &self.log_file)
            .finish_non_exhaustive()
    }
}
