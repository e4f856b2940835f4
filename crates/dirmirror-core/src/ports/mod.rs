//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the mirror depends on,
//! but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ILocalFileSystem`] - Directory listing, copy, delete, mkdir
//! - [`ILogSink`] - Append-only operator log with console echo
//! - [`IClock`] - Current UTC time for log timestamps

pub mod clock;
pub mod local_filesystem;
pub mod log_sink;

pub use clock::IClock;
pub use local_filesystem::ILocalFileSystem;
pub use log_sink::ILogSink;
