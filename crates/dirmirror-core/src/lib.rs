//! dirmirror core - domain types, ports and configuration
//!
//! This crate is the hexagonal core of dirmirror:
//! - **Domain types** - `SyncAction`, `FileEntry`, `DirectoryEntry`, `LogRecord`, `SyncPath`
//! - **Port definitions** - Traits for adapters: `ILocalFileSystem`, `ILogSink`, `IClock`
//! - **Configuration** - YAML/CLI configuration with validation
//!
//! # Architecture
//!
//! The domain module contains pure value types with no I/O. Ports define
//! the trait interfaces that the mirror depends on; their implementations
//! live in `dirmirror-sync` (filesystem) and `dirmirror-audit` (log sink,
//! clocks).

pub mod config;
pub mod domain;
pub mod ports;
