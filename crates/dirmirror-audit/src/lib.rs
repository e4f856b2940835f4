//! dirmirror audit - operator log and clocks
//!
//! Provides:
//! - `FileLogSink`: appends timestamped records to `log.txt` and echoes them to the console
//! - `SystemClock` / `FixedClock`: `IClock` adapters for production and tests

pub mod clock;
pub mod sink;

pub use clock::{FixedClock, SystemClock};
pub use sink::FileLogSink;
