//! Log sink port
//!
//! Every mutating action taken by the mirror, plus scheduler start-up and
//! failed passes, is reported through [`ILogSink::record`]. The sink owns
//! timestamping and formatting; callers pass only the message.

/// Destination for operator-facing log records
///
/// ## Contract
///
/// - `record` never fails from the caller's point of view. Implementations
///   report their own write failures out of band (console) and must not
///   feed them back into `record`.
/// - Records are written in call order.
pub trait ILogSink: Send + Sync {
    /// Appends one record for `message`
    fn record(&self, message: &str);
}
