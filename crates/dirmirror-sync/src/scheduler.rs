//! Sync scheduler - runs the tree mirror on a fixed period
//!
//! The [`SyncScheduler`] alternates between two states forever:
//!
//! ```text
//!   ┌──────────┐  pass done (ok or failed)  ┌─────────┐
//!   │ Syncing  │ ─────────────────────────→ │ Waiting │
//!   └──────────┘ ←───────────────────────── └─────────┘
//!                      interval elapsed
//! ```
//!
//! A failed pass is written to the operator log as `Sync failed: <error>`
//! and never ends the loop. The [`CancellationToken`] is only observed while
//! waiting, so a pass in progress always runs to completion and passes never
//! overlap.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dirmirror_core::{domain::newtypes::SyncPath, ports::log_sink::ILogSink};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::mirror::{PassSummary, TreeMirror};

/// What the scheduler is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// `run` has not been called or has returned
    Idle,
    /// A mirror pass is in progress
    Syncing,
    /// Sleeping until the next pass
    Waiting,
}

/// Drives [`TreeMirror`] passes for one source/replica pair
pub struct SyncScheduler {
    mirror: TreeMirror,
    sink: Arc<dyn ILogSink>,
    source: SyncPath,
    replica: SyncPath,
    interval: Duration,
    state: Mutex<SchedulerState>,
}

impl SyncScheduler {
    pub fn new(
        mirror: TreeMirror,
        sink: Arc<dyn ILogSink>,
        source: SyncPath,
        replica: SyncPath,
        interval: Duration,
    ) -> Self {
        Self {
            mirror,
            sink,
            source,
            replica,
            interval,
            state: Mutex::new(SchedulerState::Idle),
        }
    }

    /// Current state of the loop
    pub fn state(&self) -> SchedulerState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: SchedulerState) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        debug!(from = ?*state, to = ?next, "Scheduler state change");
        *state = next;
    }

    /// Runs a single pass, logging a failure record if it does not complete
    ///
    /// Returns the pass summary, or `None` if the pass failed.
    pub async fn run_pass(&self) -> Option<PassSummary> {
        self.set_state(SchedulerState::Syncing);
        info!(source = %self.source, replica = %self.replica, "Starting mirror pass");

        match self.mirror.mirror(&self.source, &self.replica).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!(error = %format!("{e:#}"), "Mirror pass failed");
                self.sink.record(&format!("Sync failed: {e:#}"));
                None
            }
        }
    }

    /// Runs passes every `interval` until `shutdown` is cancelled
    ///
    /// The first pass starts immediately. No record is written on shutdown.
    pub async fn run(&self, shutdown: CancellationToken) {
        self.sink
            .record(&format!("Starting to monitor the folder: '{}'", self.source));
        info!(
            interval_secs = self.interval.as_secs(),
            "Sync scheduler starting"
        );

        while !shutdown.is_cancelled() {
            self.run_pass().await;

            self.set_state(SchedulerState::Waiting);
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, stopping sync scheduler");
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        self.set_state(SchedulerState::Idle);
        info!("Sync scheduler stopped");
    }
}

// ============================================================================
// Unit tests
// ============================================================================
