//! Mirror service - wires the adapters together and runs the scheduler
//!
//! Owns the process-level concerns: loading the configuration file,
//! building the log sink, mirror and scheduler from validated settings,
//! and translating SIGINT/SIGTERM into cancellation of the scheduler loop.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dirmirror_audit::{FileLogSink, SystemClock};
use dirmirror_core::{
    config::{Config, SyncSettings},
    ports::log_sink::ILogSink,
};
use dirmirror_sync::{
    filesystem::LocalFileSystemAdapter,
    mirror::{MirrorOptions, PassSummary, TreeMirror},
    scheduler::SyncScheduler,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Loads the YAML configuration file
///
/// An explicit `path` must exist. Without one the default location is
/// read if present and an empty configuration is used otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display())),
        None => {
            let default_path = Config::default_path();
            if default_path.is_file() {
                Config::load(&default_path).with_context(|| {
                    format!("Failed to load config file {}", default_path.display())
                })
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// One configured source/replica pair ready to run
pub struct MirrorService {
    scheduler: SyncScheduler,
}

impl MirrorService {
    pub fn new(settings: SyncSettings) -> Self {
        let sink: Arc<dyn ILogSink> = Arc::new(FileLogSink::new(
            &settings.log_directory,
            Arc::new(SystemClock),
        ));
        let mirror = TreeMirror::new(
            Arc::new(LocalFileSystemAdapter::new()),
            Arc::clone(&sink),
            MirrorOptions::from(&settings),
        );
        let scheduler = SyncScheduler::new(
            mirror,
            sink,
            settings.source,
            settings.replica,
            settings.interval,
        );

        Self { scheduler }
    }

    /// Runs a single pass
    pub async fn run_once(&self) -> Option<PassSummary> {
        self.scheduler.run_pass().await
    }

    /// Runs the scheduler until SIGINT or SIGTERM
    ///
    /// A pass in progress when the signal arrives is finished first.
    pub async fn run(&self) -> Result<()> {
        let shutdown = CancellationToken::new();

        let signal_token = shutdown.clone();
        let signals = tokio::spawn(async move {
            shutdown_signal(signal_token).await;
        });

        self.scheduler.run(shutdown).await;
        signals.abort();

        info!("dirmirror shut down gracefully");
        Ok(())
    }
}

/// Waits for SIGINT or SIGTERM and cancels `token`
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
