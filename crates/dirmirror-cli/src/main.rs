//! dirmirror - keep a replica folder in step with a source folder
//!
//! Parses the command line, layers it over the optional YAML configuration
//! file, validates the result, and runs the mirror on a fixed interval until
//! interrupted (or once with `--once`).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use dirmirror_core::{
    config::{Config, ConfigBuilder},
    domain::policy::{ErrorPolicy, OrphanDirectoryPolicy},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod output;
mod service;

use output::get_formatter;
use service::MirrorService;

#[derive(Debug, Parser)]
#[command(
    name = "dirmirror",
    version,
    about = "One-way periodic mirror of a source folder into a replica folder"
)]
pub struct Cli {
    /// Root folder that will be mirrored
    #[arg(long = "source-path", alias = "sourcePath", value_name = "DIR")]
    source_path: Option<PathBuf>,

    /// Folder that receives the modifications
    #[arg(long = "replica-path", alias = "replicaPath", value_name = "DIR")]
    replica_path: Option<PathBuf>,

    /// Minutes to wait between passes
    #[arg(
        long,
        alias = "timeInterval",
        value_name = "MINUTES",
        value_parser = parse_interval
    )]
    interval: Option<u64>,

    /// Folder where log.txt is written
    #[arg(long = "log-path", alias = "logPath", value_name = "DIR")]
    log_path: Option<PathBuf>,

    /// Use alternate config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run a single pass and exit. The "Starting to monitor the folder"
    /// record is not written; records for the pass's changes still are
    #[arg(long)]
    once: bool,

    /// What to do with replica folders missing from the source: keep or remove
    #[arg(long, value_name = "POLICY")]
    orphan_directories: Option<OrphanDirectoryPolicy>,

    /// What to do when a file operation fails: continue or abort
    #[arg(long, value_name = "POLICY")]
    on_error: Option<ErrorPolicy>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Layers the command-line flags over `config`
    fn apply(&self, config: Config) -> Config {
        let mut builder = ConfigBuilder::from_config(config);

        if let Some(path) = &self.source_path {
            builder = builder.source(path.clone());
        }
        if let Some(path) = &self.replica_path {
            builder = builder.replica(path.clone());
        }
        if let Some(minutes) = self.interval {
            builder = builder.interval_minutes(minutes);
        }
        if let Some(path) = &self.log_path {
            builder = builder.log_directory(path.clone());
        }
        if let Some(policy) = self.orphan_directories {
            builder = builder.orphan_directories(policy);
        }
        if let Some(policy) = self.on_error {
            builder = builder.on_error(policy);
        }
        if let Some(level) = verbosity_level(self.verbose) {
            builder = builder.logging_level(level);
        }

        builder.build()
    }
}

/// Accepts any non-negative integer; zero is rejected during validation
fn parse_interval(value: &str) -> Result<u64, String> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| "The --interval parameter is not a valid number".to_string())
}

fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

fn init_tracing(level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let formatter = get_formatter();

    let file_config = match service::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return Ok(ExitCode::FAILURE);
        }
    };
    let config = cli.apply(file_config);
    init_tracing(&config.logging.level);

    let settings = match config.into_settings() {
        Ok(settings) => settings,
        Err(errors) => {
            for error in &errors {
                formatter.error(&error.message);
            }
            formatter.info("");
            formatter.info(&Cli::command().render_usage().to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    info!(
        source = %settings.source,
        replica = %settings.replica,
        log_directory = %settings.log_directory.display(),
        interval_secs = settings.interval.as_secs(),
        "Configuration resolved"
    );

    let service = MirrorService::new(settings);

    if cli.once {
        return Ok(match service.run_once().await {
            Some(summary) => {
                formatter.success(&format!(
                    "Pass complete: {} copied, {} overwritten, {} deleted, {} folders created, {} folders removed",
                    summary.copied,
                    summary.overwritten,
                    summary.deleted,
                    summary.directories_created,
                    summary.directories_removed
                ));
                ExitCode::SUCCESS
            }
            None => ExitCode::FAILURE,
        });
    }

    service.run().await?;
    Ok(ExitCode::SUCCESS)
}
