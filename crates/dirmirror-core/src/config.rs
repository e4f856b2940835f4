//! Configuration module for dirmirror.
//!
//! Provides typed configuration structs that map to the optional YAML
//! configuration file, with loading, validation, defaults, and a builder
//! pattern used by the CLI to layer command-line flags on top of the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{
    newtypes::SyncPath,
    policy::{ErrorPolicy, OrphanDirectoryPolicy},
};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for dirmirror.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Synchronization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Directory tree to mirror from.
    pub source: Option<PathBuf>,
    /// Directory tree to mirror into.
    pub replica: Option<PathBuf>,
    /// Minutes to wait between the end of one pass and the start of the next.
    pub interval_minutes: Option<u64>,
    /// Whether replica-only subdirectories are kept or removed.
    pub orphan_directories: OrphanDirectoryPolicy,
    /// Whether a failed entry operation stops the pass.
    pub on_error: ErrorPolicy,
    /// Maximum directory depth the mirror descends to.
    pub max_depth: usize,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory in which `log.txt` is appended to.
    pub directory: Option<PathBuf>,
    /// Diagnostic level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

/// Default recursion bound for the mirror.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Largest interval whose length in seconds still fits in a `u64`.
pub const MAX_INTERVAL_MINUTES: u64 = u64::MAX / 60;

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/dirmirror/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("dirmirror")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: None,
            replica: None,
            interval_minutes: None,
            orphan_directories: OrphanDirectoryPolicy::default(),
            on_error: ErrorPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.interval_minutes"`.
    pub field: String,
    /// Human-readable explanation naming the command-line parameter.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// The directories the mirror works on, in the order they are checked.
const REQUIRED_DIRECTORIES: &[(&str, &str)] = &[
    ("sync.source", "--source-path"),
    ("sync.replica", "--replica-path"),
    ("logging.directory", "--log-path"),
];

impl Config {
    fn directory(&self, field: &str) -> Option<&PathBuf> {
        match field {
            "sync.source" => self.sync.source.as_ref(),
            "sync.replica" => self.sync.replica.as_ref(),
            _ => self.logging.directory.as_ref(),
        }
    }

    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Directory checks
    /// touch the filesystem.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        for (field, flag) in REQUIRED_DIRECTORIES {
            match self.directory(field) {
                None => errors.push(ValidationError {
                    field: (*field).into(),
                    message: format!("The {flag} parameter is required."),
                }),
                Some(dir) if !dir.is_dir() => errors.push(ValidationError {
                    field: (*field).into(),
                    message: format!("The {flag} folder was not found: {}", dir.display()),
                }),
                Some(_) => {}
            }
        }

        match self.sync.interval_minutes {
            None => errors.push(ValidationError {
                field: "sync.interval_minutes".into(),
                message: "The --interval parameter is required.".into(),
            }),
            Some(0) => errors.push(ValidationError {
                field: "sync.interval_minutes".into(),
                message: "The --interval parameter must be greater than zero.".into(),
            }),
            Some(minutes) if minutes > MAX_INTERVAL_MINUTES => errors.push(ValidationError {
                field: "sync.interval_minutes".into(),
                message: format!(
                    "The --interval parameter must not exceed {MAX_INTERVAL_MINUTES} minutes."
                ),
            }),
            Some(_) => {}
        }

        if self.sync.max_depth == 0 {
            errors.push(ValidationError {
                field: "sync.max_depth".into(),
                message: "must be greater than 0".into(),
            });
        }

        if let (Some(source), Some(replica)) = (&self.sync.source, &self.sync.replica) {
            if let (Ok(source), Ok(replica)) = (source.canonicalize(), replica.canonicalize()) {
                if source.starts_with(&replica) || replica.starts_with(&source) {
                    errors.push(ValidationError {
                        field: "sync.replica".into(),
                        message: format!(
                            "The --replica-path folder must not overlap the --source-path folder: {}",
                            replica.display()
                        ),
                    });
                }
            }
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }

    /// Validate and resolve into the settings the mirror runs with.
    ///
    /// Directory paths are canonicalized, so the resulting [`SyncPath`]s are
    /// absolute even when the configuration used relative paths.
    pub fn into_settings(self) -> Result<SyncSettings, Vec<ValidationError>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut errors = Vec::new();
        let mut resolve = |field: &str, path: Option<PathBuf>| {
            let path = path.unwrap_or_default();
            match path
                .canonicalize()
                .map_err(|e| e.to_string())
                .and_then(|p| SyncPath::new(p).map_err(|e| e.to_string()))
            {
                Ok(p) => Some(p),
                Err(e) => {
                    errors.push(ValidationError {
                        field: field.into(),
                        message: format!("cannot resolve {}: {e}", path.display()),
                    });
                    None
                }
            }
        };

        let source = resolve("sync.source", self.sync.source);
        let replica = resolve("sync.replica", self.sync.replica);
        let log_directory = resolve("logging.directory", self.logging.directory);

        match (source, replica, log_directory) {
            (Some(source), Some(replica), Some(log_directory)) => Ok(SyncSettings {
                source,
                replica,
                log_directory: log_directory.into_path_buf(),
                interval: Duration::from_secs(
                    self.sync.interval_minutes.unwrap_or(1).saturating_mul(60),
                ),
                orphan_directories: self.sync.orphan_directories,
                on_error: self.sync.on_error,
                max_depth: self.sync.max_depth,
            }),
            _ => Err(errors),
        }
    }
}

/// Validated, resolved settings for one mirror process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub source: SyncPath,
    pub replica: SyncPath,
    pub log_directory: PathBuf,
    pub interval: Duration,
    pub orphan_directories: OrphanDirectoryPolicy,
    pub on_error: ErrorPolicy,
    pub max_depth: usize,
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] (or an existing config) and allows
/// selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use dirmirror_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .source(PathBuf::from("/srv/data"))
///     .replica(PathBuf::from("/mnt/backup/data"))
///     .interval_minutes(5)
///     .log_directory(PathBuf::from("/var/log/dirmirror"))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create a builder that overrides values of an existing config.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // --- sync ---

    pub fn source(mut self, path: PathBuf) -> Self {
        self.config.sync.source = Some(path);
        self
    }

    pub fn replica(mut self, path: PathBuf) -> Self {
        self.config.sync.replica = Some(path);
        self
    }

    pub fn interval_minutes(mut self, minutes: u64) -> Self {
        self.config.sync.interval_minutes = Some(minutes);
        self
    }

    pub fn orphan_directories(mut self, policy: OrphanDirectoryPolicy) -> Self {
        self.config.sync.orphan_directories = policy;
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.config.sync.on_error = policy;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.sync.max_depth = depth;
        self
    }

    // --- logging ---

    pub fn log_directory(mut self, path: PathBuf) -> Self {
        self.config.logging.directory = Some(path);
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    /// Three sibling directories: source, replica, logs.
    fn dirs() -> (TempDir, PathBuf, PathBuf, PathBuf) {
        let root = TempDir::new().unwrap();
        let source = root.path().join("source");
        let replica = root.path().join("replica");
        let logs = root.path().join("logs");
        for d in [&source, &replica, &logs] {
            std::fs::create_dir(d).unwrap();
        }
        (root, source, replica, logs)
    }

    fn complete(source: &Path, replica: &Path, logs: &Path) -> ConfigBuilder {
        ConfigBuilder::new()
            .source(source.to_path_buf())
            .replica(replica.to_path_buf())
            .interval_minutes(1)
            .log_directory(logs.to_path_buf())
    }

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert!(cfg.sync.source.is_none());
        assert!(cfg.sync.replica.is_none());
        assert!(cfg.sync.interval_minutes.is_none());
        assert_eq!(cfg.sync.orphan_directories, OrphanDirectoryPolicy::Keep);
        assert_eq!(cfg.sync.on_error, ErrorPolicy::Continue);
        assert_eq!(cfg.sync.max_depth, DEFAULT_MAX_DEPTH);
        assert!(cfg.logging.directory.is_none());
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn default_config_reports_every_missing_parameter() {
        let errors = Config::default().validate();
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "The --source-path parameter is required.",
                "The --replica-path parameter is required.",
                "The --log-path parameter is required.",
                "The --interval parameter is required.",
            ]
        );
    }

    #[test]
    fn default_path_ends_with_config_yaml() {
        let path = Config::default_path();
        assert!(path.ends_with("dirmirror/config.yaml"));
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
sync:
  source: /srv/source
  replica: /srv/replica
  interval_minutes: 15
  orphan_directories: remove
  on_error: abort
  max_depth: 32
logging:
  directory: /var/log/dirmirror
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.sync.source, Some(PathBuf::from("/srv/source")));
        assert_eq!(cfg.sync.replica, Some(PathBuf::from("/srv/replica")));
        assert_eq!(cfg.sync.interval_minutes, Some(15));
        assert_eq!(cfg.sync.orphan_directories, OrphanDirectoryPolicy::Remove);
        assert_eq!(cfg.sync.on_error, ErrorPolicy::Abort);
        assert_eq!(cfg.sync.max_depth, 32);
        assert_eq!(cfg.logging.directory, Some(PathBuf::from("/var/log/dirmirror")));
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn load_partial_yaml_fills_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"sync:\n  interval_minutes: 3\n").unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.sync.interval_minutes, Some(3));
        assert_eq!(cfg.sync.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn load_returns_error_on_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/config.yaml")).is_err());
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"not: [valid: yaml: {{{").unwrap();
        tmp.flush().unwrap();

        let result = Config::load(tmp.path());
        assert!(result.is_err());
    }

    // -- Validation --

    #[test]
    fn validate_accepts_complete_config() {
        let (_root, source, replica, logs) = dirs();
        let errors = complete(&source, &replica, &logs).build().validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
    }

    #[test]
    fn validate_catches_zero_interval() {
        let (_root, source, replica, logs) = dirs();
        let cfg = complete(&source, &replica, &logs).interval_minutes(0).build();
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "sync.interval_minutes");
        assert!(errors[0].message.contains("--interval"));
    }

    #[test]
    fn into_settings_rejects_interval_too_large_for_seconds() {
        let (_root, source, replica, logs) = dirs();
        let errors = complete(&source, &replica, &logs)
            .interval_minutes(u64::MAX)
            .build()
            .into_settings()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "sync.interval_minutes");
        assert!(errors[0].message.starts_with("The --interval parameter must not exceed"));
    }

    #[test]
    fn into_settings_accepts_largest_interval() {
        let (_root, source, replica, logs) = dirs();
        let settings = complete(&source, &replica, &logs)
            .interval_minutes(MAX_INTERVAL_MINUTES)
            .build()
            .into_settings()
            .expect("largest interval is valid");
        assert_eq!(
            settings.interval,
            Duration::from_secs(MAX_INTERVAL_MINUTES * 60)
        );
    }

    #[test]
    fn validate_catches_missing_directories_in_order() {
        let (root, source, _replica, _logs) = dirs();
        let cfg = complete(
            &source,
            &root.path().join("no-replica"),
            &root.path().join("no-logs"),
        )
        .build();
        let errors = cfg.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sync.replica", "logging.directory"]);
        assert!(errors[0]
            .message
            .starts_with("The --replica-path folder was not found"));
    }

    #[test]
    fn validate_rejects_file_as_directory() {
        let (root, _source, replica, logs) = dirs();
        let file = root.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let errors = complete(&file, &replica, &logs).build().validate();
        assert!(errors.iter().any(|e| e.field == "sync.source"));
    }

    #[test]
    fn validate_rejects_replica_inside_source() {
        let (_root, source, _replica, logs) = dirs();
        let nested = source.join("mirror");
        std::fs::create_dir(&nested).unwrap();
        let errors = complete(&source, &nested, &logs).build().validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "sync.replica" && e.message.contains("overlap")));
    }

    #[test]
    fn validate_catches_zero_max_depth_and_bad_level() {
        let (_root, source, replica, logs) = dirs();
        let cfg = complete(&source, &replica, &logs)
            .max_depth(0)
            .logging_level("verbose")
            .build();
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"sync.max_depth".to_string()));
        assert!(fields.contains(&"logging.level".to_string()));
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "sync.interval_minutes".into(),
            message: "The --interval parameter is required.".into(),
        };
        assert_eq!(
            err.to_string(),
            "sync.interval_minutes: The --interval parameter is required."
        );
    }

    // -- Settings --

    #[test]
    fn into_settings_resolves_paths_and_interval() {
        let (_root, source, replica, logs) = dirs();
        let settings = complete(&source, &replica, &logs)
            .interval_minutes(5)
            .orphan_directories(OrphanDirectoryPolicy::Remove)
            .build()
            .into_settings()
            .expect("valid settings");

        assert_eq!(settings.source.as_path(), source.canonicalize().unwrap());
        assert_eq!(settings.replica.as_path(), replica.canonicalize().unwrap());
        assert_eq!(settings.log_directory, logs.canonicalize().unwrap());
        assert_eq!(settings.interval, Duration::from_secs(300));
        assert_eq!(settings.orphan_directories, OrphanDirectoryPolicy::Remove);
        assert_eq!(settings.on_error, ErrorPolicy::Continue);
    }

    #[test]
    fn into_settings_returns_validation_errors() {
        let result = Config::default().into_settings();
        assert_eq!(result.unwrap_err().len(), 4);
    }

    // -- Builder --

    #[test]
    fn builder_overrides_existing_config() {
        let base = ConfigBuilder::new()
            .interval_minutes(10)
            .logging_level("info")
            .build();
        let cfg = ConfigBuilder::from_config(base)
            .interval_minutes(2)
            .on_error(ErrorPolicy::Abort)
            .build();
        assert_eq!(cfg.sync.interval_minutes, Some(2));
        assert_eq!(cfg.sync.on_error, ErrorPolicy::Abort);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn builder_zero_interval_is_rejected_by_into_settings() {
        let errors = ConfigBuilder::new()
            .interval_minutes(0)
            .build()
            .into_settings()
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.message == "The --interval parameter must be greater than zero."));
    }
}
