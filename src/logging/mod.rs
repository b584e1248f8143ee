//! Tracing subscriber initialization.
//!
//! Logs go to a file when one is configured (for cron-driven runs) and to stderr
//! otherwise. Stdout is never used for diagnostics.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Timestamp format of every log line, e.g. `2017.06.30 03:50:22`.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Initialize the tracing subscriber.
///
/// Respects RUST_LOG environment variable, defaults to "info" level.
/// With `Some(path)`, creates the log directory if it doesn't exist and appends
/// to that file; with `None`, writes to stderr.
///
/// # Errors
///
/// Returns `LoggingError` if the subscriber was already initialized, the path has
/// no file name, or directory creation failed.
pub fn init(log_path: Option<&Path>) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(false);

    let Some(log_path) = log_path else {
        return builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|_| LoggingError::SubscriberAlreadySet);
    };

    let (directory, file_name) = prepare_log_file(log_path)?;
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    builder
        .with_writer(file_appender)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

/// Split `log_path` into directory and file name, creating the directory.
fn prepare_log_file(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?
        .to_string();

    // A bare file name logs into the current directory
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    Ok((directory, file_name))
}
