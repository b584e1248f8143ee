//! Error types for the log analyzer.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error wrapping all domain-specific failures
//!   - [`SelectError`] - Log directory scanning failures (not a directory, IO)
//!   - [`InputError`] - Log file reading failures (file not found, IO)
//!   - [`AnalysisError`] - Data-quality and dataset failures (too many bad lines, empty dataset)
//!   - [`ReportError`] - Template loading, serialization and report writing failures
//!   - [`ConfigError`](crate::config::ConfigError) - Config file failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup failures
//!
//! # Error Recovery Strategy
//!
//! A line that does not match the access log grammar is **not** an error at all: it is
//! counted, logged at debug level and skipped. Only the aggregate error rate can become
//! fatal, and it is checked once after the stream has been drained. Every other error is
//! fatal to the run and no report is written.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LoggingError;

/// Top-level application error encompassing all failure modes.
///
/// All domain-specific error types convert to `AppError` via `From`, so the pipeline in
/// [`crate::integration`] can use `?` throughout.
///
/// # Examples
///
/// ```no_run
/// use log_analyzer::model::error::{AppError, SelectError};
///
/// fn run_app() -> Result<(), AppError> {
///     // SelectError automatically converts to AppError via From
///     scan()?;
///     Ok(())
/// }
/// # fn scan() -> Result<(), SelectError> { Ok(()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Tracing subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),

    /// The log directory could not be scanned.
    #[error("Failed to select log file: {0}")]
    Select(#[from] SelectError),

    /// The selected log file could not be analyzed.
    #[error("Failed to analyze log: {0}")]
    Analysis(#[from] AnalysisError),

    /// The report could not be rendered or written.
    #[error("Failed to build report: {0}")]
    Report(#[from] ReportError),
}

/// Errors raised while choosing the log file to analyze.
#[derive(Debug, Error)]
pub enum SelectError {
    /// The configured log directory is not a directory.
    ///
    /// Fatal: there is nothing sensible to scan, and retrying will not help.
    #[error("Path {path:?} is not a directory, please specify log directory")]
    InvalidDirectory {
        /// The path that was given.
        path: PathBuf,
    },

    /// Reading the directory listing failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur when opening or reading a log file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The log file does not exist.
    #[error("File not found: {path:?}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Low-level I/O failure while reading the log.
    ///
    /// Propagated as-is; retry policy belongs to the caller.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that end an analysis run after (or instead of) aggregation.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// More than the tolerated share of examined lines failed to parse.
    ///
    /// This is a post-hoc data-quality gate: it is raised after the line stream has been
    /// drained (or its cap reached) and the file handle released.
    #[error("Too many error lines in file {source_name}: {error_percent}% of lines could not be parsed")]
    TooManyParseErrors {
        /// Identity of the offending source (usually its path).
        source_name: String,
        /// Observed percentage of unparsable lines, rounded to three decimals.
        error_percent: f64,
    },

    /// No record was parsed, so percentages are undefined.
    #[error("No parsable records in dataset, cannot compute percentages")]
    EmptyDataset,

    /// The log file could not be read.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),
}

/// Errors raised while rendering or writing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The HTML template could not be read.
    #[error("Failed to read report template at {path:?}: {source}")]
    TemplateRead {
        /// Template path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The statistics table could not be serialized.
    #[error("Failed to serialize report table: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The report file could not be written.
    #[error("Failed to write report to {path:?}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn select_error_invalid_directory_display() {
        let err = SelectError::InvalidDirectory {
            path: PathBuf::from("/tmp/not-a-dir.txt"),
        };
        let msg = err.to_string();
        assert!(msg.contains("is not a directory"));
        assert!(msg.contains("/tmp/not-a-dir.txt"));
    }

    #[test]
    fn input_error_file_not_found_display() {
        let err = InputError::FileNotFound {
            path: PathBuf::from("/tmp/missing.log"),
        };
        let msg = err.to_string();
        assert!(msg.contains("File not found"));
        assert!(msg.contains("/tmp/missing.log"));
    }

    #[test]
    fn input_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let input_err: InputError = io_err.into();
        let msg = input_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn too_many_parse_errors_carries_file_and_percentage() {
        let err = AnalysisError::TooManyParseErrors {
            source_name: "log/nginx-access-ui.log-20170630".to_string(),
            error_percent: 60.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("nginx-access-ui.log-20170630"));
        assert!(msg.contains("60%"));
    }

    #[test]
    fn empty_dataset_display() {
        let msg = AnalysisError::EmptyDataset.to_string();
        assert!(msg.contains("No parsable records"));
    }

    #[test]
    fn app_error_from_select_error() {
        let app_err: AppError = SelectError::InvalidDirectory {
            path: PathBuf::from("file.txt"),
        }
        .into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to select log file"));
        assert!(msg.contains("file.txt"));
    }

    #[test]
    fn app_error_nested_io_through_input_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let input_err: InputError = io_err.into();
        let analysis_err: AnalysisError = input_err.into();
        let app_err: AppError = analysis_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to analyze log"));
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn report_error_write_includes_path() {
        let err = ReportError::Write {
            path: PathBuf::from("reports/report-2017-06-30.html"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        };
        let msg = err.to_string();
        assert!(msg.contains("report-2017-06-30.html"));
        assert!(msg.contains("read-only"));
    }
}
