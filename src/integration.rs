//! Pipeline entry point.
//!
//! Wires the pieces together for one run:
//! log selector → line stream → endpoint table → report.
//!
//! A run either writes a complete report or returns an error; it never leaves a
//! partial report behind.

use crate::config::ResolvedConfig;
use crate::model::{AnalysisError, AppError, EndpointSummary, EndpointTable};
use crate::report;
use crate::source::{find_latest_log, LineStream, StreamSummary};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Finalized statistics of one log source.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// One row per endpoint, in order of first appearance.
    pub endpoints: Vec<EndpointSummary>,
    /// Line counters of the drained stream.
    pub summary: StreamSummary,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The log directory holds no matching log; nothing to do.
    NoLogFile,
    /// The report for the most recent log already exists; nothing to do.
    AlreadyReported(PathBuf),
    /// A new report was written.
    Reported {
        /// Report location.
        path: PathBuf,
        /// Number of distinct endpoints in the report.
        endpoints: usize,
        /// Line counters of the analyzed log.
        summary: StreamSummary,
    },
}

/// Drain `stream` into an endpoint table and finalize it.
///
/// The stream is consumed in one pass. The error-rate gate is applied only after
/// the stream has ended (EOF or line cap), then percentages are computed.
///
/// # Errors
///
/// - `AnalysisError::Input` if reading fails mid-stream
/// - `AnalysisError::TooManyParseErrors` if the error budget is exceeded
/// - `AnalysisError::EmptyDataset` if no record was parsed
pub fn analyze_stream<R: BufRead>(mut stream: LineStream<R>) -> Result<Analysis, AnalysisError> {
    let mut table = EndpointTable::new();
    for record in stream.by_ref() {
        table.record(&record?);
    }
    let summary = stream.finish()?;
    let endpoints = table.finalize()?;

    Ok(Analysis { endpoints, summary })
}

/// Open and analyze a log file, examining at most `limit` lines.
///
/// # Errors
///
/// See [`analyze_stream`]; opening failures surface as `AnalysisError::Input`.
pub fn analyze_file(path: &Path, limit: Option<usize>) -> Result<Analysis, AnalysisError> {
    let stream = LineStream::open(path, limit)?;
    analyze_stream(stream)
}

/// Run the whole pipeline once.
///
/// # Errors
///
/// Returns `AppError` for an invalid log directory, an unreadable or too broken
/// log, an empty dataset, or a failure to render or write the report.
pub fn run(config: &ResolvedConfig) -> Result<RunOutcome, AppError> {
    let Some(log) = find_latest_log(&config.log_dir)? else {
        info!(log_dir = %config.log_dir.display(), "Log file has not been found");
        return Ok(RunOutcome::NoLogFile);
    };

    let report_path = report::report_path(&config.report_dir, log.date);
    if report_path.exists() {
        info!(report = %report_path.display(), "Report already exists, skip this time");
        return Ok(RunOutcome::AlreadyReported(report_path));
    }

    info!(
        log = %log.path.display(),
        date = %log.date,
        gzip = log.is_gzip(),
        limit = ?config.line_limit(),
        "Analyzing log"
    );
    let analysis = analyze_file(&log.path, config.line_limit())?;
    if analysis.summary.skipped_lines > 0 {
        warn!(
            skipped = analysis.summary.skipped_lines,
            total = analysis.summary.total_lines,
            error_percent = analysis.summary.error_percent(),
            "Some lines could not be parsed"
        );
    }

    let template = report::load_template(&config.report_template)?;
    let html = report::render(&template, &analysis.endpoints)?;
    report::write_report(&report_path, &html)?;

    info!(
        report = %report_path.display(),
        endpoints = analysis.endpoints.len(),
        records = analysis.summary.parsed_lines(),
        "Report written"
    );
    Ok(RunOutcome::Reported {
        path: report_path,
        endpoints: analysis.endpoints.len(),
        summary: analysis.summary,
    })
}
