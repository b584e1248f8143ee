//! Lazy stream of parsed records with an error-rate budget.
//!
//! [`LineStream`] reads one line at a time, yields every line that parses and counts
//! the rest. It owns the reader: the handle is dropped as soon as the stream ends
//! (EOF, line cap, or I/O error), and at the latest when the stream is dropped.
//!
//! The data-quality check is explicit: after draining, the consumer calls
//! [`LineStream::finish`], which fails with
//! [`AnalysisError::TooManyParseErrors`] if more than
//! [`ERROR_THRESHOLD_PERCENT`] of the examined lines were unparsable.

use crate::model::error::{AnalysisError, InputError};
use crate::model::{round3, LogRecord};
use crate::parser::parse_line;
use crate::source::open_log;
use std::io::BufRead;
use std::iter::FusedIterator;
use std::path::Path;
use tracing::{debug, error};

/// Highest tolerated share of unparsable lines, in percent.
pub const ERROR_THRESHOLD_PERCENT: f64 = 50.0;

/// Line counters for a drained stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Lines examined, parsed or not.
    pub total_lines: usize,
    /// Lines that did not match the grammar.
    pub skipped_lines: usize,
}

impl StreamSummary {
    /// Lines that produced a record.
    pub fn parsed_lines(&self) -> usize {
        self.total_lines - self.skipped_lines
    }

    /// Share of skipped lines in percent, rounded to three decimals.
    ///
    /// Zero when no line was examined.
    pub fn error_percent(&self) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        round3(self.skipped_lines as f64 / self.total_lines as f64 * 100.0)
    }

    /// True if the exact error rate exceeds [`ERROR_THRESHOLD_PERCENT`].
    ///
    /// Compares the unrounded ratio; [`error_percent`](Self::error_percent) is
    /// only for reporting.
    pub fn exceeds_error_budget(&self) -> bool {
        self.skipped_lines as f64 * 100.0 > ERROR_THRESHOLD_PERCENT * self.total_lines as f64
    }
}

/// Single-pass, non-restartable iterator over the records of one log source.
///
/// Yields `Err` only for I/O failures; unparsable lines are counted, logged at debug
/// level and skipped. After an `Err` the stream is exhausted.
#[derive(Debug)]
pub struct LineStream<R> {
    reader: Option<R>,
    source_name: String,
    limit: Option<usize>,
    summary: StreamSummary,
    buffer: Vec<u8>,
}

impl LineStream<Box<dyn BufRead>> {
    /// Open `path` (decompressing `.gz` files) as a record stream.
    ///
    /// `limit` caps the number of examined lines; `None` reads to EOF.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn open(path: &Path, limit: Option<usize>) -> Result<Self, InputError> {
        let reader = open_log(path)?;
        Ok(Self::from_reader(
            reader,
            path.display().to_string(),
            limit,
        ))
    }
}

impl<R: BufRead> LineStream<R> {
    /// Wrap an already-decoded reader.
    ///
    /// `source_name` identifies the source in logs and errors.
    pub fn from_reader(reader: R, source_name: impl Into<String>, limit: Option<usize>) -> Self {
        Self {
            reader: Some(reader),
            source_name: source_name.into(),
            limit,
            summary: StreamSummary::default(),
            buffer: Vec::new(),
        }
    }

    /// Identity of the source, as given at construction.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Counters so far.
    pub fn summary(&self) -> StreamSummary {
        self.summary
    }

    /// True once the reader has been released.
    pub fn is_exhausted(&self) -> bool {
        self.reader.is_none()
    }

    /// Release the reader and apply the error-rate gate.
    ///
    /// Call after iteration has ended. Calling it early simply judges the lines
    /// examined so far.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::TooManyParseErrors`] if more than
    /// [`ERROR_THRESHOLD_PERCENT`] of the examined lines were skipped.
    pub fn finish(mut self) -> Result<StreamSummary, AnalysisError> {
        self.reader = None;
        let summary = self.summary;

        if summary.exceeds_error_budget() {
            error!(
                source = %self.source_name,
                error_percent = summary.error_percent(),
                skipped = summary.skipped_lines,
                total = summary.total_lines,
                "Too many errors occurred while parsing"
            );
            return Err(AnalysisError::TooManyParseErrors {
                source_name: self.source_name,
                error_percent: summary.error_percent(),
            });
        }

        debug!(
            source = %self.source_name,
            parsed = summary.parsed_lines(),
            skipped = summary.skipped_lines,
            "Line stream finished"
        );
        Ok(summary)
    }

    fn limit_reached(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.summary.total_lines >= limit)
    }
}

impl<R: BufRead> Iterator for LineStream<R> {
    type Item = Result<LogRecord, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.limit_reached() {
                self.reader = None;
                return None;
            }
            let reader = self.reader.as_mut()?;

            self.buffer.clear();
            match reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    self.reader = None;
                    return Some(Err(err.into()));
                }
            }
            self.summary.total_lines += 1;

            let line = String::from_utf8_lossy(&self.buffer);
            match parse_line(&line) {
                Some(record) => return Some(Ok(record)),
                None => {
                    self.summary.skipped_lines += 1;
                    debug!(
                        line_number = self.summary.total_lines,
                        line = %line.trim_end(),
                        "Line skipped"
                    );
                }
            }
        }
    }
}

impl<R: BufRead> FusedIterator for LineStream<R> {}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
