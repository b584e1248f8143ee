//! Per-endpoint timing statistics.
//!
//! [`EndpointTable`] is the streaming aggregator: it is fed one [`LogRecord`] at a
//! time in arrival order and, once the stream is drained, finalized exactly once into
//! a list of [`EndpointSummary`] rows carrying percentage shares.

use crate::model::error::AnalysisError;
use crate::model::LogRecord;
use serde::Serialize;
use std::collections::HashMap;

/// Round to three decimal places.
///
/// Rounds the exact binary value with ties to even, so `0.0625` becomes `0.062`
/// and `1.5625` becomes `1.562`.
pub fn round3(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.3}").parse().unwrap_or(value)
}

// ===== EndpointStats =====

/// Running statistics for a single endpoint key.
///
/// # Invariants
///
/// - `count >= 1` (created on first observation)
/// - `time_max` is the largest duration observed for this key
/// - `time_sum` and `time_avg` are rounded to three decimals after every update
///   except the first
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointStats {
    /// Number of requests observed.
    pub count: u64,
    /// Sum of request durations in seconds.
    pub time_sum: f64,
    /// Running mean of request durations in seconds.
    pub time_avg: f64,
    /// Maximum request duration in seconds.
    pub time_max: f64,
    /// Duration of the first observation; never updated.
    pub time_med: f64,
}

impl EndpointStats {
    /// Statistics for a key observed once.
    pub fn first(duration: f64) -> Self {
        Self {
            count: 1,
            time_sum: duration,
            time_avg: duration,
            time_max: duration,
            time_med: duration,
        }
    }

    /// Fold one more sample into the running statistics.
    ///
    /// The running mean is recomputed from the previous (rounded) mean and the
    /// pre-increment count. Reports produced by earlier versions of this tool depend
    /// on this exact recurrence, including its rounding drift.
    pub fn observe(&mut self, duration: f64) {
        let count = self.count as f64;
        self.time_sum = round3(self.time_sum + duration);
        self.time_avg = round3((self.time_avg * count + duration) / (count + 1.0));
        if duration > self.time_max {
            self.time_max = duration;
        }
        self.count += 1;
    }
}

// ===== RunTotals =====

/// Grand totals over every successfully parsed record of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunTotals {
    /// Number of records aggregated.
    pub total_count: u64,
    /// Unrounded sum of all request durations in seconds.
    pub total_time: f64,
}

impl RunTotals {
    fn observe(&mut self, duration: f64) {
        self.total_count += 1;
        self.total_time += duration;
    }
}

// ===== EndpointSummary =====

/// A finalized report row.
///
/// Field order matches the column order the report template expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointSummary {
    /// Endpoint key.
    pub url: String,
    /// Number of requests.
    pub count: u64,
    /// Share of all requests, percent.
    pub count_perc: f64,
    /// Sum of durations in seconds.
    pub time_sum: f64,
    /// Share of total request time, percent.
    pub time_perc: f64,
    /// Running mean duration in seconds.
    pub time_avg: f64,
    /// Maximum duration in seconds.
    pub time_max: f64,
    /// First observed duration in seconds, the `time_med` column of existing
    /// report templates.
    pub time_med: f64,
}

// ===== EndpointTable =====

/// Streaming aggregator keyed by endpoint.
///
/// Keys keep the order of their first appearance; that order is preserved in the
/// finalized output.
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, EndpointStats)>,
    totals: RunTotals,
}

impl EndpointTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record statistics from a parsed log record.
    pub fn record(&mut self, record: &LogRecord) {
        self.record_sample(record.endpoint_key(), record.request_time);
    }

    /// Record one duration sample for `key`.
    pub fn record_sample(&mut self, key: &str, duration: f64) {
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].1.observe(duration),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries
                    .push((key.to_string(), EndpointStats::first(duration)));
            }
        }
        self.totals.observe(duration);
    }

    /// Running statistics for `key`, if it has been observed.
    pub fn get(&self, key: &str) -> Option<&EndpointStats> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Grand totals so far.
    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    /// Number of distinct endpoint keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compute percentage shares against the grand totals.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyDataset`] when no record was aggregated or the
    /// total request time is zero, since the shares would be undefined.
    pub fn finalize(self) -> Result<Vec<EndpointSummary>, AnalysisError> {
        let RunTotals {
            total_count,
            total_time,
        } = self.totals;
        if total_count == 0 || total_time == 0.0 {
            return Err(AnalysisError::EmptyDataset);
        }

        Ok(self
            .entries
            .into_iter()
            .map(|(url, stats)| EndpointSummary {
                count_perc: round3(stats.count as f64 / total_count as f64 * 100.0),
                time_perc: round3(stats.time_sum / total_time * 100.0),
                url,
                count: stats.count,
                time_sum: stats.time_sum,
                time_avg: stats.time_avg,
                time_max: stats.time_max,
                time_med: stats.time_med,
            })
            .collect())
    }
}
