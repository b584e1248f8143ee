//! Domain model types (pure).
//!
//! Parsed records, per-endpoint statistics and the error taxonomy. Nothing in
//! this module performs I/O.

pub mod error;
pub mod record;
pub mod stats;

// Re-export for convenience
pub use error::{AnalysisError, AppError, InputError, ReportError, SelectError};
pub use record::{HttpMethod, LogRecord, RequestLine};
pub use stats::{round3, EndpointStats, EndpointSummary, EndpointTable, RunTotals};
