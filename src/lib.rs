//! nginx access log analyzer.
//!
//! Finds the most recent rotated nginx access log in a directory, aggregates
//! per-endpoint request timing statistics in one streaming pass, and renders
//! them into an HTML report.
//!
//! The core (parser, statistics, rendering) is pure; file system access lives
//! in `source`, `report` and `integration`.

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod report;
pub mod source;

// Pipeline entry point
pub mod integration;
