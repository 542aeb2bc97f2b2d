//! Status reporting.
//!
//! - report.rs: registry + health + window usage as one JSON-ready report
//! - benchmark.rs: probe every backend once, off the routing path

pub mod benchmark;
pub mod report;

pub use benchmark::{run_benchmark, BenchmarkResult, DEFAULT_PROBE};
pub use report::{build_report, BackendStatus, StatusReport};
