//! Proxy module for validating and ranking proxies
//!
//! This module provides functionality for:
//! - Fetching candidate lists over HTTP or from a file
//! - Probing candidates through a bounded worker pool
//! - Ranking working proxies by latency and saving them

pub mod models;
pub mod probe;
pub mod ranker;
pub mod report;
pub mod scheduler;
pub mod sink;
pub mod source;

#[cfg(test)]
pub(crate) mod stub;

pub use models::{Candidate, FailureKind, ProbeOutcome, RankedProxy};
pub use probe::{HttpProbe, Probe};
pub use ranker::{aggregate, Aggregation, FailureTally, ResultSet};
pub use report::{ConsoleReporter, SilentReporter, StatusReporter, Summary};
pub use scheduler::{OutcomeStream, Scheduler};
pub use sink::{FileSink, ResultSink};
pub use source::{parse_candidates, FileListSource, HttpListSource, ListSource};
