//! Proxy Rank - Concurrent Proxy Validator
//!
//! Fetches a list of candidate proxies, probes each one with a real request
//! through a bounded worker pool and writes the working ones ranked by latency.

pub mod config;
pub mod error;
pub mod proxy;
pub mod runner;

pub use config::RunConfig;
pub use error::{ConfigError, FetchError, ProbeError, RunError, SinkError};
pub use proxy::*;
pub use runner::{RunSummary, Runner};

/// Application result type
pub type Result<T> = anyhow::Result<T>;
