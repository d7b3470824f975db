//! Error types for a ranking run
//!
//! Only [`FetchError`], [`SinkError`] and [`ConfigError`] ever end a run. A
//! [`ProbeError`] is absorbed into a failed [`ProbeOutcome`](crate::proxy::ProbeOutcome)
//! at the worker and never crosses the scheduler boundary.

use crate::proxy::models::FailureKind;
use std::path::PathBuf;
use thiserror::Error;

/// The candidate list could not be obtained
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to request proxy list: {0}")]
    Request(#[from] reqwest::Error),

    #[error("proxy list at {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read proxy list {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single probe did not succeed
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("could not build client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("empty response body")]
    EmptyBody,

    #[error("failed to read body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("probe panicked")]
    Panicked,
}

impl ProbeError {
    /// Collapse the error into the category recorded on the outcome
    pub fn kind(&self) -> FailureKind {
        match self {
            ProbeError::Timeout => FailureKind::Timeout,
            ProbeError::Connect(_) => FailureKind::Connect,
            ProbeError::Status(_) => FailureKind::Status,
            ProbeError::EmptyBody => FailureKind::EmptyBody,
            ProbeError::Client(_) | ProbeError::Body(_) | ProbeError::Panicked => {
                FailureKind::Other
            }
        }
    }
}

/// The ranked result set could not be persisted
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write results to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration could not be loaded or is unusable
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Run-level failure
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("interrupted before all probes completed")]
    Interrupted,
}
