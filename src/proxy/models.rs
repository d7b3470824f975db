//! Proxy data models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A proxy endpoint under test, e.g. `http://1.2.3.4:8080` or `socks5://host:1080`
///
/// The string is passed to the HTTP client as-is; no parsing or deduplication happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self(endpoint.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Candidate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Candidate {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Coarse category of a failed probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    Timeout,
    Connect,
    Status,
    EmptyBody,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Connect => write!(f, "connect"),
            FailureKind::Status => write!(f, "status"),
            FailureKind::EmptyBody => write!(f, "empty body"),
            FailureKind::Other => write!(f, "other"),
        }
    }
}

/// Result of probing a single candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    Success {
        candidate: Candidate,
        elapsed: Duration,
    },
    Failure {
        candidate: Candidate,
        kind: FailureKind,
    },
}

impl ProbeOutcome {
    pub fn success(candidate: Candidate, elapsed: Duration) -> Self {
        ProbeOutcome::Success { candidate, elapsed }
    }

    pub fn failure(candidate: Candidate, kind: FailureKind) -> Self {
        ProbeOutcome::Failure { candidate, kind }
    }

    pub fn candidate(&self) -> &Candidate {
        match self {
            ProbeOutcome::Success { candidate, .. } | ProbeOutcome::Failure { candidate, .. } => {
                candidate
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }
}

/// A working proxy with its measured latency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProxy {
    pub candidate: Candidate,
    pub elapsed: Duration,
}

impl RankedProxy {
    pub fn new(candidate: Candidate, elapsed: Duration) -> Self {
        Self { candidate, elapsed }
    }

    /// Elapsed time in seconds as printed in reports
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
