//! Collects probe outcomes and ranks the working proxies

use crate::proxy::models::{FailureKind, ProbeOutcome, RankedProxy};
use crate::proxy::report::StatusReporter;
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Working proxies ordered slowest first, fastest last
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    entries: Vec<RankedProxy>,
}

impl ResultSet {
    /// Sort by elapsed time, descending. The sort is stable, so equal
    /// latencies keep their arrival order.
    pub fn from_unsorted(mut entries: Vec<RankedProxy>) -> Self {
        entries.sort_by(|a, b| b.elapsed.cmp(&a.elapsed));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedProxy> {
        self.entries.iter()
    }

    /// The fastest working proxy, if any
    pub fn fastest(&self) -> Option<&RankedProxy> {
        self.entries.last()
    }
}

/// Failed probes counted per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureTally {
    pub timeout: usize,
    pub connect: usize,
    pub status: usize,
    pub empty_body: usize,
    pub other: usize,
}

impl FailureTally {
    pub fn record(&mut self, kind: FailureKind) {
        match kind {
            FailureKind::Timeout => self.timeout += 1,
            FailureKind::Connect => self.connect += 1,
            FailureKind::Status => self.status += 1,
            FailureKind::EmptyBody => self.empty_body += 1,
            FailureKind::Other => self.other += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.timeout + self.connect + self.status + self.empty_body + self.other
    }
}

impl fmt::Display for FailureTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed (timeout: {}, connect: {}, status: {}, empty body: {}, other: {})",
            self.total(),
            self.timeout,
            self.connect,
            self.status,
            self.empty_body,
            self.other
        )
    }
}

/// Everything learned from draining an outcome stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub results: ResultSet,
    pub failures: FailureTally,
}

impl Aggregation {
    /// Number of outcomes consumed
    pub fn processed(&self) -> usize {
        self.results.len() + self.failures.total()
    }
}

/// Drain `outcomes` until exhausted and rank the successes
///
/// Each success is reported as it arrives; failures only reach the reporter's
/// `failure` hook and never the result set.
pub async fn aggregate<S>(outcomes: S, reporter: &dyn StatusReporter) -> Aggregation
where
    S: Stream<Item = ProbeOutcome>,
{
    let mut outcomes = std::pin::pin!(outcomes);
    let mut working = Vec::new();
    let mut failures = FailureTally::default();

    while let Some(outcome) = outcomes.next().await {
        match outcome {
            ProbeOutcome::Success { candidate, elapsed } => {
                let entry = RankedProxy::new(candidate, elapsed);
                reporter.success(&entry);
                working.push(entry);
            }
            ProbeOutcome::Failure { candidate, kind } => {
                reporter.failure(&candidate, kind);
                failures.record(kind);
            }
        }
    }

    let results = ResultSet::from_unsorted(working);
    debug!(working = results.len(), %failures, "outcomes aggregated");

    Aggregation { results, failures }
}
