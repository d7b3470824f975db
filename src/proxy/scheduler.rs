//! Bounded worker pool that fans probes out over the candidate list
//!
//! A fixed number of workers pull candidates from a shared queue and push each
//! outcome into a channel as soon as it is known. The caller consumes the
//! channel as an [`OutcomeStream`], so outcomes arrive in completion order and
//! memory stays proportional to the concurrency limit rather than to the
//! number of candidates.

use crate::config::RunConfig;
use crate::error::ProbeError;
use crate::proxy::models::{Candidate, ProbeOutcome};
use crate::proxy::probe::Probe;
use futures::{FutureExt, Stream};
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Candidates waiting for a free worker
///
/// Workers claim the next index with a single atomic increment, so there is no
/// lock around the supply.
#[derive(Debug)]
struct CandidateQueue {
    items: Vec<Candidate>,
    cursor: AtomicUsize,
}

impl CandidateQueue {
    fn new(items: Vec<Candidate>) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    fn next(&self) -> Option<&Candidate> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.items.get(index)
    }
}

/// Runs a probe over many candidates with at most `concurrency` in flight
pub struct Scheduler<P: ?Sized> {
    probe: Arc<P>,
    concurrency: usize,
}

impl<P> Scheduler<P>
where
    P: Probe + ?Sized + 'static,
{
    /// A limit of zero is treated as one
    pub fn new(probe: Arc<P>, concurrency: usize) -> Self {
        Self {
            probe,
            concurrency: concurrency.max(1),
        }
    }

    /// Take the concurrency limit from the run configuration
    pub fn from_config(probe: Arc<P>, config: &RunConfig) -> Self {
        Self::new(probe, config.concurrency)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probe every candidate exactly once
    ///
    /// Must be called from within a tokio runtime. Probing starts immediately;
    /// dropping the returned stream aborts all in-flight probes.
    pub fn run_all(&self, candidates: Vec<Candidate>) -> OutcomeStream {
        let total = candidates.len();
        let workers = self.concurrency.min(total);
        let queue = Arc::new(CandidateQueue::new(candidates));
        let (tx, rx) = mpsc::channel(self.concurrency);

        let mut tasks = JoinSet::new();
        for id in 0..workers {
            let queue = Arc::clone(&queue);
            let probe = Arc::clone(&self.probe);
            let tx = tx.clone();
            tasks.spawn(async move { worker(id, queue, probe, tx).await });
        }

        debug!(total, workers, "probing started");

        OutcomeStream {
            rx,
            _tasks: tasks,
            expected: total,
            received: 0,
        }
    }
}

async fn worker<P>(
    id: usize,
    queue: Arc<CandidateQueue>,
    probe: Arc<P>,
    tx: mpsc::Sender<ProbeOutcome>,
) where
    P: Probe + ?Sized,
{
    while let Some(candidate) = queue.next() {
        let outcome = match AssertUnwindSafe(probe.probe(candidate))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(worker = id, %candidate, "probe panicked");
                ProbeOutcome::failure(candidate.clone(), ProbeError::Panicked.kind())
            }
        };

        if tx.send(outcome).await.is_err() {
            debug!(worker = id, "outcome receiver dropped, stopping");
            return;
        }
    }
}

/// Completion-ordered outcomes of a [`Scheduler::run_all`] call
///
/// The stream ends once every candidate has reported.
pub struct OutcomeStream {
    rx: mpsc::Receiver<ProbeOutcome>,
    // Dropping the set aborts the workers.
    _tasks: JoinSet<()>,
    expected: usize,
    received: usize,
}

impl OutcomeStream {
    /// Number of outcomes the stream will yield in total
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Outcomes not yet received
    pub fn remaining(&self) -> usize {
        self.expected - self.received
    }
}

impl Stream for OutcomeStream {
    type Item = ProbeOutcome;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(outcome)) => {
                this.received += 1;
                Poll::Ready(Some(outcome))
            }
            other => other,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl std::fmt::Debug for OutcomeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeStream")
            .field("expected", &self.expected)
            .field("received", &self.received)
            .finish()
    }
}
