//! End-to-end ranking run: fetch, probe, rank, persist

use crate::config::RunConfig;
use crate::error::RunError;
use crate::proxy::probe::Probe;
use crate::proxy::ranker::{aggregate, FailureTally, ResultSet};
use crate::proxy::report::{StatusReporter, Summary};
use crate::proxy::scheduler::Scheduler;
use crate::proxy::sink::ResultSink;
use crate::proxy::source::ListSource;
use std::sync::Arc;
use tracing::{debug, info};

/// What a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Candidates read from the list source
    pub loaded: usize,
    /// Entries written to the sink
    pub saved: usize,
    pub failures: FailureTally,
    pub results: ResultSet,
}

/// Wires the collaborators of a run together
pub struct Runner<'a, P: ?Sized> {
    source: &'a dyn ListSource,
    scheduler: Scheduler<P>,
    sink: &'a dyn ResultSink,
    reporter: &'a dyn StatusReporter,
}

impl<'a, P> Runner<'a, P>
where
    P: Probe + ?Sized + 'static,
{
    pub fn new(
        source: &'a dyn ListSource,
        probe: Arc<P>,
        concurrency: usize,
        sink: &'a dyn ResultSink,
        reporter: &'a dyn StatusReporter,
    ) -> Self {
        Self {
            source,
            scheduler: Scheduler::new(probe, concurrency),
            sink,
            reporter,
        }
    }

    /// Build a runner whose worker pool follows `config`
    pub fn from_config(
        source: &'a dyn ListSource,
        probe: Arc<P>,
        config: &RunConfig,
        sink: &'a dyn ResultSink,
        reporter: &'a dyn StatusReporter,
    ) -> Self {
        Self {
            source,
            scheduler: Scheduler::from_config(probe, config),
            sink,
            reporter,
        }
    }

    /// Execute one run
    ///
    /// A fetch failure aborts before any probe is issued and nothing is
    /// written. Individual probe failures never fail the run.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let candidates = self.source.fetch().await?;
        let loaded = candidates.len();
        self.reporter.loaded(loaded);
        info!(
            loaded,
            concurrency = self.scheduler.concurrency(),
            "probing candidates"
        );

        let outcomes = self.scheduler.run_all(candidates);
        let aggregation = aggregate(outcomes, self.reporter).await;
        debug!(processed = aggregation.processed(), "all probes completed");

        let saved = self.sink.write(&aggregation.results).await?;
        let destination = self.sink.describe();
        self.reporter.finished(&Summary {
            loaded,
            working: saved,
            destination: &destination,
            failures: &aggregation.failures,
        });

        Ok(RunSummary {
            loaded,
            saved,
            failures: aggregation.failures,
            results: aggregation.results,
        })
    }
}
