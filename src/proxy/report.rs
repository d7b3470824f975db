//! Human-readable progress reporting

use crate::proxy::models::{Candidate, FailureKind, RankedProxy};
use crate::proxy::ranker::FailureTally;
use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

/// Receives progress events during a run
///
/// Every hook defaults to a no-op so implementations only pick what they show.
pub trait StatusReporter: Send + Sync {
    /// The candidate list was fetched
    fn loaded(&self, _count: usize) {}

    /// A probe succeeded
    fn success(&self, _entry: &RankedProxy) {}

    /// A probe failed
    fn failure(&self, _candidate: &Candidate, _kind: FailureKind) {}

    /// The result set was persisted
    fn finished(&self, _summary: &Summary<'_>) {}
}

/// Totals handed to [`StatusReporter::finished`]
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    pub loaded: usize,
    pub working: usize,
    pub destination: &'a str,
    pub failures: &'a FailureTally,
}

/// Reports nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl StatusReporter for SilentReporter {}

/// Prints progress lines, to stdout unless another writer is given
pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
    failure_stats: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            failure_stats: false,
        }
    }

    /// Also print categorised failure counts in the summary
    pub fn with_failure_stats(mut self, enabled: bool) -> Self {
        self.failure_stats = enabled;
        self
    }

    fn emit(&self, args: fmt::Arguments<'_>) {
        // Progress output is best effort; a closed stdout must not end the run.
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_fmt(args);
            let _ = out.flush();
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConsoleReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleReporter")
            .field("failure_stats", &self.failure_stats)
            .finish_non_exhaustive()
    }
}

impl StatusReporter for ConsoleReporter {
    fn loaded(&self, count: usize) {
        self.emit(format_args!("[+] Loaded {} proxies\n", count));
    }

    fn success(&self, entry: &RankedProxy) {
        self.emit(format_args!(
            "[OK] {} -> {:.2}s\n",
            entry.candidate,
            entry.elapsed_secs()
        ));
    }

    fn finished(&self, summary: &Summary<'_>) {
        self.emit(format_args!(
            "\n✅ Saved {} working proxies to {} ({} loaded)\n",
            summary.working, summary.destination, summary.loaded
        ));
        if self.failure_stats {
            self.emit(format_args!("   {}\n", summary.failures));
        }
    }
}
