//! Persisting the ranked result set

use crate::error::SinkError;
use crate::proxy::models::RankedProxy;
use crate::proxy::ranker::ResultSet;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Destination for a finished result set
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist `results` in order, returning how many entries were written
    async fn write(&self, results: &ResultSet) -> Result<usize, SinkError>;

    /// Where the results end up, for status messages
    fn describe(&self) -> String;
}

/// Writes one line per working proxy, replacing the file each run
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultSink for FileSink {
    async fn write(&self, results: &ResultSet) -> Result<usize, SinkError> {
        tokio::fs::write(&self.path, render(results))
            .await
            .map_err(|source| SinkError::Io {
                path: self.path.clone(),
                source,
            })?;

        info!(path = ?self.path, count = results.len(), "results written");
        Ok(results.len())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// `<candidate>  # <seconds>s`
pub fn format_line(entry: &RankedProxy) -> String {
    format!("{}  # {:.2}s", entry.candidate, entry.elapsed_secs())
}

/// Full file content, newline-terminated lines in result order
pub fn render(results: &ResultSet) -> String {
    results
        .iter()
        .map(|entry| format_line(entry) + "\n")
        .collect()
}
