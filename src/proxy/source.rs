//! Candidate list sources
//!
//! A list is plain text with one endpoint per line. Lines are trimmed and blank
//! lines skipped; everything else is taken verbatim.

use crate::config::RunConfig;
use crate::error::FetchError;
use crate::proxy::models::Candidate;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Supplies the raw candidate list for a run
#[async_trait]
pub trait ListSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Candidate>, FetchError>;
}

/// Split list content into candidates
pub fn parse_candidates(content: &str) -> Vec<Candidate> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Candidate::from)
        .collect()
}

/// Downloads the list with a single GET
#[derive(Debug, Clone)]
pub struct HttpListSource {
    url: String,
    client: Client,
}

impl HttpListSource {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, FetchError> {
        Self::new(
            config.list_url.clone(),
            config.fetch_timeout,
            &config.user_agent,
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ListSource for HttpListSource {
    async fn fetch(&self) -> Result<Vec<Candidate>, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let content = response.text().await?;
        let candidates = parse_candidates(&content);
        info!(url = %self.url, count = candidates.len(), "proxy list fetched");
        Ok(candidates)
    }
}

/// Reads the list from a local file
#[derive(Debug, Clone)]
pub struct FileListSource {
    path: PathBuf,
}

impl FileListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListSource for FileListSource {
    async fn fetch(&self) -> Result<Vec<Candidate>, FetchError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;

        let candidates = parse_candidates(&content);
        info!(path = ?self.path, count = candidates.len(), "proxy list loaded");
        Ok(candidates)
    }
}
