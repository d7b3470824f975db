//! Probe module for validating a single proxy

use crate::config::RunConfig;
use crate::error::ProbeError;
use crate::proxy::models::{Candidate, ProbeOutcome};
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::time::{Duration, Instant};
use tracing::debug;

/// One validation attempt against one candidate
///
/// Implementations must not share mutable state between calls; the scheduler
/// invokes `probe` from many workers at once. Every call yields exactly one
/// outcome and never propagates an error.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, candidate: &Candidate) -> ProbeOutcome;
}

/// Probes a candidate by fetching the validation endpoint through it
#[derive(Debug, Clone)]
pub struct HttpProbe {
    test_url: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(test_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            test_url: test_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.test_url.clone(), config.probe_timeout)
    }

    pub fn test_url(&self) -> &str {
        &self.test_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Route both http and https traffic through the candidate
    fn create_client(&self, candidate: &Candidate) -> Result<Client, ProbeError> {
        let proxy = ReqwestProxy::all(candidate.as_str()).map_err(ProbeError::Client)?;

        Client::builder()
            .proxy(proxy)
            .timeout(self.timeout)
            .build()
            .map_err(ProbeError::Client)
    }

    async fn fetch(&self, client: Client) -> Result<(), ProbeError> {
        let response = client
            .get(&self.test_url)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout
            } else {
                ProbeError::Body(e)
            }
        })?;
        if body.trim().is_empty() {
            return Err(ProbeError::EmptyBody);
        }

        Ok(())
    }

    /// Returns the elapsed time of a successful request
    async fn check(&self, candidate: &Candidate) -> Result<Duration, ProbeError> {
        let client = self.create_client(candidate)?;

        let start = Instant::now();
        match tokio::time::timeout(self.timeout, self.fetch(client)).await {
            Ok(Ok(())) => Ok(start.elapsed()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, candidate: &Candidate) -> ProbeOutcome {
        match self.check(candidate).await {
            Ok(elapsed) => ProbeOutcome::success(candidate.clone(), elapsed),
            Err(e) => {
                debug!(%candidate, error = %e, "probe failed");
                ProbeOutcome::failure(candidate.clone(), e.kind())
            }
        }
    }
}

fn classify_request_error(e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout
    } else {
        ProbeError::Connect(e)
    }
}
