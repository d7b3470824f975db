//! Run configuration
//!
//! Values come from three layers: built-in defaults, an optional YAML file and
//! finally whatever the command line overrides.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default source of raw candidates, one per line
pub const DEFAULT_LIST_URL: &str =
    "https://cdn.jsdelivr.net/gh/proxifly/free-proxy-list@main/proxies/all/data.txt";

/// Default URL every candidate is asked to fetch
pub const DEFAULT_TEST_URL: &str = "https://api.ipify.org";

/// Default per-probe timeout in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 6;

/// Default timeout for downloading the candidate list in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default number of probes in flight
pub const DEFAULT_CONCURRENCY: usize = 30;

/// Default report file
pub const DEFAULT_OUTPUT: &str = "work.txt";

const DEFAULT_USER_AGENT: &str = concat!("proxy-rank/", env!("CARGO_PKG_VERSION"));

/// Tunables for one ranking run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Where the candidate list is downloaded from
    pub list_url: String,
    /// Validation endpoint requested through each candidate
    pub test_url: String,
    /// Hard limit for a single probe
    pub probe_timeout: Duration,
    /// Hard limit for downloading the candidate list
    pub fetch_timeout: Duration,
    /// Maximum probes in flight
    pub concurrency: usize,
    /// Report file, overwritten on every run
    pub output: PathBuf,
    /// User agent sent to the list source
    pub user_agent: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            list_url: DEFAULT_LIST_URL.to_string(),
            test_url: DEFAULT_TEST_URL.to_string(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            output: PathBuf::from(DEFAULT_OUTPUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_url(mut self, url: impl Into<String>) -> Self {
        self.list_url = url.into();
        self
    }

    pub fn with_test_url(mut self, url: impl Into<String>) -> Self {
        self.test_url = url.into();
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Load defaults overlaid with the YAML file at `path`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::default().merge(file)
    }

    /// Reject values that would stall or never admit a probe
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "probe timeout must be greater than zero".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "fetch timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn merge(mut self, file: FileConfig) -> Result<Self, ConfigError> {
        if let Some(url) = file.list_url {
            self.list_url = url;
        }
        if let Some(url) = file.test_url {
            self.test_url = url;
        }
        if let Some(secs) = file.probe_timeout_secs {
            self.probe_timeout = secs_to_duration("probe_timeout_secs", secs)?;
        }
        if let Some(secs) = file.fetch_timeout_secs {
            self.fetch_timeout = secs_to_duration("fetch_timeout_secs", secs)?;
        }
        if let Some(concurrency) = file.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(output) = file.output {
            self.output = output;
        }
        if let Some(user_agent) = file.user_agent {
            self.user_agent = user_agent;
        }
        Ok(self)
    }
}

fn secs_to_duration(key: &str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        ConfigError::Invalid(format!("{key} must be a non-negative number, got {secs}"))
    })
}

/// On-disk shape of the config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    list_url: Option<String>,
    test_url: Option<String>,
    probe_timeout_secs: Option<f64>,
    fetch_timeout_secs: Option<f64>,
    concurrency: Option<usize>,
    output: Option<PathBuf>,
    user_agent: Option<String>,
}
