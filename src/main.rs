use clap::Parser;
use proxy_rank::{
    proxy::{ConsoleReporter, FileListSource, FileSink, HttpListSource, HttpProbe, ListSource},
    Result, RunConfig, RunError, Runner,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validate candidate proxies concurrently and rank the working ones by latency
#[derive(Parser)]
#[command(name = "proxy-rank")]
#[command(about = "Validate candidate proxies concurrently and rank the working ones by latency")]
struct Cli {
    /// YAML config file; command line flags override its values
    #[arg(short, long, env = "PROXY_RANK_CONFIG")]
    config: Option<PathBuf>,

    /// URL of the proxy list (one proxy per line)
    #[arg(long, conflicts_with = "list_file")]
    list_url: Option<String>,

    /// Read the proxy list from a local file instead of downloading it
    #[arg(short = 'f', long)]
    list_file: Option<PathBuf>,

    /// URL to request through each proxy
    #[arg(long)]
    test_url: Option<String>,

    /// Per-proxy timeout in seconds (fractions allowed)
    #[arg(short, long, value_parser = parse_secs)]
    timeout: Option<Duration>,

    /// Timeout in seconds for downloading the proxy list
    #[arg(long, value_parser = parse_secs)]
    fetch_timeout: Option<Duration>,

    /// Number of concurrent checks
    #[arg(short = 'n', long)]
    concurrency: Option<usize>,

    /// Output file for working proxies
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print failure counts by category after the run
    #[arg(long)]
    failure_stats: bool,
}

/// Seconds as accepted by the config file, e.g. `6` or `2.5`
fn parse_secs(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("`{s}` must be a non-negative number"))
}

impl Cli {
    fn into_config(self) -> Result<(RunConfig, Option<PathBuf>, bool)> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(url) = self.list_url {
            config = config.with_list_url(url);
        }
        if let Some(url) = self.test_url {
            config = config.with_test_url(url);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_probe_timeout(timeout);
        }
        if let Some(timeout) = self.fetch_timeout {
            config = config.with_fetch_timeout(timeout);
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(output) = self.output {
            config = config.with_output(output);
        }

        config.validate()?;
        Ok((config, self.list_file, self.failure_stats))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proxy_rank=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let (config, list_file, failure_stats) = Cli::parse().into_config()?;

    let source: Box<dyn ListSource> = match list_file {
        Some(path) => Box::new(FileListSource::new(path)),
        None => Box::new(HttpListSource::from_config(&config)?),
    };
    let probe = Arc::new(HttpProbe::from_config(&config));
    let sink = FileSink::new(config.output.clone());
    let reporter = ConsoleReporter::new().with_failure_stats(failure_stats);

    info!(test_url = %config.test_url, timeout = ?config.probe_timeout, "starting run");

    let runner = Runner::from_config(source.as_ref(), probe, &config, &sink, &reporter);
    let run = runner.run();
    tokio::pin!(run);

    let summary = tokio::select! {
        result = &mut run => result?,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                error!("interrupted, aborting in-flight probes");
                return Err(RunError::Interrupted.into());
            }
            Err(e) => {
                warn!(error = %e, "could not listen for Ctrl-C, continuing without it");
                run.await?
            }
        },
    };

    info!(loaded = summary.loaded, saved = summary.saved, "run complete");
    Ok(())
}
