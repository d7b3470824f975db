use async_trait::async_trait;
use proxy_rank::{
    proxy::{
        Candidate, FailureKind, FileListSource, FileSink, HttpProbe, ListSource, ProbeOutcome,
        Probe, SilentReporter, StatusReporter, Summary,
    },
    FetchError, RunConfig, RunError, Runner,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct StaticSource(&'static str);

#[async_trait]
impl ListSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<Candidate>, FetchError> {
        Ok(proxy_rank::proxy::parse_candidates(self.0))
    }
}

struct FailingSource;

#[async_trait]
impl ListSource for FailingSource {
    async fn fetch(&self) -> Result<Vec<Candidate>, FetchError> {
        Err(FetchError::Status {
            url: "http://list.test/proxies.txt".to_string(),
            status: 500,
        })
    }
}

/// Returns a fixed outcome per candidate and counts invocations
#[derive(Default)]
struct FixedProbe {
    latencies: HashMap<&'static str, Duration>,
    calls: AtomicUsize,
}

impl FixedProbe {
    fn with(latencies: &[(&'static str, Duration)]) -> Self {
        Self {
            latencies: latencies.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Probe for FixedProbe {
    async fn probe(&self, candidate: &Candidate) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.latencies.get(candidate.as_str()) {
            Some(elapsed) => ProbeOutcome::success(candidate.clone(), *elapsed),
            None => ProbeOutcome::failure(candidate.clone(), FailureKind::Timeout),
        }
    }
}

#[derive(Default)]
struct RecordingReporter {
    loaded: Mutex<Option<usize>>,
    finished: Mutex<Option<(usize, usize)>>,
}

impl StatusReporter for RecordingReporter {
    fn loaded(&self, count: usize) {
        *self.loaded.lock().unwrap() = Some(count);
    }

    fn finished(&self, summary: &Summary<'_>) {
        *self.finished.lock().unwrap() = Some((summary.working, summary.failures.total()));
    }
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("work.txt");

    let source = StaticSource("proxyA\n\nproxyB\n");
    let probe = Arc::new(FixedProbe::with(&[("proxyA", Duration::from_millis(800))]));
    let sink = FileSink::new(&output);
    let reporter = RecordingReporter::default();

    let summary = Runner::new(&source, Arc::clone(&probe), 30, &sink, &reporter)
        .run()
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "proxyA  # 0.80s\n");
    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.failures.timeout, 1);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
    assert_eq!(*reporter.loaded.lock().unwrap(), Some(2));
    assert_eq!(*reporter.finished.lock().unwrap(), Some((1, 1)));
}

#[tokio::test]
async fn test_output_is_ranked_slowest_first() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("work.txt");

    let source = StaticSource("a\nb\nc\nd\n");
    let probe = Arc::new(FixedProbe::with(&[
        ("a", Duration::from_millis(500)),
        ("b", Duration::from_millis(3200)),
        ("c", Duration::from_millis(1100)),
    ]));
    let sink = FileSink::new(&output);

    let summary = Runner::new(&source, probe, 2, &sink, &SilentReporter)
        .run()
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "b  # 3.20s\nc  # 1.10s\na  # 0.50s\n"
    );
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.results.fastest().unwrap().candidate.as_str(), "a");
}

#[tokio::test]
async fn test_runner_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("work.txt");
    let config = RunConfig::new().with_concurrency(1).with_output(&output);

    let source = StaticSource("slow\nfast\n");
    let probe = Arc::new(FixedProbe::with(&[
        ("slow", Duration::from_millis(2000)),
        ("fast", Duration::from_millis(250)),
    ]));
    let sink = FileSink::new(config.output.clone());

    let summary = Runner::from_config(&source, Arc::clone(&probe), &config, &sink, &SilentReporter)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.saved, 2);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "slow  # 2.00s\nfast  # 0.25s\n"
    );
}

#[tokio::test]
async fn test_fetch_failure_issues_no_probes() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("work.txt");

    let probe = Arc::new(FixedProbe::default());
    let sink = FileSink::new(&output);

    let err = Runner::new(&FailingSource, Arc::clone(&probe), 30, &sink, &SilentReporter)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RunError::Fetch(FetchError::Status { status: 500, .. })
    ));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_empty_list_writes_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("work.txt");
    std::fs::write(&output, "old entry  # 1.00s\n").unwrap();

    let source = StaticSource("\n  \n");
    let sink = FileSink::new(&output);

    let summary = Runner::new(&source, Arc::new(FixedProbe::default()), 30, &sink, &SilentReporter)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.loaded, 0);
    assert_eq!(summary.saved, 0);
    assert!(summary.results.is_empty());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}

#[tokio::test]
async fn test_sink_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("no-such-dir").join("work.txt");

    let source = StaticSource("proxyA\n");
    let probe = Arc::new(FixedProbe::with(&[("proxyA", Duration::from_millis(100))]));
    let sink = FileSink::new(&output);

    let err = Runner::new(&source, probe, 30, &sink, &SilentReporter)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Sink(_)));
}

/// Minimal forward proxy that answers every request with `200 OK`
async fn spawn_proxy(body: &'static str) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn test_http_probe_through_local_proxy() {
    let working = spawn_proxy("198.51.100.4").await;
    let dead = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("list.txt");
    let output = dir.path().join("work.txt");
    std::fs::write(&list, format!("http://{working}\n\nhttp://{dead}\n")).unwrap();

    let source = FileListSource::new(&list);
    let probe = Arc::new(HttpProbe::new(
        "http://validation.test/",
        Duration::from_secs(5),
    ));
    let sink = FileSink::new(&output);

    let summary = Runner::new(&source, probe, 4, &sink, &SilentReporter)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.failures.connect, 1);

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(&format!("http://{working}  # ")));
    assert!(lines[0].ends_with('s'));
}
