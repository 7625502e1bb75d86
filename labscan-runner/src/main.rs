//! Labscan Runner
//!
//! Submits TLS assessments for a list of hosts to a job-oriented scanning
//! service, polls each one until it reaches a terminal status and writes one
//! JSON artifact per host.
//!
//! Architecture:
//! - Configuration: command-line flags, each backed by a `LABSCAN_*` variable
//! - Client: HTTP gateway to the scanning service (labscan-client)
//! - Scheduler: per-host poll loop and the batch runner around it
//! - Services: report emission
//!
//! An unavailable scanning service aborts the run before any host is
//! submitted. Per-host failures are reported and the run continues.

mod config;
mod error;
mod output;
mod scheduler;
mod service;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::Config;
use crate::scheduler::{BatchReport, BatchRunner, JobPoller};
use crate::service::{FileReportEmitter, ReportEmitter};
use labscan_client::{DEFAULT_API_URL, ScanApi, ScanClient};

#[derive(Parser)]
#[command(name = "labscan")]
#[command(about = "Assess the TLS configuration of a list of hosts", long_about = None)]
struct Cli {
    /// Hostnames to assess, processed in order
    #[arg(required = true, env = "LABSCAN_HOSTS", value_delimiter = ',')]
    hosts: Vec<String>,

    /// Scanning service base URL
    #[arg(long, env = "LABSCAN_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Seconds between two status polls of the same host
    #[arg(long, env = "LABSCAN_POLL_INTERVAL", default_value_t = 10)]
    poll_interval: u64,

    /// Give up on a host after this many status polls
    #[arg(long, env = "LABSCAN_MAX_POLLS")]
    max_polls: Option<u32>,

    /// Give up on a host after this many seconds (0 disables)
    #[arg(long, env = "LABSCAN_MAX_WAIT", default_value_t = 3600)]
    max_wait: u64,

    /// Retries of a status poll that failed to reach the service
    #[arg(long, env = "LABSCAN_TRANSPORT_RETRIES", default_value_t = 0)]
    transport_retries: u32,

    /// Number of hosts assessed at the same time
    #[arg(short = 'j', long, env = "LABSCAN_MAX_PARALLEL_HOSTS", default_value_t = 1)]
    max_parallel_hosts: usize,

    /// Seconds before an HTTP request times out
    #[arg(long, env = "LABSCAN_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,

    /// Directory receiving the per-host JSON artifacts
    #[arg(short, long, env = "LABSCAN_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Also write a run summary artifact
    #[arg(long, env = "LABSCAN_SUMMARY")]
    summary: bool,

    /// Exit with an error when any host failed
    #[arg(long, env = "LABSCAN_FAIL_ON_ERROR")]
    fail_on_error: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            api_url: self.api_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(self.poll_interval),
            max_polls: self.max_polls,
            max_wait: (self.max_wait > 0).then(|| Duration::from_secs(self.max_wait)),
            transport_retries: self.transport_retries,
            max_parallel_hosts: self.max_parallel_hosts,
            request_timeout: Duration::from_secs(self.request_timeout),
            output_dir: self.output_dir,
            write_summary: self.summary,
            fail_on_error: self.fail_on_error,
            ..Config::new(self.hosts)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labscan_runner=info,labscan_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Cli::parse().into_config();
    config.validate()?;

    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        "Starting scan of {} host(s) against {}",
        config.hosts.len(),
        config.api_url
    );

    // One HTTP client for the whole run, never reconfigured
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let client: Arc<dyn ScanApi> = Arc::new(ScanClient::with_client(
        config.api_url.clone(),
        http_client,
    ));

    let shutdown = CancellationToken::new();
    spawn_shutdown_listener(shutdown.clone());

    let emitter = Arc::new(FileReportEmitter::new(config.output_dir.clone()));
    info!("Writing artifacts to {}", emitter.output_dir().display());

    let started_at = Utc::now();
    let report = execute(&config, client, emitter.clone(), shutdown).await?;
    let finished_at = Utc::now();

    output::print_report(&report);

    if config.write_summary {
        let summary = report.to_summary(run_id, started_at, finished_at);
        match emitter.emit_summary(&summary).await {
            Ok(path) => info!("Run summary written to {}", path.display()),
            Err(e) => warn!("Failed to write run summary: {:#}", e),
        }
    }

    if config.fail_on_error && report.failed() > 0 {
        anyhow::bail!(
            "{} of {} host(s) failed",
            report.failed(),
            report.outcomes.len()
        );
    }

    Ok(())
}

/// Gates on service availability, then runs every configured host
///
/// Fails without submitting anything when the availability check fails.
async fn execute(
    config: &Config,
    api: Arc<dyn ScanApi>,
    emitter: Arc<dyn ReportEmitter>,
    shutdown: CancellationToken,
) -> Result<BatchReport> {
    let info = api
        .check_availability()
        .await
        .with_context(|| format!("Scanning service at {} is not available", config.api_url))?;

    info!(
        engine = info.engine_version.as_deref().unwrap_or("unknown"),
        criteria = info.criteria_version.as_deref().unwrap_or("unknown"),
        "Scanning service available"
    );
    if let (Some(current), Some(max)) = (info.current_assessments, info.max_assessments) {
        info!("Service capacity: {}/{} assessments in use", current, max);
    }
    for message in &info.messages {
        info!("Service message: {}", message);
    }

    let poller = JobPoller::new(api, config.poll_policy(), shutdown);
    info!(
        "Poll interval: {:?}, max polls: {:?}, max wait: {:?}",
        poller.policy().interval,
        poller.policy().max_polls,
        poller.policy().max_wait
    );

    let runner = BatchRunner::new(poller, emitter, config.max_parallel_hosts);

    Ok(runner.run(&config.hosts).await)
}

/// Cancels in-flight assessments on Ctrl-C
fn spawn_shutdown_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, cancelling in-flight assessments");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for interrupt: {}", e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MemoryEmitter, ScriptedApi, in_progress, ready};

    fn config(hosts: &[&str]) -> Config {
        let mut config = Config::new(hosts.iter().map(|s| s.to_string()).collect());
        config.poll_interval = Duration::from_millis(1);
        config
    }

    #[tokio::test]
    async fn test_available_service_processes_hosts() {
        let api = Arc::new(
            ScriptedApi::new().script("a.test", vec![Ok(ready("a.test", "10.0.0.1"))]),
        );
        let emitter = Arc::new(MemoryEmitter::default());

        let report = execute(
            &config(&["a.test"]),
            api.clone(),
            emitter.clone(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(api.calls()[0], Call::Availability);
        assert_eq!(emitter.hosts(), vec!["a.test"]);
    }

    #[tokio::test]
    async fn test_unavailable_service_aborts_before_hosts() {
        let api = Arc::new(
            ScriptedApi::new()
                .unavailable()
                .script("a.test", vec![Ok(in_progress("a.test"))]),
        );
        let emitter = Arc::new(MemoryEmitter::default());

        let err = execute(
            &config(&["a.test", "b.test"]),
            api.clone(),
            emitter.clone(),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("not available"));
        assert_eq!(api.calls(), vec![Call::Availability]);
        assert!(emitter.hosts().is_empty());
    }

    #[test]
    fn test_cli_into_config() {
        let cli = Cli::parse_from([
            "labscan",
            "--api-url",
            "http://localhost:9000/api/v2/",
            "--poll-interval",
            "5",
            "--max-wait",
            "0",
            "-j",
            "4",
            "a.test",
            "b.test",
        ]);

        let config = cli.into_config();

        assert_eq!(config.hosts, vec!["a.test", "b.test"]);
        assert_eq!(config.api_url, "http://localhost:9000/api/v2");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.max_wait, None);
        assert_eq!(config.max_parallel_hosts, 4);
        assert!(!config.write_summary);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_requires_hosts() {
        assert!(Cli::try_parse_from(["labscan"]).is_err());
    }
}
