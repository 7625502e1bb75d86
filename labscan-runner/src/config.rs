//! Runner configuration
//!
//! Defines all configurable parameters for a run: the target host list, the
//! scanning service location, polling cadence and its bounds, parallelism and
//! where artifacts are written.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use labscan_client::DEFAULT_API_URL;

use crate::scheduler::PollPolicy;

/// Runner configuration
///
/// All intervals and bounds are configurable so the same binary can be tuned
/// for a public rate-limited service or a private instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hostnames to assess, in processing order
    pub hosts: Vec<String>,

    /// Scanning service base URL (e.g., "https://api.ssllabs.com/api/v2")
    pub api_url: String,

    /// Wait between two status polls of the same job
    pub poll_interval: Duration,

    /// Maximum number of status polls per job
    pub max_polls: Option<u32>,

    /// Maximum wall-clock time per job, from submission
    pub max_wait: Option<Duration>,

    /// Retries of a poll call that failed at the transport level
    pub transport_retries: u32,

    /// Number of hosts assessed at the same time
    pub max_parallel_hosts: usize,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,

    /// Directory receiving per-host artifacts
    pub output_dir: PathBuf,

    /// Also write a run summary artifact
    pub write_summary: bool,

    /// Exit with an error when any host failed
    pub fail_on_error: bool,
}

impl Config {
    /// Creates a new configuration with defaults for the given hosts
    pub fn new(hosts: Vec<String>) -> Self {
        Self {
            hosts,
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_secs(10),
            max_polls: None,
            max_wait: Some(Duration::from_secs(3600)), // 1 hour
            transport_retries: 0,
            max_parallel_hosts: 1,
            request_timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("."),
            write_summary: false,
            fail_on_error: false,
        }
    }

    /// Builds the poll policy handed to every job
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            max_polls: self.max_polls,
            max_wait: self.max_wait,
            transport_retries: self.transport_retries,
            ..PollPolicy::default()
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.hosts.is_empty() {
            anyhow::bail!("at least one host is required");
        }

        let mut seen = HashSet::new();
        for host in &self.hosts {
            if host.trim().is_empty() {
                anyhow::bail!("host names cannot be empty");
            }
            if host.contains(['/', '\\']) || host.chars().any(char::is_whitespace) {
                anyhow::bail!("invalid host name '{}'", host);
            }
            if !seen.insert(host.as_str()) {
                anyhow::bail!("host '{}' is listed more than once", host);
            }
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_parallel_hosts == 0 {
            anyhow::bail!("max_parallel_hosts must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}
