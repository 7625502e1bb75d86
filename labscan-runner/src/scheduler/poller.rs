//! Job poller
//!
//! Drives one remote job from submission to a terminal status. The job is
//! submitted exactly once, then polled every `interval` for as long as the
//! service reports `IN_PROGRESS`. Any other status ends the loop.

use std::future::Future;
use std::sync::Arc;

use labscan_client::ScanApi;
use labscan_core::domain::scan::{JobSnapshot, normalize};
use labscan_core::dto::job::JobRequest;
use tokio::time::{self, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::JobError;

/// Polling cadence and bounds for a single job
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Wait between two status polls
    pub interval: Duration,
    /// Give up after this many polls
    pub max_polls: Option<u32>,
    /// Give up once this much time has passed since submission
    pub max_wait: Option<Duration>,
    /// Retries of a poll that failed at the transport level
    pub transport_retries: u32,
    /// First delay between transport retries, doubled on each attempt
    pub retry_backoff: Duration,
    /// Upper bound of the retry delay
    pub max_retry_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_polls: None,
            max_wait: Some(Duration::from_secs(3600)),
            transport_retries: 0,
            retry_backoff: Duration::from_millis(500),
            max_retry_backoff: Duration::from_secs(30),
        }
    }
}

/// Submits a job and polls it until it leaves `IN_PROGRESS`
pub struct JobPoller {
    api: Arc<dyn ScanApi>,
    policy: PollPolicy,
    shutdown: CancellationToken,
}

impl JobPoller {
    /// Creates a new job poller
    ///
    /// # Arguments
    /// * `api` - Gateway shared by every job of the run
    /// * `policy` - Poll cadence and bounds
    /// * `shutdown` - Cancels every in-flight loop when triggered
    pub fn new(api: Arc<dyn ScanApi>, policy: PollPolicy, shutdown: CancellationToken) -> Self {
        Self {
            api,
            policy,
            shutdown,
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Runs the job for `request` to a terminal status
    ///
    /// Returns the terminal snapshot with the hostname stamped on every
    /// endpoint. No network call is made after a terminal status is seen.
    pub async fn run(&self, request: &JobRequest) -> Result<JobSnapshot, JobError> {
        let hostname = request.hostname.as_str();

        if self.shutdown.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        info!(host = %hostname, "Submitting assessment");
        let started = Instant::now();
        let deadline = self.policy.max_wait.map(|max| started + max);
        let mut snapshot = self.cancellable(self.api.submit_job(hostname)).await??;
        let mut polls: u32 = 0;

        while !snapshot.is_terminal() {
            log_progress(hostname, &snapshot);

            if self.policy.max_polls.is_some_and(|max| polls >= max)
                || deadline.is_some_and(|deadline| Instant::now() >= deadline)
            {
                return Err(give_up(hostname, polls, started));
            }

            debug!(host = %hostname, "Sleeping {:?} before next poll", self.policy.interval);
            let next = async {
                self.cancellable(time::sleep(self.policy.interval)).await?;
                self.poll_with_retry(hostname).await
            };

            // The sleep and the poll after it both count against max_wait
            snapshot = match deadline {
                Some(deadline) => time::timeout_at(deadline, next)
                    .await
                    .map_err(|_| give_up(hostname, polls, started))??,
                None => next.await?,
            };
            polls += 1;
        }

        info!(
            host = %hostname,
            status = %snapshot.status,
            polls,
            endpoints = snapshot.endpoints.len(),
            "Assessment reached terminal status"
        );

        Ok(normalize(snapshot, hostname))
    }

    /// Polls once, retrying transport failures with exponential backoff
    async fn poll_with_retry(&self, hostname: &str) -> Result<JobSnapshot, JobError> {
        let mut attempt = 0;
        let mut delay = self.policy.retry_backoff;

        loop {
            attempt += 1;

            match self.cancellable(self.api.poll_job(hostname)).await? {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) if e.is_unreachable() && attempt <= self.policy.transport_retries => {
                    warn!(
                        host = %hostname,
                        "Poll failed (attempt {}/{}): {}",
                        attempt,
                        self.policy.transport_retries + 1,
                        e
                    );
                    self.cancellable(time::sleep(delay)).await?;
                    delay = (delay * 2).min(self.policy.max_retry_backoff);
                }
                Err(e) => return Err(JobError::Api(e)),
            }
        }
    }

    /// Races `fut` against the shutdown token
    async fn cancellable<F: Future>(&self, fut: F) -> Result<F::Output, JobError> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(JobError::Cancelled),
            output = fut => Ok(output),
        }
    }
}

fn give_up(hostname: &str, polls: u32, started: Instant) -> JobError {
    warn!(host = %hostname, polls, "Giving up on assessment still in progress");
    JobError::Timeout {
        attempts: polls,
        elapsed: started.elapsed(),
    }
}

fn log_progress(hostname: &str, snapshot: &JobSnapshot) {
    match snapshot.average_progress() {
        Some(progress) => info!(host = %hostname, status = %snapshot.status, progress, "Assessment running"),
        None => info!(host = %hostname, status = %snapshot.status, "Assessment running"),
    }

    for endpoint in &snapshot.endpoints {
        debug!(
            host = %hostname,
            ip = %endpoint.ip_address,
            progress = endpoint.progress,
            "{}",
            endpoint.status_message
        );
    }
}
