//! Multi-host batch runner
//!
//! Runs one poll loop per configured host and persists each terminal snapshot.
//! A failing host never stops the others: its error is recorded on its
//! outcome and the batch moves on.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use labscan_core::domain::scan::JobSnapshot;
use labscan_core::domain::summary::{HostSummary, RunSummary};
use labscan_core::dto::job::JobRequest;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::JobError;
use crate::scheduler::poller::JobPoller;
use crate::service::ReportEmitter;

/// A host whose job reached a terminal status and was persisted
#[derive(Debug)]
pub struct CompletedScan {
    pub snapshot: JobSnapshot,
    pub artifact: PathBuf,
}

/// Result of processing one host
#[derive(Debug)]
pub struct HostOutcome {
    pub hostname: String,
    pub result: Result<CompletedScan, JobError>,
}

/// Outcomes of a batch, in configured host order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<HostOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Builds the serializable summary of this batch
    pub fn to_summary(
        &self,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> RunSummary {
        let hosts = self
            .outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(scan) => HostSummary::completed(
                    &outcome.hostname,
                    scan.snapshot.status.clone(),
                    scan.artifact.display().to_string(),
                ),
                Err(e) => HostSummary::failed(&outcome.hostname, e.to_string()),
            })
            .collect();

        RunSummary {
            run_id,
            started_at,
            finished_at,
            hosts,
        }
    }
}

/// Processes every configured host exactly once
pub struct BatchRunner {
    poller: Arc<JobPoller>,
    emitter: Arc<dyn ReportEmitter>,
    semaphore: Arc<Semaphore>,
}

impl BatchRunner {
    /// Creates a new batch runner
    ///
    /// # Arguments
    /// * `poller` - Poll loop shared by every host task
    /// * `emitter` - Destination of terminal snapshots
    /// * `max_parallel_hosts` - Hosts polled at the same time; 1 is sequential
    pub fn new(
        poller: JobPoller,
        emitter: Arc<dyn ReportEmitter>,
        max_parallel_hosts: usize,
    ) -> Self {
        Self {
            poller: Arc::new(poller),
            emitter,
            semaphore: Arc::new(Semaphore::new(max_parallel_hosts.max(1))),
        }
    }

    /// Runs every host and collects their outcomes
    ///
    /// Hosts are started in list order; at most `max_parallel_hosts` are in
    /// flight at once.
    pub async fn run(&self, hosts: &[String]) -> BatchReport {
        info!("Processing {} host(s)", hosts.len());

        let mut handles = Vec::with_capacity(hosts.len());

        for hostname in hosts {
            let request = JobRequest::new(hostname.as_str());

            let handle = match self.semaphore.clone().acquire_owned().await {
                Ok(permit) => Some(self.spawn_host_task(request, permit)),
                Err(e) => {
                    error!(host = %hostname, "Failed to schedule host: {}", e);
                    None
                }
            };

            handles.push((hostname.clone(), handle));
        }

        let mut report = BatchReport::default();

        for (hostname, handle) in handles {
            let result = match handle {
                Some(handle) => handle
                    .await
                    .unwrap_or_else(|e| Err(JobError::TaskFailed(e.to_string()))),
                None => Err(JobError::TaskFailed("host was never scheduled".to_string())),
            };

            match &result {
                Err(e) if e.is_service_fault() => {
                    error!(host = %hostname, "Scanning service fault: {}", e)
                }
                Err(e) => error!(host = %hostname, "Assessment failed: {}", e),
                Ok(_) => {}
            }

            report.outcomes.push(HostOutcome { hostname, result });
        }

        info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );

        report
    }

    /// Spawns a task that polls one host and persists its result
    fn spawn_host_task(
        &self,
        request: JobRequest,
        permit: OwnedSemaphorePermit,
    ) -> tokio::task::JoinHandle<Result<CompletedScan, JobError>> {
        let poller = Arc::clone(&self.poller);
        let emitter = Arc::clone(&self.emitter);

        tokio::spawn(async move {
            // Held until the task finishes
            let _permit = permit;

            let snapshot = poller.run(&request).await?;

            let artifact = emitter
                .emit(&request.hostname, &snapshot)
                .await
                .map_err(|e| JobError::Report(format!("{:#}", e)))?;

            info!(
                host = %request.hostname,
                status = %snapshot.status,
                "Wrote {}",
                artifact.display()
            );

            Ok(CompletedScan { snapshot, artifact })
        })
    }
}
