//! Gateway trait
//!
//! The poll loop depends on this trait rather than on [`ScanClient`] directly
//! so that it can be driven by scripted responses in tests.

use async_trait::async_trait;

use crate::ScanClient;
use crate::error::Result;
use labscan_core::domain::scan::JobSnapshot;
use labscan_core::dto::info::ServiceInfo;

/// The three remote operations of the scanning service
#[async_trait]
pub trait ScanApi: Send + Sync {
    /// Single availability check; must succeed before any job is submitted
    async fn check_availability(&self) -> Result<ServiceInfo>;

    /// Start a new job for `hostname`
    async fn submit_job(&self, hostname: &str) -> Result<JobSnapshot>;

    /// Fetch the current snapshot of the job for `hostname`
    async fn poll_job(&self, hostname: &str) -> Result<JobSnapshot>;
}

#[async_trait]
impl ScanApi for ScanClient {
    async fn check_availability(&self) -> Result<ServiceInfo> {
        ScanClient::check_availability(self).await
    }

    async fn submit_job(&self, hostname: &str) -> Result<JobSnapshot> {
        ScanClient::submit_job(self, hostname).await
    }

    async fn poll_job(&self, hostname: &str) -> Result<JobSnapshot> {
        ScanClient::poll_job(self, hostname).await
    }
}
