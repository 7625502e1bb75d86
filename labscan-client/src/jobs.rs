//! Job-related API endpoints

use tracing::debug;

use crate::ScanClient;
use crate::error::Result;
use labscan_core::domain::scan::JobSnapshot;

impl ScanClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Start a fresh assessment of `hostname`
    ///
    /// Always sends `startNew=on`, so cached results for the host are never
    /// reused.
    ///
    /// # Returns
    /// The first snapshot of the new job, usually `IN_PROGRESS`
    pub async fn submit_job(&self, hostname: &str) -> Result<JobSnapshot> {
        let url = format!("{}/analyze", self.base_url);
        debug!(host = %hostname, "Submitting new assessment");

        let response = self
            .client
            .get(&url)
            .query(&[("host", hostname), ("startNew", "on")])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the current snapshot of the assessment for `hostname`
    ///
    /// Does not create a new job.
    pub async fn poll_job(&self, hostname: &str) -> Result<JobSnapshot> {
        let url = format!("{}/analyze", self.base_url);
        debug!(host = %hostname, "Polling assessment");

        let response = self
            .client
            .get(&url)
            .query(&[("host", hostname)])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
