//! Per-host failure reasons

use std::time::Duration;

use labscan_client::ClientError;
use thiserror::Error;

/// Why a single host's assessment did not produce an artifact
///
/// Never aborts the batch; each one is recorded on that host's outcome.
#[derive(Debug, Error)]
pub enum JobError {
    /// Submission or a status poll failed
    #[error(transparent)]
    Api(#[from] ClientError),

    /// The job was still in progress when a poll bound was reached
    #[error("assessment still in progress after {attempts} poll(s) ({elapsed:?})")]
    Timeout { attempts: u32, elapsed: Duration },

    /// The run was cancelled before the job reached a terminal status
    #[error("assessment cancelled")]
    Cancelled,

    /// The terminal snapshot could not be persisted
    #[error("failed to write report: {0}")]
    Report(String),

    /// The host's task panicked or could not be scheduled
    #[error("host task failed: {0}")]
    TaskFailed(String),
}

impl JobError {
    /// True when the scanning service itself answered with a 5xx status
    pub fn is_service_fault(&self) -> bool {
        matches!(self, JobError::Api(e) if e.is_server_error())
    }
}
