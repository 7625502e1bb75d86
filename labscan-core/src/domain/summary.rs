//! Run summary types
//!
//! Aggregated, serializable view of one run across every configured host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::scan::JobStatus;

/// Summary of one run over the configured host list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub hosts: Vec<HostSummary>,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.hosts.iter().filter(|h| h.error.is_some()).count()
    }
}

/// Per-host line of a [`RunSummary`]
///
/// Exactly one of `status` or `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostSummary {
    pub fn completed(hostname: impl Into<String>, status: JobStatus, artifact: String) -> Self {
        Self {
            hostname: hostname.into(),
            status: Some(status),
            artifact: Some(artifact),
            error: None,
        }
    }

    pub fn failed(hostname: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            status: None,
            artifact: None,
            error: Some(error.into()),
        }
    }
}
