//! Scan job domain types
//!
//! A job is one remote assessment keyed by hostname. Every response from the
//! scanning service decodes into a [`JobSnapshot`], which carries the overall
//! job status and one [`EndpointSnapshot`] per resolved address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress value reported for an endpoint whose assessment has not started
pub const PROGRESS_NOT_STARTED: i32 = -1;

/// Overall status of a remote job
///
/// Only [`JobStatus::InProgress`] requires further polling. Every other value,
/// including status strings this crate does not know about, is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    InProgress,
    Ready,
    Error,
    Dns,
    Other(String),
}

impl JobStatus {
    /// Returns `true` for every status other than `IN_PROGRESS`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::InProgress)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Ready => "READY",
            JobStatus::Error => "ERROR",
            JobStatus::Dns => "DNS",
            JobStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "IN_PROGRESS" => JobStatus::InProgress,
            "READY" => JobStatus::Ready,
            "ERROR" => JobStatus::Error,
            "DNS" => JobStatus::Dns,
            _ => JobStatus::Other(raw),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scanning service's current view of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    #[serde(default)]
    pub host: String,
    pub status: JobStatus,
    /// Assessment start, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// Assessment completion, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<EndpointSnapshot>,
}

impl JobSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.and_then(DateTime::from_timestamp_millis)
    }

    pub fn tested_at(&self) -> Option<DateTime<Utc>> {
        self.test_time.and_then(DateTime::from_timestamp_millis)
    }

    /// Mean progress across endpoints that have started, if any have
    pub fn average_progress(&self) -> Option<i32> {
        let started: Vec<i64> = self
            .endpoints
            .iter()
            .filter(|e| e.has_started())
            .map(|e| i64::from(e.progress))
            .collect();

        if started.is_empty() {
            return None;
        }

        // Summed wide so out-of-range values from the service cannot overflow
        let mean = started.iter().sum::<i64>() / started.len() as i64;
        Some(mean as i32)
    }
}

/// One sub-result of a job, typically one resolved address of the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSnapshot {
    /// Stamped by [`normalize`]; absent in raw service payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub grade_trust_ignored: String,
    #[serde(default)]
    pub has_warnings: bool,
    /// 0-100, or [`PROGRESS_NOT_STARTED`]
    #[serde(default = "not_started")]
    pub progress: i32,
}

impl EndpointSnapshot {
    pub fn has_started(&self) -> bool {
        self.progress != PROGRESS_NOT_STARTED
    }
}

fn not_started() -> i32 {
    PROGRESS_NOT_STARTED
}

/// Stamps `hostname` onto the snapshot and every endpoint it contains
///
/// Lets endpoint results be told apart once snapshots from several hosts are
/// merged. Applying it twice with the same hostname changes nothing.
pub fn normalize(mut snapshot: JobSnapshot, hostname: &str) -> JobSnapshot {
    if snapshot.host.is_empty() {
        snapshot.host = hostname.to_string();
    }

    for endpoint in &mut snapshot.endpoints {
        endpoint.hostname = Some(hostname.to_string());
    }

    snapshot
}
