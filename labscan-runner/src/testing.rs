//! Scripted scanning service and in-memory emitter for unit tests

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use labscan_client::{ClientError, ScanApi};
use labscan_core::domain::scan::{EndpointSnapshot, JobSnapshot, JobStatus};
use labscan_core::dto::info::ServiceInfo;

use crate::service::ReportEmitter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Availability,
    Submit(String),
    Poll(String),
}

/// Replays a queue of responses per host
///
/// The first queued response answers the submit call, the rest answer polls
/// in order. An exhausted queue keeps reporting `IN_PROGRESS`.
#[derive(Default)]
pub struct ScriptedApi {
    unavailable: bool,
    scripts: Mutex<HashMap<String, VecDeque<Result<JobSnapshot, ClientError>>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn script(self, host: &str, responses: Vec<Result<JobSnapshot, ClientError>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(host.to_string(), responses.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submits(&self, host: &str) -> usize {
        self.count(&Call::Submit(host.to_string()))
    }

    pub fn polls(&self, host: &str) -> usize {
        self.count(&Call::Poll(host.to_string()))
    }

    fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn next(&self, host: &str) -> Result<JobSnapshot, ClientError> {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(host)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(in_progress(host)))
    }
}

#[async_trait]
impl ScanApi for ScriptedApi {
    async fn check_availability(&self) -> labscan_client::Result<ServiceInfo> {
        self.calls.lock().unwrap().push(Call::Availability);
        if self.unavailable {
            return Err(ClientError::non_success(503, "service unavailable"));
        }
        Ok(ServiceInfo::default())
    }

    async fn submit_job(&self, hostname: &str) -> labscan_client::Result<JobSnapshot> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Submit(hostname.to_string()));
        self.next(hostname)
    }

    async fn poll_job(&self, hostname: &str) -> labscan_client::Result<JobSnapshot> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Poll(hostname.to_string()));
        self.next(hostname)
    }
}

/// Records emitted snapshots, keyed by requested hostname, instead of writing files
#[derive(Default)]
pub struct MemoryEmitter {
    pub emitted: Mutex<Vec<(String, JobSnapshot)>>,
    fail_for: Option<String>,
}

impl MemoryEmitter {
    pub fn failing_for(host: &str) -> Self {
        Self {
            emitted: Mutex::default(),
            fail_for: Some(host.to_string()),
        }
    }

    pub fn hosts(&self) -> Vec<String> {
        self.emitted
            .lock()
            .unwrap()
            .iter()
            .map(|(hostname, _)| hostname.clone())
            .collect()
    }
}

#[async_trait]
impl ReportEmitter for MemoryEmitter {
    async fn emit(&self, hostname: &str, snapshot: &JobSnapshot) -> Result<PathBuf> {
        if self.fail_for.as_deref() == Some(hostname) {
            anyhow::bail!("disk full");
        }
        self.emitted
            .lock()
            .unwrap()
            .push((hostname.to_string(), snapshot.clone()));
        Ok(PathBuf::from(format!("{}.json", hostname)))
    }
}

pub fn snapshot(host: &str, status: &str, endpoints: Vec<EndpointSnapshot>) -> JobSnapshot {
    JobSnapshot {
        host: host.to_string(),
        status: JobStatus::from(status.to_string()),
        start_time: Some(1_700_000_000_000),
        test_time: None,
        endpoints,
    }
}

pub fn in_progress(host: &str) -> JobSnapshot {
    snapshot(host, "IN_PROGRESS", vec![])
}

pub fn ready(host: &str, ip: &str) -> JobSnapshot {
    snapshot(host, "READY", vec![endpoint(ip, 100)])
}

pub fn endpoint(ip: &str, progress: i32) -> EndpointSnapshot {
    EndpointSnapshot {
        hostname: None,
        ip_address: ip.to_string(),
        status_message: if progress == 100 { "Ready" } else { "In progress" }.to_string(),
        grade: if progress == 100 { "A" } else { "" }.to_string(),
        grade_trust_ignored: if progress == 100 { "A" } else { "" }.to_string(),
        has_warnings: false,
        progress,
    }
}
