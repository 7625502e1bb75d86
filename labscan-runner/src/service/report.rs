//! Report emitter
//!
//! Persists terminal job snapshots. The file emitter writes one JSON artifact
//! per host, named `<hostname>-<unix seconds>.json`, and optionally a run
//! summary next to them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labscan_core::domain::scan::JobSnapshot;
use labscan_core::domain::summary::RunSummary;
use serde::Serialize;
use tracing::debug;

/// Service trait for persisting terminal snapshots
#[async_trait]
pub trait ReportEmitter: Send + Sync {
    /// Persists `snapshot` and returns where it was written
    ///
    /// # Arguments
    /// * `hostname` - The configured hostname the job was requested for
    /// * `snapshot` - A normalized snapshot in a terminal status
    async fn emit(&self, hostname: &str, snapshot: &JobSnapshot) -> Result<PathBuf>;
}

/// Writes artifacts as JSON files under an output directory
pub struct FileReportEmitter {
    output_dir: PathBuf,
}

impl FileReportEmitter {
    /// Creates a new file emitter
    ///
    /// The directory is created on first write if it does not exist.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the artifact for `hostname` completed at `completed_at`
    ///
    /// `hostname` must be the validated, requested name. The `host` field of
    /// a snapshot comes from the service and is never used for paths.
    pub fn artifact_path(&self, hostname: &str, completed_at: DateTime<Utc>) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}.json", hostname, completed_at.timestamp()))
    }

    /// Writes the run summary and returns its path
    pub async fn emit_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self
            .output_dir
            .join(format!("summary-{}.json", summary.finished_at.timestamp()));

        self.write_json(&path, summary).await?;

        Ok(path)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;

        let bytes = serde_json::to_vec(value).context("Failed to serialize report")?;

        tokio::fs::write(path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());

        Ok(())
    }
}

#[async_trait]
impl ReportEmitter for FileReportEmitter {
    async fn emit(&self, hostname: &str, snapshot: &JobSnapshot) -> Result<PathBuf> {
        let path = self.artifact_path(hostname, Utc::now());

        self.write_json(&path, snapshot).await?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ready;
    use labscan_core::domain::scan::normalize;
    use labscan_core::domain::summary::HostSummary;
    use labscan_core::domain::scan::JobStatus;
    use uuid::Uuid;

    #[test]
    fn test_artifact_path_uses_host_and_timestamp() {
        let emitter = FileReportEmitter::new("/var/reports");
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        assert_eq!(
            emitter.artifact_path("example.com", at),
            PathBuf::from("/var/reports/example.com-1700000000.json")
        );
    }

    #[tokio::test]
    async fn test_emit_writes_snapshot_json() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = FileReportEmitter::new(dir.path());
        let snapshot = normalize(ready("example.com", "1.2.3.4"), "example.com");

        let path = emitter.emit("example.com", &snapshot).await.unwrap();

        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("example.com-"));
        assert!(name.ends_with(".json"));

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["host"], "example.com");
        assert_eq!(written["status"], "READY");
        assert_eq!(written["endpoints"][0]["hostname"], "example.com");
        assert_eq!(written["endpoints"][0]["ipAddress"], "1.2.3.4");
        assert_eq!(written["endpoints"][0]["gradeTrustIgnored"], "A");

        let decoded: JobSnapshot = serde_json::from_value(written).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[tokio::test]
    async fn test_emit_names_file_after_requested_host() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let emitter = FileReportEmitter::new(&out);
        let hostile = normalize(ready("../escaped", "10.0.0.1"), "a.test");
        let shared = normalize(ready("same.test", "10.0.0.2"), "b.test");

        let first = emitter.emit("a.test", &hostile).await.unwrap();
        let second = emitter.emit("b.test", &shared).await.unwrap();
        let third = emitter.emit("c.test", &shared).await.unwrap();

        for path in [&first, &second, &third] {
            assert_eq!(path.parent(), Some(out.as_path()));
        }
        assert!(first.file_name().unwrap().to_string_lossy().starts_with("a.test-"));
        assert_ne!(second, third);
        assert!(second.exists() && third.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_emit_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports").join("tls");
        let emitter = FileReportEmitter::new(&nested);

        let path = emitter.emit("a.test", &ready("a.test", "10.0.0.1")).await.unwrap();

        assert!(nested.is_dir());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_emit_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, b"").unwrap();
        let emitter = FileReportEmitter::new(&blocker);

        let result = emitter.emit("a.test", &ready("a.test", "10.0.0.1")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_emit_summary() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = FileReportEmitter::new(dir.path());
        let finished_at = DateTime::from_timestamp(1_700_000_100, 0).unwrap();
        let summary = RunSummary {
            run_id: Uuid::new_v4(),
            started_at: finished_at,
            finished_at,
            hosts: vec![
                HostSummary::completed("a.test", JobStatus::Ready, "a.json".to_string()),
                HostSummary::failed("b.test", "timeout"),
            ],
        };

        let path = emitter.emit_summary(&summary).await.unwrap();

        assert_eq!(path, dir.path().join("summary-1700000100.json"));
        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["hosts"].as_array().unwrap().len(), 2);
        assert_eq!(written["hosts"][1]["error"], "timeout");
    }
}
