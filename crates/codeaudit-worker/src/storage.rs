//! Source and result storage contracts with local implementations

use async_trait::async_trait;
use codeaudit_types::{AggregateReport, StorageError, SubmissionStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;

/// Read-only store the pipeline fetches submitted source text from
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Resolve a locator to source text
    async fn fetch(&self, locator: &str) -> Result<String, StorageError>;
}

/// Store the pipeline persists reports and status transitions to.
///
/// `save` has upsert semantics keyed by submission id: re-running the
/// pipeline for a redelivered item overwrites the previous report instead
/// of corrupting state. `completed` is a hard latch and never reverts;
/// a `failed` submission returns to `processing` when the broker
/// redelivers it, so a later attempt can still complete.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist (or replace) the report for a submission
    async fn save(&self, report: &AggregateReport) -> Result<(), StorageError>;

    /// Record a status transition
    async fn update_status(
        &self,
        submission_id: &str,
        status: SubmissionStatus,
    ) -> Result<(), StorageError>;

    /// Current status, when one has been recorded
    async fn status(&self, submission_id: &str) -> Option<SubmissionStatus>;
}

/// Source store over a local directory
pub struct LocalSourceStore {
    root: PathBuf,
}

impl LocalSourceStore {
    /// Store rooted at `root`; locators are paths relative to it
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalSourceStore { root: root.into() }
    }
}

#[async_trait]
impl SourceStore for LocalSourceStore {
    async fn fetch(&self, locator: &str) -> Result<String, StorageError> {
        let path = self.root.join(locator);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(locator.to_string())
            } else {
                StorageError::Io(e.to_string())
            }
        })?;
        String::from_utf8(bytes).map_err(|_| StorageError::Decode(locator.to_string()))
    }
}

/// In-memory source store for tests and local runs
#[derive(Default)]
pub struct MemorySourceStore {
    files: Mutex<HashMap<String, String>>,
}

impl MemorySourceStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) one object
    pub fn insert(&self, locator: &str, content: &str) {
        self.files
            .lock()
            .insert(locator.to_string(), content.to_string());
    }
}

#[async_trait]
impl SourceStore for MemorySourceStore {
    async fn fetch(&self, locator: &str) -> Result<String, StorageError> {
        self.files
            .lock()
            .get(locator)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(locator.to_string()))
    }
}

/// In-memory result store for tests and local runs
#[derive(Default)]
pub struct MemoryResultStore {
    reports: Mutex<HashMap<String, AggregateReport>>,
    statuses: Mutex<HashMap<String, SubmissionStatus>>,
}

impl MemoryResultStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored report for a submission, when one exists
    pub fn report(&self, submission_id: &str) -> Option<AggregateReport> {
        self.reports.lock().get(submission_id).cloned()
    }

    /// Number of stored reports
    pub fn report_count(&self) -> usize {
        self.reports.lock().len()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn save(&self, report: &AggregateReport) -> Result<(), StorageError> {
        self.reports
            .lock()
            .insert(report.submission_id.clone(), report.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        submission_id: &str,
        status: SubmissionStatus,
    ) -> Result<(), StorageError> {
        let mut statuses = self.statuses.lock();
        if statuses.get(submission_id) == Some(&SubmissionStatus::Completed) {
            tracing::warn!("ignoring status transition completed -> {status} for {submission_id}");
            return Ok(());
        }
        statuses.insert(submission_id.to_string(), status);
        Ok(())
    }

    async fn status(&self, submission_id: &str) -> Option<SubmissionStatus> {
        self.statuses.lock().get(submission_id).copied()
    }
}

/// Result store that writes one JSON report file per submission.
///
/// `save` overwrites the report file, giving the same upsert semantics as
/// the in-memory store. Statuses are kept in memory and mirrored to a
/// `<id>.status` sidecar for operational visibility.
pub struct JsonResultStore {
    dir: PathBuf,
    statuses: Mutex<HashMap<String, SubmissionStatus>>,
}

impl JsonResultStore {
    /// Store writing into `dir` (created on first save if missing)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonResultStore {
            dir: dir.into(),
            statuses: Mutex::new(HashMap::new()),
        }
    }

    fn report_path(&self, submission_id: &str) -> PathBuf {
        self.dir.join(format!("{submission_id}.json"))
    }
}

#[async_trait]
impl ResultStore for JsonResultStore {
    async fn save(&self, report: &AggregateReport) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::write(self.report_path(&report.submission_id), json)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn update_status(
        &self,
        submission_id: &str,
        status: SubmissionStatus,
    ) -> Result<(), StorageError> {
        {
            let mut statuses = self.statuses.lock();
            if statuses.get(submission_id) == Some(&SubmissionStatus::Completed) {
                tracing::warn!(
                    "ignoring status transition completed -> {status} for {submission_id}"
                );
                return Ok(());
            }
            statuses.insert(submission_id.to_string(), status);
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::write(
            self.dir.join(format!("{submission_id}.status")),
            status.to_string(),
        )
        .await
        .map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn status(&self, submission_id: &str) -> Option<SubmissionStatus> {
        self.statuses.lock().get(submission_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codeaudit_types::{
        RefactoringReport, ReviewReport, SecurityReport, StaticAnalysis,
    };

    fn report(submission_id: &str) -> AggregateReport {
        AggregateReport {
            submission_id: submission_id.to_string(),
            overall_score: 82.0,
            quality_score: 90.0,
            security_score: 80.0,
            maintainability_score: 70.0,
            issues_count: 0,
            summary: "ok".to_string(),
            static_analysis: StaticAnalysis::unsupported("python"),
            review: ReviewReport::default(),
            security: SecurityReport::default(),
            refactoring: RefactoringReport::default(),
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn memory_store_upserts_by_submission_id() {
        let store = MemoryResultStore::new();
        store.save(&report("s-1")).await.unwrap();
        store.save(&report("s-1")).await.unwrap();
        assert_eq!(store.report_count(), 1);
    }

    #[tokio::test]
    async fn completed_status_never_reverts() {
        let store = MemoryResultStore::new();
        store
            .update_status("s-1", SubmissionStatus::Completed)
            .await
            .unwrap();
        store
            .update_status("s-1", SubmissionStatus::Processing)
            .await
            .unwrap();
        store
            .update_status("s-1", SubmissionStatus::Failed)
            .await
            .unwrap();
        assert_eq!(store.status("s-1").await, Some(SubmissionStatus::Completed));
    }

    #[tokio::test]
    async fn failed_status_allows_retry() {
        let store = MemoryResultStore::new();
        store
            .update_status("s-1", SubmissionStatus::Failed)
            .await
            .unwrap();
        store
            .update_status("s-1", SubmissionStatus::Processing)
            .await
            .unwrap();
        store
            .update_status("s-1", SubmissionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(store.status("s-1").await, Some(SubmissionStatus::Completed));
    }

    #[tokio::test]
    async fn local_source_store_distinguishes_missing_and_binary() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ok.py"), "print(1)\n").unwrap();
        std::fs::write(dir.path().join("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let store = LocalSourceStore::new(dir.path());
        assert_eq!(store.fetch("ok.py").await.unwrap(), "print(1)\n");
        assert!(matches!(
            store.fetch("gone.py").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.fetch("blob.bin").await,
            Err(StorageError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn json_store_writes_report_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonResultStore::new(dir.path());
        store.save(&report("s-9")).await.unwrap();
        store
            .update_status("s-9", SubmissionStatus::Completed)
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("s-9.json")).unwrap();
        assert!(written.contains("\"overall_score\""));
        let status = std::fs::read_to_string(dir.path().join("s-9.status")).unwrap();
        assert_eq!(status, "completed");
    }
}
