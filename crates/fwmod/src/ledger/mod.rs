//! Job records and the in-memory job ledger.
//!
//! The ledger is the only state shared between concurrently running jobs.
//! Records are created once per submitted image, mutated only by the job
//! driver, and never deleted: completed jobs stay queryable for recency
//! listings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Lifecycle state of a transformation job.
///
/// `Uploading → Processing → {Completed, Failed}`; the last two are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether the job can still change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One transformation job as stored in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchJob {
    /// Ledger-assigned id, monotonically increasing from 1.
    pub id: u64,

    /// Name of the uploaded image file.
    pub original_file_name: String,

    /// Device serial number, trimmed.
    pub serial_number: String,

    /// Size of the uploaded image in bytes.
    pub file_size: u64,

    /// Current lifecycle state.
    pub status: JobStatus,

    /// Progress percentage, 0..=100, monotonically non-decreasing.
    pub progress: u8,

    /// Name of the produced artifact, set on completion.
    pub output_file_name: Option<String>,

    /// Failure description, set when the job fails.
    pub error_message: Option<String>,

    /// When the job record was created.
    pub created_at: DateTime<Utc>,

    /// When the job reached a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields required to create a job record.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub original_file_name: String,
    pub serial_number: String,
    pub file_size: u64,
}

/// Partial update merged into an existing record. Unset fields keep their
/// current value.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub output_file_name: Option<String>,
    pub error_message: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobUpdate {
    /// Progress-only update.
    pub fn progress(percent: u8) -> Self {
        Self { progress: Some(percent), ..Self::default() }
    }

    /// Transition to `Processing` with progress reset to zero.
    pub fn processing() -> Self {
        Self {
            status: Some(JobStatus::Processing),
            progress: Some(0),
            ..Self::default()
        }
    }

    /// Terminal success: progress 100 and the artifact name set.
    pub fn completed(output_file_name: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            output_file_name: Some(output_file_name.into()),
            ..Self::default()
        }
    }

    /// Terminal failure with a human-readable message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Storage interface for job records.
#[async_trait]
pub trait JobLedger: Send + Sync {
    /// Create a record in `Uploading` state and assign it the next id.
    async fn create_job(&self, new: NewJob) -> PatchJob;

    /// Fetch a record by id.
    async fn job(&self, id: u64) -> Option<PatchJob>;

    /// Merge an update into a record. Returns the updated record, or `None`
    /// for an unknown id. Transitioning to `Completed` without an explicit
    /// `completed_at` stamps the current time.
    async fn update_job(&self, id: u64, update: JobUpdate) -> Option<PatchJob>;

    /// The most recently created `Completed` jobs, newest first.
    async fn recent_jobs(&self, limit: usize) -> Vec<PatchJob>;
}

/// Process-local [`JobLedger`] backed by a mutex-guarded map.
///
/// Lives for the whole process; ids are allocated under the same lock that
/// guards the map, so concurrent job creation never reuses an id.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: Mutex<LedgerInner>,
}

#[derive(Debug)]
struct LedgerInner {
    jobs: HashMap<u64, PatchJob>,
    next_id: u64,
}

impl Default for LedgerInner {
    fn default() -> Self {
        Self { jobs: HashMap::new(), next_id: 1 }
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobLedger for MemoryLedger {
    async fn create_job(&self, new: NewJob) -> PatchJob {
        let mut inner = self.inner.lock().expect("ledger lock poisoned");
        let id = inner.next_id;
        inner.next_id += 1;

        let job = PatchJob {
            id,
            original_file_name: new.original_file_name,
            serial_number: new.serial_number,
            file_size: new.file_size,
            status: JobStatus::Uploading,
            progress: 0,
            output_file_name: None,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        inner.jobs.insert(id, job.clone());
        job
    }

    async fn job(&self, id: u64) -> Option<PatchJob> {
        let inner = self.inner.lock().expect("ledger lock poisoned");
        inner.jobs.get(&id).cloned()
    }

    async fn update_job(&self, id: u64, update: JobUpdate) -> Option<PatchJob> {
        let mut inner = self.inner.lock().expect("ledger lock poisoned");
        let job = inner.jobs.get_mut(&id)?;

        let stamp_completion =
            update.status == Some(JobStatus::Completed) && update.completed_at.is_none();

        if let Some(status) = update.status {
            job.status = status;
        }
        if let Some(progress) = update.progress {
            job.progress = progress;
        }
        if let Some(name) = update.output_file_name {
            job.output_file_name = Some(name);
        }
        if let Some(message) = update.error_message {
            job.error_message = Some(message);
        }
        if let Some(ts) = update.completed_at {
            job.completed_at = Some(ts);
        } else if stamp_completion {
            job.completed_at = Some(Utc::now());
        }

        Some(job.clone())
    }

    async fn recent_jobs(&self, limit: usize) -> Vec<PatchJob> {
        let inner = self.inner.lock().expect("ledger lock poisoned");
        let mut completed: Vec<PatchJob> = inner
            .jobs
            .values()
            .filter(|job| job.status == JobStatus::Completed)
            .cloned()
            .collect();
        completed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        completed.truncate(limit);
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_job(name: &str) -> NewJob {
        NewJob {
            original_file_name: name.to_string(),
            serial_number: "HP1".to_string(),
            file_size: 2048,
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_from_one() {
        let ledger = MemoryLedger::new();
        let first = ledger.create_job(new_job("a.bin")).await;
        let second = ledger.create_job(new_job("b.bin")).await;
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_new_jobs_start_uploading() {
        let ledger = MemoryLedger::new();
        let job = ledger.create_job(new_job("a.bin")).await;
        assert_eq!(job.status, JobStatus::Uploading);
        assert_eq!(job.progress, 0);
        assert!(job.output_file_name.is_none());
        assert!(job.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let ledger = MemoryLedger::new();
        let job = ledger.create_job(new_job("a.bin")).await;

        ledger.update_job(job.id, JobUpdate::processing()).await.unwrap();
        let updated = ledger
            .update_job(job.id, JobUpdate::progress(45))
            .await
            .unwrap();

        assert_eq!(updated.status, JobStatus::Processing);
        assert_eq!(updated.progress, 45);
        assert_eq!(updated.original_file_name, "a.bin");
    }

    #[tokio::test]
    async fn test_completion_stamps_timestamp() {
        let ledger = MemoryLedger::new();
        let job = ledger.create_job(new_job("a.bin")).await;
        let updated = ledger
            .update_job(job.id, JobUpdate::completed("modified_a.bin"))
            .await
            .unwrap();

        assert_eq!(updated.status, JobStatus::Completed);
        assert_eq!(updated.progress, 100);
        assert_eq!(updated.output_file_name.as_deref(), Some("modified_a.bin"));
        assert!(updated.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_jobs_keep_error_message() {
        let ledger = MemoryLedger::new();
        let job = ledger.create_job(new_job("a.bin")).await;
        let updated = ledger
            .update_job(job.id, JobUpdate::failed("boom"))
            .await
            .unwrap();

        assert_eq!(updated.status, JobStatus::Failed);
        assert_eq!(updated.error_message.as_deref(), Some("boom"));
        assert!(updated.status.is_terminal());
    }

    #[tokio::test]
    async fn test_unknown_id_returns_none() {
        let ledger = MemoryLedger::new();
        assert!(ledger.job(99).await.is_none());
        assert!(ledger.update_job(99, JobUpdate::progress(5)).await.is_none());
    }

    #[tokio::test]
    async fn test_recent_returns_completed_newest_first() {
        let ledger = MemoryLedger::new();
        for name in ["a.bin", "b.bin", "c.bin"] {
            let job = ledger.create_job(new_job(name)).await;
            ledger
                .update_job(job.id, JobUpdate::completed(format!("modified_{name}")))
                .await;
        }
        // A failed job must not appear in the listing.
        let failed = ledger.create_job(new_job("d.bin")).await;
        ledger.update_job(failed.id, JobUpdate::failed("nope")).await;

        let recent = ledger.recent_jobs(2).await;
        assert_eq!(recent.len(), 2);
        assert!(recent[0].created_at >= recent[1].created_at);
        assert!(recent.iter().all(|j| j.status == JobStatus::Completed));
    }

    #[tokio::test]
    async fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
