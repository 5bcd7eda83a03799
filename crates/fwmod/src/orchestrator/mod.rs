//! Job orchestrator - drives submitted images through the pipeline.
//!
//! The orchestrator owns intake validation, the job record lifecycle, the
//! checkpoint cadence and the output sink. The rewrite passes themselves
//! live in [`crate::pipeline`]; everything that can go wrong during a run
//! is caught here and recorded on the job as a terminal failure, so a
//! caller polling the ledger only ever observes `completed` or `failed`
//! at the end. There is no way to cancel a job once it starts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use crate::classify::Vendor;
use crate::config::{Config, EngineConfig};
use crate::error::{FwmodError, Result};
use crate::ledger::{JobLedger, JobStatus, JobUpdate, NewJob, PatchJob};
use crate::pipeline::{self, CHECKPOINTS};

/// A firmware image submitted for transformation.
#[derive(Debug)]
pub struct PatchRequest {
    /// Name of the uploaded file; its extension is checked against the
    /// configured allow-list.
    pub original_file_name: String,

    /// Device serial number; must be non-empty after trimming.
    pub serial_number: String,

    /// The raw image. Exclusively owned by the job for the whole run.
    pub data: Vec<u8>,
}

/// Summary of a finished job, for callers and JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct PatchOutcome {
    /// Ledger id of the job.
    pub job_id: u64,

    /// Final status (always `completed` when returned from a successful
    /// run).
    pub status: JobStatus,

    /// Vendor profile selected from the serial number.
    pub vendor: Vendor,

    /// Size of the submitted image in bytes.
    pub input_bytes: u64,

    /// Size of the framed artifact in bytes.
    pub output_bytes: u64,

    /// Where the artifact was written.
    pub output_path: PathBuf,

    /// When the job started processing.
    pub started_at: DateTime<Utc>,

    /// Total wall time of the run.
    pub duration_seconds: f64,
}

impl PatchOutcome {
    /// Render as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drives transformation jobs and maintains their ledger records.
pub struct Orchestrator {
    engine: EngineConfig,
    ledger: Arc<dyn JobLedger>,
    permits: Arc<Semaphore>,
}

impl Orchestrator {
    /// Create a new orchestrator over a ledger.
    pub fn new(config: Config, ledger: Arc<dyn JobLedger>) -> Self {
        let workers = config.engine.effective_workers();
        Self {
            engine: config.engine,
            ledger,
            permits: Arc::new(Semaphore::new(workers)),
        }
    }

    /// The ledger this orchestrator records into.
    pub fn ledger(&self) -> &Arc<dyn JobLedger> {
        &self.ledger
    }

    /// Fetch a job record by id.
    pub async fn job(&self, id: u64) -> Result<PatchJob> {
        self.ledger.job(id).await.ok_or(FwmodError::JobNotFound(id))
    }

    /// The most recently completed jobs, capped by the configured limit.
    pub async fn recent(&self) -> Vec<PatchJob> {
        self.ledger.recent_jobs(self.engine.recent_limit).await
    }

    /// Submit an image and drive it to a terminal state.
    ///
    /// Returns the outcome on success. On failure the job record carries
    /// the error message and the error is returned to the caller; no
    /// artifact is written.
    pub async fn run_to_completion(&self, request: PatchRequest) -> Result<PatchOutcome> {
        let job = self.admit(&request).await?;
        self.drive_and_record(job.id, request).await
    }

    /// Submit an image for background processing.
    ///
    /// Intake validation happens inline; the returned record is in
    /// `Uploading` state and progresses on a spawned task. Poll the ledger
    /// by id to observe the run.
    pub async fn spawn(self: &Arc<Self>, request: PatchRequest) -> Result<PatchJob> {
        let job = self.admit(&request).await?;
        let this = Arc::clone(self);
        let id = job.id;
        tokio::spawn(async move {
            // Failures are already recorded on the job by drive_and_record.
            let _ = this.drive_and_record(id, request).await;
        });
        Ok(job)
    }

    /// Validate the request and create its ledger record.
    async fn admit(&self, request: &PatchRequest) -> Result<PatchJob> {
        self.check_intake(request)?;

        let job = self
            .ledger
            .create_job(NewJob {
                original_file_name: request.original_file_name.clone(),
                serial_number: request.serial_number.trim().to_string(),
                file_size: request.data.len() as u64,
            })
            .await;

        info!(
            "job {} created: {} ({} bytes, serial {})",
            job.id, job.original_file_name, job.file_size, job.serial_number
        );
        Ok(job)
    }

    /// Intake rules applied before any job record exists.
    fn check_intake(&self, request: &PatchRequest) -> Result<()> {
        if request.serial_number.trim().is_empty() {
            return Err(FwmodError::Config("serial number is required".into()));
        }

        let extension = Path::new(&request.original_file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !self.engine.allowed_extensions.contains(&extension) {
            return Err(FwmodError::Config(format!(
                "unsupported file format '{}' (allowed: {})",
                request.original_file_name,
                self.engine.allowed_extensions.join(", ")
            )));
        }

        if request.data.len() as u64 > self.engine.max_upload_bytes {
            return Err(FwmodError::Config(format!(
                "file exceeds the {} byte upload limit",
                self.engine.max_upload_bytes
            )));
        }

        Ok(())
    }

    /// Run the pipeline for an admitted job, mapping any fault to a
    /// terminal `failed` record.
    async fn drive_and_record(&self, job_id: u64, request: PatchRequest) -> Result<PatchOutcome> {
        match self.drive(job_id, request).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!("job {} failed: {}", job_id, err);
                self.ledger
                    .update_job(job_id, JobUpdate::failed(err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    async fn drive(&self, job_id: u64, request: PatchRequest) -> Result<PatchOutcome> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FwmodError::Config("orchestrator is shutting down".into()))?;

        let started_at = Utc::now();
        let clock = Instant::now();

        self.ledger.update_job(job_id, JobUpdate::processing()).await;

        for checkpoint in CHECKPOINTS {
            if self.engine.step_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.engine.step_delay_ms)).await;
            }
            info!("job {}: {}", job_id, checkpoint.message);
            self.ledger
                .update_job(job_id, JobUpdate::progress(checkpoint.percent))
                .await;
        }

        let input_bytes = request.data.len() as u64;
        let transformed = pipeline::transform(request.data, request.serial_number.trim())?;

        let output_file_name = format!(
            "modified_{}_{}",
            Uuid::new_v4().simple(),
            file_stem_or_name(&request.original_file_name)
        );
        let output_path = self.engine.output_dir.join(&output_file_name);

        tokio::fs::create_dir_all(&self.engine.output_dir).await?;
        tokio::fs::write(&output_path, &transformed.bytes).await?;

        self.ledger
            .update_job(job_id, JobUpdate::completed(output_file_name))
            .await;

        let duration_seconds = clock.elapsed().as_secs_f64();
        info!(
            "job {} completed: {} profile, {} -> {} bytes in {:.1}s",
            job_id,
            transformed.vendor,
            input_bytes,
            transformed.bytes.len(),
            duration_seconds
        );

        Ok(PatchOutcome {
            job_id,
            status: JobStatus::Completed,
            vendor: transformed.vendor,
            input_bytes,
            output_bytes: transformed.bytes.len() as u64,
            output_path,
            started_at,
            duration_seconds,
        })
    }
}

/// Base name of the uploaded file, without any directory components.
fn file_stem_or_name(original: &str) -> String {
    Path::new(original)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(original)
        .to_string()
}
