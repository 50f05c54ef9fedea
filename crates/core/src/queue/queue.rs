//! Batch queue implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::artifacts::ArtifactStore;
use crate::cancel::CancelToken;
use crate::job::{JobId, JobRequest, JobStatus};
use crate::metrics;
use crate::pipeline::Pipeline;
use crate::progress::{ProgressBus, ProgressEvent};

use super::config::QueueConfig;
use super::error::QueueError;
use super::types::{JobStatusReport, QueueStatus};

/// Everything the queue holds for one submitted job.
struct JobEntry {
    submitted_at: DateTime<Utc>,
    status: RwLock<JobStatus>,
    token: CancelToken,
    bus: ProgressBus,
    handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl JobEntry {
    async fn set_status(&self, status: JobStatus) {
        *self.status.write().await = status;
    }
}

/// Concurrency-bounded job queue.
///
/// Admission is FIFO over a fair semaphore: at most `max_concurrent_jobs`
/// pipelines run at once and waiting jobs start in submission order. Each
/// job runs in its own task, so a panicking collaborator fails only its
/// own job. The driver task owns the job's scratch store and releases it
/// after the pipeline task settles, whatever the outcome.
pub struct BatchQueue {
    config: QueueConfig,
    pipeline: Arc<Pipeline>,
    semaphore: Arc<Semaphore>,
    jobs: Arc<RwLock<HashMap<JobId, Arc<JobEntry>>>>,
    draining: Arc<AtomicBool>,
}

impl BatchQueue {
    pub fn new(config: QueueConfig, pipeline: Pipeline) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        Self {
            config,
            pipeline: Arc::new(pipeline),
            semaphore,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            draining: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Submit a job for execution.
    ///
    /// An invalid request still yields a job id: the job lands directly in
    /// the Failed state so callers have one uniform way to observe
    /// outcomes.
    pub async fn submit(&self, request: JobRequest) -> Result<JobId, QueueError> {
        if self.draining.load(Ordering::SeqCst) {
            return Err(QueueError::ShuttingDown);
        }

        let job_id = JobId::new();
        metrics::JOBS_SUBMITTED.inc();

        let entry = Arc::new(JobEntry {
            submitted_at: Utc::now(),
            status: RwLock::new(JobStatus::Pending),
            token: CancelToken::new(),
            bus: ProgressBus::new(job_id, self.config.progress_buffer),
            handle: std::sync::Mutex::new(None),
        });

        if let Err(reason) = request.validate() {
            warn!(job = %job_id, "rejected invalid job: {reason}");
            entry.set_status(JobStatus::Failed { error: reason }).await;
            metrics::JOBS_COMPLETED.with_label_values(&["failed"]).inc();
            self.jobs.write().await.insert(job_id, entry);
            return Ok(job_id);
        }

        let handle = tokio::spawn(Self::drive(
            job_id,
            request,
            Arc::clone(&entry),
            Arc::clone(&self.pipeline),
            Arc::clone(&self.semaphore),
            self.config.scratch_root.clone(),
        ));
        *entry.handle.lock().expect("queue lock poisoned") = Some(handle);
        self.jobs.write().await.insert(job_id, entry);

        info!(job = %job_id, "job submitted");
        Ok(job_id)
    }

    /// Driver task for one job: admission, execution, cleanup, bookkeeping.
    async fn drive(
        job_id: JobId,
        request: JobRequest,
        entry: Arc<JobEntry>,
        pipeline: Arc<Pipeline>,
        semaphore: Arc<Semaphore>,
        scratch_root: std::path::PathBuf,
    ) {
        // A job cancelled while queued must not sit in Pending until a
        // permit frees up; the wait itself is abandoned on cancellation.
        let _permit = tokio::select! {
            permit = semaphore.acquire_owned() => match permit {
                // Closed only on process teardown.
                Ok(permit) => permit,
                Err(_) => return,
            },
            _ = entry.token.cancelled() => {
                entry.set_status(JobStatus::Cancelled).await;
                metrics::JOBS_COMPLETED
                    .with_label_values(&["cancelled"])
                    .inc();
                return;
            }
        };

        // Cancellation may land in the same instant the permit is granted.
        if entry.token.is_cancelled() {
            entry.set_status(JobStatus::Cancelled).await;
            metrics::JOBS_COMPLETED
                .with_label_values(&["cancelled"])
                .inc();
            return;
        }

        entry.set_status(JobStatus::Running).await;
        let started = Instant::now();

        let store = match ArtifactStore::create(&scratch_root, &job_id).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!(job = %job_id, "scratch setup failed: {e}");
                entry
                    .set_status(JobStatus::Failed {
                        error: e.to_string(),
                    })
                    .await;
                metrics::JOBS_COMPLETED.with_label_values(&["failed"]).inc();
                return;
            }
        };

        // The pipeline runs in its own task so a panic inside a
        // collaborator surfaces as a JoinError instead of taking the
        // driver (and scratch cleanup) down with it.
        let outcome = {
            let pipeline = Arc::clone(&pipeline);
            let store = Arc::clone(&store);
            let token = entry.token.clone();
            let progress = entry.bus.handle();
            tokio::spawn(async move {
                pipeline
                    .run(job_id, &request, &store, &token, &progress)
                    .await
            })
            .await
        };

        store.release().await;

        let status = match outcome {
            Ok(Ok(video)) => JobStatus::Succeeded { output: video.path },
            Ok(Err(e)) if e.is_cancelled() => JobStatus::Cancelled,
            Ok(Err(e)) => JobStatus::Failed {
                error: e.to_string(),
            },
            Err(join_error) if join_error.is_panic() => {
                error!(job = %job_id, "pipeline task panicked");
                JobStatus::Failed {
                    error: "pipeline task panicked".to_string(),
                }
            }
            Err(_) => JobStatus::Cancelled,
        };

        let state = status.state_type();
        metrics::JOBS_COMPLETED.with_label_values(&[state]).inc();
        metrics::JOB_DURATION
            .with_label_values(&[state])
            .observe(started.elapsed().as_secs_f64());
        info!(job = %job_id, state, "job finished");
        entry.set_status(status).await;
    }

    /// Request cancellation of a job.
    ///
    /// Idempotent: returns `true` only for the call that actually flips
    /// the token. Cancelling an already-terminal job is a no-op.
    pub async fn cancel(&self, job_id: JobId) -> Result<bool, QueueError> {
        let entry = self.entry(job_id).await?;
        if entry.status.read().await.is_terminal() {
            return Ok(false);
        }
        let flipped = entry.token.cancel();
        if flipped {
            info!(job = %job_id, "cancellation requested");
        }
        Ok(flipped)
    }

    /// Current status of one job.
    pub async fn status(&self, job_id: JobId) -> Result<JobStatusReport, QueueError> {
        let entry = self.entry(job_id).await?;
        let status = entry.status.read().await.clone();
        Ok(JobStatusReport {
            job_id,
            submitted_at: entry.submitted_at,
            status,
            last_progress: entry.bus.last_event(),
        })
    }

    /// Observe a job's progress events.
    pub async fn subscribe(
        &self,
        job_id: JobId,
    ) -> Result<broadcast::Receiver<ProgressEvent>, QueueError> {
        Ok(self.entry(job_id).await?.bus.subscribe())
    }

    /// Stop admitting jobs and wait for every submitted job to settle.
    pub async fn drain(&self) {
        self.draining.store(true, Ordering::SeqCst);
        info!("queue draining");

        let handles: Vec<JoinHandle<()>> = {
            let jobs = self.jobs.read().await;
            jobs.values()
                .filter_map(|entry| entry.handle.lock().expect("queue lock poisoned").take())
                .collect()
        };
        for handle in handles {
            // Panics are already converted to Failed by the driver.
            let _ = handle.await;
        }
        info!("queue drained");
    }

    /// Aggregate counts across all known jobs.
    pub async fn queue_status(&self) -> QueueStatus {
        let jobs = self.jobs.read().await;
        let mut status = QueueStatus {
            total: jobs.len(),
            draining: self.draining.load(Ordering::SeqCst),
            ..QueueStatus::default()
        };
        for entry in jobs.values() {
            match &*entry.status.read().await {
                JobStatus::Pending => status.pending += 1,
                JobStatus::Running => status.running += 1,
                JobStatus::Succeeded { .. } => status.succeeded += 1,
                JobStatus::Failed { .. } => status.failed += 1,
                JobStatus::Cancelled => status.cancelled += 1,
            }
        }
        status
    }

    async fn entry(&self, job_id: JobId) -> Result<Arc<JobEntry>, QueueError> {
        self.jobs
            .read()
            .await
            .get(&job_id)
            .cloned()
            .ok_or(QueueError::JobNotFound(job_id))
    }
}
