//! Queue status types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::job::{JobId, JobStatus};
use crate::progress::ProgressEvent;

/// Point-in-time view of one job.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusReport {
    pub job_id: JobId,
    pub submitted_at: DateTime<Utc>,
    pub status: JobStatus,
    /// Most recent progress event, if any was emitted yet.
    pub last_progress: Option<ProgressEvent>,
}

/// Aggregate counts over every job the queue knows about.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueStatus {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub draining: bool,
}
