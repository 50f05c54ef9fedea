//! Progress fan-out: one producer handle per job, many observers.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::broadcast;

use crate::job::JobId;

use super::events::{ProgressEvent, StageName};

/// Per-job progress channel.
///
/// Backed by a broadcast channel so multiple observers can attach to one
/// job. The most recent event is retained for status queries from drivers
/// that never subscribed.
#[derive(Debug)]
pub struct ProgressBus {
    job_id: JobId,
    tx: broadcast::Sender<ProgressEvent>,
    last: Arc<Mutex<Option<ProgressEvent>>>,
}

impl ProgressBus {
    /// Create a bus buffering up to `capacity` events per observer.
    ///
    /// A zero capacity is treated as one: the broadcast channel rejects
    /// empty buffers, and a misconfigured buffer size must not panic a
    /// submission.
    pub fn new(job_id: JobId, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            job_id,
            tx,
            last: Arc::new(Mutex::new(None)),
        }
    }

    /// Attach a read-only observer. Each observer gets every event emitted
    /// after subscription; a lagging observer skips ahead rather than
    /// blocking producers.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    /// Producer handle for the pipeline and its stages.
    pub fn handle(&self) -> ProgressHandle {
        ProgressHandle {
            job_id: self.job_id,
            tx: self.tx.clone(),
            last: Arc::clone(&self.last),
        }
    }

    /// The most recently emitted event, if any.
    pub fn last_event(&self) -> Option<ProgressEvent> {
        self.last.lock().expect("progress lock poisoned").clone()
    }
}

/// Cheaply cloneable producer side of a [`ProgressBus`].
///
/// Emission is non-blocking; if no observer is attached the event is still
/// recorded as the job's latest.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    job_id: JobId,
    tx: broadcast::Sender<ProgressEvent>,
    last: Arc<Mutex<Option<ProgressEvent>>>,
}

impl ProgressHandle {
    /// Emit a progress event for `stage`.
    pub fn emit(&self, stage: StageName, message: impl Into<String>, percent: Option<f32>) {
        let event = ProgressEvent {
            job_id: self.job_id,
            stage,
            timestamp: Utc::now(),
            message: message.into(),
            percent,
        };
        *self.last.lock().expect("progress lock poisoned") = Some(event.clone());
        // A send error just means nobody is listening right now.
        let _ = self.tx.send(event);
    }

    /// Job this handle reports for.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }
}
