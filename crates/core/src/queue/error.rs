//! Queue error types.

use thiserror::Error;

use crate::job::JobId;

/// Error type for queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// No job with this id was ever submitted (or it has been forgotten).
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// The queue is draining and accepts no new jobs.
    #[error("queue is shutting down")]
    ShuttingDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_job_id() {
        let id = JobId::new();
        let msg = QueueError::JobNotFound(id).to_string();
        assert!(msg.contains(&id.to_string()));
    }
}
