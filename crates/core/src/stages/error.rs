//! Stage failure classification.

use thiserror::Error;

use crate::artifacts::ArtifactError;
use crate::cancel::Cancelled;
use crate::progress::StageName;

/// A stage failure, classified by what the caller can do about it.
///
/// Transient failures exhausted their retries but might succeed on a fresh
/// submission. Fatal failures will not: either the job's own input is
/// unusable, or an external collaborator is broken in a way retrying the
/// same input cannot fix. Cancellation is its own class so it is never
/// reported as an error condition.
#[derive(Debug, Error)]
pub enum StageError {
    /// Retries were exhausted on an error that could still succeed later.
    #[error("{stage} stage failed transiently: {reason}")]
    Transient { stage: StageName, reason: String },

    /// The job's input can never produce a video.
    #[error("unusable job input: {reason}")]
    FatalInput { reason: String },

    /// An external collaborator failed in a non-retryable way.
    #[error("{stage} stage failed: {reason}")]
    FatalExternal { stage: StageName, reason: String },

    /// The job was cancelled.
    #[error("job cancelled")]
    Cancelled,
}

impl StageError {
    /// Classification label, used for logs, metrics, and status reports.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Transient { .. } => "transient",
            Self::FatalInput { .. } => "fatal_input",
            Self::FatalExternal { .. } => "fatal_external",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<Cancelled> for StageError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<ArtifactError> for StageError {
    fn from(e: ArtifactError) -> Self {
        // Scratch bookkeeping failures are environment problems, not job
        // input problems.
        Self::FatalExternal {
            stage: StageName::Pipeline,
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_labels() {
        assert_eq!(
            StageError::FatalInput {
                reason: "empty text".to_string()
            }
            .class(),
            "fatal_input"
        );
        assert_eq!(StageError::Cancelled.class(), "cancelled");
    }

    #[test]
    fn test_cancelled_conversion() {
        let err: StageError = Cancelled.into();
        assert!(err.is_cancelled());
    }
}
