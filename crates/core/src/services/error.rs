//! Classified error types for the collaborator services.
//!
//! Every variant answers one question for the pipeline: is retrying this
//! operation worth anything? `is_retryable()` encodes the answer; the stage
//! layer maps retryable errors to the Transient classification and the rest
//! to FatalExternal (or FatalInput where the input itself is unusable).

use std::path::PathBuf;
use thiserror::Error;

/// Errors from speech synthesis.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The synthesis backend could not be reached.
    #[error("synthesis backend unreachable: {reason}")]
    Unreachable { reason: String },

    /// The backend rejected the request.
    #[error("synthesis rejected: {reason}")]
    Rejected { reason: String },

    /// Synthesis produced no usable audio.
    #[error("synthesis produced empty audio for {path}")]
    EmptyOutput { path: PathBuf },

    /// Synthesis timed out.
    #[error("synthesis timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error writing the audio file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::Timeout { .. } | Self::Io(_)
        )
    }
}

/// Errors from image acquisition.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The page or image URL could not be fetched.
    #[error("request failed for {url}: {reason}")]
    RequestFailed { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// No candidate images were found at the source.
    #[error("no usable images found at source: {source_desc}")]
    NoImages { source_desc: String },

    /// A local source file does not exist.
    #[error("source image not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The fetch timed out.
    #[error("fetch timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error writing the image.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. } | Self::Timeout { .. } | Self::Io(_)
        ) || matches!(self, Self::HttpStatus { status, .. } if *status >= 500)
    }
}

/// Errors from slideshow composition.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// Encoder binary not found.
    #[error("encoder not found at path: {path}")]
    EncoderNotFound { path: PathBuf },

    /// The encoder process failed.
    #[error("composition failed: {reason}")]
    EncoderFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Composition exceeded its deadline.
    #[error("composition timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// An input image or the audio track is unreadable.
    #[error("unusable input: {reason}")]
    BadInput { reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompositionError {
    pub fn is_retryable(&self) -> bool {
        // A crashed or timed-out encoder fed identical input fails again.
        false
    }
}

/// Errors from subtitle generation.
#[derive(Debug, Error)]
pub enum SubtitleError {
    /// The generator backend could not be reached.
    #[error("subtitle backend unreachable: {reason}")]
    Unreachable { reason: String },

    /// Generation failed.
    #[error("subtitle generation failed: {reason}")]
    GenerationFailed { reason: String },

    /// Generation timed out.
    #[error("subtitle generation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error writing the subtitle file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SubtitleError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::Timeout { .. } | Self::Io(_)
        )
    }
}

/// Errors from the final merge.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Encoder binary not found.
    #[error("encoder not found at path: {path}")]
    EncoderNotFound { path: PathBuf },

    /// The merge process failed.
    #[error("merge failed: {reason}")]
    EncoderFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The merge exceeded its deadline.
    #[error("merge timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The video or subtitle input is corrupt or missing.
    #[error("unusable input: {reason}")]
    BadInput { reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MergeError {
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_retryability() {
        assert!(SynthesisError::Unreachable {
            reason: "connection refused".to_string()
        }
        .is_retryable());
        assert!(!SynthesisError::Rejected {
            reason: "text too long".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_fetch_server_errors_are_retryable() {
        assert!(FetchError::HttpStatus {
            url: "https://example.com/a.jpg".to_string(),
            status: 503
        }
        .is_retryable());
        assert!(!FetchError::HttpStatus {
            url: "https://example.com/a.jpg".to_string(),
            status: 404
        }
        .is_retryable());
        assert!(!FetchError::NoImages {
            source_desc: "https://example.com".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_encoder_errors_never_retryable() {
        assert!(!CompositionError::Timeout { timeout_secs: 600 }.is_retryable());
        assert!(!MergeError::EncoderFailed {
            reason: "exit code 1".to_string(),
            stderr: None
        }
        .is_retryable());
    }
}
