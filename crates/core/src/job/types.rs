//! Job request and lifecycle types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::options::EnhancementOptions;

/// Image file extensions accepted from local folders and remote pages.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Unique identifier for a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short prefix used in output filenames.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where the slideshow images come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ImageSource {
    /// Scrape and download images from a web page (or a direct image URL).
    RemoteUrl { url: String },
    /// Use images from a local directory.
    ///
    /// When `selected` is non-empty only those files are used, in order;
    /// otherwise the directory is scanned for supported extensions.
    LocalSelection {
        dir: PathBuf,
        #[serde(default)]
        selected: Vec<PathBuf>,
    },
}

/// One video generation request as submitted by a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Narration text. First line doubles as the title.
    pub text: String,
    /// Image source for the slideshow.
    pub images: ImageSource,
    /// Visual/audio enhancement options.
    #[serde(default)]
    pub options: EnhancementOptions,
    /// Directory the final video is promoted into.
    pub output_dir: PathBuf,
}

impl JobRequest {
    /// Validate the static parts of a request.
    ///
    /// Failures here are input errors: the job must fail before any stage
    /// runs. Output directory writability is checked when the pipeline
    /// starts, since it may legitimately not exist yet.
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("text input is empty".to_string());
        }
        match &self.images {
            ImageSource::RemoteUrl { url } => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(format!("image source url is not http(s): {url}"));
                }
            }
            ImageSource::LocalSelection { dir, selected } => {
                if selected.is_empty() && !dir.is_dir() {
                    return Err(format!(
                        "image source directory does not exist: {}",
                        dir.display()
                    ));
                }
            }
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err("output directory is empty".to_string());
        }
        Ok(())
    }
}

/// Lifecycle status of a job.
///
/// `Pending -> Running -> Succeeded | Failed | Cancelled`; terminal states
/// never transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum JobStatus {
    /// Submitted, waiting for a concurrency slot.
    Pending,
    /// Pipeline is executing.
    Running,
    /// Final video promoted to the output directory.
    Succeeded { output: PathBuf },
    /// Pipeline failed; all intermediate artifacts cleaned up.
    Failed { error: String },
    /// Cancellation observed before completion.
    Cancelled,
}

impl JobStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }

    /// Snake-case name, used for logging and metrics labels.
    pub fn state_type(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_text(text: &str) -> JobRequest {
        JobRequest {
            text: text.to_string(),
            images: ImageSource::RemoteUrl {
                url: "https://example.com/gallery".to_string(),
            },
            options: EnhancementOptions::default(),
            output_dir: PathBuf::from("/tmp/out"),
        }
    }

    #[test]
    fn test_job_id_short_is_eight_chars() {
        let id = JobId::new();
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn test_validate_accepts_plain_request() {
        assert!(request_with_text("Hello world").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_text() {
        assert!(request_with_text("").validate().is_err());
        assert!(request_with_text("   \n ").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut request = request_with_text("Hello");
        request.images = ImageSource::RemoteUrl {
            url: "ftp://example.com".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_local_dir() {
        let mut request = request_with_text("Hello");
        request.images = ImageSource::LocalSelection {
            dir: PathBuf::from("/definitely/not/a/real/dir"),
            selected: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_allows_explicit_selection_without_dir() {
        let mut request = request_with_text("Hello");
        request.images = ImageSource::LocalSelection {
            dir: PathBuf::from("/definitely/not/a/real/dir"),
            selected: vec![PathBuf::from("/tmp/a.jpg")],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Succeeded {
            output: PathBuf::from("/out/final.mp4")
        }
        .is_terminal());
        assert!(JobStatus::Failed {
            error: "boom".to_string()
        }
        .is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_serialization_round_trip() {
        let status = JobStatus::Failed {
            error: "encoder crashed".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        let parsed: JobStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }

    #[test]
    fn test_image_source_serialization() {
        let source = ImageSource::LocalSelection {
            dir: PathBuf::from("/photos"),
            selected: vec![PathBuf::from("/photos/a.jpg")],
        };
        let json = serde_json::to_string(&source).unwrap();
        let parsed: ImageSource = serde_json::from_str(&json).unwrap();
        match parsed {
            ImageSource::LocalSelection { dir, selected } => {
                assert_eq!(dir, PathBuf::from("/photos"));
                assert_eq!(selected.len(), 1);
            }
            _ => panic!("wrong variant"),
        }
    }
}
