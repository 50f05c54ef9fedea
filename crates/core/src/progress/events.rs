//! Progress event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::JobId;

/// Pipeline phase a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Job-level events (admission, terminal status).
    Pipeline,
    Audio,
    Images,
    Slideshow,
    Subtitles,
    Merge,
}

impl StageName {
    /// Snake-case name, used for logging and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Audio => "audio",
            Self::Images => "images",
            Self::Slideshow => "slideshow",
            Self::Subtitles => "subtitles",
            Self::Merge => "merge",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ordered progress record for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub job_id: JobId,
    pub stage: StageName,
    pub timestamp: DateTime<Utc>,
    /// Human-readable description of what just happened.
    pub message: String,
    /// Completion within the current stage, 0.0 to 100.0.
    pub percent: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_name_strings() {
        assert_eq!(StageName::Audio.as_str(), "audio");
        assert_eq!(StageName::Merge.as_str(), "merge");
        assert_eq!(StageName::Pipeline.to_string(), "pipeline");
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = ProgressEvent {
            job_id: JobId::new(),
            stage: StageName::Images,
            timestamp: Utc::now(),
            message: "downloaded image 2 of 5".to_string(),
            percent: Some(40.0),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.job_id, event.job_id);
        assert_eq!(parsed.stage, StageName::Images);
        assert_eq!(parsed.percent, Some(40.0));
    }
}
