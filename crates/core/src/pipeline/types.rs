//! Typed payloads flowing between pipeline stages.
//!
//! Each is produced by exactly one stage and consumed by later ones;
//! immutable once produced.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Output of the audio stage: the synthesized narration track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTrack {
    pub path: PathBuf,
    /// Duration when the synthesizer reports it; composers probe otherwise.
    pub duration_secs: Option<f64>,
}

/// Output of the images stage: the slides, in presentation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSet {
    pub paths: Vec<PathBuf>,
}

impl ImageSet {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Output of the slideshow stage: video without subtitles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVideo {
    pub path: PathBuf,
}

/// Output of the subtitle stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub path: PathBuf,
}

/// Output of the merge stage: the finished artifact, still in scratch until
/// promoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalVideo {
    pub path: PathBuf,
}
