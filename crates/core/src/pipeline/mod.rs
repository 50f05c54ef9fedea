//! Single-job orchestration.
//!
//! A [`Pipeline`] turns one validated [`JobRequest`](crate::job::JobRequest)
//! into a final video: audio and images are produced concurrently, then
//! slideshow, subtitles, and the merge run in sequence, and the result is
//! promoted out of scratch into the job's output directory.

mod config;
mod runner;
mod types;

pub use config::PipelineConfig;
pub use runner::{Pipeline, Services};
pub use types::{AudioTrack, FinalVideo, ImageSet, RawVideo, SubtitleTrack};
