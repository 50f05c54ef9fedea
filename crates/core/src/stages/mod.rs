//! The five pipeline stages.
//!
//! Each stage is a free async function over the collaborator trait it
//! drives. Stages share a common shape: checkpoint for cancellation on
//! entry, emit a start event, allocate output paths from the job's
//! [`ArtifactStore`](crate::artifacts::ArtifactStore), do the work,
//! checkpoint again, and emit a completion event. Classification of
//! collaborator errors into [`StageError`] happens here, so the runner
//! and queue never inspect service-specific error types.

mod audio;
mod error;
mod images;
mod merge;
mod slideshow;
mod subtitles;

pub use error::StageError;

pub(crate) use audio::run as run_audio;
pub(crate) use images::run as run_images;
pub(crate) use merge::run as run_merge;
pub(crate) use slideshow::run as run_slideshow;
pub(crate) use subtitles::run as run_subtitles;

use crate::artifacts::ArtifactStore;
use crate::cancel::CancelToken;
use crate::pipeline::PipelineConfig;
use crate::progress::ProgressHandle;

/// Everything a stage needs besides its own inputs.
pub(crate) struct StageContext<'a> {
    pub store: &'a ArtifactStore,
    pub token: &'a CancelToken,
    pub progress: &'a ProgressHandle,
    pub config: &'a PipelineConfig,
}
