//! Merge stage: burn subtitles into the slideshow.

use crate::pipeline::{FinalVideo, RawVideo, SubtitleTrack};
use crate::progress::StageName;
use crate::services::VideoMerger;

use super::error::StageError;
use super::StageContext;

pub(crate) async fn run(
    merger: &dyn VideoMerger,
    video: &RawVideo,
    subtitles: &SubtitleTrack,
    output_name: &str,
    ctx: &StageContext<'_>,
) -> Result<FinalVideo, StageError> {
    ctx.token.checkpoint()?;
    ctx.progress
        .emit(StageName::Merge, "merging subtitles into video", Some(0.0));

    let output = ctx.store.allocate(output_name).await?;

    // Like composition, the merge is never retried.
    let merged = merger
        .merge(video, subtitles, &output)
        .await
        .map_err(|e| StageError::FatalExternal {
            stage: StageName::Merge,
            reason: e.to_string(),
        })?;

    ctx.token.checkpoint()?;
    ctx.progress
        .emit(StageName::Merge, "final video ready", Some(100.0));
    Ok(merged)
}
