//! Subtitles stage: synchronized captions for the narration.

use tracing::warn;

use crate::job::EnhancementOptions;
use crate::pipeline::{AudioTrack, RawVideo, SubtitleTrack};
use crate::progress::StageName;
use crate::services::SubtitleGenerator;

use super::error::StageError;
use super::StageContext;

const OUTPUT_NAME: &str = "subtitles.ass";

pub(crate) async fn run(
    generator: &dyn SubtitleGenerator,
    audio: &AudioTrack,
    video: &RawVideo,
    options: &EnhancementOptions,
    ctx: &StageContext<'_>,
) -> Result<SubtitleTrack, StageError> {
    ctx.token.checkpoint()?;
    ctx.progress
        .emit(StageName::Subtitles, "generating subtitles", Some(0.0));

    let output = ctx.store.allocate(OUTPUT_NAME).await?;

    let mut attempt = 0;
    let track = loop {
        match generator.generate(audio, video, options, &output).await {
            Ok(track) => break track,
            Err(e) if e.is_retryable() && attempt < ctx.config.max_stage_retries => {
                attempt += 1;
                crate::metrics::STAGE_RETRIES
                    .with_label_values(&[StageName::Subtitles.as_str()])
                    .inc();
                warn!(
                    generator = generator.name(),
                    attempt, "subtitle generation failed, retrying: {e}"
                );
                ctx.token.checkpoint()?;
            }
            Err(e) if e.is_retryable() => {
                return Err(StageError::Transient {
                    stage: StageName::Subtitles,
                    reason: e.to_string(),
                })
            }
            Err(e) => {
                return Err(StageError::FatalExternal {
                    stage: StageName::Subtitles,
                    reason: e.to_string(),
                })
            }
        }
    };

    ctx.token.checkpoint()?;
    ctx.progress
        .emit(StageName::Subtitles, "subtitles ready", Some(100.0));
    Ok(track)
}
