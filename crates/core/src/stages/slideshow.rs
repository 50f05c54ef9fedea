//! Slideshow stage: images plus narration into a raw video.

use crate::job::EnhancementOptions;
use crate::pipeline::{AudioTrack, ImageSet, RawVideo};
use crate::progress::StageName;
use crate::services::{CompositionError, SlideshowComposer};

use super::error::StageError;
use super::StageContext;

const OUTPUT_NAME: &str = "slideshow.mp4";

pub(crate) async fn run(
    composer: &dyn SlideshowComposer,
    images: &ImageSet,
    audio: &AudioTrack,
    text: &str,
    options: &EnhancementOptions,
    ctx: &StageContext<'_>,
) -> Result<RawVideo, StageError> {
    ctx.token.checkpoint()?;
    ctx.progress.emit(
        StageName::Slideshow,
        format!("composing slideshow from {} images", images.len()),
        Some(0.0),
    );

    let output = ctx.store.allocate(OUTPUT_NAME).await?;

    // Encoder failures repeat on identical input, so no retry here.
    let video = composer
        .compose(images, audio, text, options, &output)
        .await
        .map_err(|e| match e {
            CompositionError::BadInput { reason } => StageError::FatalInput { reason },
            e => StageError::FatalExternal {
                stage: StageName::Slideshow,
                reason: e.to_string(),
            },
        })?;

    ctx.token.checkpoint()?;
    ctx.progress
        .emit(StageName::Slideshow, "slideshow ready", Some(100.0));
    Ok(video)
}
