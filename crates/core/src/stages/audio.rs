//! Audio stage: narration text to speech.

use tracing::warn;

use crate::pipeline::AudioTrack;
use crate::progress::StageName;
use crate::services::SpeechSynthesizer;

use super::error::StageError;
use super::StageContext;

const OUTPUT_NAME: &str = "voice.mp3";

pub(crate) async fn run(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    ctx: &StageContext<'_>,
) -> Result<AudioTrack, StageError> {
    ctx.token.checkpoint()?;
    ctx.progress
        .emit(StageName::Audio, "synthesizing narration", Some(0.0));

    let output = ctx.store.allocate(OUTPUT_NAME).await?;

    let mut attempt = 0;
    let track = loop {
        match synthesizer.synthesize(text, &output).await {
            Ok(track) => break track,
            Err(e) if e.is_retryable() && attempt < ctx.config.max_stage_retries => {
                attempt += 1;
                crate::metrics::STAGE_RETRIES
                    .with_label_values(&[StageName::Audio.as_str()])
                    .inc();
                warn!(
                    synthesizer = synthesizer.name(),
                    attempt, "synthesis failed, retrying: {e}"
                );
                ctx.token.checkpoint()?;
            }
            Err(e) if e.is_retryable() => {
                return Err(StageError::Transient {
                    stage: StageName::Audio,
                    reason: e.to_string(),
                })
            }
            Err(e) => {
                return Err(StageError::FatalExternal {
                    stage: StageName::Audio,
                    reason: e.to_string(),
                })
            }
        }
    };

    ctx.token.checkpoint()?;
    ctx.progress
        .emit(StageName::Audio, "narration ready", Some(100.0));
    Ok(track)
}
