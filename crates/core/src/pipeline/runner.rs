//! Pipeline runner implementation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::artifacts::ArtifactStore;
use crate::cancel::CancelToken;
use crate::job::{split_title_content, JobId, JobRequest};
use crate::metrics;
use crate::progress::{ProgressHandle, StageName};
use crate::services::{
    ImageFetcher, SlideshowComposer, SpeechSynthesizer, SubtitleGenerator, VideoMerger,
};
use crate::stages::{self, StageContext, StageError};

use super::config::PipelineConfig;
use super::types::FinalVideo;

/// The five collaborators a pipeline drives.
#[derive(Clone)]
pub struct Services {
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub images: Arc<dyn ImageFetcher>,
    pub composer: Arc<dyn SlideshowComposer>,
    pub subtitles: Arc<dyn SubtitleGenerator>,
    pub merger: Arc<dyn VideoMerger>,
}

/// Runs one job end to end.
pub struct Pipeline {
    services: Services,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(services: Services, config: PipelineConfig) -> Self {
        Self { services, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full stage sequence for one job.
    ///
    /// On success the returned path points inside the job's output
    /// directory. Scratch cleanup is NOT done here; the caller owns the
    /// store and must release it on every exit path, including when this
    /// future is aborted.
    pub async fn run(
        &self,
        job_id: JobId,
        request: &JobRequest,
        store: &ArtifactStore,
        token: &CancelToken,
        progress: &ProgressHandle,
    ) -> Result<FinalVideo, StageError> {
        request
            .validate()
            .map_err(|reason| StageError::FatalInput { reason })?;

        let result = self.run_inner(job_id, request, store, token, progress).await;
        // Observers learn the terminal cause the same way they learn
        // everything else: through the event stream.
        if let Err(e) = &result {
            let message = if e.is_cancelled() {
                "job cancelled".to_string()
            } else {
                format!("job failed: {e}")
            };
            progress.emit(StageName::Pipeline, message, None);
        }
        result
    }

    async fn run_inner(
        &self,
        job_id: JobId,
        request: &JobRequest,
        store: &ArtifactStore,
        token: &CancelToken,
        progress: &ProgressHandle,
    ) -> Result<FinalVideo, StageError> {
        ensure_output_dir(&request.output_dir).await?;

        let ctx = StageContext {
            store,
            token,
            progress,
            config: &self.config,
        };

        let (title, _) = split_title_content(&request.text);
        info!(job = %job_id, title, "starting pipeline");
        progress.emit(
            StageName::Pipeline,
            format!("job started: {title}"),
            Some(0.0),
        );

        // Audio and images have no data dependency on each other.
        let (audio, images) = tokio::join!(
            timed(StageName::Audio, async {
                stages::run_audio(self.services.synthesizer.as_ref(), &request.text, &ctx).await
            }),
            timed(StageName::Images, async {
                stages::run_images(self.services.images.as_ref(), &request.images, &ctx).await
            }),
        );

        // A cancelled token outranks whatever error the other branch hit.
        if token.is_cancelled() {
            return Err(StageError::Cancelled);
        }
        let audio = audio?;
        let images = images?;

        let video = timed(StageName::Slideshow, async {
            stages::run_slideshow(
                self.services.composer.as_ref(),
                &images,
                &audio,
                &request.text,
                &request.options,
                &ctx,
            )
            .await
        })
        .await?;

        let subtitles = timed(StageName::Subtitles, async {
            stages::run_subtitles(
                self.services.subtitles.as_ref(),
                &audio,
                &video,
                &request.options,
                &ctx,
            )
            .await
        })
        .await?;

        let output_name = format!(
            "slidecast_{}_{}.mp4",
            Utc::now().format("%Y%m%d_%H%M%S"),
            job_id.short()
        );
        let merged = timed(StageName::Merge, async {
            stages::run_merge(
                self.services.merger.as_ref(),
                &video,
                &subtitles,
                &output_name,
                &ctx,
            )
            .await
        })
        .await?;

        token.checkpoint()?;
        let promoted = store.promote(&merged.path, &request.output_dir).await?;

        info!(job = %job_id, output = %promoted.display(), "pipeline complete");
        progress.emit(
            StageName::Pipeline,
            format!("final video at {}", promoted.display()),
            Some(100.0),
        );
        Ok(FinalVideo { path: promoted })
    }
}

/// Probe the output directory before any stage spends work on the job.
///
/// The directory may legitimately not exist yet; failing to create it, or
/// finding it read-only, is an input error rather than a stage failure.
async fn ensure_output_dir(dir: &std::path::Path) -> Result<(), StageError> {
    let not_writable = |detail: String| StageError::FatalInput {
        reason: format!("output directory {} is not writable: {detail}", dir.display()),
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| not_writable(e.to_string()))?;
    let meta = tokio::fs::metadata(dir)
        .await
        .map_err(|e| not_writable(e.to_string()))?;
    if meta.permissions().readonly() {
        return Err(not_writable("read-only permissions".to_string()));
    }
    Ok(())
}

/// Observe a stage's wall time whether it succeeds or fails.
async fn timed<T, F>(stage: StageName, fut: F) -> Result<T, StageError>
where
    F: std::future::Future<Output = Result<T, StageError>>,
{
    let timer = metrics::STAGE_DURATION
        .with_label_values(&[stage.as_str()])
        .start_timer();
    let result = fut.await;
    timer.observe_duration();
    if let Err(e) = &result {
        if !e.is_cancelled() {
            warn!(stage = stage.as_str(), class = e.class(), "stage failed: {e}");
        }
    }
    result
}
