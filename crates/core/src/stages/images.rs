//! Images stage: acquire slideshow images with per-image degradation.
//!
//! Every image is its own retryable unit. A fetch that keeps failing after
//! retries skips that image instead of failing the job; the job only fails
//! here when the surviving set falls below the configured minimum.

use tracing::{info, warn};

use crate::job::ImageSource;
use crate::metrics;
use crate::pipeline::ImageSet;
use crate::progress::StageName;
use crate::services::{FetchError, ImageFetcher, ImageRef};

use super::error::StageError;
use super::StageContext;

pub(crate) async fn run(
    fetcher: &dyn ImageFetcher,
    source: &ImageSource,
    ctx: &StageContext<'_>,
) -> Result<ImageSet, StageError> {
    ctx.token.checkpoint()?;
    ctx.progress
        .emit(StageName::Images, "discovering images", Some(0.0));

    let refs = discover(fetcher, source, ctx).await?;
    let total = refs.len();

    let mut paths = Vec::new();
    let mut skipped = 0usize;
    for image in &refs {
        ctx.token.checkpoint()?;

        let ext = image.extension().unwrap_or_else(|| "jpg".to_string());
        let name = format!("images/{:03}.{ext}", paths.len());
        let dest = ctx.store.allocate(&name).await?;

        if fetch_one(fetcher, image, &dest, ctx).await? {
            metrics::IMAGES_FETCHED.inc();
            paths.push(dest);
        } else {
            metrics::IMAGES_SKIPPED.inc();
            skipped += 1;
            ctx.progress.emit(
                StageName::Images,
                format!("skipped unusable image: {}", image.describe()),
                None,
            );
        }

        let done = paths.len() + skipped;
        ctx.progress.emit(
            StageName::Images,
            format!("fetched {} of {total} images", paths.len()),
            Some(done as f32 / total as f32 * 100.0),
        );
    }

    if paths.len() < ctx.config.min_images {
        return Err(StageError::FatalInput {
            reason: format!(
                "only {} of {total} images usable, minimum is {}",
                paths.len(),
                ctx.config.min_images
            ),
        });
    }

    ctx.token.checkpoint()?;
    info!(fetched = paths.len(), skipped, "images stage complete");
    Ok(ImageSet { paths })
}

/// Enumerate candidates, retrying once on a retryable discovery error.
async fn discover(
    fetcher: &dyn ImageFetcher,
    source: &ImageSource,
    ctx: &StageContext<'_>,
) -> Result<Vec<ImageRef>, StageError> {
    let mut attempt = 0;
    loop {
        match fetcher.discover(source).await {
            Ok(refs) => return Ok(refs),
            Err(e) if e.is_retryable() && attempt < ctx.config.max_stage_retries => {
                attempt += 1;
                metrics::STAGE_RETRIES
                    .with_label_values(&[StageName::Images.as_str()])
                    .inc();
                warn!(fetcher = fetcher.name(), attempt, "discovery failed, retrying: {e}");
                ctx.token.checkpoint()?;
            }
            Err(e) => return Err(classify_discovery(e)),
        }
    }
}

/// Fetch one image with retries. Returns `Ok(false)` when the image is
/// skipped after exhausting its retries.
async fn fetch_one(
    fetcher: &dyn ImageFetcher,
    image: &ImageRef,
    dest: &std::path::Path,
    ctx: &StageContext<'_>,
) -> Result<bool, StageError> {
    let mut attempt = 0;
    loop {
        match fetcher.fetch(image, dest).await {
            Ok(()) => return Ok(true),
            Err(e) if e.is_retryable() && attempt < ctx.config.max_image_retries => {
                attempt += 1;
                warn!(
                    image = %image.describe(),
                    attempt, "image fetch failed, retrying: {e}"
                );
                ctx.token.checkpoint()?;
            }
            Err(e) => {
                warn!(image = %image.describe(), "image skipped: {e}");
                return Ok(false);
            }
        }
    }
}

fn classify_discovery(e: FetchError) -> StageError {
    match e {
        // An empty or missing source can never produce a video.
        FetchError::NoImages { .. } | FetchError::SourceNotFound { .. } => StageError::FatalInput {
            reason: e.to_string(),
        },
        e if e.is_retryable() => StageError::Transient {
            stage: StageName::Images,
            reason: e.to_string(),
        },
        e => StageError::FatalExternal {
            stage: StageName::Images,
            reason: e.to_string(),
        },
    }
}
