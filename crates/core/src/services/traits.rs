//! Trait definitions for the collaborator services.

use async_trait::async_trait;
use std::path::Path;

use crate::job::{EnhancementOptions, ImageSource};
use crate::pipeline::{AudioTrack, FinalVideo, ImageSet, RawVideo, SubtitleTrack};

use super::error::{CompositionError, FetchError, MergeError, SubtitleError, SynthesisError};
use super::types::ImageRef;

/// Converts narration text into an audio file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns the name of this synthesizer implementation.
    fn name(&self) -> &str;

    /// Synthesize `text` into `output` and report the produced track.
    async fn synthesize(&self, text: &str, output: &Path) -> Result<AudioTrack, SynthesisError>;
}

/// Discovers and retrieves slideshow images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Enumerate candidate images for a job's image source.
    ///
    /// Returns them in presentation order. An empty result is reported as
    /// [`FetchError::NoImages`].
    async fn discover(&self, source: &ImageSource) -> Result<Vec<ImageRef>, FetchError>;

    /// Retrieve a single image into `dest`.
    ///
    /// One call is one retryable unit: the images stage retries or skips
    /// individual images based on this call's outcome.
    async fn fetch(&self, image: &ImageRef, dest: &Path) -> Result<(), FetchError>;
}

/// Composes images and an audio track into a slideshow video.
#[async_trait]
pub trait SlideshowComposer: Send + Sync {
    /// Returns the name of this composer implementation.
    fn name(&self) -> &str;

    /// Compose `images` over `audio` into `output`.
    ///
    /// `text` is the job's narration text (first line is the title) for
    /// composers that render overlays.
    async fn compose(
        &self,
        images: &ImageSet,
        audio: &AudioTrack,
        text: &str,
        options: &EnhancementOptions,
        output: &Path,
    ) -> Result<RawVideo, CompositionError>;
}

/// Produces a subtitle file synchronized to the narration.
#[async_trait]
pub trait SubtitleGenerator: Send + Sync {
    /// Returns the name of this generator implementation.
    fn name(&self) -> &str;

    /// Generate subtitles for `audio`, aligned against `video` for
    /// duration, into `output`.
    async fn generate(
        &self,
        audio: &AudioTrack,
        video: &RawVideo,
        options: &EnhancementOptions,
        output: &Path,
    ) -> Result<SubtitleTrack, SubtitleError>;
}

/// Burns subtitles into the slideshow to produce the final artifact.
#[async_trait]
pub trait VideoMerger: Send + Sync {
    /// Returns the name of this merger implementation.
    fn name(&self) -> &str;

    /// Merge `video` and `subtitles` into `output`.
    async fn merge(
        &self,
        video: &RawVideo,
        subtitles: &SubtitleTrack,
        output: &Path,
    ) -> Result<FinalVideo, MergeError>;
}
