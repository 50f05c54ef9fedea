//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of all collaborator service
//! traits, allowing full pipeline and queue testing without a speech
//! backend, a network, or ffmpeg. Every mock writes a real placeholder
//! file for its artifact, so scratch tracking, promotion, and cleanup
//! behave exactly as they do in production.
//!
//! # Example
//!
//! ```rust,ignore
//! use slidecast_core::testing::{fixtures, MockComposer};
//!
//! let composer = std::sync::Arc::new(MockComposer::new());
//! let services = fixtures::mock_services().await.composer(composer.clone()).build();
//!
//! // Run a pipeline, then assert on what was composed:
//! let recorded = composer.recorded_compositions().await;
//! ```

mod mock_composer;
mod mock_image_fetcher;
mod mock_merger;
mod mock_subtitler;
mod mock_synthesizer;

pub use mock_composer::{MockComposer, RecordedComposition};
pub use mock_image_fetcher::MockImageFetcher;
pub use mock_merger::MockMerger;
pub use mock_subtitler::MockSubtitler;
pub use mock_synthesizer::MockSynthesizer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::job::{EnhancementOptions, ImageSource, JobRequest};
    use crate::pipeline::Services;
    use crate::services::{
        ImageFetcher, SlideshowComposer, SpeechSynthesizer, SubtitleGenerator, VideoMerger,
    };

    use super::{MockComposer, MockImageFetcher, MockMerger, MockSubtitler, MockSynthesizer};

    /// Create a job request with reasonable defaults.
    pub fn job_request(output_dir: impl Into<PathBuf>) -> JobRequest {
        JobRequest {
            text: "A Day at the Lake\nWe packed up early and drove north.".to_string(),
            images: ImageSource::RemoteUrl {
                url: "https://gallery.test/album".to_string(),
            },
            options: EnhancementOptions::default(),
            output_dir: output_dir.into(),
        }
    }

    /// Builder over [`Services`] that starts with all mocks and lets a
    /// test swap in the ones it wants to control.
    pub struct MockServicesBuilder {
        synthesizer: Arc<dyn SpeechSynthesizer>,
        images: Arc<dyn ImageFetcher>,
        composer: Arc<dyn SlideshowComposer>,
        subtitles: Arc<dyn SubtitleGenerator>,
        merger: Arc<dyn VideoMerger>,
    }

    impl MockServicesBuilder {
        pub fn synthesizer(mut self, s: Arc<dyn SpeechSynthesizer>) -> Self {
            self.synthesizer = s;
            self
        }

        pub fn images(mut self, f: Arc<dyn ImageFetcher>) -> Self {
            self.images = f;
            self
        }

        pub fn composer(mut self, c: Arc<dyn SlideshowComposer>) -> Self {
            self.composer = c;
            self
        }

        pub fn subtitles(mut self, g: Arc<dyn SubtitleGenerator>) -> Self {
            self.subtitles = g;
            self
        }

        pub fn merger(mut self, m: Arc<dyn VideoMerger>) -> Self {
            self.merger = m;
            self
        }

        pub fn build(self) -> Services {
            Services {
                synthesizer: self.synthesizer,
                images: self.images,
                composer: self.composer,
                subtitles: self.subtitles,
                merger: self.merger,
            }
        }
    }

    /// All-mock services. The default fetcher discovers three images.
    pub async fn mock_services() -> MockServicesBuilder {
        MockServicesBuilder {
            synthesizer: Arc::new(MockSynthesizer::new()),
            images: Arc::new(MockImageFetcher::with_images(3).await),
            composer: Arc::new(MockComposer::new()),
            subtitles: Arc::new(MockSubtitler::new()),
            merger: Arc::new(MockMerger::new()),
        }
    }
}
