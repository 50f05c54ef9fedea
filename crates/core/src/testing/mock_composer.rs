//! Mock slideshow composer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::job::EnhancementOptions;
use crate::pipeline::{AudioTrack, ImageSet, RawVideo};
use crate::services::{CompositionError, SlideshowComposer};

/// A recorded composition for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedComposition {
    pub image_count: usize,
    pub audio_path: PathBuf,
    pub text: String,
}

/// Mock implementation of the SlideshowComposer trait.
///
/// Records what it was asked to compose, writes a placeholder video file,
/// and can be made to fail, stall, or panic.
#[derive(Debug)]
pub struct MockComposer {
    compositions: Arc<RwLock<Vec<RecordedComposition>>>,
    next_error: Arc<RwLock<Option<CompositionError>>>,
    latency_ms: Arc<RwLock<u64>>,
    panic_on_compose: Arc<RwLock<bool>>,
}

impl Default for MockComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockComposer {
    pub fn new() -> Self {
        Self {
            compositions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            latency_ms: Arc::new(RwLock::new(0)),
            panic_on_compose: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded compositions.
    pub async fn recorded_compositions(&self) -> Vec<RecordedComposition> {
        self.compositions.read().await.clone()
    }

    /// Fail the next composition with the given error.
    pub async fn set_next_error(&self, error: CompositionError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated composition latency.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency_ms.write().await = latency.as_millis() as u64;
    }

    /// Make the next composition panic instead of returning.
    pub async fn set_panic(&self, panic: bool) {
        *self.panic_on_compose.write().await = panic;
    }
}

#[async_trait]
impl SlideshowComposer for MockComposer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn compose(
        &self,
        images: &ImageSet,
        audio: &AudioTrack,
        text: &str,
        _options: &EnhancementOptions,
        output: &Path,
    ) -> Result<RawVideo, CompositionError> {
        if *self.panic_on_compose.read().await {
            panic!("mock composer panic");
        }

        let latency = *self.latency_ms.read().await;
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.compositions.write().await.push(RecordedComposition {
            image_count: images.len(),
            audio_path: audio.path.clone(),
            text: text.to_string(),
        });

        tokio::fs::write(output, b"mock video").await?;
        Ok(RawVideo {
            path: PathBuf::from(output),
        })
    }
}
