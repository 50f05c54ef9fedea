//! Mock video merger for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::pipeline::{FinalVideo, RawVideo, SubtitleTrack};
use crate::services::{MergeError, VideoMerger};

/// Mock implementation of the VideoMerger trait.
#[derive(Debug)]
pub struct MockMerger {
    next_error: Arc<RwLock<Option<MergeError>>>,
    call_count: Arc<RwLock<usize>>,
}

impl Default for MockMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMerger {
    pub fn new() -> Self {
        Self {
            next_error: Arc::new(RwLock::new(None)),
            call_count: Arc::new(RwLock::new(0)),
        }
    }

    /// Fail the next merge with the given error.
    pub async fn set_next_error(&self, error: MergeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Number of merge calls, including failed ones.
    pub async fn call_count(&self) -> usize {
        *self.call_count.read().await
    }
}

#[async_trait]
impl VideoMerger for MockMerger {
    fn name(&self) -> &str {
        "mock"
    }

    async fn merge(
        &self,
        _video: &RawVideo,
        _subtitles: &SubtitleTrack,
        output: &Path,
    ) -> Result<FinalVideo, MergeError> {
        *self.call_count.write().await += 1;

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        tokio::fs::write(output, b"mock final video").await?;
        Ok(FinalVideo {
            path: PathBuf::from(output),
        })
    }
}
