//! Mock subtitle generator for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::job::EnhancementOptions;
use crate::pipeline::{AudioTrack, RawVideo, SubtitleTrack};
use crate::services::{SubtitleError, SubtitleGenerator};

/// Mock implementation of the SubtitleGenerator trait.
#[derive(Debug)]
pub struct MockSubtitler {
    /// Errors returned before calls start succeeding, oldest first.
    pending_errors: Arc<RwLock<Vec<SubtitleError>>>,
    call_count: Arc<RwLock<usize>>,
}

impl Default for MockSubtitler {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSubtitler {
    pub fn new() -> Self {
        Self {
            pending_errors: Arc::new(RwLock::new(Vec::new())),
            call_count: Arc::new(RwLock::new(0)),
        }
    }

    /// Fail the next call with the given error.
    pub async fn set_next_error(&self, error: SubtitleError) {
        self.pending_errors.write().await.push(error);
    }

    /// Number of generate calls, including failed ones.
    pub async fn call_count(&self) -> usize {
        *self.call_count.read().await
    }
}

#[async_trait]
impl SubtitleGenerator for MockSubtitler {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        _audio: &AudioTrack,
        _video: &RawVideo,
        _options: &EnhancementOptions,
        output: &Path,
    ) -> Result<SubtitleTrack, SubtitleError> {
        *self.call_count.write().await += 1;

        let next = {
            let mut errors = self.pending_errors.write().await;
            if errors.is_empty() {
                None
            } else {
                Some(errors.remove(0))
            }
        };
        if let Some(err) = next {
            return Err(err);
        }

        tokio::fs::write(output, b"mock subtitles").await?;
        Ok(SubtitleTrack {
            path: PathBuf::from(output),
        })
    }
}
