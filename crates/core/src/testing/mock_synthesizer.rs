//! Mock speech synthesizer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::pipeline::AudioTrack;
use crate::services::{SpeechSynthesizer, SynthesisError};

/// Mock implementation of the SpeechSynthesizer trait.
///
/// Writes a placeholder audio file so downstream stages and the artifact
/// store see a real file on disk. Behavior is controllable:
/// - record synthesized texts for assertions
/// - fail the next N calls with configured errors
/// - simulate synthesis latency
#[derive(Debug)]
pub struct MockSynthesizer {
    /// Texts synthesized so far.
    texts: Arc<RwLock<Vec<String>>>,
    /// Errors returned before calls start succeeding, oldest first.
    pending_errors: Arc<RwLock<Vec<SynthesisError>>>,
    /// Simulated synthesis latency in milliseconds.
    latency_ms: Arc<RwLock<u64>>,
    /// Duration reported on the produced track.
    duration_secs: Arc<RwLock<Option<f64>>>,
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            texts: Arc::new(RwLock::new(Vec::new())),
            pending_errors: Arc::new(RwLock::new(Vec::new())),
            latency_ms: Arc::new(RwLock::new(0)),
            duration_secs: Arc::new(RwLock::new(Some(12.0))),
        }
    }

    /// Get all texts synthesized so far.
    pub async fn recorded_texts(&self) -> Vec<String> {
        self.texts.read().await.clone()
    }

    /// Number of synthesize calls, including failed ones.
    pub async fn call_count(&self) -> usize {
        self.texts.read().await.len()
    }

    /// Fail the next call with the given error.
    pub async fn set_next_error(&self, error: SynthesisError) {
        self.pending_errors.write().await.push(error);
    }

    /// Set the simulated synthesis latency.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency_ms.write().await = latency.as_millis() as u64;
    }

    /// Set the duration reported on produced tracks.
    pub async fn set_duration(&self, duration_secs: Option<f64>) {
        *self.duration_secs.write().await = duration_secs;
    }

    async fn take_error(&self) -> Option<SynthesisError> {
        let mut errors = self.pending_errors.write().await;
        if errors.is_empty() {
            None
        } else {
            Some(errors.remove(0))
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn synthesize(&self, text: &str, output: &Path) -> Result<AudioTrack, SynthesisError> {
        self.texts.write().await.push(text.to_string());

        let latency = *self.latency_ms.read().await;
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        tokio::fs::write(output, b"mock audio").await?;
        Ok(AudioTrack {
            path: PathBuf::from(output),
            duration_secs: *self.duration_secs.read().await,
        })
    }
}
