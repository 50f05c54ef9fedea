//! Mock image fetcher for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::job::ImageSource;
use crate::services::{FetchError, ImageFetcher, ImageRef};

/// Mock implementation of the ImageFetcher trait.
///
/// Discovery returns a configured candidate list regardless of the source.
/// Individual fetches can be made to fail permanently or only for the
/// first few attempts, which is how per-image retry and skip behavior is
/// exercised.
#[derive(Debug)]
pub struct MockImageFetcher {
    /// Candidates returned from discovery.
    refs: Arc<RwLock<Vec<ImageRef>>>,
    /// Error returned by the next discovery call.
    next_discover_error: Arc<RwLock<Option<FetchError>>>,
    /// Image descriptions that always fail to fetch.
    always_fail: Arc<RwLock<HashSet<String>>>,
    /// Image descriptions that fail N times before succeeding.
    fail_counts: Arc<RwLock<HashMap<String, u32>>>,
    /// Fetch attempts per image description.
    attempts: Arc<RwLock<HashMap<String, u32>>>,
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageFetcher {
    pub fn new() -> Self {
        Self {
            refs: Arc::new(RwLock::new(Vec::new())),
            next_discover_error: Arc::new(RwLock::new(None)),
            always_fail: Arc::new(RwLock::new(HashSet::new())),
            fail_counts: Arc::new(RwLock::new(HashMap::new())),
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a fetcher whose discovery yields `count` URL candidates.
    pub async fn with_images(count: usize) -> Self {
        let fetcher = Self::new();
        fetcher
            .set_refs(
                (0..count)
                    .map(|i| ImageRef::Url {
                        url: format!("https://images.test/{i:03}.jpg"),
                    })
                    .collect(),
            )
            .await;
        fetcher
    }

    /// Set the candidates returned by discovery.
    pub async fn set_refs(&self, refs: Vec<ImageRef>) {
        *self.refs.write().await = refs;
    }

    /// Fail the next discovery call with the given error.
    pub async fn set_next_discover_error(&self, error: FetchError) {
        *self.next_discover_error.write().await = Some(error);
    }

    /// Make every fetch of this image fail.
    pub async fn fail_always(&self, description: &str) {
        self.always_fail.write().await.insert(description.to_string());
    }

    /// Make the first `times` fetches of this image fail, then succeed.
    pub async fn fail_times(&self, description: &str, times: u32) {
        self.fail_counts
            .write()
            .await
            .insert(description.to_string(), times);
    }

    /// Fetch attempts recorded for one image.
    pub async fn attempts_for(&self, description: &str) -> u32 {
        self.attempts
            .read()
            .await
            .get(description)
            .copied()
            .unwrap_or(0)
    }

    fn transient_error(description: &str) -> FetchError {
        FetchError::RequestFailed {
            url: description.to_string(),
            reason: "mock transient failure".to_string(),
        }
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn discover(&self, _source: &ImageSource) -> Result<Vec<ImageRef>, FetchError> {
        if let Some(err) = self.next_discover_error.write().await.take() {
            return Err(err);
        }
        Ok(self.refs.read().await.clone())
    }

    async fn fetch(&self, image: &ImageRef, dest: &Path) -> Result<(), FetchError> {
        let description = image.describe();
        *self.attempts.write().await.entry(description.clone()).or_insert(0) += 1;

        if self.always_fail.read().await.contains(&description) {
            return Err(Self::transient_error(&description));
        }

        {
            let mut counts = self.fail_counts.write().await;
            if let Some(remaining) = counts.get_mut(&description) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(Self::transient_error(&description));
                }
            }
        }

        tokio::fs::write(dest, b"mock image").await?;
        Ok(())
    }
}
