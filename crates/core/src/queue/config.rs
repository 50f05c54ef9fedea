//! Queue configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the batch queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Jobs allowed to run concurrently. Admission beyond this waits in
    /// FIFO order.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Parent directory for per-job scratch directories.
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,

    /// Progress events buffered per observer before a slow observer starts
    /// skipping ahead.
    #[serde(default = "default_progress_buffer")]
    pub progress_buffer: usize,
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_scratch_root() -> PathBuf {
    std::env::temp_dir().join("slidecast")
}

fn default_progress_buffer() -> usize {
    64
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            scratch_root: default_scratch_root(),
            progress_buffer: default_progress_buffer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QueueConfig::default();
        assert_eq!(config.max_concurrent_jobs, 2);
        assert_eq!(config.progress_buffer, 64);
        assert!(config.scratch_root.ends_with("slidecast"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: QueueConfig = toml::from_str("max_concurrent_jobs = 4").unwrap();
        assert_eq!(config.max_concurrent_jobs, 4);
        assert_eq!(config.progress_buffer, 64);
    }
}
