//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Tuning for retries and degradation inside a single job run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Retries for one image fetch before that image is skipped.
    #[serde(default = "default_max_image_retries")]
    pub max_image_retries: u32,

    /// Minimum number of images a job must end up with. Falling below
    /// this after skips fails the job.
    #[serde(default = "default_min_images")]
    pub min_images: usize,

    /// Retries for a whole stage call that failed with a retryable error.
    /// Applies to synthesis and subtitle generation; encoder stages are
    /// never retried.
    #[serde(default = "default_max_stage_retries")]
    pub max_stage_retries: u32,
}

fn default_max_image_retries() -> u32 {
    2
}

fn default_min_images() -> usize {
    1
}

fn default_max_stage_retries() -> u32 {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_image_retries: default_max_image_retries(),
            min_images: default_min_images(),
            max_stage_retries: default_max_stage_retries(),
        }
    }
}
