//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineConfig;
use crate::queue::QueueConfig;
use crate::services::{FetcherConfig, FfmpegConfig};

/// Top-level configuration.
///
/// Every section is optional in the TOML file; omitted sections take their
/// defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub fetcher: FetcherConfig,

    #[serde(default)]
    pub ffmpeg: FfmpegConfig,
}
