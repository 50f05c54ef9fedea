pub mod artifacts;
pub mod cancel;
pub mod config;
pub mod job;
pub mod metrics;
pub mod pipeline;
pub mod progress;
pub mod queue;
pub mod services;
pub mod stages;
pub mod testing;

pub use cancel::{CancelToken, Cancelled};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use job::{
    EnhancementOptions, ImageSource, JobId, JobRequest, JobStatus, SUPPORTED_IMAGE_EXTENSIONS,
};
pub use pipeline::{Pipeline, PipelineConfig, Services};
pub use queue::{BatchQueue, JobStatusReport, QueueConfig, QueueError, QueueStatus};
pub use stages::StageError;
