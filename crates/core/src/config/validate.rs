use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - queue concurrency and buffering are non-zero
/// - pipeline minimum image count is non-zero
/// - service timeouts are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.queue.max_concurrent_jobs == 0 {
        return Err(ConfigError::ValidationError(
            "queue.max_concurrent_jobs cannot be 0".to_string(),
        ));
    }
    if config.queue.progress_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "queue.progress_buffer cannot be 0".to_string(),
        ));
    }

    if config.pipeline.min_images == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.min_images cannot be 0".to_string(),
        ));
    }

    if config.fetcher.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "fetcher.timeout_secs cannot be 0".to_string(),
        ));
    }
    if config.ffmpeg.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "ffmpeg.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
