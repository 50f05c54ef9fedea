//! Service configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP image fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Upper bound on images taken from one source.
    #[serde(default = "default_max_images")]
    pub max_images: usize,

    /// User-Agent header sent with page and image requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_max_images() -> usize {
    12
}

fn default_user_agent() -> String {
    format!("slidecast/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_images: default_max_images(),
            user_agent: default_user_agent(),
        }
    }
}

/// Configuration for the ffmpeg-backed composer and merger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to the ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// ffmpeg -loglevel value.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Deadline for one encoder invocation in seconds.
    #[serde(default = "default_encode_timeout")]
    pub timeout_secs: u64,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_encode_timeout() -> u64 {
    600
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            log_level: default_log_level(),
            timeout_secs: default_encode_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_defaults() {
        let config = FetcherConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_images, 12);
        assert!(config.user_agent.starts_with("slidecast/"));
    }

    #[test]
    fn test_ffmpeg_defaults() {
        let config = FfmpegConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.log_level, "error");
        assert_eq!(config.timeout_secs, 600);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: FfmpegConfig = toml::from_str(
            r#"
            ffmpeg_path = "/usr/local/bin/ffmpeg"
            timeout_secs = 120
        "#,
        )
        .unwrap();
        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
    }
}
