//! FFmpeg-based composer and merger implementations.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::job::{EnhancementOptions, ImageFit};
use crate::pipeline::{AudioTrack, FinalVideo, ImageSet, RawVideo, SubtitleTrack};

use super::config::FfmpegConfig;
use super::error::{CompositionError, MergeError};
use super::traits::{SlideshowComposer, VideoMerger};

// Per-slide duration used when the audio duration cannot be determined.
const FALLBACK_SLIDE_SECS: f64 = 3.0;

/// Outcome of one encoder invocation, before mapping to the caller's
/// error type.
enum RunError {
    NotFound,
    Failed { code: Option<i32>, stderr: String },
    Timeout,
    Io(std::io::Error),
}

/// Runs ffmpeg to completion, killing it if the deadline passes.
async fn run_ffmpeg(config: &FfmpegConfig, args: &[String]) -> Result<(), RunError> {
    debug!(ffmpeg = %config.ffmpeg_path.display(), ?args, "running ffmpeg");

    let child = Command::new(&config.ffmpeg_path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunError::NotFound
            } else {
                RunError::Io(e)
            }
        })?;

    let deadline = Duration::from_secs(config.timeout_secs);
    let output = timeout(deadline, child.wait_with_output())
        .await
        .map_err(|_| RunError::Timeout)?
        .map_err(RunError::Io)?;

    if !output.status.success() {
        return Err(RunError::Failed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// Media duration in seconds via ffprobe, if it can be determined.
async fn probe_duration(config: &FfmpegConfig, path: &Path) -> Option<f64> {
    #[derive(Deserialize)]
    struct ProbeOutput {
        format: ProbeFormat,
    }

    #[derive(Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }

    let output = Command::new(&config.ffprobe_path)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let probe: ProbeOutput = serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).ok()?;
    probe.format.duration.and_then(|d| d.parse::<f64>().ok())
}

/// Escapes a path for use inside an ffmpeg filter argument.
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}

/// FFmpeg-based slideshow composer.
pub struct FfmpegComposer {
    config: FfmpegConfig,
}

impl FfmpegComposer {
    /// Creates a new composer with the given configuration.
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    /// Creates a composer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FfmpegConfig::default())
    }

    /// Body of the concat demuxer list file: every image shown for an
    /// equal share of the audio, with the last entry repeated so the
    /// final frame holds through the tail.
    fn build_concat_list(images: &ImageSet, total_secs: f64) -> String {
        let per_slide = total_secs / images.len() as f64;
        let mut list = String::new();
        for path in &images.paths {
            let escaped = path.to_string_lossy().replace('\'', "'\\''");
            list.push_str(&format!("file '{escaped}'\nduration {per_slide:.3}\n"));
        }
        if let Some(last) = images.paths.last() {
            let escaped = last.to_string_lossy().replace('\'', "'\\''");
            list.push_str(&format!("file '{escaped}'\n"));
        }
        list
    }

    /// Video filter chain for the configured frame geometry and effects.
    fn build_filter_chain(options: &EnhancementOptions, total_secs: f64) -> String {
        let (w, h) = (options.width, options.height);
        let mut filters = Vec::new();

        match options.image_fit {
            ImageFit::Contain => {
                filters.push(format!(
                    "scale={w}:{h}:force_original_aspect_ratio=decrease"
                ));
                filters.push(format!("pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"));
            }
            ImageFit::Cover => {
                filters.push(format!(
                    "scale={w}:{h}:force_original_aspect_ratio=increase"
                ));
                filters.push(format!("crop={w}:{h}"));
            }
        }

        if options.use_effects {
            if options.zoom_effect {
                let max_zoom = 1.0 + options.zoom_factor;
                filters.push(format!(
                    "zoompan=z='min(zoom+0.0005,{max_zoom:.3})':d=1:s={w}x{h}"
                ));
            }
            if options.color_correction {
                filters.push(format!(
                    "eq=contrast={:.3}:brightness={:.3}:saturation={:.3}",
                    options.contrast, options.brightness, options.saturation
                ));
            }
            if options.fade_effect && total_secs > 1.0 {
                filters.push("fade=t=in:st=0:d=0.5".to_string());
                filters.push(format!("fade=t=out:st={:.3}:d=0.5", total_secs - 0.5));
            }
        }

        filters.push(format!("fps={}", options.frame_rate));
        filters.push("format=yuv420p".to_string());
        filters.join(",")
    }

    fn build_compose_args(
        &self,
        list_path: &Path,
        audio: &Path,
        options: &EnhancementOptions,
        total_secs: f64,
        output: &Path,
    ) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_path.to_string_lossy().to_string(),
            "-i".to_string(),
            audio.to_string_lossy().to_string(),
            "-vf".to_string(),
            Self::build_filter_chain(options, total_secs),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-r".to_string(),
            options.frame_rate.to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-shortest".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl SlideshowComposer for FfmpegComposer {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn compose(
        &self,
        images: &ImageSet,
        audio: &AudioTrack,
        _text: &str,
        options: &EnhancementOptions,
        output: &Path,
    ) -> Result<RawVideo, CompositionError> {
        if images.is_empty() {
            return Err(CompositionError::BadInput {
                reason: "no images to compose".to_string(),
            });
        }
        if !audio.path.exists() {
            return Err(CompositionError::BadInput {
                reason: format!("audio track missing: {}", audio.path.display()),
            });
        }

        let total_secs = match audio.duration_secs {
            Some(secs) if secs > 0.0 => secs,
            _ => probe_duration(&self.config, &audio.path)
                .await
                .filter(|secs| *secs > 0.0)
                .unwrap_or(FALLBACK_SLIDE_SECS * images.len() as f64),
        };

        let list_path = output.with_extension("concat");
        tokio::fs::write(&list_path, Self::build_concat_list(images, total_secs)).await?;

        let args = self.build_compose_args(&list_path, &audio.path, options, total_secs, output);
        let result = run_ffmpeg(&self.config, &args).await;
        let _ = tokio::fs::remove_file(&list_path).await;

        match result {
            Ok(()) => {}
            Err(RunError::NotFound) => {
                return Err(CompositionError::EncoderNotFound {
                    path: self.config.ffmpeg_path.clone(),
                })
            }
            Err(RunError::Failed { code, stderr }) => {
                return Err(CompositionError::EncoderFailed {
                    reason: format!("ffmpeg exited with code {code:?}"),
                    stderr: if stderr.is_empty() {
                        None
                    } else {
                        Some(stderr)
                    },
                })
            }
            Err(RunError::Timeout) => {
                return Err(CompositionError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
            Err(RunError::Io(e)) => return Err(CompositionError::Io(e)),
        }

        let meta = tokio::fs::metadata(output)
            .await
            .map_err(|_| CompositionError::EncoderFailed {
                reason: "output file not created".to_string(),
                stderr: None,
            })?;
        if meta.len() == 0 {
            return Err(CompositionError::EncoderFailed {
                reason: "output file is empty".to_string(),
                stderr: None,
            });
        }

        Ok(RawVideo {
            path: output.to_path_buf(),
        })
    }
}

/// FFmpeg-based subtitle merger.
///
/// Burns the subtitle track into the video stream and copies the audio
/// stream untouched.
pub struct FfmpegMerger {
    config: FfmpegConfig,
}

impl FfmpegMerger {
    /// Creates a new merger with the given configuration.
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    /// Creates a merger with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FfmpegConfig::default())
    }

    fn build_merge_args(&self, video: &Path, subtitles: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-vf".to_string(),
            format!("ass='{}'", escape_filter_path(subtitles)),
            "-c:a".to_string(),
            "copy".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl VideoMerger for FfmpegMerger {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn merge(
        &self,
        video: &RawVideo,
        subtitles: &SubtitleTrack,
        output: &Path,
    ) -> Result<FinalVideo, MergeError> {
        if !video.path.exists() {
            return Err(MergeError::BadInput {
                reason: format!("video missing: {}", video.path.display()),
            });
        }
        if !subtitles.path.exists() {
            return Err(MergeError::BadInput {
                reason: format!("subtitle track missing: {}", subtitles.path.display()),
            });
        }

        let args = self.build_merge_args(&video.path, &subtitles.path, output);
        match run_ffmpeg(&self.config, &args).await {
            Ok(()) => {}
            Err(RunError::NotFound) => {
                return Err(MergeError::EncoderNotFound {
                    path: self.config.ffmpeg_path.clone(),
                })
            }
            Err(RunError::Failed { code, stderr }) => {
                return Err(MergeError::EncoderFailed {
                    reason: format!("ffmpeg exited with code {code:?}"),
                    stderr: if stderr.is_empty() {
                        None
                    } else {
                        Some(stderr)
                    },
                })
            }
            Err(RunError::Timeout) => {
                return Err(MergeError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
            Err(RunError::Io(e)) => return Err(MergeError::Io(e)),
        }

        tokio::fs::metadata(output)
            .await
            .map_err(|_| MergeError::EncoderFailed {
                reason: "output file not created".to_string(),
                stderr: None,
            })?;

        Ok(FinalVideo {
            path: output.to_path_buf(),
        })
    }
}
