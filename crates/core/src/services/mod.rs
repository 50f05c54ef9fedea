//! External collaborator contracts.
//!
//! The pipeline consumes five narrow services: speech synthesis, image
//! acquisition, slideshow composition, subtitle generation, and the final
//! merge. Each is an async trait with its own classified error type so the
//! pipeline can decide retry vs abort without inspecting opaque strings.
//!
//! Production implementations live here for the services this crate can
//! provide itself (HTTP image fetching, ffmpeg-backed composition and
//! merging); speech synthesis and subtitle generation engines are supplied
//! by the embedder.

mod config;
mod error;
mod ffmpeg;
mod http_images;
mod traits;
mod types;

pub use config::{FetcherConfig, FfmpegConfig};
pub use error::{CompositionError, FetchError, MergeError, SubtitleError, SynthesisError};
pub use ffmpeg::{FfmpegComposer, FfmpegMerger};
pub use http_images::HttpImageFetcher;
pub use traits::{
    ImageFetcher, SlideshowComposer, SpeechSynthesizer, SubtitleGenerator, VideoMerger,
};
pub use types::ImageRef;
