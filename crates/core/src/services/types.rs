//! Shared service types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One candidate image discovered from a job's image source.
///
/// Discovery and fetching are split so the images stage can retry or skip
/// individual images without re-scraping the whole source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ImageRef {
    /// Remote image to download.
    Url { url: String },
    /// Local file to copy into scratch.
    File { path: PathBuf },
}

impl ImageRef {
    /// File extension of the underlying image, lowercased, without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            Self::Url { url } => url.rsplit('/').next().unwrap_or(url),
            Self::File { path } => path.file_name()?.to_str()?,
        };
        // Strip URL query/fragment before looking at the extension.
        let name = name.split(['?', '#']).next().unwrap_or(name);
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 5 {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Human-readable description for progress messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Url { url } => url.clone(),
            Self::File { path } => path.display().to_string(),
        }
    }
}
