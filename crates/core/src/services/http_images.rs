//! HTTP-backed image fetcher.
//!
//! Discovery is deliberately simple: a direct image URL yields itself; any
//! other page is fetched and scanned for quoted URLs with a supported image
//! extension. Local sources are expanded by explicit selection or a
//! directory scan.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use tokio::fs;
use tracing::debug;

use crate::job::{ImageSource, SUPPORTED_IMAGE_EXTENSIONS};

use super::config::FetcherConfig;
use super::error::FetchError;
use super::traits::ImageFetcher;
use super::types::ImageRef;

/// Image fetcher backed by reqwest and the local filesystem.
pub struct HttpImageFetcher {
    config: FetcherConfig,
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FetcherConfig::default())
    }

    fn is_image_name(name: &str) -> bool {
        let name = name.split(['?', '#']).next().unwrap_or(name);
        match name.rsplit_once('.') {
            Some((_, ext)) => SUPPORTED_IMAGE_EXTENSIONS
                .iter()
                .any(|e| ext.eq_ignore_ascii_case(e)),
            None => false,
        }
    }

    /// Scheme + host of a URL, for resolving root-relative references.
    fn origin(url: &str) -> Option<String> {
        let (scheme, rest) = url.split_once("://")?;
        let host = rest.split('/').next()?;
        Some(format!("{scheme}://{host}"))
    }

    /// Extract image URLs from an HTML page.
    ///
    /// Scans quoted tokens rather than parsing the DOM; good enough to pick
    /// up src/href attribute values, which is all the sources we consume
    /// use.
    fn extract_image_urls(page_url: &str, html: &str, limit: usize) -> Vec<String> {
        let origin = Self::origin(page_url);
        let mut found: Vec<String> = Vec::new();

        for token in html.split(['"', '\'']) {
            if found.len() >= limit {
                break;
            }
            if !Self::is_image_name(token) {
                continue;
            }
            let resolved = if token.starts_with("http://") || token.starts_with("https://") {
                token.to_string()
            } else if let Some(rest) = token.strip_prefix("//") {
                format!("https://{rest}")
            } else if token.starts_with('/') {
                match &origin {
                    Some(origin) => format!("{origin}{token}"),
                    None => continue,
                }
            } else {
                continue;
            };
            if !found.contains(&resolved) {
                found.push(resolved);
            }
        }

        found
    }

    async fn discover_remote(&self, url: &str) -> Result<Vec<ImageRef>, FetchError> {
        // A direct image URL is its own one-element list.
        if Self::is_image_name(url) {
            return Ok(vec![ImageRef::Url {
                url: url.to_string(),
            }]);
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let urls = Self::extract_image_urls(url, &html, self.config.max_images);
        debug!(page = url, count = urls.len(), "discovered remote images");

        if urls.is_empty() {
            return Err(FetchError::NoImages {
                source_desc: url.to_string(),
            });
        }
        Ok(urls.into_iter().map(|url| ImageRef::Url { url }).collect())
    }

    async fn discover_local(
        &self,
        dir: &Path,
        selected: &[std::path::PathBuf],
    ) -> Result<Vec<ImageRef>, FetchError> {
        if !selected.is_empty() {
            return Ok(selected
                .iter()
                .take(self.config.max_images)
                .map(|path| ImageRef::File { path: path.clone() })
                .collect());
        }

        let mut entries = fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && Self::is_image_name(&path.to_string_lossy()) {
                paths.push(path);
            }
        }
        paths.sort();
        paths.truncate(self.config.max_images);

        if paths.is_empty() {
            return Err(FetchError::NoImages {
                source_desc: dir.display().to_string(),
            });
        }
        Ok(paths
            .into_iter()
            .map(|path| ImageRef::File { path })
            .collect())
    }

    fn request_error(&self, url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            FetchError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn discover(&self, source: &ImageSource) -> Result<Vec<ImageRef>, FetchError> {
        match source {
            ImageSource::RemoteUrl { url } => self.discover_remote(url).await,
            ImageSource::LocalSelection { dir, selected } => {
                self.discover_local(dir, selected).await
            }
        }
    }

    async fn fetch(&self, image: &ImageRef, dest: &Path) -> Result<(), FetchError> {
        match image {
            ImageRef::Url { url } => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| self.request_error(url, e))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::HttpStatus {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| self.request_error(url, e))?;
                fs::write(dest, &bytes).await?;
                Ok(())
            }
            ImageRef::File { path } => {
                if !path.exists() {
                    return Err(FetchError::SourceNotFound { path: path.clone() });
                }
                fs::copy(path, dest).await?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_is_image_name() {
        assert!(HttpImageFetcher::is_image_name("photo.jpg"));
        assert!(HttpImageFetcher::is_image_name("photo.PNG?w=100"));
        assert!(!HttpImageFetcher::is_image_name("page.html"));
        assert!(!HttpImageFetcher::is_image_name("noext"));
    }

    #[test]
    fn test_extract_image_urls_resolves_relative() {
        let html = r#"
            <img src="https://cdn.example.com/a.jpg">
            <img src='/static/b.png'>
            <img src="//cdn.example.com/c.webp">
            <a href="page.html">not an image</a>
            <img src="https://cdn.example.com/a.jpg">
        "#;
        let urls =
            HttpImageFetcher::extract_image_urls("https://example.com/gallery/index", html, 10);
        assert_eq!(
            urls,
            vec![
                "https://cdn.example.com/a.jpg".to_string(),
                "https://example.com/static/b.png".to_string(),
                "https://cdn.example.com/c.webp".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_image_urls_respects_limit() {
        let html = r#"<img src="https://e.com/1.jpg"><img src="https://e.com/2.jpg">"#;
        let urls = HttpImageFetcher::extract_image_urls("https://e.com", html, 1);
        assert_eq!(urls.len(), 1);
    }

    #[tokio::test]
    async fn test_discover_direct_image_url() {
        let fetcher = HttpImageFetcher::with_defaults();
        let refs = fetcher
            .discover(&ImageSource::RemoteUrl {
                url: "https://example.com/photo.jpg".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[tokio::test]
    async fn test_discover_local_scan() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.jpg"), b"jpg").unwrap();
        std::fs::write(temp.path().join("a.png"), b"png").unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"txt").unwrap();

        let fetcher = HttpImageFetcher::with_defaults();
        let refs = fetcher
            .discover(&ImageSource::LocalSelection {
                dir: temp.path().to_path_buf(),
                selected: vec![],
            })
            .await
            .unwrap();

        // Sorted, text file excluded.
        assert_eq!(refs.len(), 2);
        match &refs[0] {
            ImageRef::File { path } => assert!(path.ends_with("a.png")),
            _ => panic!("expected file ref"),
        }
    }

    #[tokio::test]
    async fn test_discover_local_empty_dir_fails() {
        let temp = TempDir::new().unwrap();
        let fetcher = HttpImageFetcher::with_defaults();
        let result = fetcher
            .discover(&ImageSource::LocalSelection {
                dir: temp.path().to_path_buf(),
                selected: vec![],
            })
            .await;
        assert!(matches!(result, Err(FetchError::NoImages { .. })));
    }

    #[tokio::test]
    async fn test_fetch_local_copies_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.jpg");
        std::fs::write(&src, b"image data").unwrap();
        let dest = temp.path().join("dest.jpg");

        let fetcher = HttpImageFetcher::with_defaults();
        fetcher
            .fetch(&ImageRef::File { path: src }, &dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"image data");
    }

    #[tokio::test]
    async fn test_fetch_missing_local_file_fails() {
        let temp = TempDir::new().unwrap();
        let fetcher = HttpImageFetcher::with_defaults();
        let result = fetcher
            .fetch(
                &ImageRef::File {
                    path: PathBuf::from("/no/such/image.jpg"),
                },
                &temp.path().join("dest.jpg"),
            )
            .await;
        assert!(matches!(result, Err(FetchError::SourceNotFound { .. })));
    }
}
