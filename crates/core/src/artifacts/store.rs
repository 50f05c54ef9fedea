//! Artifact store implementation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::fs;
use tracing::{debug, warn};

use crate::job::JobId;

use super::error::ArtifactError;

/// Owns one job's scratch directory and tracks every file created in it.
///
/// The tracking structure is a plain mutex so the two parallel first-phase
/// stage workers can allocate concurrently; no lock is held across await
/// points.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    tracked: Mutex<Vec<PathBuf>>,
    released: AtomicBool,
}

impl ArtifactStore {
    /// Create the scratch directory `<scratch_root>/<job_id>/`.
    pub async fn create(scratch_root: &Path, job_id: &JobId) -> Result<Self, ArtifactError> {
        let root = scratch_root.join(job_id.to_string());
        fs::create_dir_all(&root)
            .await
            .map_err(|source| ArtifactError::ScratchCreationFailed {
                path: root.clone(),
                source,
            })?;
        debug!(scratch = %root.display(), "created scratch directory");
        Ok(Self {
            root,
            tracked: Mutex::new(Vec::new()),
            released: AtomicBool::new(false),
        })
    }

    /// The scratch directory this store owns.
    pub fn scratch_dir(&self) -> &Path {
        &self.root
    }

    /// Reserve and track a path inside the scratch directory, creating
    /// parent directories as needed. `name` may contain subdirectories,
    /// e.g. `images/000.jpg`.
    pub async fn allocate(&self, name: &str) -> Result<PathBuf, ArtifactError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(ArtifactError::Released);
        }
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|source| {
                    ArtifactError::DirectoryCreationFailed {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }
        self.tracked
            .lock()
            .expect("artifact lock poisoned")
            .push(path.clone());
        Ok(path)
    }

    /// Number of paths currently tracked.
    pub fn tracked_count(&self) -> usize {
        self.tracked.lock().expect("artifact lock poisoned").len()
    }

    /// Move a tracked artifact out of scratch into `dest_dir`, keeping its
    /// filename. Creates `dest_dir` if missing. An existing destination is
    /// never overwritten; the name is uniquified with a numeric suffix so
    /// concurrent jobs sharing an output directory cannot clobber each
    /// other.
    pub async fn promote(&self, path: &Path, dest_dir: &Path) -> Result<PathBuf, ArtifactError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(ArtifactError::Released);
        }
        let is_tracked = self
            .tracked
            .lock()
            .expect("artifact lock poisoned")
            .iter()
            .any(|p| p == path);
        if !is_tracked {
            return Err(ArtifactError::NotTracked {
                path: path.to_path_buf(),
            });
        }
        if !path.exists() {
            return Err(ArtifactError::Missing {
                path: path.to_path_buf(),
            });
        }

        fs::create_dir_all(dest_dir)
            .await
            .map_err(|source| ArtifactError::DirectoryCreationFailed {
                path: dest_dir.to_path_buf(),
                source,
            })?;

        let destination = Self::unique_destination(dest_dir, path).await;
        Self::move_file(path, &destination)
            .await
            .map_err(|source| ArtifactError::PromoteFailed {
                path: path.to_path_buf(),
                dest: destination.clone(),
                source,
            })?;

        // The promoted file now lives outside scratch; stop tracking it.
        self.tracked
            .lock()
            .expect("artifact lock poisoned")
            .retain(|p| p != path);

        debug!(from = %path.display(), to = %destination.display(), "promoted artifact");
        Ok(destination)
    }

    /// Delete the scratch directory and everything tracked. Idempotent;
    /// must be invoked on every exit path, including cancellation mid-stage.
    pub async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.tracked.lock().expect("artifact lock poisoned").clear();
        if self.root.exists() {
            if let Err(e) = fs::remove_dir_all(&self.root).await {
                warn!(
                    scratch = %self.root.display(),
                    "failed to remove scratch directory: {e}"
                );
            } else {
                debug!(scratch = %self.root.display(), "removed scratch directory");
            }
        }
    }

    /// Whether `release()` has run.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Pick a destination path in `dest_dir` that does not exist yet.
    async fn unique_destination(dest_dir: &Path, source: &Path) -> PathBuf {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "artifact".to_string());
        let candidate = dest_dir.join(&file_name);
        if !candidate.exists() {
            return candidate;
        }

        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) => (stem.to_string(), Some(ext.to_string())),
            None => (file_name, None),
        };
        for n in 1u32.. {
            let name = match &ext {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            let candidate = dest_dir.join(name);
            if !candidate.exists() {
                return candidate;
            }
        }
        unreachable!("exhausted u32 uniquifier suffixes");
    }

    /// Atomic rename with copy+remove fallback for cross-filesystem moves.
    async fn move_file(source: &Path, destination: &Path) -> Result<(), std::io::Error> {
        match fs::rename(source, destination).await {
            Ok(()) => Ok(()),
            Err(e)
                if e.kind() == std::io::ErrorKind::CrossesDevices
                    || e.raw_os_error() == Some(18) =>
            {
                fs::copy(source, destination).await?;
                fs::remove_file(source).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store_in(temp: &TempDir) -> ArtifactStore {
        ArtifactStore::create(temp.path(), &JobId::new())
            .await
            .expect("create store")
    }

    #[tokio::test]
    async fn test_allocate_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp).await;

        let path = store.allocate("images/000.jpg").await.unwrap();
        assert!(path.parent().unwrap().exists());
        assert_eq!(store.tracked_count(), 1);
    }

    #[tokio::test]
    async fn test_release_removes_scratch() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp).await;

        let audio = store.allocate("voice.mp3").await.unwrap();
        fs::write(&audio, b"audio").await.unwrap();
        assert!(store.scratch_dir().exists());

        store.release().await;
        assert!(!store.scratch_dir().exists());
        assert!(store.is_released());
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp).await;

        store.release().await;
        store.release().await;
        assert!(store.is_released());
    }

    #[tokio::test]
    async fn test_promote_moves_file_out_of_scratch() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = store_in(&temp).await;

        let video = store.allocate("final.mp4").await.unwrap();
        fs::write(&video, b"video").await.unwrap();

        let promoted = store.promote(&video, out.path()).await.unwrap();
        assert!(promoted.exists());
        assert!(!video.exists());
        assert_eq!(store.tracked_count(), 0);

        // Promoted file survives release.
        store.release().await;
        assert!(promoted.exists());
    }

    #[tokio::test]
    async fn test_promote_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = store_in(&temp).await;

        fs::write(out.path().join("final.mp4"), b"existing")
            .await
            .unwrap();

        let video = store.allocate("final.mp4").await.unwrap();
        fs::write(&video, b"new").await.unwrap();

        let promoted = store.promote(&video, out.path()).await.unwrap();
        assert_eq!(promoted, out.path().join("final (1).mp4"));
        let existing = fs::read(out.path().join("final.mp4")).await.unwrap();
        assert_eq!(existing, b"existing");
    }

    #[tokio::test]
    async fn test_promote_untracked_path_fails() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = store_in(&temp).await;

        let stray = temp.path().join("stray.mp4");
        fs::write(&stray, b"stray").await.unwrap();

        let result = store.promote(&stray, out.path()).await;
        assert!(matches!(result, Err(ArtifactError::NotTracked { .. })));
    }

    #[tokio::test]
    async fn test_promote_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = store_in(&temp).await;

        let never_written = store.allocate("final.mp4").await.unwrap();
        let result = store.promote(&never_written, out.path()).await;
        assert!(matches!(result, Err(ArtifactError::Missing { .. })));
    }

    #[tokio::test]
    async fn test_allocate_after_release_fails() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp).await;

        store.release().await;
        let result = store.allocate("late.mp3").await;
        assert!(matches!(result, Err(ArtifactError::Released)));
    }

    #[tokio::test]
    async fn test_concurrent_allocation() {
        let temp = TempDir::new().unwrap();
        let store = std::sync::Arc::new(store_in(&temp).await);

        let a = {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move { store.allocate("voice.mp3").await })
        };
        let b = {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move { store.allocate("images/000.jpg").await })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
        assert_eq!(store.tracked_count(), 2);
    }
}
