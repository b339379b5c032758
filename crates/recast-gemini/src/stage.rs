//! Staging of uploaded bytes to a transient local file.
//!
//! The remote upload call needs a file on disk. Each run stages to its own
//! uuid-suffixed path under the OS temp dir, so concurrent runs never touch
//! the same file.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::GeminiResult;

/// A staged video file with scoped cleanup.
///
/// Call [`release`](Self::release) once the upload attempt is over; if the
/// run bails out early, `Drop` removes the file best-effort so no path leaks
/// past the run that created it.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    released: bool,
}

impl StagedFile {
    /// Write `bytes` to a fresh per-run path and return the handle.
    ///
    /// The staged path keeps the extension of `file_name` (mp4, mov, ...) so
    /// the upload can report the right content type; anything missing or
    /// suspicious falls back to `.mp4`.
    pub async fn stage(bytes: &[u8], file_name: Option<&str>) -> GeminiResult<Self> {
        let ext = file_name
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.len() <= 4 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "mp4".to_string());

        let path = std::env::temp_dir().join(format!("recast-stage-{}.{}", Uuid::new_v4(), ext));
        fs::write(&path, bytes).await?;
        debug!("Staged {} bytes to {}", bytes.len(), path.display());
        Ok(Self {
            path,
            released: false,
        })
    }

    /// Path of the staged file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file. A file that is already gone is not an error,
    /// and a second call is a no-op.
    pub async fn release(mut self) -> GeminiResult<()> {
        self.released = true;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// MIME type for a staged video path, derived from its extension.
pub fn video_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        _ => "video/mp4",
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove staged file {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_then_release_leaves_no_file() {
        let staged = StagedFile::stage(b"fake video bytes", None).await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(fs::read(&path).await.unwrap(), b"fake video bytes");

        staged.release().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_file() {
        let staged = StagedFile::stage(b"x", None).await.unwrap();
        let path = staged.path().to_path_buf();
        fs::remove_file(&path).await.unwrap();

        staged.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let staged = StagedFile::stage(b"x", None).await.unwrap();
        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_stages_use_distinct_paths() {
        let a = StagedFile::stage(b"a", None).await.unwrap();
        let b = StagedFile::stage(b"b", None).await.unwrap();
        assert_ne!(a.path(), b.path());
        a.release().await.unwrap();
        b.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_stage_keeps_upload_extension() {
        let staged = StagedFile::stage(b"x", Some("clip.MOV")).await.unwrap();
        assert_eq!(
            staged.path().extension().and_then(|e| e.to_str()),
            Some("mov")
        );
        assert_eq!(video_mime_type(staged.path()), "video/quicktime");
        staged.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_stage_rejects_suspicious_extension() {
        let staged = StagedFile::stage(b"x", Some("../../etc/passwd")).await.unwrap();
        assert_eq!(
            staged.path().extension().and_then(|e| e.to_str()),
            Some("mp4")
        );
        staged.release().await.unwrap();
    }

    #[test]
    fn test_video_mime_type_mapping() {
        assert_eq!(video_mime_type(Path::new("a.mp4")), "video/mp4");
        assert_eq!(video_mime_type(Path::new("a.mov")), "video/quicktime");
        assert_eq!(video_mime_type(Path::new("a.webm")), "video/webm");
        assert_eq!(video_mime_type(Path::new("a")), "video/mp4");
    }
}
