//! Upload staging
//!
//! Incoming files are parked in a transient local directory before being
//! forwarded to the media host. Only `image/*` and `video/*` content is
//! accepted, and the check runs before a single byte reaches disk.
//! Contents of the staging directory are not durable; cleanup is left to
//! an external process.

use rand::{distr::Alphanumeric, Rng};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum StagingError {
    /// The declared mime type is neither image nor video.
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// The staging directory or file could not be written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Local disk buffer for files awaiting publication.
#[derive(Debug, Clone)]
pub struct Staging {
    dir: PathBuf,
}

impl Staging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Staging { dir: dir.into() }
    }

    /// Validates the declared mime type and writes the upload to a
    /// uniquely named file, returning its path.
    ///
    /// Staged names have the form `{field}-{token}{ext}` where `token`
    /// is a random 12-character alphanumeric string, so concurrent
    /// uploads cannot collide. The extension is carried over from the
    /// client's original filename.
    pub async fn stage(
        &self,
        field_name: &str,
        original_name: &str,
        mime_type: &str,
        data: &[u8],
    ) -> Result<PathBuf, StagingError> {
        if !is_media_mime_type(mime_type) {
            return Err(StagingError::UnsupportedMediaType(mime_type.to_string()));
        }

        let extension = Path::new(original_name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();

        fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(format!("{field_name}-{token}{extension}"));
        fs::write(&path, data).await?;

        tracing::debug!(path = %path.display(), mime = mime_type, "staged upload");
        Ok(path)
    }
}

/// Only images and videos may pass through the portfolio.
fn is_media_mime_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type.starts_with("video/")
}
