//! Image persistence for uploaded school photos.
//!
//! [`ImageStore`] is chosen once at startup from [`ImageConfig`]: the local
//! store writes into the public directory and returns a bare filename, the
//! remote store uploads to Cloudinary and returns an `https://` URL. Callers
//! never branch on the mode; the reference format alone tells them apart.

pub mod local;
pub mod remote;

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AppConfig, ConfigError, ImageStorageMode};

pub use local::LocalImageStore;
pub use remote::CloudinaryImageStore;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("I/O error writing image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Upload response did not contain a secure URL")]
    MissingUrl,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `bytes` and return the reference to store alongside the record
    async fn store(&self, bytes: &[u8], original_name: &str) -> Result<String, ImageStoreError>;

    /// Short label for logs
    fn kind(&self) -> &'static str;
}

/// Wire the configured backend
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn ImageStore>, ImageStoreError> {
    match config.images.storage {
        ImageStorageMode::Local => Ok(Arc::new(LocalImageStore::new(config.local_image_dir()))),
        ImageStorageMode::Remote => {
            let cloudinary = config
                .images
                .cloudinary
                .clone()
                .ok_or(ConfigError::Missing("CLOUDINARY_CLOUD_NAME"))?;
            Ok(Arc::new(CloudinaryImageStore::new(cloudinary)?))
        }
    }
}

/// Split a client-supplied filename into `(base, extension)`.
///
/// Only the final path component is used, and characters outside
/// `[A-Za-z0-9._-]` become `_` so the result is safe both on disk and inside
/// a URL path segment. The extension keeps its leading dot.
pub(crate) fn split_name(original_name: &str) -> (String, String) {
    let last = original_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let path = Path::new(last);

    let base = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(sanitize)
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| "image".to_string());
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(sanitize)
        .filter(|s| !s.is_empty())
        .map(|s| format!(".{s}"))
        .unwrap_or_default();

    (base, extension)
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

pub(crate) fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
