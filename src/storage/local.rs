use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{split_name, unix_millis, ImageStore, ImageStoreError};

/// Writes uploads into a directory that is also served as static files.
///
/// References look like `<unix-millis>_<base><ext>`. Files are opened
/// create-new, so an existing image is never overwritten: when two uploads
/// with the same name land in the same millisecond the second one gets an
/// 8-hex random suffix on its base name instead.
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn store_at(
        &self,
        bytes: &[u8],
        original_name: &str,
        millis: i64,
    ) -> Result<String, ImageStoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let (base, extension) = split_name(original_name);
        let filename = format!("{millis}_{base}{extension}");

        match self.write_new(&filename, bytes).await {
            Ok(()) => Ok(filename),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let suffix = Uuid::new_v4().simple().to_string();
                let fallback = format!("{millis}_{base}-{}{extension}", &suffix[..8]);
                warn!("Image name collision on {}, storing as {}", filename, fallback);
                self.write_new(&fallback, bytes).await?;
                Ok(fallback)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_new(&self, filename: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.dir.join(filename);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            // Don't leave a truncated image behind for the gallery to serve
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, bytes: &[u8], original_name: &str) -> Result<String, ImageStoreError> {
        self.store_at(bytes, original_name, unix_millis()).await
    }

    fn kind(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_file_named_after_timestamp_and_original() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(tmp.path().join("schoolImages"));

        let reference = store
            .store_at(b"jpeg-bytes", "Front Gate.jpg", 1_700_000_000_123)
            .await
            .unwrap();

        assert_eq!(reference, "1700000000123_Front_Gate.jpg");
        let written = std::fs::read(tmp.path().join("schoolImages").join(&reference)).unwrap();
        assert_eq!(written, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("public").join("schoolImages");
        assert!(!dir.exists());

        let store = LocalImageStore::new(&dir);
        let reference = store.store(b"png", "logo.png").await.unwrap();

        assert!(dir.join(reference).is_file());
    }

    #[tokio::test]
    async fn colliding_names_never_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(tmp.path());

        let first = store.store_at(b"first", "campus.png", 42).await.unwrap();
        let second = store.store_at(b"second", "campus.png", 42).await.unwrap();

        assert_eq!(first, "42_campus.png");
        assert_ne!(first, second);
        assert!(second.starts_with("42_campus-"));
        assert!(second.ends_with(".png"));
        assert_eq!(std::fs::read(tmp.path().join(&first)).unwrap(), b"first");
        assert_eq!(std::fs::read(tmp.path().join(&second)).unwrap(), b"second");
    }

    #[tokio::test]
    async fn reference_is_a_bare_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(tmp.path());

        let reference = store.store_at(b"x", "../../escape.gif", 7).await.unwrap();

        assert_eq!(reference, "7_escape.gif");
        assert!(!reference.contains('/'));
        assert!(tmp.path().join(reference).is_file());
    }
}
