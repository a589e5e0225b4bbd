//! Filesystem image store scoped to the media root.
//!
//! All file access goes through a `cap_std::fs::Dir` opened on the media
//! root, so stored references can never resolve outside it. Blocking file
//! operations run on tokio's blocking pool.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageKind, ImageRef, ImageUpload};

/// Image store writing under `<root>/<kind folder>/<uuid>.<ext>`.
#[derive(Clone)]
pub struct FsImageStore {
    root: Arc<Dir>,
    base_url: String,
}

impl FsImageStore {
    /// Open (creating if needed) the media root and every image folder.
    ///
    /// `base_url` is prefixed to stored references to build public URLs; a
    /// trailing slash is added when missing.
    ///
    /// # Errors
    ///
    /// Fails when the root or a folder cannot be created or opened.
    pub fn open(root: impl AsRef<Path>, base_url: impl Into<String>) -> io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        for kind in [ImageKind::Recipe, ImageKind::Avatar] {
            dir.create_dir_all(kind.folder())?;
        }
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            root: Arc::new(dir),
            base_url,
        })
    }

    /// Public URL prefix, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read a stored file; `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors other than a missing file, including paths that
    /// would escape the media root.
    pub async fn read(&self, relative: &str) -> io::Result<Option<Vec<u8>>> {
        let root = Arc::clone(&self.root);
        let path = PathBuf::from(relative);
        blocking(move || match root.read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        })
        .await
    }
}

async fn blocking<T, F>(task: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| io::Error::other(err.to_string()))?
}

fn io_error(error: io::Error) -> ImageStoreError {
    ImageStoreError::io(error.to_string())
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(
        &self,
        kind: ImageKind,
        upload: ImageUpload,
    ) -> Result<ImageRef, ImageStoreError> {
        let relative = format!(
            "{}/{}.{}",
            kind.folder(),
            Uuid::new_v4().simple(),
            upload.format.extension()
        );
        let root = Arc::clone(&self.root);
        let path = PathBuf::from(&relative);
        blocking(move || root.write(&path, &upload.bytes))
            .await
            .map_err(io_error)?;
        debug!(image = %relative, "image stored");
        Ok(ImageRef::new(relative))
    }

    async fn remove(&self, image: ImageRef) -> Result<(), ImageStoreError> {
        let root = Arc::clone(&self.root);
        let path = PathBuf::from(image.as_ref());
        blocking(move || match root.remove_file(&path) {
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        })
        .await
        .map_err(io_error)
    }

    fn public_url(&self, image: &ImageRef) -> String {
        format!("{}{}", self.base_url, image.as_ref())
    }
}
