//! Helpers shared by services that store images.

use tracing::warn;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{Error, ImageKind, ImageRef, ImageUpload};

pub(crate) fn map_image_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::Io { message } => Error::internal(format!("image store error: {message}")),
    }
}

/// Store an upload, mapping failures to an internal error.
pub(crate) async fn store_image<M>(
    store: &M,
    kind: ImageKind,
    upload: ImageUpload,
) -> Result<ImageRef, Error>
where
    M: ImageStore + ?Sized,
{
    store.save(kind, upload).await.map_err(map_image_error)
}

/// Remove an image that is no longer referenced. Failures are logged only.
pub(crate) async fn discard_image<M>(store: &M, image: ImageRef)
where
    M: ImageStore + ?Sized,
{
    if let Err(error) = store.remove(image.clone()).await {
        warn!(%image, %error, "failed to remove unreferenced image");
    }
}
