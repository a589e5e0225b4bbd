//! Port for stored recipe images and avatars.

use async_trait::async_trait;

use crate::domain::{ImageKind, ImageRef, ImageUpload};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// Writing or removing the file failed.
        Io { message: String } => "image store failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `upload` under the folder for `kind` with a fresh name.
    async fn save(&self, kind: ImageKind, upload: ImageUpload)
    -> Result<ImageRef, ImageStoreError>;

    /// Delete a stored image. Missing files are not an error.
    async fn remove(&self, image: ImageRef) -> Result<(), ImageStoreError>;

    /// Absolute URL clients fetch the image from.
    fn public_url(&self, image: &ImageRef) -> String;
}
