//! Uploaded images and the references stored in their place.

use std::fmt;

/// Raster formats accepted for recipe pictures and avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Parse the subtype of an `image/<subtype>` media type.
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// File extension used when storing the image.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Where an image belongs, which decides its storage folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Recipe,
    Avatar,
}

impl ImageKind {
    /// Folder, relative to the media root, holding images of this kind.
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Recipe => "recipes/images",
            Self::Avatar => "users/avatars",
        }
    }
}

/// Decoded image bytes waiting to be stored.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Opaque reference to a stored image, relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap a stored reference.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

impl AsRef<str> for ImageRef {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("png", Some(ImageFormat::Png))]
    #[case("JPEG", Some(ImageFormat::Jpeg))]
    #[case("jpg", Some(ImageFormat::Jpeg))]
    #[case("svg+xml", None)]
    fn recognises_raster_subtypes(#[case] subtype: &str, #[case] expected: Option<ImageFormat>) {
        assert_eq!(ImageFormat::from_subtype(subtype), expected);
    }
}
