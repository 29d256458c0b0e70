//! Image files: dimension probing and embeddable media parts.

use slides_core::{Error, ImageProbe, Result};
use std::path::Path;

/// Probes image dimensions from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageProbe;

impl FsImageProbe {
    pub fn new() -> Self {
        Self
    }
}

impl ImageProbe for FsImageProbe {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        image::image_dimensions(path)
            .map_err(|e| Error::ImageError(format!("{}: {}", path.display(), e)))
    }
}

/// Image types that can be embedded in a PPTX package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Png,
    Jpeg,
    Gif,
}

impl MediaFormat {
    /// Detect the format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }

    /// File extension used for the part name.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }

    /// MIME type registered in `[Content_Types].xml`.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }
}

/// Image bytes stored in the package under `ppt/media/`.
#[derive(Debug, Clone)]
pub struct MediaPart {
    pub data: Vec<u8>,
    pub format: MediaFormat,
}

impl MediaPart {
    /// Read and type-check an image file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::ImageError(format!("{}: {}", path.display(), e)))?;
        let format = MediaFormat::from_magic(&data).ok_or_else(|| {
            Error::ImageError(format!("{}: unsupported image format", path.display()))
        })?;
        Ok(Self { data, format })
    }
}
