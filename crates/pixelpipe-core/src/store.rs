//! Image load/save.
//!
//! The [`ImageStore`] trait is the executor's only way to touch the
//! filesystem. [`FsImageStore`] is the production implementation on top of
//! the `image` crate:
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode | `image::ImageReader` with content-sniffed format |
//! | Narrow to 8-bit | `DynamicImage::into_luma8` / `into_luma_alpha8` / `into_rgb8` / `into_rgba8` |
//! | Encode | `image::save_buffer_with_format` |
//!
//! Decoded images keep their native channel count (1 = L, 2 = LA, 3 = RGB,
//! 4 = RGBA); wider sample types are narrowed to 8 bits per channel.

use image::{DynamicImage, ExtendedColorType, ImageFormat};
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::StoreError;
use crate::raster::RasterBuffer;

/// Encodable output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
    Tga,
}

impl OutputFormat {
    /// Parse a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            "tga" => Some(Self::Tga),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Bmp => "bmp",
            Self::Tga => "tga",
        }
    }

    /// Whether the encoder accepts images with this many channels.
    ///
    /// JPEG has no alpha channel, so LA and RGBA are refused.
    pub fn supports_channels(self, channels: u8) -> bool {
        match self {
            Self::Jpeg => matches!(channels, 1 | 3),
            Self::Png | Self::Bmp | Self::Tga => (1..=4).contains(&channels),
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tga => ImageFormat::Tga,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Load/save collaborator used by the executor.
pub trait ImageStore {
    /// Load and decode the image at `path`.
    fn load(&self, path: &Path) -> Result<RasterBuffer, StoreError>;

    /// Encode `buffer` as `format` and write it to `path`.
    ///
    /// Callers guarantee `buffer.is_valid()`.
    fn save(&self, path: &Path, buffer: &RasterBuffer, format: OutputFormat)
        -> Result<(), StoreError>;
}

/// Filesystem-backed store using the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct FsImageStore {
    limits: LimitsConfig,
}

impl FsImageStore {
    /// Create a store with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    fn check_size(&self, path: &Path) -> Result<(), StoreError> {
        let metadata = std::fs::metadata(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(StoreError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }
}

impl ImageStore for FsImageStore {
    fn load(&self, path: &Path) -> Result<RasterBuffer, StoreError> {
        self.check_size(path)?;

        let reader = image::ImageReader::open(path)
            .map_err(|source| StoreError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .with_guessed_format()
            .map_err(|source| StoreError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let image = reader.decode().map_err(|e| StoreError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let buffer = to_raster(image).map_err(|source| StoreError::Raster {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::trace!(
            "Decoded {:?}: {}x{} ({} channels)",
            path,
            buffer.width(),
            buffer.height(),
            buffer.channels()
        );
        Ok(buffer)
    }

    fn save(
        &self,
        path: &Path,
        buffer: &RasterBuffer,
        format: OutputFormat,
    ) -> Result<(), StoreError> {
        let color = color_type(buffer.channels()).ok_or(StoreError::UnsupportedLayout {
            channels: buffer.channels(),
        })?;
        image::save_buffer_with_format(
            path,
            buffer.pixels(),
            buffer.width(),
            buffer.height(),
            color,
            format.image_format(),
        )
        .map_err(|e| StoreError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Narrow a decoded image to 8 bits per channel, keeping its channel count.
fn to_raster(image: DynamicImage) -> Result<RasterBuffer, crate::error::RasterError> {
    let (width, height) = (image.width(), image.height());
    let (channels, bytes) = match image.color().channel_count() {
        1 => (1, image.into_luma8().into_raw()),
        2 => (2, image.into_luma_alpha8().into_raw()),
        3 => (3, image.into_rgb8().into_raw()),
        _ => (4, image.into_rgba8().into_raw()),
    };
    RasterBuffer::from_raw(width, height, channels, bytes)
}

fn color_type(channels: u8) -> Option<ExtendedColorType> {
    match channels {
        1 => Some(ExtendedColorType::L8),
        2 => Some(ExtendedColorType::La8),
        3 => Some(ExtendedColorType::Rgb8),
        4 => Some(ExtendedColorType::Rgba8),
        _ => None,
    }
}
