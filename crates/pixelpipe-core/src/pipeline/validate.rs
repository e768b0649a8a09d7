//! Loaded-image validation before any operation runs.

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::raster::RasterBuffer;

/// Validates decoded buffers against structural invariants and limits.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check a loaded buffer.
    ///
    /// Checks:
    /// - Dimensions and channel count are non-zero and pixel data is present
    /// - Byte length matches `width * height * channels`
    /// - Neither dimension exceeds `limits.max_image_dimension`
    pub fn validate(&self, buffer: &RasterBuffer) -> Result<(), PipelineError> {
        if !buffer.is_valid() {
            return Err(PipelineError::InvalidImage {
                reason: format!(
                    "empty image ({}x{}, {} channels)",
                    buffer.width(),
                    buffer.height(),
                    buffer.channels()
                ),
            });
        }

        if buffer.pixels().len() != buffer.pixel_byte_count() {
            return Err(PipelineError::InvalidImage {
                reason: format!(
                    "pixel data is {} bytes, expected {}",
                    buffer.pixels().len(),
                    buffer.pixel_byte_count()
                ),
            });
        }

        let max_dim = self.limits.max_image_dimension;
        if buffer.width() > max_dim || buffer.height() > max_dim {
            return Err(PipelineError::InvalidImage {
                reason: format!(
                    "{}x{} exceeds the {} pixel dimension limit",
                    buffer.width(),
                    buffer.height(),
                    max_dim
                ),
            });
        }

        Ok(())
    }
}
