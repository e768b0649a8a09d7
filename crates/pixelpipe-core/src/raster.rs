//! In-memory raster buffer.
//!
//! Pixels are stored row-major with interleaved channels, so channel `c` of
//! pixel `(x, y)` lives at `(y * width + x) * channels + c`.

use std::ops::{Index, IndexMut};

use rayon::prelude::*;

use crate::error::RasterError;

/// An 8-bit raster image: dimensions plus interleaved pixel bytes.
///
/// A buffer with any zero dimension is "empty" and never valid. The default
/// value is the empty buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Create a zero-filled buffer.
    ///
    /// Any zero dimension yields the empty buffer.
    ///
    /// # Panics
    ///
    /// Panics if the byte count overflows `usize`.
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        match byte_count(width, height, channels) {
            Some(0) => Self::default(),
            Some(len) => Self {
                width,
                height,
                channels,
                pixels: vec![0; len],
            },
            None => panic!("raster dimensions {width}x{height}x{channels} overflow usize"),
        }
    }

    /// Create a buffer from existing bytes.
    ///
    /// The byte length must equal `width * height * channels`.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u8,
        pixels: Vec<u8>,
    ) -> Result<Self, RasterError> {
        let expected = byte_count(width, height, channels).ok_or(RasterError::Overflow {
            width,
            height,
            channels,
        })?;
        if pixels.len() != expected {
            return Err(RasterError::SizeMismatch {
                width,
                height,
                channels,
                expected,
                actual: pixels.len(),
            });
        }
        if expected == 0 {
            return Ok(Self::default());
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Create a buffer by copying a byte slice.
    pub fn from_slice(
        width: u32,
        height: u32,
        channels: u8,
        pixels: &[u8],
    ) -> Result<Self, RasterError> {
        Self::from_raw(width, height, channels, pixels.to_vec())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Raw interleaved pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True iff all dimensions are non-zero and pixel data is present.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.channels > 0 && !self.pixels.is_empty()
    }

    /// `width * height * channels`.
    pub fn pixel_byte_count(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Bounds-checked read access to one channel byte.
    ///
    /// # Panics
    ///
    /// Panics if `x`, `y` or `channel` is out of range.
    pub fn at(&self, x: u32, y: u32, channel: u8) -> &u8 {
        let idx = self.offset(x, y, channel);
        &self.pixels[idx]
    }

    /// Bounds-checked write access to one channel byte.
    ///
    /// # Panics
    ///
    /// Panics if `x`, `y` or `channel` is out of range.
    pub fn at_mut(&mut self, x: u32, y: u32, channel: u8) -> &mut u8 {
        let idx = self.offset(x, y, channel);
        &mut self.pixels[idx]
    }

    /// Move the contents out, leaving an empty buffer behind.
    pub fn take(&mut self) -> RasterBuffer {
        std::mem::take(self)
    }

    /// Swap in new storage and dimensions in one step.
    ///
    /// `pixels` must already be fully populated for the new dimensions; the
    /// existing channel count is kept.
    pub(crate) fn replace_storage(&mut self, width: u32, height: u32, pixels: Vec<u8>) {
        debug_assert_eq!(
            byte_count(width, height, self.channels),
            Some(pixels.len())
        );
        self.width = width;
        self.height = height;
        self.pixels = pixels;
    }

    /// Run `f` on every pixel's channel slice.
    ///
    /// With `parallel` set the work is spread over rayon's pool; `f` must
    /// therefore only touch the pixel it is handed.
    pub fn for_each_pixel_mut<F>(&mut self, parallel: bool, f: F)
    where
        F: Fn(&mut [u8]) + Sync + Send,
    {
        let stride = self.channels as usize;
        if stride == 0 {
            return;
        }
        if parallel {
            self.pixels.par_chunks_exact_mut(stride).for_each(f);
        } else {
            self.pixels.chunks_exact_mut(stride).for_each(f);
        }
    }

    fn offset(&self, x: u32, y: u32, channel: u8) -> usize {
        assert!(
            x < self.width && y < self.height && channel < self.channels,
            "raster access ({x}, {y}, {channel}) out of bounds for {}x{}x{}",
            self.width,
            self.height,
            self.channels
        );
        (y as usize * self.width as usize + x as usize) * self.channels as usize
            + channel as usize
    }
}

impl Index<(u32, u32, u8)> for RasterBuffer {
    type Output = u8;

    fn index(&self, (x, y, channel): (u32, u32, u8)) -> &u8 {
        self.at(x, y, channel)
    }
}

impl IndexMut<(u32, u32, u8)> for RasterBuffer {
    fn index_mut(&mut self, (x, y, channel): (u32, u32, u8)) -> &mut u8 {
        self.at_mut(x, y, channel)
    }
}

/// `width * height * channels`, or `None` on overflow.
pub(crate) fn byte_count(width: u32, height: u32, channels: u8) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(channels as usize)
}
