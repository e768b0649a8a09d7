//! Luminosity grayscale.

use super::ApplyOptions;
use crate::error::OperationError;
use crate::raster::RasterBuffer;

const R_WEIGHT: f64 = 0.299;
const G_WEIGHT: f64 = 0.587;
const B_WEIGHT: f64 = 0.114;

pub(super) fn apply(buffer: &mut RasterBuffer, options: ApplyOptions) -> Result<(), OperationError> {
    if buffer.channels() < 3 {
        return Err(OperationError::TooFewChannels {
            required: 3,
            actual: buffer.channels(),
        });
    }

    buffer.for_each_pixel_mut(options.parallel, |px| {
        let gray = luminosity(px[0], px[1], px[2]);
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
    });
    Ok(())
}

/// Weighted luminosity of one RGB triple, rounded to the nearest byte.
pub(crate) fn luminosity(r: u8, g: u8, b: u8) -> u8 {
    let norm = |v: u8| f64::from(v) / 255.0;
    let l = R_WEIGHT * norm(r) + G_WEIGHT * norm(g) + B_WEIGHT * norm(b);
    (l * 255.0).round().clamp(0.0, 255.0) as u8
}
