//! Brightness scaling by a float multiplier.

use super::ApplyOptions;
use crate::error::OperationError;
use crate::raster::RasterBuffer;

pub(super) fn apply(
    buffer: &mut RasterBuffer,
    factor: f64,
    options: ApplyOptions,
) -> Result<(), OperationError> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(OperationError::InvalidFactor(factor));
    }

    let color = usize::from(buffer.channels().min(3));
    buffer.for_each_pixel_mut(options.parallel, |px| {
        for v in &mut px[..color] {
            *v = scale(*v, factor);
        }
    });
    Ok(())
}

fn scale(v: u8, factor: f64) -> u8 {
    (f64::from(v) * factor).round().clamp(0.0, 255.0) as u8
}
