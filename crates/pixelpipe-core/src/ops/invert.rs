//! Color inversion.

use super::ApplyOptions;
use crate::error::OperationError;
use crate::raster::RasterBuffer;

pub(super) fn apply(buffer: &mut RasterBuffer, options: ApplyOptions) -> Result<(), OperationError> {
    let color = usize::from(buffer.channels().min(3));
    buffer.for_each_pixel_mut(options.parallel, |px| {
        for v in &mut px[..color] {
            *v = 255 - *v;
        }
    });
    Ok(())
}
