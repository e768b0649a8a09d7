//! Nearest-neighbor resize.
//!
//! The destination buffer is allocated and fully sampled before it replaces
//! the source, so an allocation failure leaves the original image intact.

use rayon::prelude::*;

use super::ApplyOptions;
use crate::error::OperationError;
use crate::raster::{byte_count, RasterBuffer};

pub(super) fn apply(
    buffer: &mut RasterBuffer,
    width: u32,
    height: u32,
    options: ApplyOptions,
) -> Result<(), OperationError> {
    if width == 0 || height == 0 {
        return Err(OperationError::ZeroDimension { width, height });
    }
    let channels = buffer.channels();
    let alloc_error = |source| OperationError::Allocation {
        width,
        height,
        channels,
        source,
    };

    let len = byte_count(width, height, channels).ok_or_else(|| alloc_error(None))?;
    let mut dst = Vec::new();
    dst.try_reserve_exact(len)
        .map_err(|e| alloc_error(Some(e)))?;

    let src_w = buffer.width();
    let src_h = buffer.height();
    let stride = channels as usize;
    let src_row = src_w as usize * stride;
    let dst_row = width as usize * stride;

    // Column lookup is the same for every row
    let x_map: Vec<usize> = (0..width)
        .map(|x| nearest(x, src_w, width) as usize * stride)
        .collect();

    let src = buffer.pixels();
    let source_line = |y: u32| {
        let src_y = nearest(y, src_h, height) as usize;
        &src[src_y * src_row..(src_y + 1) * src_row]
    };

    if options.parallel {
        // Disjoint row writes need initialized storage
        dst.resize(len, 0);
        dst.par_chunks_exact_mut(dst_row)
            .enumerate()
            .for_each(|(y, row)| {
                let line = source_line(y as u32);
                for (px, &sx) in row.chunks_exact_mut(stride).zip(&x_map) {
                    px.copy_from_slice(&line[sx..sx + stride]);
                }
            });
    } else {
        for y in 0..height {
            let line = source_line(y);
            for &sx in &x_map {
                dst.extend_from_slice(&line[sx..sx + stride]);
            }
        }
    }

    tracing::trace!("resize {}x{} -> {}x{}", src_w, src_h, width, height);
    buffer.replace_storage(width, height, dst);
    Ok(())
}

/// Map a destination coordinate to the nearest source coordinate.
///
/// `round(dst * src_dim / dst_dim)`, clamped into `[0, src_dim - 1]`.
fn nearest(dst: u32, src_dim: u32, dst_dim: u32) -> u32 {
    let scaled = (f64::from(dst) * f64::from(src_dim) / f64::from(dst_dim)).round();
    (scaled as u32).min(src_dim - 1)
}
