//! Conversion of raw mip levels into RGBA images.
//!
//! Two steps, both by value: [`convert_to_rgba`] reorders channels into a
//! new owned buffer, and [`reshape_to_image`] checks the buffer against its
//! dimensions and wraps it as a [`DecodedImage`]. Failures here concern one
//! mip level only.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::surface::SurfaceFormat;
use crate::{Error, Result};

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Where a texture's dimensions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Width and height are read from the container and halved per level.
    Declared,
    /// Width and height are guessed from the buffer length, assuming a
    /// square 4-byte-per-pixel image. Only legacy containers use this; a
    /// non-square texture comes out with the wrong shape or fails to
    /// reshape.
    InferredSquare,
}

/// One mip level as a `height × width × 4` RGBA grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Mip level this image came from (0 = full resolution).
    pub level: usize,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Iterate over rows of `width * 4` bytes.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.pixels.chunks_exact(self.stride())
    }

    /// RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = y as usize * self.stride() + x as usize * CHANNELS;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[at..at + CHANNELS]);
        Some(px)
    }
}

/// Swap bytes 0 and 2 of every 4-byte pixel (BGRA ⇄ RGBA).
///
/// A trailing partial pixel is left untouched. Applying this twice yields
/// the input.
pub fn swizzle_bgra(mut pixels: Vec<u8>) -> Vec<u8> {
    for px in pixels.chunks_exact_mut(CHANNELS) {
        px.swap(0, 2);
    }
    pixels
}

/// Reorder `pixels` from `format` into RGBA.
///
/// Only BGR-ordered formats have a converter. Every other format, `Color`
/// included, is returned unchanged and an
/// [`Diagnostic::UnsupportedSurfaceFormat`] is recorded; this never fails.
pub fn convert_to_rgba(
    pixels: Vec<u8>,
    format: SurfaceFormat,
    diagnostics: &mut Diagnostics,
) -> Vec<u8> {
    if format.is_bgr_ordered() {
        return swizzle_bgra(pixels);
    }
    diagnostics.push(Diagnostic::UnsupportedSurfaceFormat(format));
    pixels
}

/// Dimension of mip `level` for a base dimension.
pub fn mip_dimension(base: i32, level: usize) -> u32 {
    u32::try_from(base)
        .ok()
        .and_then(|b| u32::try_from(level).ok().and_then(|l| b.checked_shr(l)))
        .unwrap_or(0)
}

/// Guess `(width, height)` of a square RGBA image from its byte length.
pub fn square_dimensions(len: usize) -> (usize, usize) {
    let pixel_count = len / CHANNELS;
    let width = pixel_count.isqrt();
    if width == 0 {
        return (0, 0);
    }
    (width, pixel_count / width)
}

/// Shape a converted level into an image.
///
/// With [`Sizing::Declared`] the base `width`/`height` are shifted right by
/// `level`. The buffer must hold exactly `width * height * 4` bytes.
pub fn reshape_to_image(
    pixels: Vec<u8>,
    width: i32,
    height: i32,
    level: usize,
    sizing: Sizing,
) -> Result<DecodedImage> {
    if pixels.is_empty() {
        return Err(Error::EmptyLevel(level));
    }

    let (w, h) = match sizing {
        Sizing::Declared => (
            mip_dimension(width, level) as usize,
            mip_dimension(height, level) as usize,
        ),
        Sizing::InferredSquare => square_dimensions(pixels.len()),
    };

    let mismatch = || Error::ShapeMismatch {
        level,
        width: w,
        height: h,
        len: pixels.len(),
    };

    let expected = w.checked_mul(h).and_then(|n| n.checked_mul(CHANNELS));
    if expected != Some(pixels.len()) {
        return Err(mismatch());
    }
    let (Ok(width), Ok(height)) = (u32::try_from(w), u32::try_from(h)) else {
        return Err(mismatch());
    };

    Ok(DecodedImage {
        width,
        height,
        level,
        pixels,
    })
}
