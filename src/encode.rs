//! Image file output (requires the `encode` feature).
//!
//! The decoder stops at raw RGBA buffers. This module hands them to the
//! [`image`] crate to produce PNG (or any other format it was built with)
//! and writes one file per mip level:
//!
//! ```text
//! {base}-0.png   level 0, full resolution
//! {base}-1.png   level 1
//! ...
//! ```
//!
//! Levels that fail to convert or encode are skipped and recorded as
//! [`Diagnostic::LevelSkipped`]; their index is simply missing from the
//! sequence.

use std::ffi::OsString;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub use image::ImageFormat;
use image::{DynamicImage, RgbaImage};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::formats::xnb::Decoded;
use crate::pixel::DecodedImage;
use crate::readers::Texture2D;
use crate::{Error, Result};

/// One mip level encoded into an image file format.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Mip level the image came from.
    pub level: usize,
    pub format: ImageFormat,
    /// Complete file contents.
    pub bytes: Vec<u8>,
}

/// File extension used for `format`.
pub fn extension(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("bin")
}

/// Encode one decoded level.
pub fn encode_image(decoded: &DecodedImage, format: ImageFormat) -> Result<Vec<u8>> {
    let rgba = RgbaImage::from_raw(decoded.width, decoded.height, decoded.as_raw().to_vec())
        .ok_or(Error::ShapeMismatch {
            level: decoded.level,
            width: decoded.width as usize,
            height: decoded.height as usize,
            len: decoded.as_raw().len(),
        })?;

    // JPEG has no alpha channel.
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
        _ => DynamicImage::ImageRgba8(rgba),
    };

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format)?;
    Ok(bytes)
}

/// Append `suffix` to the file name of `base` without a lossy conversion.
fn suffixed(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

impl Texture2D {
    /// Encode every mip level that converts cleanly, in level order.
    pub fn to_raster_images(
        &self,
        format: ImageFormat,
        diagnostics: &mut Diagnostics,
    ) -> Vec<EncodedImage> {
        self.images(diagnostics)
            .into_iter()
            .filter_map(|decoded| match encode_image(&decoded, format) {
                Ok(bytes) => Some(EncodedImage {
                    level: decoded.level,
                    format,
                    bytes,
                }),
                Err(e) => {
                    diagnostics.push(Diagnostic::LevelSkipped {
                        level: decoded.level,
                        reason: e.to_string(),
                    });
                    None
                }
            })
            .collect()
    }

    /// Write each level to `{base}-{level}.{ext}`.
    ///
    /// Returns the number of files written. A texture with no usable
    /// levels writes nothing and is not an error.
    pub fn save(
        &self,
        base: impl AsRef<Path>,
        format: ImageFormat,
        diagnostics: &mut Diagnostics,
    ) -> Result<usize> {
        let base = base.as_ref();
        let ext = extension(format);
        let images = self.to_raster_images(format, diagnostics);
        for image in &images {
            let path = suffixed(base, &format!("-{}.{ext}", image.level));
            log::debug!("writing {}", path.display());
            fs::write(&path, &image.bytes)?;
        }
        Ok(images.len())
    }
}

impl Decoded {
    /// Save every texture in the container.
    ///
    /// With a single texture the files are named as in [`Texture2D::save`].
    /// With several, texture `n` uses `{base}-{n}` as its base.
    pub fn save_textures(&mut self, base: impl AsRef<Path>, format: ImageFormat) -> Result<usize> {
        let base = base.as_ref();
        let textures: Vec<&Texture2D> = self.contents.iter().filter_map(|c| c.as_texture()).collect();
        let mut written = 0;
        match textures.as_slice() {
            [] => self.diagnostics.push(Diagnostic::NoImages),
            [texture] => written += texture.save(base, format, &mut self.diagnostics)?,
            many => {
                for (n, texture) in many.iter().enumerate() {
                    let object_base = suffixed(base, &format!("-{n}"));
                    written += texture.save(&object_base, format, &mut self.diagnostics)?;
                }
            }
        }
        Ok(written)
    }
}
