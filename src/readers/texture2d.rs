//! `Texture2DReader` - a 2D texture with its mip chain.
//!
//! ## Payload
//! ```text
//! [0x00] SurfaceFormat                     (s32 LE)
//! [0x04] Width                             (s32 LE)
//! [0x08] Height                            (s32 LE)
//! [0x0C] LevelCount                        (s32 LE)
//! [0x10] LevelCount × {
//!            DataSize                      (u32 LE)
//!            Data                          (DataSize bytes)
//!        }
//! ```
//! Level 0 is full resolution; each following level halves both
//! dimensions. Level sizes are not checked against the dimensions here;
//! a mismatch only shows up when that level is turned into an image.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::pixel::{DecodedImage, Sizing, convert_to_rgba, reshape_to_image};
use crate::readers::Content;
use crate::stream::StreamIn;
use crate::surface::SurfaceFormat;
use crate::{Error, Result};

/// Manifest type name of this reader.
pub const TYPE_NAME: &str = "Microsoft.Xna.Framework.Content.Texture2DReader";

/// Reader version written by the content pipeline.
pub const VERSION: i32 = 0;

/// A decoded 2D texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture2D {
    /// Pixel format of every level.
    pub surface_format: SurfaceFormat,
    /// Width of level 0 as stored.
    pub width: i32,
    /// Height of level 0 as stored.
    pub height: i32,
    /// Raw bytes of each mip level, largest first.
    pub levels: Vec<Vec<u8>>,
    /// Whether `width`/`height` can be trusted.
    pub sizing: Sizing,
}

/// [`crate::readers::ReadFn`] for `Texture2DReader`.
pub fn read(s: &mut StreamIn<'_>, diagnostics: &mut Diagnostics) -> Result<Content> {
    Texture2D::parse(s, diagnostics).map(Content::Texture2D)
}

impl Texture2D {
    /// Parse a texture payload at the stream's position.
    pub fn parse(s: &mut StreamIn<'_>, diagnostics: &mut Diagnostics) -> Result<Self> {
        let surface_format = SurfaceFormat::from_code(s.s32()?);
        let width = s.s32()?;
        let height = s.s32()?;
        let level_count = s.s32()?;
        log::debug!("texture {surface_format} {width}x{height}, {level_count} level(s)");

        let level_count = usize::try_from(level_count).unwrap_or_else(|_| {
            diagnostics.push(Diagnostic::NegativeLevelCount(level_count));
            0
        });

        // Every level costs at least its 4-byte length field.
        let mut levels = Vec::with_capacity(level_count.min(s.remaining() / 4));
        for level in 0..level_count {
            let len = s.u32()? as usize;
            log::trace!("level {level}: {len} bytes at {:#x}", s.position());
            levels.push(s.read(len)?.to_vec());
        }

        Ok(Self {
            surface_format,
            width,
            height,
            levels,
            sizing: Sizing::Declared,
        })
    }

    /// Number of mip levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Convert one mip level into an RGBA image.
    pub fn decode_level(&self, level: usize, diagnostics: &mut Diagnostics) -> Result<DecodedImage> {
        let raw = self.levels.get(level).ok_or(Error::NoSuchLevel(level))?;
        if raw.is_empty() {
            return Err(Error::EmptyLevel(level));
        }
        let pixels = convert_to_rgba(raw.clone(), self.surface_format, diagnostics);
        reshape_to_image(pixels, self.width, self.height, level, self.sizing)
    }

    /// Convert every mip level, in order.
    ///
    /// A level that cannot be converted is left out and recorded as
    /// [`Diagnostic::LevelSkipped`]; the others are unaffected.
    pub fn images(&self, diagnostics: &mut Diagnostics) -> Vec<DecodedImage> {
        let images: Vec<_> = (0..self.levels.len())
            .filter_map(|level| match self.decode_level(level, diagnostics) {
                Ok(image) => Some(image),
                Err(e) => {
                    diagnostics.push(Diagnostic::LevelSkipped {
                        level,
                        reason: e.to_string(),
                    });
                    None
                }
            })
            .collect();
        if images.is_empty() {
            diagnostics.push(Diagnostic::NoImages);
        }
        images
    }
}
