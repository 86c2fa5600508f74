//! Headerless textures from early content pipelines.
//!
//! Some shipped `.xnb` files carry no `XNB` magic at all. They hold a single
//! texture behind a fixed-size header whose contents are not understood.
//! Two incompatible header sizes are known and nothing in the file says
//! which one applies:
//!
//! ## Compact (10-byte header)
//! ```text
//! [0x00] Unknown                            (10 bytes)
//! [0x0A] Texture2D payload (see readers::texture2d)
//! ```
//!
//! ## Extended (13-byte header)
//! ```text
//! [0x00] Unknown                            (13 bytes)
//! [0x0D] SurfaceFormat                      (s32 LE)
//! [0x11] Width                              (s32 LE)
//! [0x15] Height                             (s32 LE)
//! [0x19] LevelCount (ignored)               (s32 LE)
//! [0x1D] DataSize                           (u16 LE)
//! [0x1F] Data                               (DataSize bytes, one level)
//! ```
//!
//! In both layouts the stored width and height are unreliable, so the
//! texture is marked [`Sizing::InferredSquare`].
//!
//! [`LegacyMode::Probe`] parses the buffer with both layouts and keeps the
//! one that accounts for the whole buffer. If both do, or neither parses,
//! the input is rejected instead of guessing.

use std::fmt;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::pixel::Sizing;
use crate::readers::Texture2D;
use crate::stream::StreamIn;
use crate::surface::SurfaceFormat;
use crate::{Error, Result};

/// Bytes every legacy layout needs at minimum: the shorter header plus
/// surface format, width and height.
pub const MIN_LEGACY_LEN: usize = 10 + 3 * 4;

/// Known headerless layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyLayout {
    /// 10-byte header followed by a regular texture payload.
    Compact,
    /// 13-byte header followed by a single `u16`-length level.
    Extended,
}

impl LegacyLayout {
    pub const ALL: [LegacyLayout; 2] = [LegacyLayout::Compact, LegacyLayout::Extended];

    /// Size of the skipped header.
    pub fn header_len(self) -> usize {
        match self {
            LegacyLayout::Compact => 10,
            LegacyLayout::Extended => 13,
        }
    }

    /// Parse `data` with this layout. Returns the texture and the number of
    /// bytes left unread.
    fn parse(self, data: &[u8], diagnostics: &mut Diagnostics) -> Result<(Texture2D, usize)> {
        let mut s = StreamIn::new(data);
        s.skip(self.header_len())?;

        let mut texture = match self {
            LegacyLayout::Compact => Texture2D::parse(&mut s, diagnostics)?,
            LegacyLayout::Extended => {
                let surface_format = SurfaceFormat::from_code(s.s32()?);
                let width = s.s32()?;
                let height = s.s32()?;
                let _level_count = s.s32()?;
                let len = s.u16()? as usize;
                Texture2D {
                    surface_format,
                    width,
                    height,
                    levels: vec![s.read(len)?.to_vec()],
                    sizing: Sizing::Declared,
                }
            }
        };
        texture.sizing = Sizing::InferredSquare;
        Ok((texture, s.remaining()))
    }
}

impl fmt::Display for LegacyLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyLayout::Compact => f.write_str("compact"),
            LegacyLayout::Extended => f.write_str("extended"),
        }
    }
}

/// How to treat input without the `XNB` magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyMode {
    /// Try every [`LegacyLayout`] and accept the single best fit.
    #[default]
    Probe,
    /// Use this layout only.
    Fixed(LegacyLayout),
    /// Fail with [`Error::InvalidLegacyContainer`].
    Reject,
}

struct Candidate {
    layout: LegacyLayout,
    texture: Texture2D,
    trailing: usize,
    diagnostics: Diagnostics,
}

fn try_layout(layout: LegacyLayout, data: &[u8]) -> Result<Candidate> {
    let mut diagnostics = Diagnostics::new();
    let (texture, trailing) = layout.parse(data, &mut diagnostics)?;
    Ok(Candidate {
        layout,
        texture,
        trailing,
        diagnostics,
    })
}

/// Read a headerless container as a single texture.
pub(crate) fn read_legacy(
    data: &[u8],
    mode: LegacyMode,
    diagnostics: &mut Diagnostics,
) -> Result<(LegacyLayout, Texture2D)> {
    if data.len() < MIN_LEGACY_LEN {
        return Err(Error::InvalidLegacyContainer("too short for a legacy header"));
    }

    let mut chosen = match mode {
        LegacyMode::Reject => return Err(Error::InvalidLegacyContainer("missing XNB magic")),
        LegacyMode::Fixed(layout) => try_layout(layout, data)?,
        LegacyMode::Probe => probe(data)?,
    };

    diagnostics.push(Diagnostic::LegacyFallback(chosen.layout));
    diagnostics.append(&mut chosen.diagnostics);
    if chosen.trailing > 0 {
        diagnostics.push(Diagnostic::TrailingBytes(chosen.trailing));
    }
    Ok((chosen.layout, chosen.texture))
}

fn probe(data: &[u8]) -> Result<Candidate> {
    let mut parsed: Vec<Candidate> = LegacyLayout::ALL
        .into_iter()
        .filter_map(|layout| match try_layout(layout, data) {
            Ok(c) => Some(c),
            Err(e) => {
                log::debug!("{layout} legacy layout does not fit: {e}");
                None
            }
        })
        .collect();

    // A layout that ends exactly at the end of the buffer beats one that
    // leaves bytes over.
    if parsed.iter().any(|c| c.trailing == 0) {
        parsed.retain(|c| c.trailing == 0);
    }

    match parsed.len() {
        0 => Err(Error::InvalidLegacyContainer("no legacy layout fits")),
        1 => Ok(parsed.remove(0)),
        _ => Err(Error::InvalidLegacyContainer(
            "ambiguous legacy layout, specify one explicitly",
        )),
    }
}
