//! Texture surface formats.
//!
//! XNB stores the surface format as a raw `s32`. Codes 0-21 come from XNA
//! 4.0; the sparse codes above 30 were added by MonoGame for sRGB and mobile
//! GPU block formats. Codes outside the table are kept as
//! [`SurfaceFormat::Unknown`] so a texture with an unfamiliar format can
//! still be parsed and its bytes passed through.

use std::fmt;

macro_rules! surface_formats {
    ($($name:ident = $code:literal,)+) => {
        /// Pixel or block encoding of a texture.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SurfaceFormat {
            $($name,)+
            /// A code with no known meaning.
            Unknown(i32),
        }

        impl SurfaceFormat {
            /// Map a stored code to its format.
            pub fn from_code(code: i32) -> Self {
                match code {
                    $($code => SurfaceFormat::$name,)+
                    other => SurfaceFormat::Unknown(other),
                }
            }

            /// The code this format is stored as.
            pub fn code(self) -> i32 {
                match self {
                    $(SurfaceFormat::$name => $code,)+
                    SurfaceFormat::Unknown(other) => other,
                }
            }

            fn name(self) -> Option<&'static str> {
                match self {
                    $(SurfaceFormat::$name => Some(stringify!($name)),)+
                    SurfaceFormat::Unknown(_) => None,
                }
            }
        }
    };
}

surface_formats! {
    Color = 0,
    Bgr565 = 1,
    Bgra5551 = 2,
    Bgra4444 = 3,
    Dxt1 = 4,
    Dxt3 = 5,
    Dxt5 = 6,
    NormalizedByte2 = 7,
    NormalizedByte4 = 8,
    Rgba1010102 = 9,
    Rg32 = 10,
    Rgba64 = 11,
    Alpha8 = 12,
    Single = 13,
    Vector2 = 14,
    Vector4 = 15,
    HalfSingle = 16,
    HalfVector2 = 17,
    HalfVector4 = 18,
    HdrBlendable = 19,
    Bgr32 = 20,
    Bgra32 = 21,
    ColorSRgb = 30,
    Bgr32SRgb = 31,
    Bgra32SRgb = 32,
    Dxt1SRgb = 33,
    Dxt3SRgb = 34,
    Dxt5SRgb = 35,
    RgbPvrtc2Bpp = 50,
    RgbPvrtc4Bpp = 51,
    RgbaPvrtc2Bpp = 52,
    RgbaPvrtc4Bpp = 53,
    RgbEtc1 = 60,
    Dxt1a = 70,
    RgbaAtcExplicitAlpha = 80,
    RgbaAtcInterpolatedAlpha = 81,
    Rgb8Etc2 = 90,
    Srgb8Etc2 = 91,
    Rgb8A1Etc2 = 92,
    Srgb8A1Etc2 = 93,
    Rgba8Etc2 = 94,
    SRgb8A8Etc2 = 95,
}

impl SurfaceFormat {
    /// Formats whose texels are stored blue-first in four bytes and become
    /// RGBA by swapping bytes 0 and 2.
    ///
    /// `Bgr565` is treated as 32-bit BGRA. Real 16-bit 565 data fails the
    /// reshape step and is reported there.
    pub fn is_bgr_ordered(self) -> bool {
        matches!(
            self,
            SurfaceFormat::Bgr565
                | SurfaceFormat::Bgr32
                | SurfaceFormat::Bgra32
                | SurfaceFormat::Bgr32SRgb
                | SurfaceFormat::Bgra32SRgb
        )
    }
}

impl From<i32> for SurfaceFormat {
    fn from(code: i32) -> Self {
        SurfaceFormat::from_code(code)
    }
}

impl fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown({})", self.code()),
        }
    }
}
