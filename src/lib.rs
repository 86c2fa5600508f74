//! **xnbkit** - a reader for XNA / MonoGame compiled content (`.xnb`).
//!
//! Decodes the container into typed objects and turns textures into RGBA
//! images, one per mip level.
//!
//! ```no_run
//! # fn main() -> xnbkit::Result<()> {
//! let data = std::fs::read("player.xnb")?;
//! let decoded = xnbkit::decode(&data)?;
//! let mut diagnostics = xnbkit::Diagnostics::new();
//! for texture in decoded.textures() {
//!     for image in texture.images(&mut diagnostics) {
//!         println!("level {}: {}x{}", image.level, image.width, image.height);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//! | Module | Purpose |
//! |--------|---------|
//! | [`stream`]      | Cursor primitives: integers, ULEB128, strings |
//! | [`formats::xnb`]    | Header, manifest and object dispatch |
//! | [`formats::legacy`] | Headerless textures from early pipelines |
//! | [`readers`]     | Type-name registry and content readers |
//! | [`surface`]     | Surface format codes |
//! | [`pixel`]       | Channel conversion and mip reshaping |
//! | [`diagnostics`] | Non-fatal events returned with results |
//! | [`encode`]      | PNG/JPEG output via `image` (feature `encode`) |
//!
//! Compressed containers (LZX, LZ4) and shared resources are detected and
//! rejected; they are not decoded.

pub mod diagnostics;
#[cfg(feature = "encode")]
pub mod encode;
pub mod error;
pub mod formats;
pub mod options;
pub mod pixel;
pub mod readers;
pub mod stream;
pub mod surface;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use formats::xnb::{Decoded, XnbDecoder};
pub use options::DecodeOptions;
pub use readers::{Content, Registry, Texture2D};

/// Decode a complete container with the built-in readers.
pub fn decode(data: &[u8]) -> Result<Decoded> {
    XnbDecoder::new(data).decode()
}

/// Decode with a caller-supplied registry and options.
pub fn decode_with(data: &[u8], registry: &Registry, options: DecodeOptions) -> Result<Decoded> {
    XnbDecoder::new_with_options(data, registry, options).decode()
}
