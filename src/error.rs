//! Library-wide error and result types.

use std::fmt;
use std::io;

/// Result alias used throughout xnbkit.
pub type Result<T> = std::result::Result<T, Error>;

/// Compression scheme advertised by the container flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// LZX (flag bit `0x80`), used by XNA Game Studio.
    Lzx,
    /// LZ4 (flag bit `0x40`), used by MonoGame.
    Lz4,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Lzx => f.write_str("LZX"),
            Compression::Lz4 => f.write_str("LZ4"),
        }
    }
}

/// All errors the library can produce.
///
/// Structural errors abort a whole decode. [`Error::ShapeMismatch`],
/// [`Error::EmptyLevel`] and [`Error::NoSuchLevel`] only ever concern a
/// single mip level and are reported per image.
#[derive(Debug)]
pub enum Error {
    /// The stream ended before `need` bytes could be read at `offset`.
    EndOfStream { offset: usize, need: usize },
    /// A ULEB128 integer overflowed 32 bits or was cut off by the end of the
    /// stream.
    MalformedVarint { offset: usize },
    /// A length-prefixed string was not valid UTF-8.
    InvalidEncoding { offset: usize },
    /// The container version is not one of 1, 2, 4 or 5.
    UnsupportedVersion(u8),
    /// The container body is compressed.
    UnsupportedCompression(Compression),
    /// The manifest declares zero content readers.
    NoReaders,
    /// A manifest entry names a type that has no registered reader.
    UnknownReaderType(String),
    /// The container uses a feature this library does not decode.
    UnsupportedFeature { feature: &'static str, count: u32 },
    /// A top-level object references a reader outside the manifest.
    InvalidReaderIndex { index: u32, count: usize },
    /// A mip level's byte length does not match its dimensions.
    ShapeMismatch {
        level: usize,
        width: usize,
        height: usize,
        len: usize,
    },
    /// A mip level has no bytes at all.
    EmptyLevel(usize),
    /// The requested mip level does not exist.
    NoSuchLevel(usize),
    /// The input has no `XNB` magic and no legacy layout fits it.
    InvalidLegacyContainer(&'static str),
    /// An underlying I/O operation failed.
    Io(io::Error),
    /// The image encoder rejected a decoded level.
    #[cfg(feature = "encode")]
    Encode(image::ImageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EndOfStream { offset, need } => {
                write!(f, "unexpected end of stream at {offset:#x} (need {need} bytes)")
            }
            Error::MalformedVarint { offset } => write!(f, "malformed varint at {offset:#x}"),
            Error::InvalidEncoding { offset } => write!(f, "invalid UTF-8 string at {offset:#x}"),
            Error::UnsupportedVersion(v) => write!(f, "unsupported version: {v}"),
            Error::UnsupportedCompression(c) => write!(f, "unsupported compression: {c}"),
            Error::NoReaders => write!(f, "container declares no content readers"),
            Error::UnknownReaderType(name) => write!(f, "unknown content reader: {name}"),
            Error::UnsupportedFeature { feature, count } => {
                write!(f, "unsupported feature: {feature} ({count})")
            }
            Error::InvalidReaderIndex { index, count } => {
                write!(f, "reader index {index} out of range (1..={count})")
            }
            Error::ShapeMismatch {
                level,
                width,
                height,
                len,
            } => write!(
                f,
                "level {level}: {len} bytes cannot be shaped into {width}x{height}x4"
            ),
            Error::EmptyLevel(level) => write!(f, "level {level} is empty"),
            Error::NoSuchLevel(level) => write!(f, "no mip level {level}"),
            Error::InvalidLegacyContainer(s) => write!(f, "invalid legacy container: {s}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "encode")]
            Error::Encode(e) => write!(f, "image encoding failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            #[cfg(feature = "encode")]
            Error::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(feature = "encode")]
impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Encode(e)
    }
}
