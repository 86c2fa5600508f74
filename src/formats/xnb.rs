//! XNB - compiled XNA / MonoGame content.
//!
//! ## Layout
//! ```text
//! [0x00] Magic "XNB"                        (3 bytes)
//! [0x03] Platform ('w', 'x', 'm', 'd', ...)  (u8)
//! [0x04] Version (1, 2, 4 or 5)             (u8)
//! [0x05] Flags                              (u8)
//!         0x01 HiDef profile
//!         0x40 LZ4 compressed
//!         0x80 LZX compressed
//! [0x06] DeclaredSize (whole file)          (s32 LE)
//! [0x0A] ReaderCount                        (ULEB128)
//!        ReaderCount × {
//!            TypeName                       (ULEB128 length + UTF-8)
//!            TypeVersion                    (s32 LE)
//!        }
//!        SharedResourceCount                (ULEB128, must be 0)
//!        ReaderCount × {
//!            ReaderIndex (1-based, 0=null)  (ULEB128)
//!            Payload                        (reader specific)
//!        }
//! ```
//!
//! Everything after the flags byte is compressed when either compression
//! bit is set. Compressed containers are rejected.
//!
//! ## Decoding
//! [`XnbDecoder`] is a small state machine:
//!
//! ```text
//! Start -> HeaderValidated -> ManifestRead -> ReadersDispatched -> Done
//!   \______________\_______________\_______________\______-> Failed
//! ```
//!
//! A buffer without the magic goes from `HeaderValidated` straight to
//! `ReadersDispatched` through [`crate::formats::legacy`].

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Compression;
use crate::formats::legacy::{self, LegacyLayout};
use crate::options::DecodeOptions;
use crate::readers::{Content, ReaderEntry, Registry, Texture2D};
use crate::stream::StreamIn;
use crate::{Error, Result};

/// File magic.
pub const MAGIC: &[u8; 3] = b"XNB";

/// Container versions this library reads.
pub const SUPPORTED_VERSIONS: [u8; 4] = [1, 2, 4, 5];

const FLAG_HIDEF: u8 = 0x01;
const FLAG_LZ4: u8 = 0x40;
const FLAG_LZX: u8 = 0x80;

/// Fixed part of an XNB header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Target platform tag.
    pub platform: char,
    pub version: u8,
    pub flags: u8,
    /// File size as written by the pipeline. Not used for bounds checks.
    pub declared_size: i32,
}

impl ContainerHeader {
    /// Whether the content targets the HiDef graphics profile.
    pub fn hidef(&self) -> bool {
        self.flags & FLAG_HIDEF != 0
    }

    /// Compression scheme named by the flags, if any. LZX wins if both bits
    /// are set.
    pub fn compression(&self) -> Option<Compression> {
        compression_of(self.flags)
    }
}

fn compression_of(flags: u8) -> Option<Compression> {
    if flags & FLAG_LZX != 0 {
        Some(Compression::Lzx)
    } else if flags & FLAG_LZ4 != 0 {
        Some(Compression::Lz4)
    } else {
        None
    }
}

/// One reader declared in the manifest.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    /// Type name exactly as stored.
    pub type_name: String,
    /// Version as stored.
    pub version: i32,
    /// Registered reader it resolved to.
    pub reader: ReaderEntry,
}

/// Progress of an [`XnbDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Start,
    HeaderValidated,
    ManifestRead,
    ReadersDispatched,
    Done,
    Failed,
}

/// Result of a successful decode.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// [`None`] for legacy input.
    pub header: Option<ContainerHeader>,
    /// Layout used when the input had no magic.
    pub legacy: Option<LegacyLayout>,
    /// Readers declared by the manifest (empty for legacy input).
    pub manifest: Vec<ManifestEntry>,
    /// Top-level objects in file order; null objects are left out.
    pub contents: Vec<Content>,
    /// Non-fatal events met while decoding.
    pub diagnostics: Diagnostics,
}

impl Decoded {
    /// All textures among the top-level objects.
    pub fn textures(&self) -> impl Iterator<Item = &Texture2D> {
        self.contents.iter().filter_map(Content::as_texture)
    }

    pub fn is_legacy(&self) -> bool {
        self.legacy.is_some()
    }
}

/// Step-by-step XNB decoder over an in-memory buffer.
///
/// Most callers want [`crate::decode`]; this type exposes the individual
/// transitions for inspection.
#[derive(Debug)]
pub struct XnbDecoder<'a> {
    data: &'a [u8],
    stream: StreamIn<'a>,
    registry: &'a Registry,
    options: DecodeOptions,
    state: DecoderState,
    header: Option<ContainerHeader>,
    legacy: bool,
    legacy_layout: Option<LegacyLayout>,
    manifest: Vec<ManifestEntry>,
    contents: Vec<Content>,
    diagnostics: Diagnostics,
}

impl<'a> XnbDecoder<'a> {
    /// Decoder with the built-in readers and default options.
    pub fn new(data: &'a [u8]) -> Self {
        Self::new_with_options(data, Registry::builtin(), DecodeOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], registry: &'a Registry, options: DecodeOptions) -> Self {
        Self {
            data,
            stream: StreamIn::new(data),
            registry,
            options,
            state: DecoderState::Start,
            header: None,
            legacy: false,
            legacy_layout: None,
            manifest: Vec::new(),
            contents: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Header, once validated. [`None`] before that and for legacy input.
    pub fn header(&self) -> Option<&ContainerHeader> {
        self.header.as_ref()
    }

    pub fn manifest(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    /// Perform the next transition and return the new state.
    ///
    /// On error the decoder moves to [`DecoderState::Failed`] and stays
    /// there; further calls return `Ok(Failed)`. `Done` is likewise final.
    pub fn step(&mut self) -> Result<DecoderState> {
        let next = match self.state {
            DecoderState::Start => self.validate_header(),
            DecoderState::HeaderValidated if self.legacy => self.read_legacy(),
            DecoderState::HeaderValidated => self.read_manifest(),
            DecoderState::ManifestRead => self.dispatch_readers(),
            DecoderState::ReadersDispatched => self.finish(),
            DecoderState::Done | DecoderState::Failed => return Ok(self.state),
        };
        match next {
            Ok(state) => {
                log::trace!("{:?} -> {:?} at {:#x}", self.state, state, self.stream.position());
                self.state = state;
                Ok(state)
            }
            Err(e) => {
                log::debug!("decode failed in {:?}: {e}", self.state);
                self.state = DecoderState::Failed;
                Err(e)
            }
        }
    }

    /// Run every remaining transition.
    ///
    /// A decoder that already failed starts over from the beginning, which
    /// reproduces the original error.
    pub fn decode(mut self) -> Result<Decoded> {
        if self.state == DecoderState::Failed {
            self = Self::new_with_options(self.data, self.registry, self.options);
        }
        while self.step()? != DecoderState::Done {}
        Ok(Decoded {
            header: self.header,
            legacy: self.legacy_layout,
            manifest: self.manifest,
            contents: self.contents,
            diagnostics: self.diagnostics,
        })
    }

    fn validate_header(&mut self) -> Result<DecoderState> {
        if self.stream.peek(MAGIC.len()) != Some(MAGIC.as_slice()) {
            self.legacy = true;
            return Ok(DecoderState::HeaderValidated);
        }
        self.stream.skip(MAGIC.len())?;

        let platform = self.stream.char()?;
        let version = self.stream.u8()?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(Error::UnsupportedVersion(version));
        }

        let flags = self.stream.u8()?;
        if let Some(c) = compression_of(flags) {
            return Err(Error::UnsupportedCompression(c));
        }

        let declared_size = self.stream.s32()?;
        let header = ContainerHeader {
            platform,
            version,
            flags,
            declared_size,
        };

        log::debug!(
            "XNB v{version} platform '{platform}' flags {flags:#04x} size {declared_size}"
        );
        self.header = Some(header);
        Ok(DecoderState::HeaderValidated)
    }

    fn read_manifest(&mut self) -> Result<DecoderState> {
        let count = self.stream.uleb128()?;
        if count == 0 {
            return Err(Error::NoReaders);
        }
        if count > 1 {
            self.diagnostics.push(Diagnostic::MultipleReaders(count));
        }

        // Each entry needs at least a length byte and a version.
        let mut manifest = Vec::with_capacity((count as usize).min(self.stream.remaining() / 5));
        for _ in 0..count {
            let type_name = self.stream.string()?;
            let version = self.stream.s32()?;

            let Some(&reader) = self.registry.lookup(&type_name) else {
                return Err(Error::UnknownReaderType(type_name));
            };
            if reader.version != version {
                self.diagnostics.push(Diagnostic::ReaderVersionMismatch {
                    type_name: type_name.clone(),
                    expected: reader.version,
                    found: version,
                });
            }
            log::debug!("reader {type_name} v{version}");
            manifest.push(ManifestEntry {
                type_name,
                version,
                reader,
            });
        }

        let shared = self.stream.uleb128()?;
        if shared != 0 {
            return Err(Error::UnsupportedFeature {
                feature: "shared resources",
                count: shared,
            });
        }

        self.manifest = manifest;
        Ok(DecoderState::ManifestRead)
    }

    fn dispatch_readers(&mut self) -> Result<DecoderState> {
        for slot in 0..self.manifest.len() {
            let index = self.stream.uleb128()?;
            if index == 0 {
                self.diagnostics.push(Diagnostic::NullObject(slot));
                continue;
            }
            let read = self
                .manifest
                .get(index as usize - 1)
                .map(|entry| entry.reader.read)
                .ok_or(Error::InvalidReaderIndex {
                    index,
                    count: self.manifest.len(),
                })?;
            let content = read(&mut self.stream, &mut self.diagnostics)?;
            self.contents.push(content);
        }
        Ok(DecoderState::ReadersDispatched)
    }

    fn read_legacy(&mut self) -> Result<DecoderState> {
        let (layout, texture) =
            legacy::read_legacy(self.data, self.options.legacy_mode(), &mut self.diagnostics)?;
        self.stream.seek(self.data.len())?;
        self.legacy_layout = Some(layout);
        self.contents.push(Content::Texture2D(texture));
        Ok(DecoderState::ReadersDispatched)
    }

    fn finish(&mut self) -> Result<DecoderState> {
        let trailing = self.stream.remaining();
        if trailing > 0 {
            self.diagnostics.push(Diagnostic::TrailingBytes(trailing));
        }
        Ok(DecoderState::Done)
    }
}
