//! Non-fatal events raised while decoding.
//!
//! The format is full of "warn and continue" situations: a reader version
//! that doesn't match, a texture format we can't convert, one broken mip
//! level among several good ones. None of these abort a decode. They are
//! collected here and handed back next to the result, and each one is also
//! forwarded to the [`log`] facade as it happens.

use std::fmt;

use crate::formats::legacy::LegacyLayout;
use crate::surface::SurfaceFormat;

/// A single non-fatal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A manifest entry's version differs from the registered reader's.
    ReaderVersionMismatch {
        type_name: String,
        expected: i32,
        found: i32,
    },
    /// The manifest lists more than one reader.
    MultipleReaders(u32),
    /// A top-level slot holds a null object (reader index 0).
    NullObject(usize),
    /// Bytes remain after the last object was read.
    TrailingBytes(usize),
    /// The `XNB` magic was missing and a legacy layout was used instead.
    LegacyFallback(LegacyLayout),
    /// A texture declared a negative level count; it was read as empty.
    NegativeLevelCount(i32),
    /// No converter exists for this format; bytes were passed through.
    UnsupportedSurfaceFormat(SurfaceFormat),
    /// A mip level could not be turned into an image.
    LevelSkipped { level: usize, reason: String },
    /// A texture produced no images at all.
    NoImages,
}

impl Diagnostic {
    /// Whether the event means output may be wrong or missing.
    pub fn is_lossy(&self) -> bool {
        matches!(
            self,
            Diagnostic::TrailingBytes(_)
                | Diagnostic::UnsupportedSurfaceFormat(_)
                | Diagnostic::LevelSkipped { .. }
                | Diagnostic::NoImages
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ReaderVersionMismatch {
                type_name,
                expected,
                found,
            } => write!(
                f,
                "reader {type_name} has version {found}, expected {expected}; continuing"
            ),
            Diagnostic::MultipleReaders(n) => write!(f, "{n} content readers declared"),
            Diagnostic::NullObject(slot) => write!(f, "object {slot} is null"),
            Diagnostic::TrailingBytes(n) => write!(f, "{n} trailing bytes after last object"),
            Diagnostic::LegacyFallback(layout) => {
                write!(f, "no XNB magic, read as {layout} legacy texture")
            }
            Diagnostic::NegativeLevelCount(n) => write!(f, "negative level count {n}"),
            Diagnostic::UnsupportedSurfaceFormat(format) => {
                write!(f, "unsupported surface format {format}, passing bytes through")
            }
            Diagnostic::LevelSkipped { level, reason } => {
                write!(f, "skipped level {level}: {reason}")
            }
            Diagnostic::NoImages => write!(f, "no images were produced"),
        }
    }
}

/// Ordered collection of [`Diagnostic`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    events: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and log it.
    pub fn push(&mut self, event: Diagnostic) {
        if event.is_lossy() {
            log::warn!("{event}");
        } else {
            log::info!("{event}");
        }
        self.events.push(event);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether any recorded event is lossy.
    pub fn has_lossy(&self) -> bool {
        self.events.iter().any(Diagnostic::is_lossy)
    }

    /// Move every event of `other` into `self` without logging them again.
    pub fn append(&mut self, other: &mut Diagnostics) {
        self.events.append(&mut other.events);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
