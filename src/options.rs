//! Decoder configuration.

use crate::formats::legacy::{LegacyLayout, LegacyMode};

/// Options controlling a decode.
///
/// Setters consume and return `self` so options can be built inline:
///
/// ```
/// use xnbkit::DecodeOptions;
/// use xnbkit::formats::legacy::{LegacyLayout, LegacyMode};
///
/// let options = DecodeOptions::default().set_legacy_mode(LegacyMode::Fixed(LegacyLayout::Extended));
/// assert_eq!(options.legacy_mode(), LegacyMode::Fixed(LegacyLayout::Extended));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    legacy: LegacyMode,
}

impl DecodeOptions {
    /// How input without the `XNB` magic is handled.
    ///
    /// - Default value: [`LegacyMode::Probe`]
    pub fn legacy_mode(&self) -> LegacyMode {
        self.legacy
    }

    pub fn set_legacy_mode(mut self, mode: LegacyMode) -> Self {
        self.legacy = mode;
        self
    }

    /// Shorthand for `set_legacy_mode(LegacyMode::Fixed(layout))`.
    pub fn set_legacy_layout(self, layout: LegacyLayout) -> Self {
        self.set_legacy_mode(LegacyMode::Fixed(layout))
    }
}
