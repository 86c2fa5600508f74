//! Content readers and the type-name registry.
//!
//! Every object in a container is written by a type-specific reader, and
//! the manifest names those readers by their .NET type name. The
//! [`Registry`] maps such names to a [`ReaderEntry`], which knows the
//! reader's declared version and how to decode its payload into a
//! [`Content`] value.
//!
//! Supporting a new type means adding a [`Content`] variant, a module with
//! its `read` function, and an entry in [`Registry::builtin`]. The
//! container decoder never needs to change.
//!
//! | Type name | Module | Content |
//! |-----------|--------|---------|
//! | `Microsoft.Xna.Framework.Content.Texture2DReader` | [`texture2d`] | [`Content::Texture2D`] |

use std::fmt;
use std::sync::LazyLock;

use crate::Result;
use crate::diagnostics::Diagnostics;
use crate::stream::StreamIn;

pub mod texture2d;

pub use texture2d::Texture2D;

/// Decodes one object payload from the live stream.
pub type ReadFn = fn(&mut StreamIn<'_>, &mut Diagnostics) -> Result<Content>;

/// A decoded top-level object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Texture2D(Texture2D),
}

impl Content {
    /// The texture, if this object is one.
    pub fn as_texture(&self) -> Option<&Texture2D> {
        match self {
            Content::Texture2D(t) => Some(t),
        }
    }

    pub fn into_texture(self) -> Option<Texture2D> {
        match self {
            Content::Texture2D(t) => Some(t),
        }
    }
}

/// A registered reader.
#[derive(Clone, Copy)]
pub struct ReaderEntry {
    /// Fully-qualified type name, without assembly qualification.
    pub type_name: &'static str,
    /// Version the reader writes into manifests.
    pub version: i32,
    /// Payload decoder.
    pub read: ReadFn,
}

impl fmt::Debug for ReaderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderEntry")
            .field("type_name", &self.type_name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

static BUILTIN: LazyLock<Registry> = LazyLock::new(|| {
    Registry::empty().with(ReaderEntry {
        type_name: texture2d::TYPE_NAME,
        version: texture2d::VERSION,
        read: texture2d::read,
    })
});

/// Immutable table from type name to reader.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<ReaderEntry>,
}

impl Registry {
    /// A registry with no readers.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The readers shipped with this crate, built on first use.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Add `entry`, replacing any entry with the same type name.
    pub fn with(mut self, entry: ReaderEntry) -> Self {
        self.entries.retain(|e| e.type_name != entry.type_name);
        self.entries.push(entry);
        self
    }

    /// Find the reader for a manifest type name.
    ///
    /// Assembly-qualified names (`Type, Assembly, Version=...`) match on the
    /// part before the first comma.
    pub fn lookup(&self, type_name: &str) -> Option<&ReaderEntry> {
        let bare = match type_name.split_once(',') {
            Some((name, _)) => name,
            None => type_name,
        }
        .trim();
        self.entries.iter().find(|e| e.type_name == bare)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReaderEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::builtin().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_texture_reader() {
        let reg = Registry::builtin();
        assert_eq!(reg.len(), 1);
        let entry = reg
            .lookup("Microsoft.Xna.Framework.Content.Texture2DReader")
            .unwrap();
        assert_eq!(entry.version, 0);
    }

    #[test]
    fn assembly_qualified_names_match() {
        let reg = Registry::builtin();
        assert!(
            reg.lookup(
                "Microsoft.Xna.Framework.Content.Texture2DReader, Microsoft.Xna.Framework.Graphics, \
                 Version=4.0.0.0, Culture=neutral, PublicKeyToken=842cf8be1de50553"
            )
            .is_some()
        );
        assert!(reg.lookup("Microsoft.Xna.Framework.Content.StringReader").is_none());
        assert!(reg.lookup("").is_none());
    }

    #[test]
    fn with_replaces_same_name() {
        let reg = Registry::builtin().clone().with(ReaderEntry {
            type_name: texture2d::TYPE_NAME,
            version: 7,
            read: texture2d::read,
        });
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.lookup(texture2d::TYPE_NAME).unwrap().version, 7);
        assert!(Registry::empty().is_empty());
    }
}
