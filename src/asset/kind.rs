//! Asset kinds and the per-kind bundling policy.

use std::fmt;

use crate::manifest::Entry;

/// Kind of asset a manifest entry declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Stylesheet (`<css>`).
    Css,
    /// JavaScript (`<js>`).
    Script,
}

impl AssetKind {
    /// Processing order: stylesheets first, then scripts.
    pub const ALL: [Self; 2] = [Self::Css, Self::Script];

    /// Manifest element name.
    pub const fn element(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Script => "js",
        }
    }

    /// Human-readable name used in log output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Css => "CSS",
            Self::Script => "JavaScript",
        }
    }

    /// Suffix of bundle files, appended to the checksum.
    pub const fn bundle_extension(self) -> &'static str {
        match self {
            Self::Css => ".aggr.min.css",
            Self::Script => ".aggr.min.js",
        }
    }

    /// Whether `a` and `b` may share a bundle. Symmetric.
    ///
    /// Absolute entries never merge. Stylesheets must agree on conditional,
    /// media and the directory of their value, so relative `url()`s keep
    /// resolving. Scripts only need the same conditional.
    pub fn mergeable(self, a: &Entry, b: &Entry) -> bool {
        if a.is_absolute() || b.is_absolute() {
            return false;
        }
        match self {
            Self::Css => {
                a.conditional == b.conditional
                    && a.media == b.media
                    && a.directory() == b.directory()
            }
            Self::Script => a.conditional == b.conditional,
        }
    }

    /// Manifest entry for a bundle written at `value`, produced from a run
    /// whose first member is `head`.
    pub fn bundle_entry(self, value: String, head: &Entry) -> Entry {
        Entry {
            value,
            conditional: head.conditional.clone(),
            media: match self {
                Self::Css => head.media.clone(),
                Self::Script => None,
            },
            compressed: true,
            ..Entry::default()
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element())
    }
}
