//! Manifest data model.

use std::fmt;
use std::str::FromStr;

use crate::asset::AssetKind;
use crate::utils::path::{is_absolute_value, value_dir};

// ============================================================================
// Scope
// ============================================================================

/// Delivery mode an entry applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Served as individual files.
    #[default]
    Plain,
    /// Served only as part of merged bundles.
    Aggregated,
    Both,
}

impl Scope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Aggregated => "aggregated",
            Self::Both => "both",
        }
    }

    /// Whether an entry with this scope belongs in a view of `requested`.
    ///
    /// An entry scoped `Both` appears in every view, and a `Both` view
    /// contains every entry.
    #[inline]
    pub fn includes(self, requested: Scope) -> bool {
        self == Self::Both || requested == Self::Both || self == requested
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope `{0}` (expected plain, aggregated or both)")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "aggregated" => Ok(Self::Aggregated),
            "both" => Ok(Self::Both),
            _ => Err(UnknownScope(s.to_string())),
        }
    }
}

// ============================================================================
// Entry
// ============================================================================

/// One stylesheet or script reference, or an import directive.
///
/// Equality is structural over every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the manifest, or an absolute reference.
    pub value: String,
    pub scope: Scope,
    /// Conditional-comment expression, e.g. `IE 6`.
    pub conditional: Option<String>,
    /// CSS media query. Always `None` for scripts.
    pub media: Option<String>,
    /// Already minified; copied verbatim into bundles.
    pub compressed: bool,
    /// `value` names another manifest whose entries are spliced in here.
    pub import: bool,
    /// Marks an entry served through the resource servlet layer.
    pub resource: bool,
}

impl Entry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_conditional(mut self, conditional: impl Into<String>) -> Self {
        self.conditional = Some(conditional.into());
        self
    }

    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn with_import(mut self, import: bool) -> Self {
        self.import = import;
        self
    }

    pub fn with_resource(mut self, resource: bool) -> Self {
        self.resource = resource;
        self
    }

    /// Leading `/`, `http://` or `https://`.
    #[inline]
    pub fn is_absolute(&self) -> bool {
        is_absolute_value(&self.value)
    }

    /// Carries a non-blank conditional expression.
    #[inline]
    pub fn is_conditional(&self) -> bool {
        self.conditional
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    /// Directory portion of `value`, including the trailing separator.
    #[inline]
    pub fn directory(&self) -> &str {
        value_dir(&self.value)
    }
}

// ============================================================================
// Parameter
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// Manifest
// ============================================================================

/// Ordered stylesheet and script declarations for one skin.
///
/// Order within each kind is significant. Parameters are carried along
/// untouched by every transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub css: Vec<Entry>,
    pub js: Vec<Entry>,
    pub parameters: Vec<Parameter>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn entries(&self, kind: AssetKind) -> &[Entry] {
        match kind {
            AssetKind::Css => &self.css,
            AssetKind::Script => &self.js,
        }
    }

    #[inline]
    pub fn entries_mut(&mut self, kind: AssetKind) -> &mut Vec<Entry> {
        match kind {
            AssetKind::Css => &mut self.css,
            AssetKind::Script => &mut self.js,
        }
    }

    /// Value of the first parameter named `name`.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Copy of this manifest restricted to entries visible in `scope`.
    pub fn filtered(&self, scope: Scope) -> Manifest {
        let keep = |entries: &[Entry]| {
            entries
                .iter()
                .filter(|e| e.scope.includes(scope))
                .cloned()
                .collect()
        };

        Manifest {
            css: keep(&self.css),
            js: keep(&self.js),
            parameters: self.parameters.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }
}
