//! Error types for manifest loading and aggregation.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::asset::AssetKind;

// ============================================================================
// LoadError
// ============================================================================

/// Failure while loading and import-resolving a manifest.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The import graph loops back onto a manifest still being loaded.
    #[error("import cycle detected: {}", PathChain(.chain))]
    Cycle { chain: Vec<PathBuf> },

    #[error("manifest `{}` does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to parse manifest `{}`: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("IO error when reading `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }
}

// ============================================================================
// MinifyError
// ============================================================================

/// A minifier rejected its input.
#[derive(Debug, Clone, Error)]
#[error("failed to minify {kind} `{source_name}`{}: {message}", Position(.line, .column))]
pub struct MinifyError {
    pub kind: AssetKind,
    pub source_name: String,
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

// ============================================================================
// AggregateError
// ============================================================================

/// Failure of a single `aggregate` call.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Checked before any file is touched.
    #[error("cannot aggregate into `{}`: {reason}", .path.display())]
    Precondition { path: PathBuf, reason: String },

    #[error(
        "failed to find resource `{name}` in any of the source directories: [{}]",
        PathList(.searched)
    )]
    ResourceNotFound { name: String, searched: Vec<PathBuf> },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Minify(#[from] MinifyError),

    #[error("IO error at `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AggregateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn precondition(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Precondition {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// display helpers
// ============================================================================

struct PathChain<'a>(&'a [PathBuf]);

impl fmt::Display for PathChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

struct PathList<'a>(&'a [PathBuf]);

impl fmt::Display for PathList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

struct Position<'a>(&'a Option<u32>, &'a Option<u32>);

impl fmt::Display for Position<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (*self.0, *self.1) {
            (Some(line), Some(col)) => write!(f, " at {line}:{col}"),
            (Some(line), None) => write!(f, " at line {line}"),
            _ => Ok(()),
        }
    }
}
