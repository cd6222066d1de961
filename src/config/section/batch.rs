//! `[batch]` section configuration.
//!
//! Settings for `skinpack batch`, which aggregates every manifest found
//! under a source tree.
//!
//! # Example
//!
//! ```toml
//! [batch]
//! source_dir = "skins"                # Scanned for manifests
//! output_dir = "target/skins"         # Mirrors the source layout
//! includes = ["**/skin.xml"]          # Manifest globs (relative to source_dir)
//! excludes = ["**/test/**"]
//! shared_js_dir = "js"                # Flat script bundles, relative to output_dir
//! use_generated_sources = false       # Also look for members in the output dir
//! ```

use std::path::{Path, PathBuf};

use globset::Glob;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::normalize_path;

/// Batch aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub source_dir: PathBuf,

    pub output_dir: PathBuf,

    /// Globs selecting manifest files, matched against paths relative to
    /// `source_dir`.
    pub includes: Vec<String>,

    pub excludes: Vec<String>,

    /// Directory receiving every script bundle, relative to `output_dir`.
    pub shared_js_dir: Option<PathBuf>,

    /// Search each manifest's output directory for members after its own.
    pub use_generated_sources: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from("target/skins"),
            includes: vec!["**/skin.xml".to_string()],
            excludes: Vec::new(),
            shared_js_dir: None,
            use_generated_sources: false,
        }
    }
}

impl BatchConfig {
    const INCLUDES: FieldPath = FieldPath::new("batch.includes");
    const EXCLUDES: FieldPath = FieldPath::new("batch.excludes");

    /// Make directories absolute against `root`.
    pub fn normalize(&mut self, root: &Path) {
        self.source_dir = normalize_path(&root.join(&self.source_dir));
        self.output_dir = normalize_path(&root.join(&self.output_dir));
    }

    /// Absolute shared script directory, if configured.
    pub fn shared_js_path(&self) -> Option<PathBuf> {
        self.shared_js_dir
            .as_ref()
            .map(|dir| self.output_dir.join(dir))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.includes.is_empty() {
            diag.error_with_hint(
                Self::INCLUDES,
                "at least one include pattern is required",
                "the default is [\"**/skin.xml\"]",
            );
        }
        for (field, patterns) in [(Self::INCLUDES, &self.includes), (Self::EXCLUDES, &self.excludes)] {
            for pattern in patterns {
                if let Err(e) = Glob::new(pattern) {
                    diag.error(field, format!("invalid glob `{pattern}`: {e}"));
                }
            }
        }
    }
}
