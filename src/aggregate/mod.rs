//! Aggregation of a manifest into content-addressed bundles.
//!
//! # Flow
//!
//! ```text
//! load_filtered(Aggregated) ──► group_runs (per kind) ──► BundleContext::merge
//!                                                              │
//!          <out>/<name>.aggr.xml ◄── save ◄── bundle entries ◄─┘
//! ```
//!
//! Stylesheets are processed before scripts. Each kind is split into runs of
//! mergeable entries; every run becomes one bundle named after the digest of
//! its bytes, so unchanged inputs always produce the same file name.

pub mod bundle;
mod group;
mod source;

#[cfg(test)]
mod tests;

pub use bundle::{BundleContext, Merged, member_list};
pub use group::group_runs;
pub use source::SourceDirs;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use encoding_rs::Encoding;

use crate::asset::{AssetKind, DiagnosticReporter, LogReporter, Minifier, NativeMinifier};
use crate::config::{AggregateConfig, ConfigError};
use crate::error::AggregateError;
use crate::manifest::{Manifest, ManifestStore, Scope, aggregated_name};
use crate::utils::digest::DigestAlgorithm;
use crate::log;

// ============================================================================
// Request / Report
// ============================================================================

/// One aggregation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    /// Source manifest.
    pub manifest_path: PathBuf,
    /// Root of bundle output; the aggregated manifest is written here too.
    pub output_dir: PathBuf,
    /// Flat directory for script bundles instead of mirroring under `output_dir`.
    pub shared_script_dir: Option<PathBuf>,
    /// Searched for member files after the manifest's own directory.
    pub extra_source_dirs: Vec<PathBuf>,
}

impl AggregationRequest {
    pub fn new(manifest_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            output_dir: output_dir.into(),
            shared_script_dir: None,
            extra_source_dirs: Vec::new(),
        }
    }

    pub fn with_shared_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shared_script_dir = Some(dir.into());
        self
    }

    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extra_source_dirs.push(dir.into());
        self
    }
}

/// Entry counts of one kind before and after aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub before: usize,
    pub after: usize,
}

/// Outcome of a successful [`Aggregator::aggregate`] call.
#[derive(Debug, Clone, Default)]
pub struct AggregationReport {
    /// Written aggregated manifest.
    pub manifest: PathBuf,
    /// Bundle files written, stylesheets first.
    pub bundles: Vec<PathBuf>,
    pub css: KindCounts,
    pub js: KindCounts,
    /// Non-fatal problems, such as runs that merged down to nothing.
    pub warnings: Vec<String>,
}

impl AggregationReport {
    pub fn counts(&self, kind: AssetKind) -> KindCounts {
        match kind {
            AssetKind::Css => self.css,
            AssetKind::Script => self.js,
        }
    }

    fn counts_mut(&mut self, kind: AssetKind) -> &mut KindCounts {
        match kind {
            AssetKind::Css => &mut self.css,
            AssetKind::Script => &mut self.js,
        }
    }
}

// ============================================================================
// Aggregator
// ============================================================================

/// Merges the aggregated view of manifests into bundles.
///
/// Holds no per-call state, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct Aggregator {
    store: ManifestStore,
    minifier: Arc<dyn Minifier>,
    reporter: Arc<dyn DiagnosticReporter>,
    digest: DigestAlgorithm,
    encoding: &'static Encoding,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    /// Shared manifest cache, native minifiers, MD5 names, UTF-8 members.
    pub fn new() -> Self {
        Self {
            store: ManifestStore::shared(),
            minifier: Arc::new(NativeMinifier::default()),
            reporter: Arc::new(LogReporter),
            digest: DigestAlgorithm::default(),
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Build from the `[aggregate]` config section.
    pub fn from_config(config: &AggregateConfig) -> Result<Self, ConfigError> {
        Ok(Self::new()
            .with_minifier(Arc::new(NativeMinifier::new(config.minify_options())))
            .with_digest(config.digest)
            .with_encoding(config.encoding()?))
    }

    pub fn with_store(mut self, store: ManifestStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_minifier(mut self, minifier: Arc<dyn Minifier>) -> Self {
        self.minifier = minifier;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn DiagnosticReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    /// Encoding of member files and bundles.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Aggregate `request.manifest_path` into `request.output_dir`.
    ///
    /// Output directories are checked before anything is read. Any error
    /// aborts the whole call; working files are removed on the way out.
    pub fn aggregate(&self, request: &AggregationRequest) -> Result<AggregationReport, AggregateError> {
        let output_dir = prepare_dir(&request.output_dir)?;
        let shared_dir = request
            .shared_script_dir
            .as_deref()
            .map(prepare_dir)
            .transpose()?;

        let source = self
            .store
            .load_filtered(&request.manifest_path, Scope::Aggregated)?;
        let manifest_path = request
            .manifest_path
            .canonicalize()
            .map_err(|e| AggregateError::io(&request.manifest_path, e))?;
        let manifest_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        let sources = SourceDirs::new(manifest_dir, &request.extra_source_dirs);

        let mut report = AggregationReport::default();
        let mut aggregated = Manifest {
            parameters: source.parameters.clone(),
            ..Manifest::default()
        };

        for kind in AssetKind::ALL {
            let ctx = BundleContext {
                kind,
                sources: &sources,
                output_root: &output_dir,
                alternate_dir: match kind {
                    AssetKind::Script => shared_dir.as_deref(),
                    AssetKind::Css => None,
                },
                minifier: self.minifier.as_ref(),
                reporter: self.reporter.as_ref(),
                digest: self.digest,
                encoding: self.encoding,
            };

            let entries = source.entries(kind);
            let merged = group_runs::<AggregateError, _>(kind, entries, |run| {
                match ctx.merge(run)? {
                    Merged::Unchanged(entry) => Ok(Some(entry)),
                    Merged::Bundle { entry, path } => {
                        report.bundles.push(path);
                        Ok(Some(entry))
                    }
                    Merged::Empty => {
                        let warning =
                            format!("generated 0 byte aggregate from [{}]", member_list(run));
                        log!("warning"; "{}", warning);
                        report.warnings.push(warning);
                        Ok(None)
                    }
                }
            })?;

            *report.counts_mut(kind) = KindCounts {
                before: entries.len(),
                after: merged.len(),
            };
            *aggregated.entries_mut(kind) = merged;
        }

        let destination = output_dir.join(aggregated_name(&manifest_path));
        self.store
            .save(&aggregated, &destination)
            .map_err(|e| AggregateError::io(&destination, e))?;
        report.manifest = destination;

        log!(
            "aggregate";
            "aggregated {} {} files down to {} and {} {} files down to {} for {}",
            report.js.before,
            AssetKind::Script.label(),
            report.js.after,
            report.css.before,
            AssetKind::Css.label(),
            report.css.after,
            manifest_path.display()
        );

        Ok(report)
    }
}

/// Create `dir` if needed and make sure files can be written inside it.
///
/// Returns the canonical form of `dir`.
fn prepare_dir(dir: &Path) -> Result<PathBuf, AggregateError> {
    if dir.exists() && !dir.is_dir() {
        return Err(AggregateError::precondition(dir, "not a directory"));
    }
    fs::create_dir_all(dir)
        .map_err(|e| AggregateError::precondition(dir, format!("cannot be created: {e}")))?;
    tempfile::tempfile_in(dir)
        .map_err(|e| AggregateError::precondition(dir, format!("not writable: {e}")))?;
    dir.canonicalize()
        .map_err(|e| AggregateError::precondition(dir, e.to_string()))
}
