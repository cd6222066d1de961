//! Aggregation of every manifest under a source tree.
//!
//! Manifests are discovered with `jwalk`, selected with include/exclude
//! globs and aggregated in parallel. Each job mirrors its manifest's
//! directory under the output root. Jobs share the aggregator (and with it
//! the manifest cache) but resolve imports independently.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use jwalk::WalkDir;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::aggregate::{AggregationReport, AggregationRequest, Aggregator};
use crate::config::BatchConfig;
use crate::error::AggregateError;
use crate::log;
use crate::logger::ProgressLine;

// ============================================================================
// Discovery
// ============================================================================

/// Include/exclude globs over paths relative to the source root.
#[derive(Debug, Clone)]
pub struct ManifestFilter {
    includes: GlobSet,
    excludes: GlobSet,
}

impl ManifestFilter {
    pub fn new<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> Result<Self, globset::Error> {
        Ok(Self {
            includes: build_set(includes)?,
            excludes: build_set(excludes)?,
        })
    }

    /// Whether `relative` is included and not excluded.
    ///
    /// Aggregated manifests (`*.aggr.*`) never match, so a batch can run
    /// in place without picking up its own output.
    pub fn matches(&self, relative: &Path) -> bool {
        let is_output = relative
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(crate::manifest::AGGREGATED_INFIX));

        !is_output && self.includes.is_match(relative) && !self.excludes.is_match(relative)
    }
}

fn build_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern.as_ref())?);
    }
    builder.build()
}

/// Manifest files under `source_dir` accepted by `filter`, sorted.
pub fn discover_manifests(source_dir: &Path, filter: &ManifestFilter) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(source_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| {
            path.strip_prefix(source_dir)
                .is_ok_and(|relative| filter.matches(relative))
        })
        .collect();
    found.sort();
    found
}

// ============================================================================
// Planning
// ============================================================================

/// Where one manifest's output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub shared_js_dir: Option<PathBuf>,
    pub use_generated_sources: bool,
}

impl BatchPlan {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            output_dir: config.output_dir.clone(),
            shared_js_dir: config.shared_js_path(),
            use_generated_sources: config.use_generated_sources,
        }
    }

    /// Request for `manifest`, writing to the mirror of its directory.
    pub fn request(&self, manifest: &Path) -> AggregationRequest {
        let relative_dir = manifest
            .parent()
            .and_then(|dir| dir.strip_prefix(&self.source_dir).ok())
            .unwrap_or_else(|| Path::new(""));
        let output_dir = self.output_dir.join(relative_dir);

        let mut request = AggregationRequest::new(manifest, &output_dir);
        if let Some(shared) = &self.shared_js_dir {
            request = request.with_shared_script_dir(shared);
        }
        if self.use_generated_sources {
            request = request.with_source_dir(output_dir);
        }
        request
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Results of a batch, in manifest order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<(PathBuf, AggregationReport)>,
    pub failures: Vec<(PathBuf, AggregateError)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn bundle_count(&self) -> usize {
        self.reports.iter().map(|(_, r)| r.bundles.len()).sum()
    }
}

/// Aggregate every manifest in parallel.
///
/// A failing manifest is logged and recorded; the others still run.
pub fn run_batch(
    aggregator: &Aggregator,
    plan: &BatchPlan,
    manifests: &[PathBuf],
    progress: Option<&ProgressLine>,
) -> BatchSummary {
    let summary = Mutex::new(BatchSummary::default());

    manifests.par_iter().for_each(|manifest| {
        let result = aggregator.aggregate(&plan.request(manifest));
        if let Some(p) = progress {
            p.inc("manifests");
        }

        let mut summary = summary.lock();
        match result {
            Ok(report) => summary.reports.push((manifest.clone(), report)),
            Err(e) => {
                log!("error"; "{}: {}", manifest.display(), e);
                summary.failures.push((manifest.clone(), e));
            }
        }
    });

    let mut summary = summary.into_inner();
    summary.reports.sort_by(|a, b| a.0.cmp(&b.0));
    summary.failures.sort_by(|a, b| a.0.cmp(&b.0));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{CollectingReporter, PassthroughMinifier};
    use crate::manifest::ManifestStore;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn skin(dir: &Path, name: &str, member: &str) {
        write(dir, &format!("{name}/{member}"), "body{}");
        write(
            dir,
            &format!("{name}/skin.xml"),
            &format!(r#"<resources><css value="{member}" included="both"/></resources>"#),
        );
    }

    #[test]
    fn test_filter() {
        let filter = ManifestFilter::new(&["**/skin.xml"], &["legacy/**"]).unwrap();
        assert!(filter.matches(Path::new("default/skin.xml")));
        assert!(filter.matches(Path::new("skin.xml")));
        assert!(!filter.matches(Path::new("legacy/old/skin.xml")));
        assert!(!filter.matches(Path::new("default/other.xml")));

        let all = ManifestFilter::new(&["**/*.xml"], &[]).unwrap();
        assert!(!all.matches(Path::new("default/skin.aggr.xml")));
    }

    #[test]
    fn test_discover_sorted() {
        let src = TempDir::new().unwrap();
        skin(src.path(), "b", "b.css");
        skin(src.path(), "a", "a.css");
        write(src.path(), "a/notes.txt", "");

        let filter = ManifestFilter::new(&["**/skin.xml"], &[]).unwrap();
        let found = discover_manifests(src.path(), &filter);
        assert_eq!(
            found,
            [src.path().join("a/skin.xml"), src.path().join("b/skin.xml")]
        );
    }

    #[test]
    fn test_request_mirrors_layout() {
        let plan = BatchPlan {
            source_dir: PathBuf::from("/src"),
            output_dir: PathBuf::from("/out"),
            shared_js_dir: Some(PathBuf::from("/out/js")),
            use_generated_sources: true,
        };
        let request = plan.request(Path::new("/src/skins/blue/skin.xml"));

        assert_eq!(request.output_dir, PathBuf::from("/out/skins/blue"));
        assert_eq!(request.shared_script_dir, Some(PathBuf::from("/out/js")));
        assert_eq!(request.extra_source_dirs, [PathBuf::from("/out/skins/blue")]);
    }

    #[test]
    fn test_run_batch_keeps_going_after_failure() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        skin(src.path(), "good", "a.css");
        write(
            src.path(),
            "bad/skin.xml",
            r#"<resources><css value="missing.css" included="both"/></resources>"#,
        );

        let plan = BatchPlan {
            source_dir: src.path().to_path_buf(),
            output_dir: out.path().to_path_buf(),
            shared_js_dir: None,
            use_generated_sources: false,
        };
        let aggregator = Aggregator::new()
            .with_store(ManifestStore::new())
            .with_minifier(Arc::new(PassthroughMinifier))
            .with_reporter(Arc::new(CollectingReporter::new()));
        let filter = ManifestFilter::new(&["**/skin.xml"], &[]).unwrap();
        let manifests = discover_manifests(src.path(), &filter);

        let summary = run_batch(&aggregator, &plan, &manifests, None);
        assert!(!summary.is_success());
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.bundle_count(), 1);
        assert!(out.path().join("good/skin.aggr.xml").is_file());
        assert!(summary.failures[0].0.ends_with("bad/skin.xml"));
    }
}
