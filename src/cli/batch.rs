//! `skinpack batch`: every manifest under a source tree.

use std::path::Path;

use anyhow::{Context, Result, bail};
use skinpack::aggregate::Aggregator;
use skinpack::batch::{BatchPlan, ManifestFilter, discover_manifests, run_batch};
use skinpack::config::SkinpackConfig;
use skinpack::log;
use skinpack::logger::ProgressLine;

use super::BatchArgs;

pub fn batch_aggregate(args: &BatchArgs, mut config: SkinpackConfig, cwd: &Path) -> Result<()> {
    args.bundle.apply(&mut config.aggregate);
    args.apply(&mut config.batch, cwd);
    config.validate()?;

    let aggregator = Aggregator::from_config(&config.aggregate)?;
    let batch = &config.batch;
    let filter = ManifestFilter::new(batch.includes.as_slice(), batch.excludes.as_slice())
        .context("invalid manifest glob")?;

    let manifests = discover_manifests(&batch.source_dir, &filter);
    if manifests.is_empty() {
        log!("batch"; "no manifests found under {}", batch.source_dir.display());
        return Ok(());
    }

    let plan = BatchPlan::from_config(batch);
    let progress = ProgressLine::new("batch", &[("manifests", manifests.len())]);
    let summary = run_batch(&aggregator, &plan, &manifests, Some(&progress));
    progress.finish();

    log!(
        "batch";
        "wrote {} bundles for {} of {} manifests into {}",
        summary.bundle_count(),
        summary.reports.len(),
        manifests.len(),
        batch.output_dir.display()
    );

    if !summary.is_success() {
        bail!(
            "{} of {} manifests failed to aggregate",
            summary.failures.len(),
            manifests.len()
        );
    }
    Ok(())
}
