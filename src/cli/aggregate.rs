//! `skinpack aggregate`: one manifest.

use anyhow::{Context, Result};
use skinpack::aggregate::{AggregationRequest, Aggregator};
use skinpack::config::SkinpackConfig;
use skinpack::debug;

use super::AggregateArgs;

pub fn aggregate_manifest(args: &AggregateArgs, mut config: SkinpackConfig) -> Result<()> {
    args.bundle.apply(&mut config.aggregate);
    config.validate()?;

    let aggregator = Aggregator::from_config(&config.aggregate)?;

    let mut request = AggregationRequest::new(&args.manifest, &args.output);
    if let Some(shared) = &args.shared_js {
        request = request.with_shared_script_dir(shared);
    }
    for dir in &args.source_dir {
        request = request.with_source_dir(dir);
    }

    let report = aggregator
        .aggregate(&request)
        .with_context(|| format!("failed to aggregate {}", args.manifest.display()))?;

    for bundle in &report.bundles {
        debug!("aggregate"; "wrote {}", bundle.display());
    }
    debug!("aggregate"; "wrote {}", report.manifest.display());
    Ok(())
}
