//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use skinpack::config::{AggregateConfig, BatchConfig};
use skinpack::utils::digest::DigestAlgorithm;
use skinpack::utils::path::normalize_path;
use std::path::{Path, PathBuf};

/// Merge, minify and content-address the stylesheets and scripts of skin manifests
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "skinpack.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Aggregate a single manifest
    #[command(visible_alias = "a")]
    Aggregate {
        #[command(flatten)]
        args: AggregateArgs,
    },

    /// Aggregate every manifest found under a directory
    #[command(visible_alias = "b")]
    Batch {
        #[command(flatten)]
        args: BatchArgs,
    },

    /// Print the file name of a manifest's aggregated form
    #[command(visible_alias = "n")]
    Name {
        /// Manifest file name or path
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },
}

/// Arguments for `skinpack aggregate`.
#[derive(clap::Args, Debug, Clone)]
pub struct AggregateArgs {
    /// Source manifest
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub manifest: PathBuf,

    /// Directory receiving bundles and the aggregated manifest
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    /// Write every script bundle flat into this directory
    #[arg(long = "shared-js", value_hint = clap::ValueHint::DirPath)]
    pub shared_js: Option<PathBuf>,

    /// Extra directory searched for member files (repeatable)
    #[arg(short, long = "source-dir", value_hint = clap::ValueHint::DirPath)]
    pub source_dir: Vec<PathBuf>,

    #[command(flatten)]
    pub bundle: BundleArgs,
}

/// Arguments for `skinpack batch`.
#[derive(clap::Args, Debug, Clone)]
pub struct BatchArgs {
    /// Directory scanned for manifests
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Output root mirroring the source layout
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Manifest glob, relative to the source directory (repeatable)
    #[arg(short, long)]
    pub include: Vec<String>,

    /// Glob of manifests to skip (repeatable)
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,

    /// Write every script bundle into this directory, relative to the output root
    #[arg(long = "shared-js", value_hint = clap::ValueHint::DirPath)]
    pub shared_js: Option<PathBuf>,

    /// Also search each manifest's output directory for member files
    #[arg(short = 'g', long = "generated-sources", action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub generated_sources: Option<bool>,

    #[command(flatten)]
    pub bundle: BundleArgs,
}

/// Bundle options shared by `aggregate` and `batch`.
#[derive(clap::Args, Debug, Clone)]
pub struct BundleArgs {
    /// Digest naming the bundles (md5, sha256, sha512, blake3)
    #[arg(short, long)]
    pub digest: Option<DigestAlgorithm>,

    /// Encoding of member files and bundles
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Minify stylesheets and scripts
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,
}

impl BundleArgs {
    /// Override `[aggregate]` settings given on the command line.
    pub fn apply(&self, config: &mut AggregateConfig) {
        update_option(&mut config.digest, self.digest.as_ref());
        update_option(&mut config.encoding, self.encoding.as_ref());
        if let Some(minify) = self.minify {
            config.css.minify = minify;
            config.js.minify = minify;
        }
    }
}

impl BatchArgs {
    /// Override `[batch]` settings; paths given here are relative to `cwd`.
    pub fn apply(&self, config: &mut BatchConfig, cwd: &Path) {
        if let Some(source) = &self.source {
            config.source_dir = normalize_path(&cwd.join(source));
        }
        if let Some(output) = &self.output {
            config.output_dir = normalize_path(&cwd.join(output));
        }
        if !self.include.is_empty() {
            config.includes = self.include.clone();
        }
        if !self.exclude.is_empty() {
            config.excludes = self.exclude.clone();
        }
        if let Some(shared) = &self.shared_js {
            config.shared_js_dir = Some(shared.clone());
        }
        update_option(&mut config.use_generated_sources, self.generated_sources.as_ref());
    }
}

/// Update config option if CLI value is provided.
fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
    if let Some(option) = cli_option {
        *config_option = option.clone();
    }
}
