//! skinpack - merge, minify and content-address skin stylesheets and scripts.

mod cli;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use skinpack::config::SkinpackConfig;
use skinpack::manifest::aggregated_name;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    skinpack::logger::set_verbose(cli.verbose);

    if let Commands::Name { file } = &cli.command {
        println!("{}", aggregated_name(file));
        return Ok(());
    }

    let cwd = std::env::current_dir().context("Failed to get current working directory")?;
    let config = SkinpackConfig::load(&cli.config, &cwd)?;

    match &cli.command {
        Commands::Aggregate { args } => cli::aggregate::aggregate_manifest(args, config),
        Commands::Batch { args } => cli::batch::batch_aggregate(args, config, &cwd),
        Commands::Name { .. } => Ok(()),
    }
}
