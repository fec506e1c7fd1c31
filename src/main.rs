//! Hotpatch - hot module replacement for component-based UIs.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use hotpatch::cli::{self, Cli, Commands};
use hotpatch::config::{HotpatchConfig, init_config};
use hotpatch::{core, logger};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(HotpatchConfig::load(cli)?);

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(config),
        Commands::Transform { paths, output } => {
            cli::transform::transform_files(paths, output.as_deref(), &config)
        }
        Commands::Classify {
            old,
            new,
            kind,
            name,
        } => cli::classify::classify_files(old, new, *kind, name.as_deref(), &config),
    }
}
