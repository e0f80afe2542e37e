mod cli;
mod env;

use anyhow::{Context, Result};
use clap::Parser;
use stowage_archive::Archiver;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::env::StowageEnv;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.log_filter());

    let mut settings = match &cli.global.config {
        Some(path) => env::load_settings_file(path)?,
        None => StowageEnv::new()?.load_settings()?,
    };
    cli.global
        .apply(&mut settings)
        .context("Invalid command-line setting")?;

    let archiver = Archiver::with_settings(settings);
    cli.command.run(&archiver)
}

/// `RUST_LOG` wins over `-v`.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
