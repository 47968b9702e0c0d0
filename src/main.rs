//! Shapegen
//!
//! Generates zod schemas, zustand stores and React forms from the declared
//! types of a TypeScript module.

use clap::Parser;
use shapegen_cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --verbose raises the default level
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = shapegen_cli::VERSION, "starting shapegen");

    shapegen_cli::run(cli)
}
