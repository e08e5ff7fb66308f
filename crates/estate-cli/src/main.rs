//! Estate Guard CLI
//!
//! Operator tooling for the error pipeline: classify raw failure messages,
//! probe the liveness endpoint, drive a boundary through a simulated failure,
//! and inspect the effective configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use estate_core::EstateConfig;
use std::path::PathBuf;

mod commands;

use commands::{classify, config, probe, simulate};

#[derive(Parser)]
#[command(name = "estate")]
#[command(about = "Estate Guard - error classification, reporting and recovery", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "estate.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the record the factory builds for a failure message
    Classify(classify::ClassifyArgs),

    /// Run one liveness probe
    Probe(probe::ProbeArgs),

    /// Mount a boundary over a failing child and drive its retries
    Simulate(simulate::SimulateArgs),

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = EstateConfig::load(Some(&cli.config))?;
    tracing::debug!(path = %cli.config.display(), "Configuration loaded");

    match cli.command {
        Commands::Classify(args) => classify::run(args)?,
        Commands::Probe(args) => probe::run(args, &config).await?,
        Commands::Simulate(args) => simulate::run(args, &config).await?,
        Commands::Config => config::run(&config)?,
    }

    Ok(())
}
