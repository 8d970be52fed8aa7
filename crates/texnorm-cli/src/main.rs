//! texnorm - texture normalization pipeline CLI
//!
//! Processes supplier deliveries described by YAML rule files into
//! normalized per-asset texture variants.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "texnorm")]
#[command(author, version, about = "Texture normalization pipeline")]
#[command(long_about = "
Normalizes supplier texture deliveries into per-asset output variants.

Examples:
  texnorm run --rules delivery.yaml --config pipeline.yaml \\
      --workspace /deliveries --output /library
  texnorm run --rules delivery.yaml --config pipeline.yaml \\
      --workspace /deliveries --output /library --overwrite -j 8
  texnorm check --rules delivery.yaml --config pipeline.yaml
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Process rule files through the pipeline
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Parse and validate rules and configuration without processing
    #[command(visible_alias = "c")]
    Check(CheckArgs),
}

/// Arguments for the `run` command.
#[derive(Args)]
struct RunArgs {
    /// Rule file(s), each holding one or more source rules
    #[arg(short, long, required = true)]
    rules: Vec<PathBuf>,

    /// Pipeline configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Workspace directory relative input paths resolve against
    #[arg(short, long)]
    workspace: PathBuf,

    /// Output base directory
    #[arg(short, long)]
    output: PathBuf,

    /// Overwrite already-processed assets
    #[arg(long)]
    overwrite: bool,

    /// Extra naming tokens as name=value pairs
    #[arg(short = 't', long = "token")]
    tokens: Vec<String>,
}

/// Arguments for the `check` command.
#[derive(Args)]
struct CheckArgs {
    /// Rule file(s) to validate
    #[arg(short, long, required = true)]
    rules: Vec<PathBuf>,

    /// Pipeline configuration file
    #[arg(short, long)]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.verbose),
        Commands::Check(args) => commands::check::run(args, cli.verbose),
    }
}
