//! Pipeline run command.
//!
//! Loads configuration and rule files, processes source rules in parallel
//! and prints the aggregated summary. Exits non-zero when any asset failed.

use crate::RunArgs;
use anyhow::{Result, bail};
use rayon::prelude::*;
use std::sync::atomic::AtomicBool;
use texnorm_pipeline::{Orchestrator, RunSummary, RunTokens};
use tracing::info;

/// Runs the run command.
pub fn run(args: RunArgs, verbose: u8) -> Result<()> {
    let config = super::load_config(&args.config)?;
    let orchestrator = Orchestrator::new(config);

    let mut run_tokens = RunTokens::default();
    for pair in &args.tokens {
        match pair.split_once('=') {
            Some((name, value)) => {
                run_tokens
                    .values
                    .insert(name.to_string(), value.to_string());
            }
            None => bail!("Invalid token '{}', expected name=value", pair),
        }
    }

    let mut sources = Vec::new();
    for path in &args.rules {
        sources.extend(super::load_rules(path)?);
    }
    info!(sources = sources.len(), "starting pipeline run");

    let cancel = AtomicBool::new(false);
    let summaries: Vec<RunSummary> = sources
        .par_iter()
        .map(|source| {
            orchestrator.process_source_rule(
                source,
                &args.workspace,
                &args.output,
                args.overwrite,
                &run_tokens,
                &cancel,
            )
        })
        .collect();

    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for summary in &summaries {
        processed += summary.processed.len();
        skipped += summary.skipped.len();
        failed += summary.failed.len();

        if verbose > 0 {
            for name in &summary.processed {
                println!("processed  {}", name);
            }
            for (name, reason) in &summary.skipped {
                println!("skipped    {} ({})", name, reason);
            }
        }
        for (name, reason) in &summary.failed {
            eprintln!("failed     {} ({})", name, reason);
        }
    }

    println!(
        "{} processed, {} skipped, {} failed",
        processed, skipped, failed
    );
    if failed > 0 {
        bail!("{} asset(s) failed", failed);
    }
    Ok(())
}
