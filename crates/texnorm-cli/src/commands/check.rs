//! Rule and configuration validation command.
//!
//! Parses the inputs and reports obvious problems (unknown suppliers,
//! merge rules without inputs, empty resolution tables) without touching
//! any image file.

use crate::CheckArgs;
use anyhow::{Result, bail};
use texnorm_pipeline::PipelineConfig;
use texnorm_pipeline::rules::SourceRule;

/// Runs the check command.
pub fn run(args: CheckArgs, verbose: u8) -> Result<()> {
    let config = super::load_config(&args.config)?;
    let mut problems = Vec::new();
    check_config(&config, &mut problems);

    let mut asset_count = 0usize;
    for path in &args.rules {
        let sources = super::load_rules(path)?;
        for source in &sources {
            check_source(source, &config, &mut problems);
            asset_count += source.assets.len();
        }
        if verbose > 0 {
            println!("{}: {} source rule(s)", path.display(), sources.len());
        }
    }

    if problems.is_empty() {
        println!("ok: {} asset(s) across {} rule file(s)", asset_count, args.rules.len());
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("problem: {}", problem);
        }
        bail!("{} problem(s) found", problems.len());
    }
}

fn check_config(config: &PipelineConfig, problems: &mut Vec<String>) {
    if config.resolutions.is_empty() {
        problems.push("configuration has an empty resolution table".to_string());
    }
    let mut seen_outputs = std::collections::BTreeSet::new();
    for rule in &config.merge_rules {
        if rule.output_map_type.is_empty() || rule.inputs.is_empty() {
            problems.push(format!(
                "merge rule '{}' lacks an output type or inputs",
                rule.output_map_type
            ));
        }
        if rule.channel_order.is_empty() {
            problems.push(format!(
                "merge rule '{}' has an empty channel order",
                rule.output_map_type
            ));
        }
        if !rule.output_map_type.is_empty() && !seen_outputs.insert(rule.output_map_type.as_str()) {
            problems.push(format!(
                "duplicate merge rule for output type '{}'",
                rule.output_map_type
            ));
        }
    }
}

fn check_source(source: &SourceRule, config: &PipelineConfig, problems: &mut Vec<String>) {
    let supplier = source
        .supplier_override
        .as_deref()
        .or(source.supplier_identifier.as_deref());
    match supplier {
        None => problems.push(format!(
            "source '{}' has no supplier override or identifier",
            source.input_path.display()
        )),
        Some(name) => {
            if !config.suppliers.is_empty() && !config.suppliers.contains_key(name) {
                problems.push(format!("supplier '{}' not in configured registry", name));
            }
        }
    }

    for asset in &source.assets {
        if asset.asset_name.is_empty() {
            problems.push(format!(
                "source '{}' contains an asset with an empty name",
                source.input_path.display()
            ));
        }
        for file in &asset.files {
            if file.file_path.is_empty() {
                problems.push(format!(
                    "asset '{}' contains a file rule with an empty path",
                    asset.asset_name
                ));
            }
        }
    }
}
