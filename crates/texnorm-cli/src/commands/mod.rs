//! CLI command implementations

pub mod check;
pub mod run;

use anyhow::{Context, Result};
use std::path::Path;
use texnorm_pipeline::{PipelineConfig, SourceRule};

/// Loads the pipeline configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Loads the source rules from a YAML file.
///
/// The document may hold a single source rule or a list of them.
pub fn load_rules(path: &Path) -> Result<Vec<SourceRule>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules: {}", path.display()))?;
    if let Ok(rules) = serde_yaml::from_str::<Vec<SourceRule>>(&text) {
        return Ok(rules);
    }
    let single: SourceRule = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse rules: {}", path.display()))?;
    Ok(vec![single])
}
