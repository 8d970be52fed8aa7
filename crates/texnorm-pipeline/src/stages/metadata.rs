//! Asset metadata: initialization and the finalization sidecar.
//!
//! Initialization seeds the per-asset metadata map before any other stage
//! runs. Finalization derives the asset status string, attaches the per-map
//! variant table and writes a `<asset>.texnorm.yaml` sidecar next to the
//! organized outputs.

use crate::context::{AssetContext, AssetStatus, SavedVariant};
use crate::error::{PipelineError, PipelineResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Seeds the asset metadata map.
pub fn initialize_metadata(ctx: &mut AssetContext<'_>) {
    ctx.metadata
        .insert("asset_name".into(), ctx.asset_rule.asset_name.clone());
    ctx.metadata.insert(
        "source_input_path".into(),
        ctx.source_rule.input_path.display().to_string(),
    );
    let started = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default();
    ctx.metadata.insert("started_at_unix".into(), started);
}

/// Per-map entry in the sidecar.
#[derive(Debug, Serialize)]
struct MapRecord {
    status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notes: Vec<String>,
    variants: Vec<SavedVariant>,
}

/// Serialized sidecar document.
#[derive(Debug, Serialize)]
struct AssetSidecar<'a> {
    asset_name: &'a str,
    supplier: Option<&'a str>,
    status: &'a str,
    metadata: &'a BTreeMap<String, String>,
    maps: BTreeMap<String, MapRecord>,
}

/// Writes the metadata sidecar into the organized output directory.
///
/// # Errors
///
/// Returns [`PipelineError::SaveFailed`] when serialization or the write
/// itself fails.
pub fn finalize_metadata(
    ctx: &AssetContext<'_>,
    status: &AssetStatus,
    output_dir: &Path,
) -> PipelineResult<PathBuf> {
    let status_label = match status {
        AssetStatus::Processed => "Processed",
        AssetStatus::Skipped(_) => "Skipped",
        AssetStatus::Failed(_) => "Failed",
    };

    let maps = ctx
        .results
        .iter()
        .map(|(key, result)| {
            (
                key.clone(),
                MapRecord {
                    status: result.status.label().to_string(),
                    notes: result.notes.clone(),
                    variants: result.saved.clone(),
                },
            )
        })
        .collect();

    let sidecar = AssetSidecar {
        asset_name: &ctx.asset_rule.asset_name,
        supplier: ctx.supplier.as_deref(),
        status: status_label,
        metadata: &ctx.metadata,
        maps,
    };

    let body = serde_yaml::to_string(&sidecar)
        .map_err(|e| PipelineError::SaveFailed(format!("sidecar serialization: {}", e)))?;

    let path = output_dir.join(format!("{}.texnorm.yaml", ctx.asset_rule.asset_name));
    std::fs::create_dir_all(output_dir)
        .map_err(|e| PipelineError::SaveFailed(format!("create {}: {}", output_dir.display(), e)))?;
    std::fs::write(&path, body)
        .map_err(|e| PipelineError::SaveFailed(format!("write {}: {}", path.display(), e)))?;

    debug!(path = %path.display(), "wrote metadata sidecar");
    Ok(path)
}
