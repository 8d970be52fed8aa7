//! Output organization.
//!
//! Moves saved variants out of the per-asset scratch directory into their
//! final directory under the output base, derived from the configured
//! directory pattern. Variant paths in the result records are rewritten to
//! their final locations.

use crate::config::PipelineConfig;
use crate::context::{AssetContext, RunTokens};
use crate::error::{PipelineError, PipelineResult};
use crate::naming;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Moves every saved variant into the organized output directory.
///
/// Returns the final directory so metadata finalization can write its
/// sidecar next to the outputs.
///
/// # Errors
///
/// Returns [`PipelineError::SaveFailed`] when the directory cannot be
/// created or a variant cannot be moved.
pub fn organize_outputs(
    ctx: &mut AssetContext<'_>,
    config: &PipelineConfig,
    run_tokens: &RunTokens,
) -> PipelineResult<PathBuf> {
    let supplier = ctx.supplier.clone().unwrap_or_default();
    let dir_name = naming::substitute(
        &config.output_directory_pattern,
        &[
            ("assetname", &ctx.asset_rule.asset_name),
            ("supplier", &supplier),
        ],
        run_tokens,
    );
    let final_dir = ctx.output_base.join(dir_name);
    std::fs::create_dir_all(&final_dir).map_err(|e| {
        PipelineError::SaveFailed(format!("create {}: {}", final_dir.display(), e))
    })?;

    let overwrite = ctx.overwrite;
    for result in ctx.results.values_mut() {
        for variant in &mut result.saved {
            let file_name = variant.path.file_name().ok_or_else(|| {
                PipelineError::SaveFailed(format!(
                    "variant path '{}' has no file name",
                    variant.path.display()
                ))
            })?;
            let dest = final_dir.join(file_name);
            if dest.exists() && !overwrite {
                warn!(path = %dest.display(), "destination exists, keeping existing file");
                variant.path = dest;
                continue;
            }
            move_file(&variant.path, &dest)?;
            debug!(path = %dest.display(), "variant organized");
            variant.path = dest;
        }
    }

    Ok(final_dir)
}

/// Renames a file, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> PipelineResult<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(|e| {
        PipelineError::SaveFailed(format!(
            "copy {} -> {}: {}",
            from.display(),
            to.display(),
            e
        ))
    })?;
    if let Err(e) = std::fs::remove_file(from) {
        warn!(path = %from.display(), error = %e, "could not remove scratch file");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ItemResult, ItemStatus, SavedVariant};
    use crate::rules::{AssetRule, SourceRule};
    use std::collections::BTreeMap;

    fn fixtures() -> (SourceRule, AssetRule) {
        let asset = AssetRule {
            asset_name: "rock".into(),
            common_metadata: BTreeMap::new(),
            files: Vec::new(),
        };
        let source = SourceRule {
            supplier_identifier: Some("acme".into()),
            supplier_override: None,
            input_path: "/in".into(),
            preset_name: None,
            assets: Vec::new(),
        };
        (source, asset)
    }

    fn variant(path: PathBuf) -> SavedVariant {
        SavedVariant {
            path,
            resolution_key: "1K".into(),
            format: "png".into(),
            bit_depth: 8,
            dimensions: (4, 4),
        }
    }

    #[test]
    fn test_moves_variants_into_pattern_directory() {
        let (source, asset) = fixtures();
        let temp = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let scratch = temp.path().join("rock_col_1K.png");
        std::fs::write(&scratch, b"data").unwrap();

        let mut ctx = AssetContext::new(
            &source,
            &asset,
            "/ws".into(),
            temp.path().to_path_buf(),
            out.path().to_path_buf(),
            false,
        );
        ctx.supplier = Some("acme".into());
        ctx.record_result(
            "MAP_COL_1K".into(),
            ItemResult {
                status: ItemStatus::Processed,
                map_type: "MAP_COL".into(),
                notes: Vec::new(),
                saved: vec![variant(scratch.clone())],
            },
        );

        let config = PipelineConfig::default();
        let final_dir = organize_outputs(&mut ctx, &config, &RunTokens::default()).unwrap();

        assert_eq!(final_dir, out.path().join("rock"));
        let moved = final_dir.join("rock_col_1K.png");
        assert!(moved.is_file());
        assert!(!scratch.exists());
        assert_eq!(ctx.results["MAP_COL_1K"].saved[0].path, moved);
    }

    #[test]
    fn test_existing_destination_kept_without_overwrite() {
        let (source, asset) = fixtures();
        let temp = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let scratch = temp.path().join("rock_col_1K.png");
        std::fs::write(&scratch, b"new").unwrap();
        let existing_dir = out.path().join("rock");
        std::fs::create_dir_all(&existing_dir).unwrap();
        let existing = existing_dir.join("rock_col_1K.png");
        std::fs::write(&existing, b"old").unwrap();

        let mut ctx = AssetContext::new(
            &source,
            &asset,
            "/ws".into(),
            temp.path().to_path_buf(),
            out.path().to_path_buf(),
            false,
        );
        ctx.supplier = Some("acme".into());
        ctx.record_result(
            "MAP_COL_1K".into(),
            ItemResult {
                status: ItemStatus::Processed,
                map_type: "MAP_COL".into(),
                notes: Vec::new(),
                saved: vec![variant(scratch)],
            },
        );

        let config = PipelineConfig::default();
        organize_outputs(&mut ctx, &config, &RunTokens::default()).unwrap();
        assert_eq!(std::fs::read(&existing).unwrap(), b"old");
    }
}
