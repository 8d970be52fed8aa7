//! Per-source-rule orchestration.
//!
//! Sequences the stages for every asset of a source rule: pre-item stages
//! (metadata init, supplier, skip, filter), item preparation, the ordered
//! item loop with per-item error containment, and the post stages (output
//! organization, metadata finalization). Aggregates terminal statuses into
//! a [`RunSummary`].

use crate::config::PipelineConfig;
use crate::context::{
    AssetContext, AssetStatus, ItemResult, ItemStatus, LOWRES_KEY, MergeTask, ProcessingItem,
    RunTokens, WorkItem,
};
use crate::error::{PipelineError, PipelineResult};
use crate::rules::SourceRule;
use crate::stages::{filter, merge, metadata, organize, prepare, save, scale, skip, supplier, transform};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use tracing::{error, info, warn};

/// Aggregated outcome of one source-rule run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Assets that finished fully processed.
    pub processed: Vec<String>,
    /// Skipped assets with their reasons.
    pub skipped: Vec<(String, String)>,
    /// Failed assets with their reasons.
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    fn record(&mut self, asset_name: &str, status: AssetStatus) {
        match status {
            AssetStatus::Processed => self.processed.push(asset_name.to_string()),
            AssetStatus::Skipped(reason) => self.skipped.push((asset_name.to_string(), reason)),
            AssetStatus::Failed(reason) => self.failed.push((asset_name.to_string(), reason)),
        }
    }
}

/// Drives asset processing for whole source rules.
#[derive(Debug)]
pub struct Orchestrator {
    config: PipelineConfig,
}

impl Orchestrator {
    /// Creates an orchestrator over a resolved configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration this orchestrator runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes every asset of one source rule.
    ///
    /// A single temporary directory backs the whole call and is removed on
    /// every exit path. Cancellation is checked between assets and between
    /// items; already-finished assets keep their status.
    pub fn process_source_rule(
        &self,
        source_rule: &SourceRule,
        workspace: &Path,
        output_base: &Path,
        overwrite: bool,
        run_tokens: &RunTokens,
        cancel: &AtomicBool,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        let temp = match TempDir::with_prefix(&self.config.temp_dir_prefix) {
            Ok(temp) => temp,
            Err(e) => {
                error!(error = %e, "cannot create run temp directory");
                for asset in &source_rule.assets {
                    summary.record(
                        &asset.asset_name,
                        AssetStatus::Failed(format!("temp directory unavailable: {}", e)),
                    );
                }
                return summary;
            }
        };

        let overwrite = overwrite || self.config.overwrite_existing;
        for asset_rule in &source_rule.assets {
            if cancel.load(Ordering::Relaxed) {
                summary.record(
                    &asset_rule.asset_name,
                    AssetStatus::Skipped("run cancelled".to_string()),
                );
                continue;
            }

            let asset_temp = temp.path().join(&asset_rule.asset_name);
            let status = match std::fs::create_dir_all(&asset_temp) {
                Ok(()) => {
                    let mut ctx = AssetContext::new(
                        source_rule,
                        asset_rule,
                        workspace.to_path_buf(),
                        asset_temp,
                        output_base.to_path_buf(),
                        overwrite,
                    );
                    self.process_asset(&mut ctx, run_tokens, cancel)
                }
                Err(e) => AssetStatus::Failed(format!("asset temp directory: {}", e)),
            };

            match &status {
                AssetStatus::Processed => {
                    info!(asset = %asset_rule.asset_name, "asset processed")
                }
                AssetStatus::Skipped(reason) => {
                    info!(asset = %asset_rule.asset_name, reason, "asset skipped")
                }
                AssetStatus::Failed(reason) => {
                    error!(asset = %asset_rule.asset_name, reason, "asset failed")
                }
            }
            summary.record(&asset_rule.asset_name, status);
        }

        summary
    }

    /// Runs the full stage sequence for one asset and derives its status.
    fn process_asset(
        &self,
        ctx: &mut AssetContext<'_>,
        run_tokens: &RunTokens,
        cancel: &AtomicBool,
    ) -> AssetStatus {
        metadata::initialize_metadata(ctx);

        match supplier::determine_supplier(ctx.source_rule, &self.config) {
            Ok(name) => ctx.supplier = Some(name),
            Err(e) => warn!(asset = %ctx.asset_rule.asset_name, error = %e, "supplier unresolved"),
        }

        skip::evaluate_skip(ctx);
        if ctx.flags.skipped {
            return ctx.final_status();
        }

        ctx.filtered_files = filter::filter_files(&ctx.asset_rule.files);

        if let Err(e) = prepare::prepare_items(ctx, &self.config) {
            ctx.flags.mark_failed(e.to_string());
            return ctx.final_status();
        }

        let items = ctx.work_items.clone();
        for item in &items {
            if cancel.load(Ordering::Relaxed) {
                ctx.flags.mark_skipped("run cancelled");
                break;
            }
            let key = item.key();
            let result = match self.process_work_item(item, ctx, run_tokens) {
                Ok(result) => result,
                Err(e) => {
                    warn!(item = %key, error = %e, "item failed");
                    ItemResult {
                        status: ItemStatus::Failed(e.to_string()),
                        map_type: match item {
                            WorkItem::Map(i) => i.map_type.clone(),
                            WorkItem::Merge(t) => t.output_map_type.clone(),
                        },
                        ..Default::default()
                    }
                }
            };
            ctx.record_result(key, result);
        }

        let mut status = ctx.final_status();
        if matches!(status, AssetStatus::Processed) {
            match organize::organize_outputs(ctx, &self.config, run_tokens) {
                Ok(final_dir) => {
                    ctx.metadata.insert(
                        "output_directory".to_string(),
                        final_dir.display().to_string(),
                    );
                    if let Err(e) = metadata::finalize_metadata(ctx, &status, &final_dir) {
                        warn!(error = %e, "metadata sidecar not written");
                    }
                }
                Err(e) => {
                    ctx.flags.mark_failed(e.to_string());
                    status = ctx.final_status();
                }
            }
        }
        status
    }

    /// Processes one work item through its stage chain.
    fn process_work_item(
        &self,
        item: &WorkItem,
        ctx: &AssetContext<'_>,
        run_tokens: &RunTokens,
    ) -> PipelineResult<ItemResult> {
        match item {
            WorkItem::Map(item) => self.process_map_item(item, ctx, run_tokens),
            WorkItem::Merge(task) => self.process_merge_item(task, ctx, run_tokens),
        }
    }

    fn process_map_item(
        &self,
        item: &ProcessingItem,
        ctx: &AssetContext<'_>,
        run_tokens: &RunTokens,
    ) -> PipelineResult<ItemResult> {
        let (image, map_type, notes) =
            transform::apply_common_transforms(item.image.clone(), &item.map_type, &self.config)?;
        let scaled = scale::apply_initial_scaling(image, &item.resolution_key, &self.config)?;

        let resolutions: Vec<(String, u32)> = if item.resolution_key == LOWRES_KEY {
            vec![(LOWRES_KEY.to_string(), scaled.image.longest_edge())]
        } else {
            let edge = self
                .config
                .resolutions
                .get(&item.resolution_key)
                .copied()
                .ok_or_else(|| {
                    PipelineError::ConfigurationIncomplete(format!(
                        "resolution key '{}' not in resolution table",
                        item.resolution_key
                    ))
                })?;
            vec![(item.resolution_key.clone(), edge)]
        };

        self.save_item(
            &scaled.image,
            &map_type,
            &[item.bit_depth.unwrap_or(8)],
            &resolutions,
            notes,
            ctx,
            run_tokens,
        )
    }

    fn process_merge_item(
        &self,
        task: &MergeTask,
        ctx: &AssetContext<'_>,
        run_tokens: &RunTokens,
    ) -> PipelineResult<ItemResult> {
        let merged = merge::process_merge_task(task, &ctx.results, &self.config)?;
        let scaled = scale::apply_initial_scaling(merged.image, &task.key, &self.config)?;

        let resolutions: Vec<(String, u32)> = self
            .config
            .resolutions
            .iter()
            .map(|(key, &edge)| (key.clone(), edge))
            .collect();

        self.save_item(
            &scaled.image,
            &merged.map_type,
            &merged.source_bit_depths,
            &resolutions,
            merged.notes,
            ctx,
            run_tokens,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn save_item(
        &self,
        image: &texnorm_core::ImageBuf,
        map_type: &str,
        source_bit_depths: &[u8],
        resolutions: &[(String, u32)],
        notes: Vec<String>,
        ctx: &AssetContext<'_>,
        run_tokens: &RunTokens,
    ) -> PipelineResult<ItemResult> {
        let supplier = ctx.supplier.clone().unwrap_or_default();
        let output = save::save_variants(
            &save::SaveRequest {
                image,
                map_type,
                source_bit_depths,
                resolutions,
                asset_name: &ctx.asset_rule.asset_name,
                supplier: &supplier,
                out_dir: &ctx.temp_dir,
            },
            &self.config,
            run_tokens,
        )?;

        let status = if output.saved.is_empty() {
            ItemStatus::ProcessedNoOutput
        } else {
            ItemStatus::Processed
        };
        Ok(ItemResult {
            status,
            map_type: map_type.to_string(),
            notes,
            saved: output.saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{AssetRule, FileRule};
    use std::collections::BTreeMap;
    use texnorm_core::ImageBuf;
    use texnorm_io::EncodeOptions;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, channels: u32, value: u8) {
        let image = ImageBuf::from_u8(w, h, channels, vec![value; (w * h * channels) as usize])
            .unwrap();
        texnorm_io::write(dir.join(name), &image, &EncodeOptions::default()).unwrap();
    }

    fn rule(path: &str, item_type: &str) -> FileRule {
        FileRule {
            file_path: path.into(),
            item_type: item_type.into(),
            item_type_override: None,
            resolution_override: None,
        }
    }

    fn source_with(input: &Path, assets: Vec<AssetRule>) -> SourceRule {
        SourceRule {
            supplier_identifier: Some("acme".into()),
            supplier_override: None,
            input_path: input.to_path_buf(),
            preset_name: None,
            assets,
        }
    }

    fn asset(name: &str, files: Vec<FileRule>) -> AssetRule {
        AssetRule {
            asset_name: name.into(),
            common_metadata: BTreeMap::new(),
            files,
        }
    }

    fn config_64_32() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.resolutions.insert("64".into(), 64);
        config.resolutions.insert("32".into(), 32);
        config.output_filename_pattern = "[assetname]_[maptype]_[resolution].[ext]".into();
        config
    }

    #[test]
    fn test_end_to_end_single_color_asset() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png(input.path(), "col.png", 64, 64, 3, 120);

        let source = source_with(
            input.path(),
            vec![asset("rock", vec![rule("col.png", "MAP_COL")])],
        );
        let orchestrator = Orchestrator::new(config_64_32());
        let summary = orchestrator.process_source_rule(
            &source,
            input.path(),
            out.path(),
            false,
            &RunTokens::default(),
            &AtomicBool::new(false),
        );

        assert_eq!(summary.processed, vec!["rock"]);
        assert!(summary.failed.is_empty());

        let dir = out.path().join("rock");
        assert!(dir.join("rock_col_64.png").is_file());
        assert!(dir.join("rock_col_32.png").is_file());
        assert!(dir.join("rock.texnorm.yaml").is_file());

        let full = texnorm_io::read(dir.join("rock_col_64.png")).unwrap();
        assert_eq!(full.dimensions(), (64, 64));
        let half = texnorm_io::read(dir.join("rock_col_32.png")).unwrap();
        assert_eq!(half.dimensions(), (32, 32));
    }

    #[test]
    fn test_asset_without_items_is_skipped() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let source = source_with(input.path(), vec![asset("empty", Vec::new())]);
        let orchestrator = Orchestrator::new(config_64_32());
        let summary = orchestrator.process_source_rule(
            &source,
            input.path(),
            out.path(),
            false,
            &RunTokens::default(),
            &AtomicBool::new(false),
        );
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].0, "empty");
        // No output directory or sidecar for an asset that produced nothing.
        assert!(!out.path().join("empty").exists());
    }

    #[test]
    fn test_missing_file_fails_only_that_asset() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png(input.path(), "ok.png", 32, 32, 3, 10);

        let source = source_with(
            input.path(),
            vec![
                asset("broken", vec![rule("missing.png", "MAP_COL")]),
                asset("fine", vec![rule("ok.png", "MAP_COL")]),
            ],
        );
        let orchestrator = Orchestrator::new(config_64_32());
        let summary = orchestrator.process_source_rule(
            &source,
            input.path(),
            out.path(),
            false,
            &RunTokens::default(),
            &AtomicBool::new(false),
        );

        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "broken");
        assert_eq!(summary.processed, vec!["fine"]);
    }

    #[test]
    fn test_cancellation_skips_remaining_assets() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let source = source_with(
            input.path(),
            vec![asset("a", Vec::new()), asset("b", Vec::new())],
        );
        let orchestrator = Orchestrator::new(config_64_32());
        let summary = orchestrator.process_source_rule(
            &source,
            input.path(),
            out.path(),
            false,
            &RunTokens::default(),
            &AtomicBool::new(true),
        );
        assert_eq!(summary.skipped.len(), 2);
        assert!(summary.skipped.iter().all(|(_, r)| r == "run cancelled"));
    }

    #[test]
    fn test_merge_failure_does_not_fail_sibling_items() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png(input.path(), "col.png", 32, 32, 3, 90);

        let mut config = config_64_32();
        // No MAP_AO output will exist and no fallback is declared.
        config.merge_rules.push(crate::config::MergeRule {
            output_map_type: "MAP_PACKED".into(),
            inputs: [('R', "MAP_AO".to_string())].into_iter().collect(),
            defaults: BTreeMap::new(),
            channel_order: "R".into(),
            target_dimensions: None,
        });

        let source = source_with(
            input.path(),
            vec![asset("rock", vec![rule("col.png", "MAP_COL")])],
        );
        let orchestrator = Orchestrator::new(config);
        let summary = orchestrator.process_source_rule(
            &source,
            input.path(),
            out.path(),
            false,
            &RunTokens::default(),
            &AtomicBool::new(false),
        );

        // The asset fails overall but the color variant was still written.
        assert_eq!(summary.failed.len(), 1);
        let reason = &summary.failed[0].1;
        assert!(reason.contains("MERGE_MAP_PACKED") || reason.contains("MAP_AO"));
    }
}
