//! Item preparation.
//!
//! Explodes the asset's filtered file rules into concrete work items: one
//! [`ProcessingItem`] per map-type and eligible target resolution, an
//! optional `LOWRES` fallback for undersized sources, derived alpha masks,
//! and one [`MergeTask`] per well-formed configured merge rule.

use crate::config::PipelineConfig;
use crate::context::{AssetContext, LOWRES_KEY, MergeTask, ProcessingItem, WorkItem};
use crate::error::{PipelineError, PipelineResult};
use crate::rules::{COLOR_LIKE_TYPES, MAP_MASK, base_map_type};
use crate::stages::transform;
use std::collections::BTreeSet;
use std::path::PathBuf;
use texnorm_core::stats::{self, ChannelStats};
use texnorm_core::ImageBuf;
use tracing::{debug, warn};

/// Formats per-channel statistics for the metadata sidecar.
fn format_stats(stats: &ChannelStats) -> String {
    let fmt = |values: &[f32]| {
        values
            .iter()
            .map(|v| format!("{:.4}", v))
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        "min [{}] max [{}] mean [{}]",
        fmt(&stats.min),
        fmt(&stats.max),
        fmt(&stats.mean)
    )
}

/// Prepares all work items for one asset.
///
/// # Errors
///
/// Returns [`PipelineError::SourceUnavailable`] when the input location is
/// missing or any referenced source file is absent or unreadable. All
/// offending paths are collected before failing so the reason names every
/// problem at once.
pub fn prepare_items(
    ctx: &mut AssetContext<'_>,
    config: &PipelineConfig,
) -> PipelineResult<()> {
    let input_base = if ctx.source_rule.input_path.is_absolute() {
        ctx.source_rule.input_path.clone()
    } else {
        ctx.workspace.join(&ctx.source_rule.input_path)
    };
    if !input_base.is_dir() {
        return Err(PipelineError::SourceUnavailable(format!(
            "input location '{}' does not exist",
            input_base.display()
        )));
    }

    let suffixed = transform::resolve_instance_suffixes(
        &ctx.asset_rule.files,
        &config.respect_variant_map_types,
    );
    let kept: BTreeSet<&str> = ctx
        .filtered_files
        .iter()
        .map(|f| f.file_path.as_str())
        .collect();

    let has_explicit_mask = ctx
        .filtered_files
        .iter()
        .filter(|f| f.is_map())
        .any(|f| base_map_type(f.effective_type()) == MAP_MASK);

    let mut load_errors: Vec<String> = Vec::new();
    // First color-like source with an alpha channel, with its resolution keys.
    let mut mask_candidate: Option<(PathBuf, ImageBuf, Vec<String>)> = None;

    for (rule, map_type) in ctx.asset_rule.files.iter().zip(suffixed.iter()) {
        if !rule.is_map() || !kept.contains(rule.file_path.as_str()) {
            continue;
        }

        let source_path = input_base.join(&rule.file_path);
        if !source_path.is_file() {
            load_errors.push(format!("missing file '{}'", source_path.display()));
            continue;
        }
        let image = match texnorm_io::read(&source_path) {
            Ok(image) => image,
            Err(e) => {
                load_errors.push(format!("unreadable '{}': {}", source_path.display(), e));
                continue;
            }
        };

        let dimensions = image.dimensions();
        let longest = image.longest_edge();
        let bit_depth = image.format().bit_depth();
        let channels = image.channels();
        debug!(
            path = %source_path.display(),
            map_type = %map_type,
            width = dimensions.0,
            height = dimensions.1,
            bit_depth,
            "loaded source"
        );
        ctx.metadata.insert(
            format!("source_stats_{}", map_type),
            format_stats(&stats::channel_stats(&image)),
        );

        if let Some((w, h)) = rule.resolution_override {
            warn!(
                path = %rule.file_path,
                width = w,
                height = h,
                "resolution override set, skipping resolution explosion"
            );
            continue;
        }

        let mut keys: Vec<String> = config
            .resolutions
            .iter()
            .filter(|&(_, &edge)| edge <= longest)
            .map(|(key, _)| key.clone())
            .collect();

        let lowres_duplicate = config
            .resolutions
            .iter()
            .any(|(key, &edge)| edge == longest && keys.contains(key));
        if config.enable_low_resolution_fallback
            && longest < config.low_resolution_threshold
            && !lowres_duplicate
        {
            keys.push(LOWRES_KEY.to_string());
        }

        if mask_candidate.is_none()
            && COLOR_LIKE_TYPES.contains(&base_map_type(map_type))
            && matches!(image.channels(), 2 | 4)
        {
            mask_candidate = Some((source_path.clone(), image.clone(), keys.clone()));
        }

        for key in keys {
            ctx.work_items.push(WorkItem::Map(ProcessingItem {
                source_path: source_path.clone(),
                map_type: map_type.clone(),
                resolution_key: key,
                image: image.clone(),
                original_dimensions: dimensions,
                current_dimensions: dimensions,
                bit_depth: Some(bit_depth),
                channels,
            }));
        }
    }

    if !has_explicit_mask {
        if let Some((source_path, color_image, keys)) = mask_candidate {
            if let Some(mask) = transform::extract_alpha_mask(&color_image)? {
                let dimensions = mask.dimensions();
                let bit_depth = mask.format().bit_depth();
                debug!(source = %source_path.display(), "derived alpha mask item");
                for key in keys {
                    ctx.work_items.push(WorkItem::Map(ProcessingItem {
                        source_path: source_path.clone(),
                        map_type: MAP_MASK.to_string(),
                        resolution_key: key,
                        image: mask.clone(),
                        original_dimensions: dimensions,
                        current_dimensions: dimensions,
                        bit_depth: Some(bit_depth),
                        channels: 1,
                    }));
                }
            }
        }
    }

    let mut merge_keys = BTreeSet::new();
    for merge_rule in &config.merge_rules {
        if merge_rule.output_map_type.is_empty() || merge_rule.inputs.is_empty() {
            warn!(
                output = %merge_rule.output_map_type,
                "skipping malformed merge rule (missing output type or inputs)"
            );
            continue;
        }
        if !merge_keys.insert(merge_rule.output_map_type.as_str()) {
            warn!(
                output = %merge_rule.output_map_type,
                "skipping duplicate merge rule for output type"
            );
            continue;
        }
        ctx.work_items.push(WorkItem::Merge(MergeTask {
            key: format!("MERGE_{}", merge_rule.output_map_type),
            output_map_type: merge_rule.output_map_type.clone(),
            inputs: merge_rule.inputs.clone(),
            defaults: merge_rule.defaults.clone(),
            channel_order: merge_rule.channel_order.clone(),
            target_dimensions: merge_rule.target_dimensions,
        }));
    }

    if !load_errors.is_empty() {
        return Err(PipelineError::SourceUnavailable(load_errors.join("; ")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{AssetRule, FileRule, SourceRule};
    use crate::stages::filter;
    use std::collections::BTreeMap;
    use texnorm_io::EncodeOptions;

    fn write_png(dir: &std::path::Path, name: &str, w: u32, h: u32, channels: u32) {
        let image = ImageBuf::new(w, h, channels, texnorm_core::PixelFormat::U8);
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

    fn source(input: &std::path::Path, files: Vec<FileRule>) -> (SourceRule, AssetRule) {
        let asset = AssetRule {
            asset_name: "rock".into(),
            common_metadata: BTreeMap::new(),
            files,
        };
        let source = SourceRule {
            supplier_identifier: Some("acme".into()),
            supplier_override: None,
            input_path: input.to_path_buf(),
            preset_name: None,
            assets: vec![asset.clone()],
        };
        (source, asset)
    }

    fn config_2k_1k() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.resolutions.insert("2K".into(), 2048);
        config.resolutions.insert("1K".into(), 1024);
        config
    }

    fn prepare<'a>(
        source: &'a SourceRule,
        asset: &'a AssetRule,
        config: &PipelineConfig,
        dir: &std::path::Path,
    ) -> (AssetContext<'a>, PipelineResult<()>) {
        let mut ctx = AssetContext::new(
            source,
            asset,
            dir.to_path_buf(),
            dir.join("tmp"),
            dir.join("out"),
            false,
        );
        ctx.filtered_files = filter::filter_files(&asset.files);
        let outcome = prepare_items(&mut ctx, config);
        (ctx, outcome)
    }

    #[test]
    fn test_explodes_per_eligible_resolution() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "col.png", 1500, 1500, 3);
        let (source, asset) = source(dir.path(), vec![rule("col.png", "MAP_COL")]);
        let config = config_2k_1k();

        let (ctx, outcome) = prepare(&source, &asset, &config, dir.path());
        outcome.unwrap();
        // 2K (2048) exceeds the 1500px source and is excluded.
        assert_eq!(ctx.work_items.len(), 1);
        assert_eq!(ctx.work_items[0].key(), "MAP_COL_1K");
        assert!(ctx.metadata.contains_key("source_stats_MAP_COL"));
    }

    #[test]
    fn test_lowres_fallback_for_undersized_source() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "col.png", 500, 500, 3);
        let (source, asset) = source(dir.path(), vec![rule("col.png", "MAP_COL")]);
        let mut config = config_2k_1k();
        config.enable_low_resolution_fallback = true;
        config.low_resolution_threshold = 1024;

        let (ctx, outcome) = prepare(&source, &asset, &config, dir.path());
        outcome.unwrap();
        assert_eq!(ctx.work_items.len(), 1);
        assert_eq!(ctx.work_items[0].key(), "MAP_COL_LOWRES");
    }

    #[test]
    fn test_no_lowres_when_named_resolution_matches_source() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "col.png", 1024, 1024, 3);
        let (source, asset) = source(dir.path(), vec![rule("col.png", "MAP_COL")]);
        let mut config = config_2k_1k();
        config.enable_low_resolution_fallback = true;
        config.low_resolution_threshold = 2048;

        let (ctx, outcome) = prepare(&source, &asset, &config, dir.path());
        outcome.unwrap();
        // The 1K entry already covers the source edge exactly.
        assert_eq!(ctx.work_items.len(), 1);
        assert_eq!(ctx.work_items[0].key(), "MAP_COL_1K");
    }

    #[test]
    fn test_missing_file_is_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "ok.png", 1024, 1024, 3);
        let (source, asset) = source(
            dir.path(),
            vec![rule("ok.png", "MAP_COL"), rule("gone.png", "MAP_NORMAL")],
        );
        let config = config_2k_1k();

        let (_, outcome) = prepare(&source, &asset, &config, dir.path());
        match outcome {
            Err(PipelineError::SourceUnavailable(reason)) => {
                assert!(reason.contains("gone.png"));
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_rules_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "col.png", 1024, 1024, 3);
        let (source, asset) = source(
            dir.path(),
            vec![rule("col.png", "MAP_COL"), rule("notes.txt", "EXTRA")],
        );
        let config = config_2k_1k();

        let (ctx, outcome) = prepare(&source, &asset, &config, dir.path());
        outcome.unwrap();
        assert_eq!(ctx.work_items.len(), 1);
    }

    #[test]
    fn test_resolution_override_suppresses_explosion() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "col.png", 1024, 1024, 3);
        let mut file = rule("col.png", "MAP_COL");
        file.resolution_override = Some((256, 256));
        let (source, asset) = source(dir.path(), vec![file]);
        let config = config_2k_1k();

        let (ctx, outcome) = prepare(&source, &asset, &config, dir.path());
        outcome.unwrap();
        assert!(ctx.work_items.is_empty());
    }

    #[test]
    fn test_alpha_mask_derived_without_explicit_mask() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "col.png", 1024, 1024, 4);
        let (source, asset) = source(dir.path(), vec![rule("col.png", "MAP_COL")]);
        let config = config_2k_1k();

        let (ctx, outcome) = prepare(&source, &asset, &config, dir.path());
        outcome.unwrap();
        let keys: Vec<String> = ctx.work_items.iter().map(|i| i.key()).collect();
        assert!(keys.contains(&"MAP_COL_1K".to_string()));
        assert!(keys.contains(&"MAP_MASK_1K".to_string()));
    }

    #[test]
    fn test_merge_rules_become_tasks() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "col.png", 1024, 1024, 3);
        let (source, asset) = source(dir.path(), vec![rule("col.png", "MAP_COL")]);
        let mut config = config_2k_1k();
        config.merge_rules.push(crate::config::MergeRule {
            output_map_type: "MAP_PACKED".into(),
            inputs: [('R', "MAP_COL".to_string())].into_iter().collect(),
            defaults: BTreeMap::new(),
            channel_order: "RGB".into(),
            target_dimensions: None,
        });
        // Malformed rule: no inputs at all.
        config.merge_rules.push(crate::config::MergeRule {
            output_map_type: "MAP_EMPTY".into(),
            inputs: BTreeMap::new(),
            defaults: BTreeMap::new(),
            channel_order: "RGB".into(),
            target_dimensions: None,
        });

        let (ctx, outcome) = prepare(&source, &asset, &config, dir.path());
        outcome.unwrap();
        let merges: Vec<&WorkItem> = ctx
            .work_items
            .iter()
            .filter(|i| matches!(i, WorkItem::Merge(_)))
            .collect();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].key(), "MERGE_MAP_PACKED");
    }

    #[test]
    fn test_duplicate_merge_output_type_keeps_first_rule() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "col.png", 1024, 1024, 3);
        let (source, asset) = source(dir.path(), vec![rule("col.png", "MAP_COL")]);
        let mut config = config_2k_1k();
        for input in ["MAP_COL", "MAP_AO"] {
            config.merge_rules.push(crate::config::MergeRule {
                output_map_type: "MAP_PACKED".into(),
                inputs: [('R', input.to_string())].into_iter().collect(),
                defaults: BTreeMap::new(),
                channel_order: "R".into(),
                target_dimensions: None,
            });
        }

        let (ctx, outcome) = prepare(&source, &asset, &config, dir.path());
        outcome.unwrap();
        let merges: Vec<&MergeTask> = ctx
            .work_items
            .iter()
            .filter_map(|i| match i {
                WorkItem::Merge(task) => Some(task),
                WorkItem::Map(_) => None,
            })
            .collect();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].inputs[&'R'], "MAP_COL");
    }
}
