//! Channel-pack merge processing.
//!
//! Builds one composite output from previously saved map outputs and
//! constant fallbacks. Each output channel is declared in the task's
//! channel order and sourced either from a saved input's first plane or a
//! synthesized constant plane.

use crate::config::{MismatchPolicy, PipelineConfig};
use crate::context::{ItemResult, MergeTask};
use crate::error::{PipelineError, PipelineResult};
use crate::rules::MAP_PREFIX;
use crate::stages::transform;
use std::collections::BTreeMap;
use texnorm_core::{ImageBuf, PixelFormat};
use texnorm_ops::channel;
use texnorm_ops::resize::{self, Filter};
use tracing::{debug, warn};

/// Result of one merge task.
#[derive(Debug)]
pub struct MergeOutput {
    /// Packed composite buffer, always 8-bit.
    pub image: ImageBuf,
    /// Output map type from the task definition.
    pub map_type: String,
    /// Accumulated transform and sourcing notes.
    pub notes: Vec<String>,
    /// Bit depths of every input that fed the composite.
    pub source_bit_depths: Vec<u8>,
}

enum ChannelSource {
    Loaded(ImageBuf),
    Fallback(f32),
}

/// Finds the saved result for a required input type.
///
/// Exact map-type match wins; otherwise the base type's primary suffixed
/// variant (`-1`). Only successfully processed results with at least one
/// saved variant qualify.
fn find_input<'a>(
    results: &'a BTreeMap<String, ItemResult>,
    required: &str,
) -> Option<&'a ItemResult> {
    let usable = |r: &&ItemResult| r.status.is_processed() && !r.saved.is_empty();
    results
        .values()
        .filter(usable)
        .find(|r| r.map_type == required)
        .or_else(|| {
            let primary = format!("{}-1", required);
            results.values().filter(usable).find(|r| r.map_type == primary)
        })
}

/// Processes one merge task against the asset's saved results.
///
/// # Errors
///
/// Fails on a non-map input type, a channel with neither a saved input nor
/// a fallback, a fallback without declared target dimensions, or a
/// dimension mismatch under the `ERROR_SKIP` policy.
pub fn process_merge_task(
    task: &MergeTask,
    results: &BTreeMap<String, ItemResult>,
    config: &PipelineConfig,
) -> PipelineResult<MergeOutput> {
    let mut notes = Vec::new();
    let mut source_bit_depths = Vec::new();
    let mut sources: Vec<ChannelSource> = Vec::new();

    for letter in task.channel_order.chars() {
        let required = task.inputs.get(&letter);
        match required {
            Some(required) => {
                if !required.starts_with(MAP_PREFIX) {
                    return Err(PipelineError::ConfigurationIncomplete(format!(
                        "merge input '{}' for channel '{}' is not a map type",
                        required, letter
                    )));
                }
                match find_input(results, required) {
                    Some(result) => {
                        let variant = &result.saved[0];
                        let image = texnorm_io::read(&variant.path)?;
                        let (image, _, mut transform_notes) =
                            transform::apply_common_transforms(image, required, config)?;
                        notes.append(&mut transform_notes);
                        source_bit_depths.push(variant.bit_depth);
                        let plane = if image.channels() > 1 {
                            channel::extract_channel(&image, 0)?
                        } else {
                            image
                        };
                        debug!(channel = %letter, input = %required, "merge input loaded");
                        sources.push(ChannelSource::Loaded(plane));
                    }
                    None => match task.defaults.get(&letter) {
                        Some(&value) => {
                            notes.push(format!(
                                "channel '{}': input '{}' unavailable, using fallback {}",
                                letter, required, value
                            ));
                            source_bit_depths.push(8);
                            sources.push(ChannelSource::Fallback(value));
                        }
                        None => {
                            return Err(PipelineError::SourceUnavailable(format!(
                                "merge input '{}' for channel '{}' has no saved output and no fallback",
                                required, letter
                            )));
                        }
                    },
                }
            }
            None => match task.defaults.get(&letter) {
                Some(&value) => {
                    source_bit_depths.push(8);
                    sources.push(ChannelSource::Fallback(value));
                }
                None => {
                    return Err(PipelineError::ConfigurationIncomplete(format!(
                        "merge channel '{}' declares neither an input nor a fallback",
                        letter
                    )));
                }
            },
        }
    }

    let target = resolve_target_dimensions(task, &sources, config)?;

    let planes: Vec<ImageBuf> = sources
        .into_iter()
        .map(|source| match source {
            ChannelSource::Loaded(plane) => {
                if plane.dimensions() == target {
                    Ok(plane)
                } else {
                    warn!(
                        from = ?plane.dimensions(),
                        to = ?target,
                        "resizing mismatched merge input"
                    );
                    Ok(resize::resize(&plane, target.0, target.1, Filter::Area)?)
                }
            }
            ChannelSource::Fallback(value) => {
                Ok(ImageBuf::filled(target.0, target.1, 1, PixelFormat::U8, value))
            }
        })
        .collect::<PipelineResult<_>>()?;

    let image = if planes.len() == 1 {
        planes
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::SaveFailed("merge plane absent at pack time".into()))?
    } else {
        channel::pack_channels(&planes)?
    };
    let image = image.convert(PixelFormat::U8);

    Ok(MergeOutput {
        image,
        map_type: task.output_map_type.clone(),
        notes,
        source_bit_depths,
    })
}

/// Picks the composite's pixel dimensions per the mismatch policy.
fn resolve_target_dimensions(
    task: &MergeTask,
    sources: &[ChannelSource],
    config: &PipelineConfig,
) -> PipelineResult<(u32, u32)> {
    let loaded: Vec<(u32, u32)> = sources
        .iter()
        .filter_map(|s| match s {
            ChannelSource::Loaded(plane) => Some(plane.dimensions()),
            ChannelSource::Fallback(_) => None,
        })
        .collect();

    if loaded.is_empty() {
        return task.target_dimensions.ok_or_else(|| {
            PipelineError::ConfigurationIncomplete(format!(
                "merge '{}' uses only fallbacks but declares no target dimensions",
                task.output_map_type
            ))
        });
    }

    let mismatched = loaded.windows(2).any(|w| w[0] != w[1]);
    if mismatched && config.dimension_mismatch == MismatchPolicy::ErrorSkip {
        return Err(PipelineError::DimensionMismatch(format!(
            "merge '{}' inputs disagree in dimensions: {:?}",
            task.output_map_type, loaded
        )));
    }

    Ok(match config.dimension_mismatch {
        MismatchPolicy::ErrorSkip | MismatchPolicy::UseFirst => loaded[0],
        MismatchPolicy::UseLargest => loaded.iter().fold((0, 0), |acc, &(w, h)| {
            (acc.0.max(w), acc.1.max(h))
        }),
    })
}
