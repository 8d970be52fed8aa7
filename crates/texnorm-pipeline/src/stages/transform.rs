//! Map transforms for regular items.
//!
//! Resolves the final map-type identifier (instance suffixing) and applies
//! the per-type in-memory transforms: glossiness inversion with the
//! GLOSS→ROUGH rename, normal-map green-channel inversion, and alpha-mask
//! derivation from color-like sources.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::rules::{FileRule, MAP_GLOSS, MAP_NORMAL, MAP_PREFIX, base_map_type};
use texnorm_core::ImageBuf;
use texnorm_ops::channel;
use tracing::debug;

/// Resolves suffixed map-type identifiers for every file rule of an asset.
///
/// Multi-instance base types get `-1..-N` in file-rule order. A
/// single-instance type gets `-1` only when its unprefixed name is in the
/// respect list. Returns one identifier per input rule, index-aligned.
pub fn resolve_instance_suffixes(files: &[FileRule], respect: &[String]) -> Vec<String> {
    let mut seen: std::collections::BTreeMap<&str, u32> = std::collections::BTreeMap::new();
    let counts: std::collections::BTreeMap<&str, u32> =
        files.iter().fold(Default::default(), |mut acc, f| {
            *acc.entry(f.effective_type()).or_insert(0) += 1;
            acc
        });

    files
        .iter()
        .map(|file| {
            let base = file.effective_type();
            let instance = seen.entry(base).or_insert(0);
            *instance += 1;

            let total = counts.get(base).copied().unwrap_or(1);
            let unprefixed = base.strip_prefix(MAP_PREFIX).unwrap_or(base);
            if total > 1 || respect.iter().any(|r| r == unprefixed) {
                format!("{}-{}", base, instance)
            } else {
                base.to_string()
            }
        })
        .collect()
}

/// Applies the common per-type transforms to a buffer.
///
/// Returns the transformed buffer, the possibly-renamed map type and the
/// accumulated human-readable notes. The same function serves regular items
/// and merge inputs (spec'd per required input type).
pub fn apply_common_transforms(
    image: ImageBuf,
    map_type: &str,
    config: &PipelineConfig,
) -> PipelineResult<(ImageBuf, String, Vec<String>)> {
    let mut image = image;
    let mut final_type = map_type.to_string();
    let mut notes = Vec::new();
    let base = base_map_type(map_type).to_string();

    if base == MAP_GLOSS {
        if image.is_empty() {
            return Err(PipelineError::TransformUnsupported(
                "cannot invert an empty glossiness buffer".to_string(),
            ));
        }
        image = channel::invert(&image);
        final_type = final_type.replace("GLOSS", "ROUGH");
        notes.push(format!(
            "inverted glossiness to roughness ({} -> {})",
            map_type, final_type
        ));
        debug!(from = map_type, to = %final_type, "gloss inversion applied");
    }

    if base == MAP_NORMAL && config.invert_normal_green {
        if image.channels() < 2 {
            return Err(PipelineError::TransformUnsupported(format!(
                "normal map green inversion needs at least 2 channels, got {}",
                image.channels()
            )));
        }
        image = channel::invert_channel(&image, 1)?;
        notes.push("inverted normal map green channel".to_string());
    }

    Ok((image, final_type, notes))
}

/// Extracts the alpha channel of a color-like source as a mask plane.
///
/// Returns `None` when the buffer carries no alpha channel (neither RGBA
/// nor gray+alpha).
pub fn extract_alpha_mask(image: &ImageBuf) -> PipelineResult<Option<ImageBuf>> {
    let alpha_index = match image.channels() {
        4 => 3,
        2 => 1,
        _ => return Ok(None),
    };
    let mask = channel::extract_channel(image, alpha_index)?;
    Ok(Some(mask))
}
