//! Variant saving.
//!
//! Resolves the target bit depth and file format for one processed buffer,
//! then writes one file per eligible resolution. Upscaling is never
//! performed: resolutions larger than the source are skipped, an exact
//! match uses the buffer unresized, smaller targets are downscaled with an
//! area filter against the longer source edge.

use crate::config::{BitDepthRule, PipelineConfig};
use crate::context::{RunTokens, SavedVariant};
use crate::error::PipelineResult;
use crate::naming;
use crate::rules::base_map_type;
use std::path::Path;
use texnorm_core::{ImageBuf, PixelFormat, pot};
use texnorm_io::EncodeOptions;
use texnorm_ops::resize::{self, Filter};
use tracing::{debug, warn};

/// Extensions capable of carrying 16-bit samples.
const SIXTEEN_BIT_EXTENSIONS: [&str; 3] = ["png", "tif", "tiff"];

/// Everything the saver needs for one work item.
#[derive(Debug)]
pub struct SaveRequest<'a> {
    /// Processed working buffer.
    pub image: &'a ImageBuf,
    /// Final resolved map type (post rename).
    pub map_type: &'a str,
    /// Recorded bit depths of every source that fed this buffer.
    pub source_bit_depths: &'a [u8],
    /// Resolution subset to write: key and longest-edge pixels, in any
    /// order. `LOWRES` items pass a single entry at the source edge.
    pub resolutions: &'a [(String, u32)],
    /// Asset name for filename tokens.
    pub asset_name: &'a str,
    /// Effective supplier for filename tokens.
    pub supplier: &'a str,
    /// Directory the variants are written into.
    pub out_dir: &'a Path,
}

/// Variants written for one item.
#[derive(Debug, Default)]
pub struct SaveOutput {
    /// Successfully written variants, largest first.
    pub saved: Vec<SavedVariant>,
}

/// Resolves the target bit depth for a map type and its source depths.
pub fn resolve_bit_depth(map_type: &str, source_bit_depths: &[u8], config: &PipelineConfig) -> u8 {
    match config.bit_depth_rule(base_map_type(map_type)) {
        BitDepthRule::Force8bit => 8,
        BitDepthRule::RespectInputs => {
            if source_bit_depths.iter().any(|&d| d > 8) {
                16
            } else {
                8
            }
        }
    }
}

/// Resolves the output extension for a target bit depth.
pub fn resolve_extension(bit_depth: u8, config: &PipelineConfig) -> String {
    if bit_depth <= 8 {
        return config.output_format_8bit.clone();
    }
    let primary = config.output_format_16bit_primary.as_str();
    if SIXTEEN_BIT_EXTENSIONS.contains(&primary) {
        primary.to_string()
    } else {
        warn!(
            primary,
            fallback = %config.output_format_16bit_fallback,
            "16-bit primary format not 16-bit capable, using fallback"
        );
        config.output_format_16bit_fallback.clone()
    }
}

/// Writes the resolution variants of one processed buffer.
///
/// Per-resolution failures are logged and skipped without aborting the
/// remaining resolutions. An empty [`SaveOutput`] is not an error; the
/// caller maps it to a no-output status.
pub fn save_variants(
    request: &SaveRequest<'_>,
    config: &PipelineConfig,
    run_tokens: &RunTokens,
) -> PipelineResult<SaveOutput> {
    let bit_depth = resolve_bit_depth(request.map_type, request.source_bit_depths, config);
    let base_ext = resolve_extension(bit_depth, config);
    let target_format = if bit_depth <= 8 {
        PixelFormat::U8
    } else {
        PixelFormat::U16
    };
    let options = EncodeOptions {
        jpeg_quality: config.jpg_quality,
        png_compression: config.png_compression(),
    };

    let source_edge = request.image.longest_edge();
    let mut resolutions: Vec<&(String, u32)> = request.resolutions.iter().collect();
    resolutions.sort_by(|a, b| b.1.cmp(&a.1));

    let mut output = SaveOutput::default();
    for (key, edge) in resolutions {
        if *edge > source_edge {
            debug!(
                resolution = %key,
                edge,
                source_edge,
                "skipping resolution larger than source"
            );
            continue;
        }

        let (width, height) = request.image.dimensions();
        let variant = if *edge == source_edge {
            request.image.clone()
        } else {
            let (target_w, target_h) = pot::fit_to_longest_edge(width, height, *edge);
            match resize::resize(request.image, target_w, target_h, Filter::Area) {
                Ok(resized) => resized,
                Err(e) => {
                    warn!(resolution = %key, error = %e, "resize failed, skipping variant");
                    continue;
                }
            }
        };

        let mut ext = base_ext.clone();
        if bit_depth == 8 && ext == "png" {
            if let Some(threshold) = config.resolution_threshold_for_jpg {
                if variant.longest_edge() > threshold {
                    debug!(resolution = %key, threshold, "threshold exceeded, writing jpg");
                    ext = "jpg".to_string();
                }
            }
        }

        let variant = if variant.format() == target_format {
            variant
        } else {
            variant.convert(target_format)
        };

        let filename = naming::substitute(
            &config.output_filename_pattern,
            &[
                ("assetname", request.asset_name),
                ("supplier", request.supplier),
                ("maptype", &naming::filename_map_type(request.map_type, config)),
                ("resolution", key),
                ("ext", &ext),
            ],
            run_tokens,
        );
        let path = request.out_dir.join(filename);
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %path.display(), error = %e, "cannot create parent directory");
                continue;
            }
        }

        let dimensions = variant.dimensions();
        match texnorm_io::write(&path, &variant, &options) {
            Ok(()) => {
                debug!(path = %path.display(), resolution = %key, "variant written");
                output.saved.push(SavedVariant {
                    path,
                    resolution_key: key.clone(),
                    format: ext,
                    bit_depth,
                    dimensions,
                });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "write failed, skipping variant");
            }
        }
    }

    Ok(output)
}
