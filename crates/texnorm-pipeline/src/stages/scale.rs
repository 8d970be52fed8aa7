//! Initial power-of-two scaling.
//!
//! Optionally snaps the working buffer down so each axis is its largest
//! power of two. `LOWRES` items are exempt: the undersized fallback keeps
//! the source size by definition.

use crate::config::{PipelineConfig, ScalingMode};
use crate::context::LOWRES_KEY;
use crate::error::PipelineResult;
use texnorm_core::{ImageBuf, pot};
use texnorm_ops::resize::{self, Filter};
use tracing::debug;

/// Result of the initial scaling stage.
#[derive(Debug)]
pub struct ScalingOutput {
    /// Possibly-resized working buffer.
    pub image: ImageBuf,
    /// Whether a resize actually occurred.
    pub applied: bool,
    /// Final buffer dimensions (width, height).
    pub dimensions: (u32, u32),
    /// Resolution key, carried through unchanged.
    pub resolution_key: String,
}

/// Applies the configured initial scaling mode to one working buffer.
pub fn apply_initial_scaling(
    image: ImageBuf,
    resolution_key: &str,
    config: &PipelineConfig,
) -> PipelineResult<ScalingOutput> {
    if image.is_empty() {
        return Ok(ScalingOutput {
            image,
            applied: false,
            dimensions: (0, 0),
            resolution_key: resolution_key.to_string(),
        });
    }

    let dimensions = image.dimensions();
    if resolution_key == LOWRES_KEY || config.initial_scaling == ScalingMode::None {
        return Ok(ScalingOutput {
            image,
            applied: false,
            dimensions,
            resolution_key: resolution_key.to_string(),
        });
    }

    let (target_w, target_h) = match pot::pot_downscale_target(dimensions.0, dimensions.1) {
        Some(target) => target,
        None => {
            return Ok(ScalingOutput {
                image,
                applied: false,
                dimensions,
                resolution_key: resolution_key.to_string(),
            });
        }
    };

    debug!(
        from_w = dimensions.0,
        from_h = dimensions.1,
        to_w = target_w,
        to_h = target_h,
        "power-of-two downscale"
    );
    let resized = resize::resize(&image, target_w, target_h, Filter::Area)?;
    Ok(ScalingOutput {
        image: resized,
        applied: true,
        dimensions: (target_w, target_h),
        resolution_key: resolution_key.to_string(),
    })
}
