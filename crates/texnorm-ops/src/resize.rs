//! Image resize and resampling operations.
//!
//! Provides image scaling over [`ImageBuf`] using separable filters.
//!
//! # Filters
//!
//! - [`Filter::Nearest`] - Fastest, no interpolation (blocky)
//! - [`Filter::Bilinear`] - Linear interpolation (smooth)
//! - [`Filter::Area`] - Box average (the downscale filter for POT and
//!   named-resolution scaling)
//!
//! # Example
//!
//! ```rust,ignore
//! use texnorm_ops::resize::{resize, Filter};
//!
//! let scaled = resize(&image, 1024, 512, Filter::Area)?;
//! ```

use crate::{OpsError, OpsResult};
use texnorm_core::ImageBuf;
use tracing::trace;

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Bilinear interpolation (smooth, fast).
    Bilinear,
    /// Box average over the source footprint (artifact-free downscale).
    #[default]
    Area,
}

impl Filter {
    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Filter::Nearest => 0.5,
            Filter::Bilinear => 1.0,
            Filter::Area => 0.5,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Filter::Nearest | Filter::Area => box_weight(x),
            Filter::Bilinear => triangle_weight(x),
        }
    }
}

/// Box weight function.
#[inline]
fn box_weight(x: f32) -> f32 {
    if x.abs() <= 0.5 { 1.0 } else { 0.0 }
}

/// Triangle weight function.
#[inline]
fn triangle_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Resizes an image to the given dimensions.
///
/// Resampling runs in normalized f32, the result is converted back to the
/// source storage format.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] for a zero target or an empty
/// source.
pub fn resize(src: &ImageBuf, dst_w: u32, dst_h: u32, filter: Filter) -> OpsResult<ImageBuf> {
    if src.is_empty() {
        return Err(OpsError::InvalidDimensions("source image is empty".into()));
    }
    if dst_w == 0 || dst_h == 0 {
        return Err(OpsError::InvalidDimensions(
            "destination size must be > 0".into(),
        ));
    }
    if (dst_w, dst_h) == src.dimensions() {
        return Ok(src.clone());
    }
    trace!(from = ?src.dimensions(), to_w = dst_w, to_h = dst_h, ?filter, "resize");

    let channels = src.channels() as usize;
    let samples = src.to_f32();

    // Two-pass separable resize: horizontal then vertical.
    let temp = resize_axis(
        &samples,
        src.width() as usize,
        src.height() as usize,
        channels,
        dst_w as usize,
        filter,
        Axis::Horizontal,
    );
    let result = resize_axis(
        &temp,
        dst_w as usize,
        src.height() as usize,
        channels,
        dst_h as usize,
        filter,
        Axis::Vertical,
    );

    let out = ImageBuf::from_f32(dst_w, dst_h, src.channels(), result)?;
    Ok(out.convert(src.format()))
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One separable resize pass along the given axis.
fn resize_axis(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_len: usize,
    filter: Filter,
    axis: Axis,
) -> Vec<f32> {
    let (src_len, lines) = match axis {
        Axis::Horizontal => (src_w, src_h),
        Axis::Vertical => (src_h, src_w),
    };
    let (out_w, out_h) = match axis {
        Axis::Horizontal => (dst_len, src_h),
        Axis::Vertical => (src_w, dst_len),
    };

    let mut dst = vec![0.0f32; out_w * out_h * channels];
    let scale = src_len as f32 / dst_len as f32;
    let support = filter.support() * scale.max(1.0);

    let mut sum = vec![0.0f32; channels];
    for line in 0..lines {
        for d in 0..dst_len {
            let center = (d as f32 + 0.5) * scale - 0.5;
            let lo = ((center - support).floor().max(0.0)) as usize;
            let hi = ((center + support).ceil() as usize).min(src_len - 1);

            sum.fill(0.0);
            let mut weight_sum = 0.0f32;
            for s in lo..=hi {
                let dist = (s as f32 - center) / scale.max(1.0);
                let w = filter.weight(dist);
                if w == 0.0 {
                    continue;
                }
                weight_sum += w;
                let src_idx = match axis {
                    Axis::Horizontal => (line * src_w + s) * channels,
                    Axis::Vertical => (s * src_w + line) * channels,
                };
                for c in 0..channels {
                    sum[c] += src[src_idx + c] * w;
                }
            }

            let dst_idx = match axis {
                Axis::Horizontal => (line * out_w + d) * channels,
                Axis::Vertical => (d * out_w + line) * channels,
            };
            if weight_sum > 0.0 {
                for c in 0..channels {
                    dst[dst_idx + c] = sum[c] / weight_sum;
                }
            }
        }
    }

    dst
}
