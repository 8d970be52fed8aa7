//! Per-channel image statistics.
//!
//! Used by the pipeline for sidecar metadata and by tests to verify
//! transform behavior without pixel-by-pixel comparison.

use crate::image::ImageBuf;

/// Per-channel statistics over normalized sample values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelStats {
    /// Minimum value per channel.
    pub min: Vec<f32>,
    /// Maximum value per channel.
    pub max: Vec<f32>,
    /// Mean value per channel.
    pub mean: Vec<f32>,
}

impl ChannelStats {
    /// Creates stats for the given channel count with empty extrema.
    pub fn new(channels: usize) -> Self {
        Self {
            min: vec![f32::MAX; channels],
            max: vec![f32::MIN; channels],
            mean: vec![0.0; channels],
        }
    }
}

/// Computes min/max/mean for each channel on normalized values.
///
/// Integer buffers are normalized to `0.0..=1.0` before accumulation, so
/// results are comparable across bit depths. An empty buffer yields stats
/// with zeroed means and untouched extrema.
pub fn channel_stats(img: &ImageBuf) -> ChannelStats {
    let channels = img.channels() as usize;
    let mut stats = ChannelStats::new(channels);
    if img.is_empty() || channels == 0 {
        return stats;
    }

    let samples = img.to_f32();
    let mut sums = vec![0.0f64; channels];
    for pixel in samples.chunks_exact(channels) {
        for (c, &v) in pixel.iter().enumerate() {
            stats.min[c] = stats.min[c].min(v);
            stats.max[c] = stats.max[c].max(v);
            sums[c] += v as f64;
        }
    }

    let count = img.pixel_count() as f64;
    for c in 0..channels {
        stats.mean[c] = (sums[c] / count) as f32;
    }
    stats
}
