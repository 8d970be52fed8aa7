//! Pipeline configuration.
//!
//! [`PipelineConfig`] is the resolved, read-only settings object every stage
//! receives: resolution table, per-map-type bit-depth rules, output format
//! preferences, merge-task definitions, thresholds and naming patterns.
//! All fields default so a partial YAML document deserializes cleanly.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Per-map-type bit depth policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepthRule {
    /// Always write 8-bit.
    #[default]
    Force8bit,
    /// Write 16-bit when any recorded source bit depth exceeds 8.
    RespectInputs,
}

impl<'de> Deserialize<'de> for BitDepthRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "force_8bit" => BitDepthRule::Force8bit,
            "respect_inputs" => BitDepthRule::RespectInputs,
            other => {
                warn!(rule = other, "unknown bit_depth_rule, defaulting to force_8bit");
                BitDepthRule::Force8bit
            }
        })
    }
}

/// Properties of one map type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapTypeDef {
    /// Bit depth policy for this type.
    #[serde(default)]
    pub bit_depth_rule: BitDepthRule,
    /// Filename token replacing the internal identifier (e.g. "col").
    #[serde(default)]
    pub filename_token: Option<String>,
}

/// Initial scaling mode applied before saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScalingMode {
    /// No initial rescale.
    #[default]
    None,
    /// Snap each axis down to its largest power of two.
    PotDownscale,
}

impl<'de> Deserialize<'de> for ScalingMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "NONE" => ScalingMode::None,
            "POT_DOWNSCALE" => ScalingMode::PotDownscale,
            other => {
                warn!(mode = other, "unknown initial_scaling mode, behaving as NONE");
                ScalingMode::None
            }
        })
    }
}

/// Policy when merge inputs disagree in pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MismatchPolicy {
    /// Fail the merge task.
    ErrorSkip,
    /// Resize mismatched inputs up to the largest observed dimensions.
    #[default]
    UseLargest,
    /// Target the first loaded input's dimensions.
    UseFirst,
}

/// One configured channel-pack merge output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRule {
    /// Map type of the composite output.
    pub output_map_type: String,
    /// Channel letter → required input map type.
    #[serde(default)]
    pub inputs: BTreeMap<char, String>,
    /// Channel letter → constant fallback (normalized, 0.0 to 1.0).
    #[serde(default)]
    pub defaults: BTreeMap<char, f32>,
    /// Output channel order, e.g. "RGB".
    #[serde(default = "default_channel_order")]
    pub channel_order: String,
    /// Fixed target dimensions, required when a fallback must be
    /// synthesized with no loaded input to size against.
    #[serde(default)]
    pub target_dimensions: Option<(u32, u32)>,
}

fn default_channel_order() -> String {
    "RGB".to_string()
}

/// A known supplier registry entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierDef {
    /// Human-readable supplier name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Resolved pipeline settings, immutable during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Named resolution table: key → longest-edge pixels.
    pub resolutions: BTreeMap<String, u32>,
    /// Per-map-type definitions, keyed by base type (`MAP_COL`, ...).
    pub map_types: BTreeMap<String, MapTypeDef>,
    /// Extension for 8-bit output.
    pub output_format_8bit: String,
    /// Primary extension for 16-bit output.
    pub output_format_16bit_primary: String,
    /// Fallback extension when the primary is not 16-bit capable.
    pub output_format_16bit_fallback: String,
    /// PNG compression level, 0 to 9.
    pub png_compression_level: u8,
    /// JPEG quality, 1 to 100.
    pub jpg_quality: u8,
    /// Longest-edge threshold above which 8-bit PNG variants switch to JPG.
    pub resolution_threshold_for_jpg: Option<u32>,
    /// Emit a LOWRES fallback item for undersized sources.
    pub enable_low_resolution_fallback: bool,
    /// Longest-edge threshold below which a source counts as undersized.
    pub low_resolution_threshold: u32,
    /// Configured channel-pack merge outputs.
    pub merge_rules: Vec<MergeRule>,
    /// Initial scaling mode.
    pub initial_scaling: ScalingMode,
    /// Merge dimension mismatch policy.
    pub dimension_mismatch: MismatchPolicy,
    /// Invert normal maps' green channel globally.
    pub invert_normal_green: bool,
    /// Base types (without `MAP_` prefix) suffixed `-1` even when single.
    pub respect_variant_map_types: Vec<String>,
    /// Output filename pattern with `[token]` placeholders.
    pub output_filename_pattern: String,
    /// Output directory pattern with `[token]` placeholders.
    pub output_directory_pattern: String,
    /// Known supplier registry; empty disables validation.
    pub suppliers: BTreeMap<String, SupplierDef>,
    /// Default overwrite behavior for already-processed assets.
    pub overwrite_existing: bool,
    /// Prefix for the orchestrator's per-call temp directory.
    pub temp_dir_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolutions: BTreeMap::new(),
            map_types: BTreeMap::new(),
            output_format_8bit: "png".to_string(),
            output_format_16bit_primary: "png".to_string(),
            output_format_16bit_fallback: "tif".to_string(),
            png_compression_level: 6,
            jpg_quality: 90,
            resolution_threshold_for_jpg: None,
            enable_low_resolution_fallback: false,
            low_resolution_threshold: 1024,
            merge_rules: Vec::new(),
            initial_scaling: ScalingMode::None,
            dimension_mismatch: MismatchPolicy::default(),
            invert_normal_green: false,
            respect_variant_map_types: Vec::new(),
            output_filename_pattern: "[assetname]_[supplier]_[maptype]_[resolution].[ext]"
                .to_string(),
            output_directory_pattern: "[assetname]".to_string(),
            suppliers: BTreeMap::new(),
            overwrite_existing: false,
            temp_dir_prefix: "texnorm".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Maps the PNG compression level (0-9) to the codec's setting.
    pub fn png_compression(&self) -> png::Compression {
        match self.png_compression_level {
            0 => png::Compression::NoCompression,
            1..=3 => png::Compression::Fast,
            4..=6 => png::Compression::Balanced,
            _ => png::Compression::High,
        }
    }

    /// Returns the bit depth rule for a base map type (missing → force 8-bit).
    pub fn bit_depth_rule(&self, base_type: &str) -> BitDepthRule {
        self.map_types
            .get(base_type)
            .map(|def| def.bit_depth_rule)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.output_format_8bit, "png");
        assert_eq!(config.initial_scaling, ScalingMode::None);
        assert_eq!(config.dimension_mismatch, MismatchPolicy::UseLargest);
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let yaml = r#"
resolutions:
  2K: 2048
  1K: 1024
initial_scaling: POT_DOWNSCALE
map_types:
  MAP_NORMAL:
    bit_depth_rule: respect_inputs
merge_rules:
  - output_map_type: MAP_PACKED
    inputs:
      R: MAP_AO
    defaults:
      G: 1.0
    channel_order: RGB
    target_dimensions: [512, 512]
"#;
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.resolutions["2K"], 2048);
        assert_eq!(config.initial_scaling, ScalingMode::PotDownscale);
        assert_eq!(
            config.map_types["MAP_NORMAL"].bit_depth_rule,
            BitDepthRule::RespectInputs
        );
        assert_eq!(config.merge_rules[0].defaults[&'G'], 1.0);
        // Unset fields keep their defaults.
        assert_eq!(config.jpg_quality, 90);
    }

    #[test]
    fn test_unknown_scaling_mode_is_none() {
        let mode: ScalingMode = serde_yaml::from_str("\"HALF_RES\"").unwrap();
        assert_eq!(mode, ScalingMode::None);
    }

    #[test]
    fn test_unknown_bit_depth_rule_is_force_8bit() {
        let rule: BitDepthRule = serde_yaml::from_str("\"force_32bit\"").unwrap();
        assert_eq!(rule, BitDepthRule::Force8bit);
    }

    #[test]
    fn test_png_compression_mapping() {
        let mut config = PipelineConfig::default();
        config.png_compression_level = 0;
        assert!(matches!(config.png_compression(), png::Compression::NoCompression));
        config.png_compression_level = 9;
        assert!(matches!(config.png_compression(), png::Compression::High));
    }
}
