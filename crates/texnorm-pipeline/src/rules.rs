//! Rule model: the Source → Asset → File hierarchy driving a run.
//!
//! Rules are read-only input, deserialized from YAML. A [`SourceRule`]
//! describes one supplier delivery, its [`AssetRule`]s the logical output
//! assets, and each [`FileRule`] one input file with its map-type
//! identifier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Reserved prefix marking a map-producing item type.
pub const MAP_PREFIX: &str = "MAP_";
/// Item type whose `file_path` is a glob pattern excluding other files.
pub const FILE_IGNORE: &str = "FILE_IGNORE";
/// Item type for auxiliary files that never become processing items.
pub const EXTRA: &str = "EXTRA";
/// Map type of masks derived from a color map's alpha channel.
pub const MAP_MASK: &str = "MAP_MASK";
/// Glossiness map type, inverted and renamed to roughness.
pub const MAP_GLOSS: &str = "MAP_GLOSS";
/// Normal map type, subject to green-channel inversion.
pub const MAP_NORMAL: &str = "MAP_NORMAL";
/// Map types treated as color-like for alpha mask derivation.
pub const COLOR_LIKE_TYPES: [&str; 3] = ["MAP_COL", "MAP_ALBEDO", "MAP_BASECOLOR"];

/// Metadata key carrying the process-status hint.
pub const PROCESS_STATUS_KEY: &str = "process_status";

/// One input location (directory or archive) containing assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRule {
    /// Supplier inferred from the delivery itself.
    #[serde(default)]
    pub supplier_identifier: Option<String>,
    /// Explicit supplier override, wins over the identifier.
    #[serde(default)]
    pub supplier_override: Option<String>,
    /// Input location the file rules are relative to.
    pub input_path: PathBuf,
    /// Optional preset this rule was authored against.
    #[serde(default)]
    pub preset_name: Option<String>,
    /// Ordered list of assets in this delivery.
    #[serde(default)]
    pub assets: Vec<AssetRule>,
}

/// One logical output asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRule {
    /// Output asset name.
    pub asset_name: String,
    /// Free-form metadata; may carry a `process_status` hint
    /// (`"SKIP"` or `"PROCESSED"`).
    #[serde(default)]
    pub common_metadata: BTreeMap<String, String>,
    /// Ordered input files belonging to this asset.
    #[serde(default)]
    pub files: Vec<FileRule>,
}

impl AssetRule {
    /// Returns the `process_status` metadata hint, if any.
    pub fn process_status(&self) -> Option<&str> {
        self.common_metadata.get(PROCESS_STATUS_KEY).map(|s| s.as_str())
    }
}

/// One input file (or, for ignore rules, a glob pattern).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRule {
    /// Path relative to the workspace, or a glob pattern for ignore rules.
    pub file_path: String,
    /// Item type identifier (`MAP_*`, `FILE_IGNORE`, `EXTRA`, ...).
    pub item_type: String,
    /// Optional override of the item type.
    #[serde(default)]
    pub item_type_override: Option<String>,
    /// Optional explicit resolution override (width, height).
    #[serde(default)]
    pub resolution_override: Option<(u32, u32)>,
}

impl FileRule {
    /// Returns the effective item type (override wins).
    pub fn effective_type(&self) -> &str {
        self.item_type_override.as_deref().unwrap_or(&self.item_type)
    }

    /// Returns true for ignore rules.
    pub fn is_ignore(&self) -> bool {
        self.effective_type() == FILE_IGNORE
    }

    /// Returns true when this rule produces a map processing item.
    pub fn is_map(&self) -> bool {
        let t = self.effective_type();
        t.starts_with(MAP_PREFIX) && t != EXTRA
    }
}

/// Strips a trailing `-N` instance suffix from a map type identifier.
pub fn base_map_type(map_type: &str) -> &str {
    match map_type.rsplit_once('-') {
        Some((base, suffix)) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            base
        }
        _ => map_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(item_type: &str, over: Option<&str>) -> FileRule {
        FileRule {
            file_path: "x.png".into(),
            item_type: item_type.into(),
            item_type_override: over.map(String::from),
            resolution_override: None,
        }
    }

    #[test]
    fn test_effective_type_override_wins() {
        assert_eq!(rule("MAP_COL", None).effective_type(), "MAP_COL");
        assert_eq!(rule("MAP_COL", Some("MAP_ROUGH")).effective_type(), "MAP_ROUGH");
    }

    #[test]
    fn test_is_map() {
        assert!(rule("MAP_COL", None).is_map());
        assert!(!rule("EXTRA", None).is_map());
        assert!(!rule("FILE_IGNORE", None).is_map());
        assert!(!rule("MAP_COL", Some("EXTRA")).is_map());
    }

    #[test]
    fn test_base_map_type() {
        assert_eq!(base_map_type("MAP_COL-2"), "MAP_COL");
        assert_eq!(base_map_type("MAP_COL"), "MAP_COL");
        assert_eq!(base_map_type("MAP_NRM-10"), "MAP_NRM");
        assert_eq!(base_map_type("MAP_X-Y"), "MAP_X-Y");
    }

    #[test]
    fn test_rules_deserialize_from_yaml() {
        let yaml = r#"
supplier_identifier: acme
input_path: /deliveries/acme_pack
assets:
  - asset_name: rock_01
    common_metadata:
      process_status: SKIP
    files:
      - file_path: rock_01_col.png
        item_type: MAP_COL
      - file_path: "*.txt"
        item_type: FILE_IGNORE
"#;
        let rule: SourceRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.assets.len(), 1);
        assert_eq!(rule.assets[0].process_status(), Some("SKIP"));
        assert!(rule.assets[0].files[1].is_ignore());
    }
}
