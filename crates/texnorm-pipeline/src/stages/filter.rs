//! File-rule filtering.
//!
//! `FILE_IGNORE` rules carry glob patterns; every other rule whose path
//! matches one of them is excluded from processing.

use crate::rules::FileRule;
use glob::Pattern;
use tracing::{debug, warn};

/// Applies ignore patterns and returns the surviving file rules.
///
/// Invalid glob patterns are logged and skipped rather than failing the
/// asset.
pub fn filter_files(files: &[FileRule]) -> Vec<FileRule> {
    let patterns: Vec<Pattern> = files
        .iter()
        .filter(|f| f.is_ignore())
        .filter_map(|f| match Pattern::new(&f.file_path) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(pattern = %f.file_path, error = %e, "invalid ignore pattern");
                None
            }
        })
        .collect();

    files
        .iter()
        .filter(|f| !f.is_ignore())
        .filter(|f| {
            let ignored = patterns.iter().any(|p| p.matches(&f.file_path));
            if ignored {
                debug!(path = %f.file_path, "file excluded by ignore pattern");
            }
            !ignored
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(path: &str, item_type: &str) -> FileRule {
        FileRule {
            file_path: path.into(),
            item_type: item_type.into(),
            item_type_override: None,
            resolution_override: None,
        }
    }

    #[test]
    fn test_ignore_pattern_excludes_matches() {
        let files = vec![
            rule("*.txt", "FILE_IGNORE"),
            rule("readme.txt", "MAP_COL"),
            rule("rock_col.png", "MAP_COL"),
        ];
        let kept = filter_files(&files);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].file_path, "rock_col.png");
    }

    #[test]
    fn test_no_ignore_rules_keeps_everything() {
        let files = vec![rule("a.png", "MAP_COL"), rule("b.png", "MAP_NORMAL")];
        assert_eq!(filter_files(&files).len(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let files = vec![rule("[", "FILE_IGNORE"), rule("a.png", "MAP_COL")];
        let kept = filter_files(&files);
        assert_eq!(kept.len(), 1);
    }
}
