//! Output naming: token substitution and filename-friendly map types.

use crate::config::PipelineConfig;
use crate::context::RunTokens;
use crate::rules::{MAP_PREFIX, base_map_type};

/// Substitutes `[token]` placeholders in a pattern.
///
/// Tokens come from the explicit pairs first, then from run-level tokens.
/// Unrecognized placeholders are left in place.
pub fn substitute(pattern: &str, tokens: &[(&str, &str)], run_tokens: &RunTokens) -> String {
    let mut out = pattern.to_string();
    for (token, value) in tokens {
        out = out.replace(&format!("[{}]", token), value);
    }
    for (token, value) in &run_tokens.values {
        out = out.replace(&format!("[{}]", token), value);
    }
    out
}

/// Converts an internal map type to its filename form.
///
/// Uses the configured `filename_token` for the base type when present,
/// otherwise strips the `MAP_` prefix and lowercases. A `-N` instance
/// suffix is carried over unchanged.
pub fn filename_map_type(map_type: &str, config: &PipelineConfig) -> String {
    let base = base_map_type(map_type);
    let suffix = &map_type[base.len()..];

    let friendly = config
        .map_types
        .get(base)
        .and_then(|def| def.filename_token.clone())
        .unwrap_or_else(|| base.strip_prefix(MAP_PREFIX).unwrap_or(base).to_lowercase());

    format!("{}{}", friendly, suffix)
}
