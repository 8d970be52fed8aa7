//! Supplier determination.
//!
//! The effective supplier comes from the source rule's explicit override,
//! falling back to the delivery identifier. A non-empty supplier registry
//! in the configuration additionally validates the name.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::rules::SourceRule;
use tracing::debug;

/// Resolves the effective supplier for a source rule.
///
/// # Errors
///
/// Returns [`PipelineError::SupplierUnresolved`] when neither override nor
/// identifier is set, or when the registry is non-empty and does not
/// contain the resolved name.
pub fn determine_supplier(
    source_rule: &SourceRule,
    config: &PipelineConfig,
) -> PipelineResult<String> {
    let supplier = source_rule
        .supplier_override
        .as_deref()
        .or(source_rule.supplier_identifier.as_deref())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            PipelineError::SupplierUnresolved(format!(
                "no supplier override or identifier for '{}'",
                source_rule.input_path.display()
            ))
        })?;

    if !config.suppliers.is_empty() && !config.suppliers.contains_key(supplier) {
        return Err(PipelineError::SupplierUnresolved(format!(
            "supplier '{}' not in configured registry",
            supplier
        )));
    }

    debug!(supplier, "resolved effective supplier");
    Ok(supplier.to_string())
}
