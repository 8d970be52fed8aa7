//! Asset skip logic.
//!
//! Decides, before any item work, whether an asset should be skipped:
//! unresolved supplier, an explicit `SKIP` hint, or an already-processed
//! asset when overwrite is disabled.

use crate::context::AssetContext;
use tracing::info;

/// Evaluates skip conditions and marks the context accordingly.
pub fn evaluate_skip(ctx: &mut AssetContext<'_>) {
    if ctx.supplier.is_none() {
        ctx.flags.mark_skipped("supplier unresolved");
        info!(asset = %ctx.asset_rule.asset_name, "skipping: supplier unresolved");
        return;
    }

    match ctx.asset_rule.process_status() {
        Some("SKIP") => {
            ctx.flags.mark_skipped("process_status is SKIP");
            info!(asset = %ctx.asset_rule.asset_name, "skipping: explicit SKIP status");
        }
        Some("PROCESSED") if !ctx.overwrite => {
            ctx.flags
                .mark_skipped("already processed and overwrite disabled");
            info!(
                asset = %ctx.asset_rule.asset_name,
                "skipping: already processed, overwrite disabled"
            );
        }
        _ => {}
    }
}
