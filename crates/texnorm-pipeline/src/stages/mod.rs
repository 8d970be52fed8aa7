//! Pipeline stages.
//!
//! Pre-item stages ([`metadata`], [`supplier`], [`skip`], [`filter`]) run
//! once per asset before preparation. [`prepare`] explodes file rules into
//! work items. Per-item stages ([`transform`], [`merge`], [`scale`],
//! [`save`]) run inside the orchestrator's item loop. Post-item stages
//! ([`organize`], [`metadata`] finalization) run once the loop completes.

pub mod filter;
pub mod merge;
pub mod metadata;
pub mod organize;
pub mod prepare;
pub mod save;
pub mod scale;
pub mod skip;
pub mod supplier;
pub mod transform;
