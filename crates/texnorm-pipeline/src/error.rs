//! Error types for pipeline stages and the orchestrator.

use thiserror::Error;

/// Result type alias using [`PipelineError`].
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Errors produced by pipeline stages.
///
/// Item-level errors are caught at the orchestrator's item loop and recorded
/// against that item only; asset-level errors abort only that asset.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required configuration is missing or malformed.
    #[error("configuration incomplete: {0}")]
    ConfigurationIncomplete(String),

    /// Source file missing, unreadable, or workspace path invalid.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Buffer layout or element type a transform cannot handle.
    #[error("transform unsupported: {0}")]
    TransformUnsupported(String),

    /// Input dimensions disagree and the configured policy forbids fixing it.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Resize, encode or write failure while saving a variant.
    #[error("save failed: {0}")]
    SaveFailed(String),

    /// No effective supplier could be determined for the asset.
    #[error("supplier unresolved: {0}")]
    SupplierUnresolved(String),

    /// Image I/O error.
    #[error(transparent)]
    Io(#[from] texnorm_io::IoError),

    /// Image operation error.
    #[error(transparent)]
    Ops(#[from] texnorm_ops::OpsError),

    /// Core buffer error.
    #[error(transparent)]
    Core(#[from] texnorm_core::CoreError),
}
