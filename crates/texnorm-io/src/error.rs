//! Error types for image I/O operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Format could not be identified or is not handled.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Bit depth or color layout the codec cannot represent.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// Buffer construction error from texnorm-core.
    #[error(transparent)]
    Core(#[from] texnorm_core::CoreError),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
