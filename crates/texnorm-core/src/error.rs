//! Error types for texnorm-core operations.

use thiserror::Error;

/// Result type alias using [`CoreError`] as the error type.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur during core buffer operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Buffer length does not match the declared dimensions.
    #[error("invalid dimensions {width}x{height}x{channels}: {reason}")]
    InvalidDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Declared channel count.
        channels: u32,
        /// Description of the mismatch.
        reason: String,
    },

    /// Requested channel index exceeds the buffer's channel count.
    #[error("channel {index} out of range for {channels}-channel image")]
    ChannelOutOfRange {
        /// Requested channel index.
        index: u32,
        /// Available channel count.
        channels: u32,
    },

    /// Two buffers disagree on pixel dimensions.
    #[error("dimension mismatch: expected {expected_w}x{expected_h}, got {got_w}x{got_h}")]
    DimensionMismatch {
        /// Expected width.
        expected_w: u32,
        /// Expected height.
        expected_h: u32,
        /// Actual width.
        got_w: u32,
        /// Actual height.
        got_h: u32,
    },

    /// Operation does not support the buffer's pixel format.
    #[error("unsupported pixel format {format} for {operation}")]
    UnsupportedFormat {
        /// Format name.
        format: String,
        /// Operation that rejected it.
        operation: String,
    },
}

impl CoreError {
    /// Convenience constructor for [`CoreError::InvalidDimensions`].
    pub fn invalid_dimensions(
        width: u32,
        height: u32,
        channels: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            channels,
            reason: reason.into(),
        }
    }

    /// Convenience constructor for [`CoreError::DimensionMismatch`].
    pub fn dimension_mismatch(expected: (u32, u32), got: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            expected_w: expected.0,
            expected_h: expected.1,
            got_w: got.0,
            got_h: got.1,
        }
    }
}
