//! # texnorm-ops
//!
//! Image processing operations for the texnorm pipeline.
//!
//! # Modules
//!
//! - [`resize`] - Image scaling and resampling
//! - [`channel`] - Inversion, plane extraction and packing
//!
//! # Example
//!
//! ```rust,ignore
//! use texnorm_ops::resize::{resize, Filter};
//! use texnorm_ops::channel::invert_channel;
//!
//! let half = resize(&image, 512, 512, Filter::Area)?;
//! let flipped_green = invert_channel(&normal_map, 1)?;
//! ```

#![warn(missing_docs)]

mod error;
pub mod channel;
pub mod resize;

pub use error::{OpsError, OpsResult};
