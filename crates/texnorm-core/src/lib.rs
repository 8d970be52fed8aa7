//! # texnorm-core
//!
//! Core types for the texnorm texture normalization pipeline.
//!
//! This crate provides the foundational types used throughout the texnorm
//! workspace:
//!
//! - [`ImageBuf`] - Format-agnostic image buffer (8-bit, 16-bit, float)
//! - [`PixelFormat`] / [`PixelData`] - Runtime pixel storage description
//! - [`pot`] - Power-of-two helpers and aspect-preserving fit math
//! - [`stats`] - Per-channel image statistics
//!
//! ## Design
//!
//! Supplier deliveries mix bit depths and channel counts freely (an 8-bit
//! RGBA color map next to a 16-bit single-channel height map), so the buffer
//! type carries its format at runtime rather than in the type system. Every
//! downstream crate (`texnorm-io`, `texnorm-ops`, `texnorm-pipeline`)
//! operates on [`ImageBuf`].
//!
//! ## Crate Structure
//!
//! ```text
//! texnorm-core (this crate)
//!    ^
//!    |
//!    +-- texnorm-io  (PNG/JPEG/TIFF readers and writers)
//!    +-- texnorm-ops (resize, channel operations)
//!    +-- texnorm-pipeline (asset processing pipeline)
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod image;
pub mod pot;
pub mod stats;

pub use error::{CoreError, Result};
pub use image::{ImageBuf, PixelData, PixelFormat};
