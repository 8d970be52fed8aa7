//! Format-agnostic image buffer.
//!
//! [`ImageBuf`] holds interleaved pixel data in one of three storage formats
//! ([`PixelData::U8`], [`PixelData::U16`], [`PixelData::F32`]) with a runtime
//! channel count. Pixels are row-major, top-to-bottom:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//! ```
//!
//! Integer formats represent normalized values (0..=255 maps to 0.0..=1.0),
//! float buffers store normalized values directly.
//!
//! # Example
//!
//! ```rust
//! use texnorm_core::{ImageBuf, PixelFormat};
//!
//! let img = ImageBuf::new(64, 64, 4, PixelFormat::U8);
//! assert_eq!(img.dimensions(), (64, 64));
//! assert_eq!(img.channels(), 4);
//! assert_eq!(img.bit_depth(), 8);
//! ```

use crate::error::{CoreError, Result};

/// Pixel storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit unsigned integer per channel.
    U8,
    /// 16-bit unsigned integer per channel.
    U16,
    /// 32-bit float per channel (normalized).
    F32,
}

impl PixelFormat {
    /// Returns bytes per channel for this format.
    pub fn bytes_per_channel(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }

    /// Returns the nominal bit depth (8, 16 or 32).
    pub fn bit_depth(&self) -> u8 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::F32 => 32,
        }
    }

    /// Returns true if this is a floating-point format.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32)
    }

    /// Returns the format name as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::F32 => "f32",
        }
    }
}

/// Raw pixel data storage.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// 8-bit unsigned data.
    U8(Vec<u8>),
    /// 16-bit unsigned data.
    U16(Vec<u16>),
    /// 32-bit float data.
    F32(Vec<f32>),
}

impl PixelData {
    /// Returns the number of samples (pixels * channels).
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    /// Returns true if the storage holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the storage format of this data.
    pub fn format(&self) -> PixelFormat {
        match self {
            Self::U8(_) => PixelFormat::U8,
            Self::U16(_) => PixelFormat::U16,
            Self::F32(_) => PixelFormat::F32,
        }
    }
}

/// Image buffer with runtime pixel format and channel count.
///
/// This is the container every texnorm stage operates on. It can represent
/// grayscale masks, RGB color maps and RGBA sources at 8-bit, 16-bit or
/// float precision.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuf {
    width: u32,
    height: u32,
    channels: u32,
    data: PixelData,
}

impl ImageBuf {
    /// Creates a new zero-filled buffer.
    pub fn new(width: u32, height: u32, channels: u32, format: PixelFormat) -> Self {
        let size = width as usize * height as usize * channels as usize;
        let data = match format {
            PixelFormat::U8 => PixelData::U8(vec![0u8; size]),
            PixelFormat::U16 => PixelData::U16(vec![0u16; size]),
            PixelFormat::F32 => PixelData::F32(vec![0.0f32; size]),
        };
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Creates a buffer filled with a constant normalized value.
    ///
    /// The value is clamped to `0.0..=1.0` and quantized to the target
    /// format. Used for merge-channel fallback synthesis.
    pub fn filled(width: u32, height: u32, channels: u32, format: PixelFormat, value: f32) -> Self {
        let size = width as usize * height as usize * channels as usize;
        let v = value.clamp(0.0, 1.0);
        let data = match format {
            PixelFormat::U8 => PixelData::U8(vec![(v * 255.0).round() as u8; size]),
            PixelFormat::U16 => PixelData::U16(vec![(v * 65535.0).round() as u16; size]),
            PixelFormat::F32 => PixelData::F32(vec![v; size]),
        };
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Creates a buffer from existing 8-bit samples.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDimensions`] if the sample count does not
    /// equal `width * height * channels`.
    pub fn from_u8(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Result<Self> {
        Self::from_data(width, height, channels, PixelData::U8(data))
    }

    /// Creates a buffer from existing 16-bit samples.
    pub fn from_u16(width: u32, height: u32, channels: u32, data: Vec<u16>) -> Result<Self> {
        Self::from_data(width, height, channels, PixelData::U16(data))
    }

    /// Creates a buffer from existing float samples.
    pub fn from_f32(width: u32, height: u32, channels: u32, data: Vec<f32>) -> Result<Self> {
        Self::from_data(width, height, channels, PixelData::F32(data))
    }

    /// Creates a buffer from existing pixel data of any format.
    pub fn from_data(width: u32, height: u32, channels: u32, data: PixelData) -> Result<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(CoreError::invalid_dimensions(
                width,
                height,
                channels,
                format!("expected {} samples, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Returns the buffer width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the buffer height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the number of channels per pixel.
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Returns the longer of width and height.
    #[inline]
    pub fn longest_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Returns the storage format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.data.format()
    }

    /// Returns the nominal bit depth of the storage format.
    #[inline]
    pub fn bit_depth(&self) -> u8 {
        self.format().bit_depth()
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the total number of samples (pixels * channels).
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.pixel_count() * self.channels as usize
    }

    /// Returns true if the buffer has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the raw pixel data.
    #[inline]
    pub fn data(&self) -> &PixelData {
        &self.data
    }

    /// Returns a mutable reference to the raw pixel data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut PixelData {
        &mut self.data
    }

    /// Returns the samples as `&[u8]` if stored in 8-bit format.
    #[inline]
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.data {
            PixelData::U8(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the samples as `&[u16]` if stored in 16-bit format.
    #[inline]
    pub fn as_u16(&self) -> Option<&[u16]> {
        match &self.data {
            PixelData::U16(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the samples as `&[f32]` if stored in float format.
    #[inline]
    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            PixelData::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Converts all samples to normalized f32 (for processing).
    pub fn to_f32(&self) -> Vec<f32> {
        match &self.data {
            PixelData::U8(v) => v.iter().map(|&s| s as f32 / 255.0).collect(),
            PixelData::U16(v) => v.iter().map(|&s| s as f32 / 65535.0).collect(),
            PixelData::F32(v) => v.clone(),
        }
    }

    /// Converts the buffer to a different storage format.
    ///
    /// A no-op clone when the format already matches. Integer-to-integer
    /// conversion goes through normalized float to keep scaling exact at the
    /// endpoints (0 stays 0, max stays max).
    pub fn convert(&self, format: PixelFormat) -> ImageBuf {
        if self.format() == format {
            return self.clone();
        }
        let samples = self.to_f32();
        let data = match format {
            PixelFormat::U8 => PixelData::U8(
                samples
                    .iter()
                    .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
                    .collect(),
            ),
            PixelFormat::U16 => PixelData::U16(
                samples
                    .iter()
                    .map(|&v| (v.clamp(0.0, 1.0) * 65535.0).round() as u16)
                    .collect(),
            ),
            PixelFormat::F32 => PixelData::F32(samples),
        };
        ImageBuf {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zeroed() {
        let img = ImageBuf::new(8, 4, 3, PixelFormat::U8);
        assert_eq!(img.dimensions(), (8, 4));
        assert_eq!(img.channels(), 3);
        assert_eq!(img.sample_count(), 96);
        assert!(img.as_u8().unwrap().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_from_data_wrong_size() {
        let result = ImageBuf::from_u8(8, 8, 3, vec![0u8; 10]);
        assert!(result.is_err());
    }

    #[test]
    fn test_filled_quantizes() {
        let img = ImageBuf::filled(2, 2, 1, PixelFormat::U8, 1.0);
        assert_eq!(img.as_u8().unwrap(), &[255, 255, 255, 255]);
        let img16 = ImageBuf::filled(1, 1, 1, PixelFormat::U16, 0.5);
        assert_eq!(img16.as_u16().unwrap()[0], 32768);
    }

    #[test]
    fn test_convert_u8_to_u16_endpoints() {
        let img = ImageBuf::from_u8(2, 1, 1, vec![0, 255]).unwrap();
        let img16 = img.convert(PixelFormat::U16);
        assert_eq!(img16.as_u16().unwrap(), &[0, 65535]);
    }

    #[test]
    fn test_convert_f32_to_u8_clamps() {
        let img = ImageBuf::from_f32(3, 1, 1, vec![-0.5, 0.5, 1.5]).unwrap();
        let img8 = img.convert(PixelFormat::U8);
        assert_eq!(img8.as_u8().unwrap(), &[0, 128, 255]);
    }

    #[test]
    fn test_to_f32_normalizes_u16() {
        let img = ImageBuf::from_u16(2, 1, 1, vec![0, 65535]).unwrap();
        let f = img.to_f32();
        assert_eq!(f, vec![0.0, 1.0]);
    }

    #[test]
    fn test_longest_edge() {
        let img = ImageBuf::new(100, 40, 1, PixelFormat::U8);
        assert_eq!(img.longest_edge(), 100);
    }
}
