//! PNG format support.
//!
//! Reads and writes PNG files at 8-bit and 16-bit depth with 1, 2, 3 or 4
//! channels. Native channel counts are preserved on read so single-channel
//! masks stay single-channel through the pipeline.

use crate::{EncodeOptions, IoError, IoResult};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use texnorm_core::{ImageBuf, PixelFormat};

/// Reads a PNG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageBuf> {
    let file = File::open(path.as_ref())?;
    let decoder = png::Decoder::new(std::io::BufReader::new(file));
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let width = info.width;
    let height = info.height;
    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "PNG color type {:?}",
                other
            )));
        }
    };
    let bytes = &buf[..info.buffer_size()];

    let image = match info.bit_depth {
        png::BitDepth::Eight => ImageBuf::from_u8(width, height, channels, bytes.to_vec())?,
        png::BitDepth::Sixteen => {
            ImageBuf::from_u16(width, height, channels, bytes_to_u16(bytes))?
        }
        depth => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "PNG bit depth {:?}",
                depth
            )));
        }
    };
    Ok(image)
}

/// Writes an image to a PNG file.
///
/// Depth follows the buffer format: 8-bit buffers write 8-bit PNG, 16-bit
/// and float buffers write 16-bit PNG.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageBuf, options: &EncodeOptions) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);

    let color_type = match image.channels() {
        1 => png::ColorType::Grayscale,
        2 => png::ColorType::GrayscaleAlpha,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => {
            return Err(IoError::EncodeError(format!(
                "unsupported channel count: {}",
                n
            )));
        }
    };

    let depth = match image.format() {
        PixelFormat::U8 => png::BitDepth::Eight,
        PixelFormat::U16 | PixelFormat::F32 => png::BitDepth::Sixteen,
    };

    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(color_type);
    encoder.set_depth(depth);
    encoder.set_compression(options.png_compression);
    encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    let bytes: Vec<u8> = match depth {
        png::BitDepth::Eight => match image.as_u8() {
            Some(v) => v.to_vec(),
            None => return Err(IoError::EncodeError("depth/format mismatch".into())),
        },
        _ => {
            let converted = image.convert(PixelFormat::U16);
            match converted.as_u16() {
                Some(v) => v.iter().flat_map(|&s| s.to_be_bytes()).collect(),
                None => return Err(IoError::EncodeError("depth/format mismatch".into())),
            }
        }
    };

    png_writer
        .write_image_data(&bytes)
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    Ok(())
}

/// Converts big-endian byte slice to u16 vector.
fn bytes_to_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect()
}
