//! JPEG format support.
//!
//! Reads 8-bit JPEG (grayscale, RGB, CMYK inputs) and writes 8-bit JPEG
//! with quality control. Alpha channels are stripped on write, higher bit
//! depths are quantized to 8-bit.

use crate::{EncodeOptions, IoError, IoResult};
use std::io::{BufReader, Cursor};
use std::path::Path;
use texnorm_core::{ImageBuf, PixelFormat};

/// Reads a JPEG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageBuf> {
    let data = std::fs::read(path.as_ref())?;
    read_from_memory(&data)
}

/// Reads a JPEG from a byte slice.
pub fn read_from_memory(data: &[u8]) -> IoResult<ImageBuf> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(Cursor::new(data)));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;

    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let width = info.width as u32;
    let height = info.height as u32;

    let (channels, data) = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => (3, pixels),
        jpeg_decoder::PixelFormat::L8 => (1, pixels),
        jpeg_decoder::PixelFormat::L16 => {
            // High byte only, pipeline sources are not 16-bit JPEG.
            let gray: Vec<u8> = pixels.chunks_exact(2).map(|l16| l16[0]).collect();
            (1, gray)
        }
        jpeg_decoder::PixelFormat::CMYK32 => {
            let rgb: Vec<u8> = pixels
                .chunks_exact(4)
                .flat_map(|cmyk| {
                    let c = cmyk[0] as f32 / 255.0;
                    let m = cmyk[1] as f32 / 255.0;
                    let y = cmyk[2] as f32 / 255.0;
                    let k = cmyk[3] as f32 / 255.0;
                    [
                        ((1.0 - c) * (1.0 - k) * 255.0) as u8,
                        ((1.0 - m) * (1.0 - k) * 255.0) as u8,
                        ((1.0 - y) * (1.0 - k) * 255.0) as u8,
                    ]
                })
                .collect();
            (3, rgb)
        }
    };

    Ok(ImageBuf::from_u8(width, height, channels, data)?)
}

/// Writes an image to a JPEG file.
///
/// Always writes 8-bit. A 4-channel buffer loses its alpha channel, a
/// 2-channel buffer loses its second channel.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageBuf, options: &EncodeOptions) -> IoResult<()> {
    let data = write_to_memory(image, options)?;
    std::fs::write(path.as_ref(), data)?;
    Ok(())
}

/// Encodes an image to JPEG bytes.
pub fn write_to_memory(image: &ImageBuf, options: &EncodeOptions) -> IoResult<Vec<u8>> {
    use jpeg_encoder::{ColorType, Encoder};

    let converted = image.convert(PixelFormat::U8);
    let u8_data = match converted.as_u8() {
        Some(v) => v,
        None => return Err(IoError::EncodeError("conversion to u8 failed".into())),
    };

    let (color_type, pixel_data) = match image.channels() {
        1 => (ColorType::Luma, u8_data.to_vec()),
        2 => (
            ColorType::Luma,
            u8_data.chunks_exact(2).map(|ga| ga[0]).collect(),
        ),
        3 => (ColorType::Rgb, u8_data.to_vec()),
        4 => (
            ColorType::Rgb,
            u8_data
                .chunks_exact(4)
                .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
                .collect(),
        ),
        n => {
            return Err(IoError::EncodeError(format!(
                "unsupported channel count: {}",
                n
            )));
        }
    };

    let mut buffer = Vec::new();
    let encoder = Encoder::new(&mut buffer, options.jpeg_quality);
    encoder
        .encode(
            &pixel_data,
            image.width() as u16,
            image.height() as u16,
            color_type,
        )
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

    Ok(buffer)
}
