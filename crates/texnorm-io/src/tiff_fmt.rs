//! TIFF format support.
//!
//! Reads and writes TIFF at native 8-bit or 16-bit depth with LZW
//! compression. Bit depth is preserved on read so the save policy can see
//! what the supplier delivered.

use crate::{IoError, IoResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use texnorm_core::{ImageBuf, PixelFormat};

/// Reads a TIFF file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageBuf> {
    use tiff::ColorType;
    use tiff::decoder::{Decoder, DecodingResult};

    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut decoder =
        Decoder::new(reader).map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;
    let color_type = decoder
        .colortype()
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;

    let result = decoder
        .read_image()
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;

    let channels = match color_type {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) => 4,
        ct => {
            return Err(IoError::DecodeError(format!(
                "unsupported TIFF color type: {:?}",
                ct
            )));
        }
    };

    let image = match result {
        DecodingResult::U8(buf) => ImageBuf::from_u8(width, height, channels, buf)?,
        DecodingResult::U16(buf) => ImageBuf::from_u16(width, height, channels, buf)?,
        DecodingResult::F32(buf) => ImageBuf::from_f32(width, height, channels, buf)?,
        _ => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "TIFF sample type for {:?}",
                color_type
            )));
        }
    };
    Ok(image)
}

/// Writes an image to a TIFF file with LZW compression.
///
/// 8-bit buffers write 8-bit TIFF, 16-bit and float buffers write 16-bit.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageBuf) -> IoResult<()> {
    use tiff::encoder::{Compression, TiffEncoder, colortype};

    let file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(file)
        .map_err(|e: tiff::TiffError| IoError::EncodeError(e.to_string()))?
        .with_compression(Compression::Lzw);

    let width = image.width();
    let height = image.height();
    let enc_err = |e: tiff::TiffError| IoError::EncodeError(e.to_string());

    match image.format() {
        PixelFormat::U8 => {
            let data = match image.as_u8() {
                Some(v) => v,
                None => return Err(IoError::EncodeError("format mismatch".into())),
            };
            match image.channels() {
                1 => encoder
                    .write_image::<colortype::Gray8>(width, height, data)
                    .map_err(enc_err)?,
                3 => encoder
                    .write_image::<colortype::RGB8>(width, height, data)
                    .map_err(enc_err)?,
                4 => encoder
                    .write_image::<colortype::RGBA8>(width, height, data)
                    .map_err(enc_err)?,
                n => {
                    return Err(IoError::EncodeError(format!(
                        "unsupported channel count: {}",
                        n
                    )));
                }
            }
        }
        PixelFormat::U16 | PixelFormat::F32 => {
            let converted = image.convert(PixelFormat::U16);
            let data = match converted.as_u16() {
                Some(v) => v,
                None => return Err(IoError::EncodeError("format mismatch".into())),
            };
            match image.channels() {
                1 => encoder
                    .write_image::<colortype::Gray16>(width, height, data)
                    .map_err(enc_err)?,
                3 => encoder
                    .write_image::<colortype::RGB16>(width, height, data)
                    .map_err(enc_err)?,
                4 => encoder
                    .write_image::<colortype::RGBA16>(width, height, data)
                    .map_err(enc_err)?,
                n => {
                    return Err(IoError::EncodeError(format!(
                        "unsupported channel count: {}",
                        n
                    )));
                }
            }
        }
    }

    Ok(())
}
