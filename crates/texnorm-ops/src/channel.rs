//! Channel-level operations.
//!
//! Inversion, plane extraction and plane packing over [`ImageBuf`]. These
//! back the gloss-to-roughness flip, normal-map green inversion, alpha mask
//! derivation and channel-pack merging.

use crate::{OpsError, OpsResult};
use texnorm_core::{ImageBuf, PixelData};

/// Inverts every sample in place of a copy.
///
/// Integer samples flip around the type maximum, float samples around 1.0.
pub fn invert(src: &ImageBuf) -> ImageBuf {
    let mut out = src.clone();
    match out.data_mut() {
        PixelData::U8(v) => v.iter_mut().for_each(|s| *s = u8::MAX - *s),
        PixelData::U16(v) => v.iter_mut().for_each(|s| *s = u16::MAX - *s),
        PixelData::F32(v) => v.iter_mut().for_each(|s| *s = 1.0 - *s),
    }
    out
}

/// Inverts a single channel, leaving the others untouched.
///
/// # Errors
///
/// Returns [`OpsError::InvalidParameter`] when `channel` is out of range.
pub fn invert_channel(src: &ImageBuf, channel: u32) -> OpsResult<ImageBuf> {
    let channels = src.channels() as usize;
    if channel as usize >= channels {
        return Err(OpsError::InvalidParameter(format!(
            "channel {} out of range for {}-channel image",
            channel, channels
        )));
    }

    let c = channel as usize;
    let mut out = src.clone();
    match out.data_mut() {
        PixelData::U8(v) => v
            .chunks_exact_mut(channels)
            .for_each(|px| px[c] = u8::MAX - px[c]),
        PixelData::U16(v) => v
            .chunks_exact_mut(channels)
            .for_each(|px| px[c] = u16::MAX - px[c]),
        PixelData::F32(v) => v
            .chunks_exact_mut(channels)
            .for_each(|px| px[c] = 1.0 - px[c]),
    }
    Ok(out)
}

/// Extracts a single channel into a one-channel image of the same format.
///
/// # Errors
///
/// Returns [`OpsError::InvalidParameter`] when `channel` is out of range.
pub fn extract_channel(src: &ImageBuf, channel: u32) -> OpsResult<ImageBuf> {
    let channels = src.channels() as usize;
    if channel as usize >= channels {
        return Err(OpsError::InvalidParameter(format!(
            "channel {} out of range for {}-channel image",
            channel, channels
        )));
    }

    let c = channel as usize;
    let data = match src.data() {
        PixelData::U8(v) => {
            PixelData::U8(v.chunks_exact(channels).map(|px| px[c]).collect())
        }
        PixelData::U16(v) => {
            PixelData::U16(v.chunks_exact(channels).map(|px| px[c]).collect())
        }
        PixelData::F32(v) => {
            PixelData::F32(v.chunks_exact(channels).map(|px| px[c]).collect())
        }
    };
    Ok(ImageBuf::from_data(src.width(), src.height(), 1, data)?)
}

/// Packs single-channel planes into one interleaved multi-channel image.
///
/// The output uses the first plane's storage format; later planes are
/// converted to it before packing.
///
/// # Errors
///
/// Returns [`OpsError::InvalidParameter`] for an empty plane list or a
/// multi-channel input, [`OpsError::SizeMismatch`] when plane dimensions
/// disagree.
pub fn pack_channels(planes: &[ImageBuf]) -> OpsResult<ImageBuf> {
    let first = planes
        .first()
        .ok_or_else(|| OpsError::InvalidParameter("no planes to pack".into()))?;
    let (width, height) = first.dimensions();
    let format = first.format();

    for (i, plane) in planes.iter().enumerate() {
        if plane.channels() != 1 {
            return Err(OpsError::InvalidParameter(format!(
                "plane {} has {} channels, expected 1",
                i,
                plane.channels()
            )));
        }
        if plane.dimensions() != (width, height) {
            return Err(OpsError::SizeMismatch(format!(
                "plane {} is {}x{}, expected {}x{}",
                i,
                plane.width(),
                plane.height(),
                width,
                height
            )));
        }
    }

    let channels = planes.len();
    let converted: Vec<ImageBuf> = planes.iter().map(|p| p.convert(format)).collect();
    let pixel_count = first.pixel_count();

    let data = match format {
        texnorm_core::PixelFormat::U8 => {
            let srcs: Vec<&[u8]> = converted
                .iter()
                .filter_map(|p| p.as_u8())
                .collect();
            let mut out = Vec::with_capacity(pixel_count * channels);
            for i in 0..pixel_count {
                for s in &srcs {
                    out.push(s[i]);
                }
            }
            PixelData::U8(out)
        }
        texnorm_core::PixelFormat::U16 => {
            let srcs: Vec<&[u16]> = converted
                .iter()
                .filter_map(|p| p.as_u16())
                .collect();
            let mut out = Vec::with_capacity(pixel_count * channels);
            for i in 0..pixel_count {
                for s in &srcs {
                    out.push(s[i]);
                }
            }
            PixelData::U16(out)
        }
        texnorm_core::PixelFormat::F32 => {
            let srcs: Vec<&[f32]> = converted
                .iter()
                .filter_map(|p| p.as_f32())
                .collect();
            let mut out = Vec::with_capacity(pixel_count * channels);
            for i in 0..pixel_count {
                for s in &srcs {
                    out.push(s[i]);
                }
            }
            PixelData::F32(out)
        }
    };

    Ok(ImageBuf::from_data(width, height, channels as u32, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_u8() {
        let src = ImageBuf::from_u8(2, 1, 1, vec![0, 200]).unwrap();
        let out = invert(&src);
        assert_eq!(out.as_u8().unwrap(), &[255, 55]);
    }

    #[test]
    fn test_invert_f32() {
        let src = ImageBuf::from_f32(2, 1, 1, vec![0.0, 0.25]).unwrap();
        let out = invert(&src);
        assert_eq!(out.as_f32().unwrap(), &[1.0, 0.75]);
    }

    #[test]
    fn test_invert_channel_only_touches_target() {
        let src = ImageBuf::from_u8(1, 1, 3, vec![10, 20, 30]).unwrap();
        let out = invert_channel(&src, 1).unwrap();
        assert_eq!(out.as_u8().unwrap(), &[10, 235, 30]);
    }

    #[test]
    fn test_invert_channel_out_of_range() {
        let src = ImageBuf::from_u8(1, 1, 3, vec![0; 3]).unwrap();
        assert!(invert_channel(&src, 3).is_err());
    }

    #[test]
    fn test_extract_channel() {
        let src = ImageBuf::from_u8(2, 1, 4, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let alpha = extract_channel(&src, 3).unwrap();
        assert_eq!(alpha.channels(), 1);
        assert_eq!(alpha.as_u8().unwrap(), &[4, 8]);
    }

    #[test]
    fn test_pack_channels_interleaves() {
        let r = ImageBuf::from_u8(2, 1, 1, vec![1, 2]).unwrap();
        let g = ImageBuf::from_u8(2, 1, 1, vec![3, 4]).unwrap();
        let b = ImageBuf::from_u8(2, 1, 1, vec![5, 6]).unwrap();
        let packed = pack_channels(&[r, g, b]).unwrap();
        assert_eq!(packed.channels(), 3);
        assert_eq!(packed.as_u8().unwrap(), &[1, 3, 5, 2, 4, 6]);
    }

    #[test]
    fn test_pack_channels_dimension_mismatch() {
        let a = ImageBuf::from_u8(2, 1, 1, vec![0, 0]).unwrap();
        let b = ImageBuf::from_u8(1, 1, 1, vec![0]).unwrap();
        assert!(matches!(
            pack_channels(&[a, b]),
            Err(OpsError::SizeMismatch(_))
        ));
    }

    #[test]
    fn test_pack_channels_converts_mixed_formats() {
        let a = ImageBuf::from_u8(1, 1, 1, vec![255]).unwrap();
        let b = ImageBuf::from_u16(1, 1, 1, vec![0]).unwrap();
        let packed = pack_channels(&[a, b]).unwrap();
        assert_eq!(packed.as_u8().unwrap(), &[255, 0]);
    }
}
