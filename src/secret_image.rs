//! Image secret codec.
//!
//! Content bits are a fixed 66-bit header followed by raw row-major,
//! channel-interleaved 8-bit samples. Images that would not fit the target
//! capacity are downscaled isotropically first; the header records both the
//! original and the stored dimensions.

use crate::bits::{bytes_to_bits, bits_to_bytes, push_uint, read_uint};
use crate::config::IMAGE_HEADER_BITS;
use crate::error::{CoverlessError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// Smallest stored side after downscaling
const MIN_SCALED_SIDE: u32 = 8;

/// Color/alpha class of a stored image (2-bit header field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    Gray,
    Rgb,
    Rgba,
}

impl ColorClass {
    pub fn code(self) -> u8 {
        match self {
            Self::Gray => 0,
            Self::Rgb => 1,
            Self::Rgba => 2,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Gray),
            1 => Ok(Self::Rgb),
            2 => Ok(Self::Rgba),
            other => Err(CoverlessError::ContentDecodeFailure(format!(
                "unknown color class {}",
                other
            ))),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn bits_per_pixel(self) -> usize {
        self.channels() * 8
    }

    /// Grayscale images (with or without alpha) are stored as Gray,
    /// color images with an alpha channel as Rgba, everything else as Rgb
    pub fn of(image: &DynamicImage) -> Self {
        let color = image.color();
        if !color.has_color() {
            Self::Gray
        } else if color.has_alpha() {
            Self::Rgba
        } else {
            Self::Rgb
        }
    }
}

/// Fixed-width image header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHeader {
    pub original_width: u16,
    pub original_height: u16,
    pub color: ColorClass,
    /// Dimensions of the samples that follow
    pub width: u16,
    pub height: u16,
}

impl ImageHeader {
    pub fn is_scaled(&self) -> bool {
        (self.width, self.height) != (self.original_width, self.original_height)
    }

    /// Sample bits that follow the header
    pub fn sample_bits(&self) -> usize {
        self.width as usize * self.height as usize * self.color.bits_per_pixel()
    }

    pub fn to_bits(&self) -> Vec<u8> {
        let mut bits = Vec::with_capacity(IMAGE_HEADER_BITS);
        push_uint(&mut bits, self.original_width as u64, 16);
        push_uint(&mut bits, self.original_height as u64, 16);
        push_uint(&mut bits, self.color.code() as u64, 2);
        push_uint(&mut bits, self.width as u64, 16);
        push_uint(&mut bits, self.height as u64, 16);
        bits
    }

    pub fn from_bits(bits: &[u8]) -> Result<Self> {
        if bits.len() < IMAGE_HEADER_BITS {
            return Err(CoverlessError::ContentDecodeFailure(format!(
                "image header needs {} bits, got {}",
                IMAGE_HEADER_BITS,
                bits.len()
            )));
        }
        Ok(Self {
            original_width: read_uint(&bits[0..16]) as u16,
            original_height: read_uint(&bits[16..32]) as u16,
            color: ColorClass::from_code(read_uint(&bits[32..34]) as u8)?,
            width: read_uint(&bits[34..50]) as u16,
            height: read_uint(&bits[50..66]) as u16,
        })
    }
}

/// Dimensions an image is stored at for a target capacity.
///
/// Keeps the original size when `header + w*h*bpp` fits. Otherwise applies
/// the largest isotropic scale that fits, rounds each side down to a
/// multiple of 8 and floors it at 8. The floor can still overflow a tiny
/// capacity; framing reports that as `CapacityExceeded`.
pub fn scaled_dimensions(
    width: u32,
    height: u32,
    color: ColorClass,
    target_capacity: Option<usize>,
) -> (u32, u32) {
    let Some(target) = target_capacity else {
        return (width, height);
    };
    let max_pixels = target.saturating_sub(IMAGE_HEADER_BITS) / color.bits_per_pixel();
    let current_pixels = width as usize * height as usize;
    if current_pixels <= max_pixels {
        return (width, height);
    }

    let ratio = (max_pixels as f64 / current_pixels as f64).sqrt();
    let scale = |side: u32| {
        let scaled = (side as f64 * ratio) as u32;
        ((scaled / 8) * 8).max(MIN_SCALED_SIDE)
    };
    (scale(width), scale(height))
}

/// Content bits an image secret needs, and the dimensions it is stored at
pub fn required_image_bits(
    image: &DynamicImage,
    target_capacity: Option<usize>,
) -> (usize, (u32, u32)) {
    let color = ColorClass::of(image);
    let (w, h) = scaled_dimensions(image.width(), image.height(), color, target_capacity);
    (
        IMAGE_HEADER_BITS + w as usize * h as usize * color.bits_per_pixel(),
        (w, h),
    )
}

/// Encoded image content
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub header: ImageHeader,
    pub bits: Vec<u8>,
}

fn to_u16(side: u32, what: &str) -> Result<u16> {
    u16::try_from(side).map_err(|_| {
        CoverlessError::InvalidRaster(format!("secret image {} {} exceeds 65535", what, side))
    })
}

/// Encode an image secret, downscaling to fit `target_capacity` if given
pub fn encode_image(image: &DynamicImage, target_capacity: Option<usize>) -> Result<EncodedImage> {
    let color = ColorClass::of(image);
    let (orig_w, orig_h) = (image.width(), image.height());
    if orig_w == 0 || orig_h == 0 {
        return Err(CoverlessError::InvalidRaster("secret image is empty".into()));
    }
    let (width, height) = scaled_dimensions(orig_w, orig_h, color, target_capacity);

    let header = ImageHeader {
        original_width: to_u16(orig_w, "width")?,
        original_height: to_u16(orig_h, "height")?,
        color,
        width: to_u16(width, "width")?,
        height: to_u16(height, "height")?,
    };

    let normalized = match color {
        ColorClass::Gray => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorClass::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
        ColorClass::Rgba => DynamicImage::ImageRgba8(image.to_rgba8()),
    };
    let stored = if header.is_scaled() {
        tracing::warn!(
            from = ?(orig_w, orig_h),
            to = ?(width, height),
            "downscaling secret image to fit capacity"
        );
        normalized.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        normalized
    };

    let mut bits = header.to_bits();
    bits.extend(bytes_to_bits(stored.as_bytes()));
    Ok(EncodedImage { header, bits })
}

/// Decode image content bits. The sample count must match the header exactly.
pub fn decode_image(bits: &[u8]) -> Result<(DynamicImage, ImageHeader)> {
    let header = ImageHeader::from_bits(bits)?;
    let samples = &bits[IMAGE_HEADER_BITS..];
    if header.width == 0 || header.height == 0 || samples.len() != header.sample_bits() {
        return Err(CoverlessError::ContentDecodeFailure(format!(
            "{}x{} {:?} image needs {} sample bits, got {}",
            header.width,
            header.height,
            header.color,
            header.sample_bits(),
            samples.len()
        )));
    }

    let (w, h) = (header.width as u32, header.height as u32);
    let raw = bits_to_bytes(samples);
    let image = match header.color {
        ColorClass::Gray => GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
        ColorClass::Rgb => RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
        ColorClass::Rgba => RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
    }
    .ok_or_else(|| CoverlessError::ContentDecodeFailure("sample buffer size mismatch".into()))?;

    Ok((image, header))
}
