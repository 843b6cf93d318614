//! Z-code image serialization.
//!
//! Bits laid out row-major, 8 per grayscale pixel, MSB first:
//!
//! ```text
//! [length: 32 BE] [index: 16] [size tag: 16] [Z-code bits] [zero pad]
//!                 └──── tagged variant only ───┘
//! ```
//!
//! The raster is the smallest near-square that holds the bytes:
//! `width = ⌊√n⌋`, `height = ⌈n / width⌉`, trailing pixels zero.

use crate::bits::{bits_to_bytes, bytes_to_bits, push_uint, read_uint};
use crate::config::{ZCODE_LENGTH_BITS, ZCODE_TAG_BITS};
use crate::error::{CoverlessError, Result};
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Sequence index and size tag carried by multi-image Z-codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZCodeTag {
    pub index: u16,
    pub size: u16,
}

/// Header of a decoded Z-code image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZCodeHeader {
    /// Declared count of meaningful Z-code bits
    pub length: u32,
    pub tag: Option<ZCodeTag>,
}

/// `(width, height)` for `pixels` bytes
pub fn zcode_dimensions(pixels: usize) -> (u32, u32) {
    let pixels = pixels.max(1);
    let mut width = (pixels as f64).sqrt() as usize;
    while width * width > pixels {
        width -= 1;
    }
    while (width + 1) * (width + 1) <= pixels {
        width += 1;
    }
    let height = pixels.div_ceil(width);
    (width as u32, height as u32)
}

/// Serialize Z-code bits with a 32-bit length header
pub fn encode_zcode(bits: &[u8]) -> Result<GrayImage> {
    encode_with_tag(bits, None)
}

/// Serialize Z-code bits with length, index and size tag
pub fn encode_zcode_tagged(bits: &[u8], tag: ZCodeTag) -> Result<GrayImage> {
    encode_with_tag(bits, Some(tag))
}

fn encode_with_tag(bits: &[u8], tag: Option<ZCodeTag>) -> Result<GrayImage> {
    let length = u32::try_from(bits.len()).map_err(|_| {
        CoverlessError::InvalidZCodeImage(format!(
            "{} bits exceed the 32-bit length field",
            bits.len()
        ))
    })?;

    let mut stream = Vec::with_capacity(ZCODE_LENGTH_BITS + ZCODE_TAG_BITS + bits.len());
    push_uint(&mut stream, length as u64, ZCODE_LENGTH_BITS);
    if let Some(tag) = tag {
        push_uint(&mut stream, tag.index as u64, 16);
        push_uint(&mut stream, tag.size as u64, 16);
    }
    stream.extend_from_slice(bits);

    let mut pixels = bits_to_bytes(&stream);
    let (width, height) = zcode_dimensions(pixels.len());
    pixels.resize(width as usize * height as usize, 0);

    GrayImage::from_raw(width, height, pixels)
        .ok_or_else(|| CoverlessError::InvalidZCodeImage("pixel buffer size mismatch".into()))
}

/// Read the header of a Z-code image without extracting the bits
pub fn read_zcode_header(image: &GrayImage, tagged: bool) -> Result<ZCodeHeader> {
    let header_bits = ZCODE_LENGTH_BITS + if tagged { ZCODE_TAG_BITS } else { 0 };
    let header_bytes = header_bits / 8;
    let raw = image.as_raw();
    if raw.len() < header_bytes {
        return Err(CoverlessError::InvalidZCodeImage(format!(
            "{}x{} image is smaller than the {}-bit header",
            image.width(),
            image.height(),
            header_bits
        )));
    }

    let bits = bytes_to_bits(&raw[..header_bytes]);
    let length = read_uint(&bits[..ZCODE_LENGTH_BITS]) as u32;
    let tag = tagged.then(|| ZCodeTag {
        index: read_uint(&bits[32..48]) as u16,
        size: read_uint(&bits[48..64]) as u16,
    });
    Ok(ZCodeHeader { length, tag })
}

fn decode_with_header(image: &GrayImage, tagged: bool) -> Result<(Vec<u8>, ZCodeHeader)> {
    let header = read_zcode_header(image, tagged)?;
    let header_bits = ZCODE_LENGTH_BITS + if tagged { ZCODE_TAG_BITS } else { 0 };

    let all_bits = bytes_to_bits(image.as_raw());
    let available = all_bits.len() - header_bits;
    let length = header.length as usize;
    if length > available {
        return Err(CoverlessError::TruncatedZCode {
            required: length,
            available,
        });
    }

    Ok((all_bits[header_bits..header_bits + length].to_vec(), header))
}

/// Recover exactly the declared Z-code bits, ignoring padding
pub fn decode_zcode(image: &GrayImage) -> Result<Vec<u8>> {
    decode_with_header(image, false).map(|(bits, _)| bits)
}

/// Recover Z-code bits and the index/size tag
pub fn decode_zcode_tagged(image: &GrayImage) -> Result<(Vec<u8>, ZCodeTag)> {
    let (bits, header) = decode_with_header(image, true)?;
    let tag = header
        .tag
        .ok_or_else(|| CoverlessError::InvalidZCodeImage("missing tag".into()))?;
    Ok((bits, tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| ((i * 5 + i / 7) % 2) as u8).collect()
    }

    #[test]
    fn test_dimensions_near_square() {
        assert_eq!(zcode_dimensions(4), (2, 2));
        assert_eq!(zcode_dimensions(5), (2, 3));
        assert_eq!(zcode_dimensions(16), (4, 4));
        assert_eq!(zcode_dimensions(17), (4, 5));
        assert_eq!(zcode_dimensions(99), (9, 11));
    }

    #[test]
    fn test_roundtrip_plain() {
        for len in [0, 1, 7, 8, 9, 105, 1000] {
            let bits = pattern(len);
            let image = encode_zcode(&bits).unwrap();
            assert_eq!(decode_zcode(&image).unwrap(), bits, "length {len}");
        }
    }

    #[test]
    fn test_layout_and_padding() {
        // 32 + 12 = 44 bits -> 6 bytes -> 2x3 raster
        let bits = vec![1u8; 12];
        let image = encode_zcode(&bits).unwrap();
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(image.as_raw(), &vec![0, 0, 0, 12, 0xff, 0xf0]);
    }

    #[test]
    fn test_trailing_pixels_zero() {
        // 32 + 8 = 5 bytes -> 2x3 raster with one zero pixel
        let image = encode_zcode(&[1; 8]).unwrap();
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(image.as_raw()[5], 0);
    }

    #[test]
    fn test_roundtrip_tagged() {
        let bits = pattern(300);
        let tag = ZCodeTag { index: 3, size: 512 };
        let image = encode_zcode_tagged(&bits, tag).unwrap();
        let (decoded, decoded_tag) = decode_zcode_tagged(&image).unwrap();
        assert_eq!(decoded, bits);
        assert_eq!(decoded_tag, tag);

        let header = read_zcode_header(&image, true).unwrap();
        assert_eq!(header.length, 300);
    }

    #[test]
    fn test_too_small_image() {
        let image = GrayImage::new(1, 3);
        assert!(matches!(
            decode_zcode(&image),
            Err(CoverlessError::InvalidZCodeImage(_))
        ));
    }

    #[test]
    fn test_declared_length_exceeds_available() {
        // Declares 1000 bits, carries 32
        let image = GrayImage::from_raw(2, 4, vec![0, 0, 0x03, 0xe8, 1, 2, 3, 4]).unwrap();
        match decode_zcode(&image) {
            Err(CoverlessError::TruncatedZCode { required: 1000, available: 32 }) => {}
            other => panic!("expected TruncatedZCode, got {other:?}"),
        }
    }
}
