use crate::config::{ZCODE_LENGTH_BITS, ZCODE_TAG_BITS};
use crate::error::Result;
use crate::zcode::read_zcode_header;
use std::path::Path;

/// Bytes of Z-code shown in the hex preview
const PREVIEW_BYTES: usize = 16;

/// Display information about a Z-code image
pub fn show_info(path: &Path, tagged: bool) -> Result<String> {
    let image = image::open(path)?.to_luma8();
    let header = read_zcode_header(&image, tagged)?;

    let header_bits = ZCODE_LENGTH_BITS + if tagged { ZCODE_TAG_BITS } else { 0 };
    let stored_bits = image.as_raw().len() * 8;
    let body = &image.as_raw()[header_bits / 8..];
    let preview_len = (header.length as usize).div_ceil(8).min(PREVIEW_BYTES).min(body.len());

    let mut output = String::new();

    output.push_str("Coverless Z-code Information\n");
    output.push_str("============================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Image: {}x{} grayscale\n", image.width(), image.height()));
    output.push_str("\n");

    output.push_str("Header:\n");
    output.push_str(&format!("  Z-code length: {} bits\n", header.length));
    if let Some(tag) = header.tag {
        output.push_str(&format!("  Index: {}\n", tag.index));
        output.push_str(&format!("  Size tag: {}\n", tag.size));
    }
    output.push_str("\n");

    let used = header_bits + header.length as usize;
    output.push_str("Storage:\n");
    output.push_str(&format!("  Pixel bits: {}\n", stored_bits));
    output.push_str(&format!("  Padding bits: {}\n", stored_bits.saturating_sub(used)));
    output.push_str(&format!("  Preview: {}\n", hex::encode(&body[..preview_len])));
    if used > stored_bits {
        output.push_str("  Warning: declared length exceeds image size\n");
    }

    Ok(output)
}
