//! Payload framing and the text codec.
//!
//! Layout: `[checksum (8, optional)] [type marker (1)] [content bits]`.
//! Only the content bits are shuffled; the checksum and marker stay in place
//! so a wrong key still yields an interpretable fail signal. There is no
//! length field: the Z-code length fixes the content length exactly.

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::config::{SecretKind, StegoConfig};
use crate::error::{CoverlessError, Result};
use image::DynamicImage;

/// A secret to hide, or one recovered
#[derive(Debug, Clone)]
pub enum Secret {
    Text(String),
    Image(DynamicImage),
}

impl Secret {
    pub fn kind(&self) -> SecretKind {
        match self {
            Self::Text(_) => SecretKind::Text,
            Self::Image(_) => SecretKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&DynamicImage> {
        match self {
            Self::Text(_) => None,
            Self::Image(image) => Some(image),
        }
    }
}

/// UTF-8 bytes, MSB first
pub fn encode_text(text: &str) -> Vec<u8> {
    bytes_to_bits(text.as_bytes())
}

pub fn decode_text(bits: &[u8]) -> Result<String> {
    if bits.len() % 8 != 0 {
        return Err(CoverlessError::ContentDecodeFailure(format!(
            "text content of {} bits is not a whole number of bytes",
            bits.len()
        )));
    }
    String::from_utf8(bits_to_bytes(bits))
        .map_err(|e| CoverlessError::ContentDecodeFailure(format!("invalid UTF-8: {}", e)))
}

/// Concatenate checksum, type marker and (already shuffled) content
pub fn assemble(checksum: &[u8], kind: SecretKind, content: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(checksum.len() + 1 + content.len());
    payload.extend_from_slice(checksum);
    payload.push(kind.marker());
    payload.extend_from_slice(content);
    payload
}

/// A payload split back into its fields
#[derive(Debug, Clone, Copy)]
pub struct ParsedPayload<'a> {
    /// Empty when the checksum is disabled
    pub checksum: &'a [u8],
    pub marker: u8,
    pub content: &'a [u8],
}

impl ParsedPayload<'_> {
    pub fn kind(&self) -> SecretKind {
        SecretKind::from_marker(self.marker)
    }
}

/// Split a recovered payload according to the framing configuration
pub fn split<'a>(payload: &'a [u8], config: &StegoConfig) -> Result<ParsedPayload<'a>> {
    let prefix = config.prefix_bits();
    if payload.len() < prefix {
        return Err(CoverlessError::TruncatedZCode {
            required: prefix,
            available: payload.len(),
        });
    }
    let checksum_bits = config.checksum.bits();
    Ok(ParsedPayload {
        checksum: &payload[..checksum_bits],
        marker: payload[checksum_bits],
        content: &payload[prefix..],
    })
}
