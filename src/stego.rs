use crate::capacity::capacity;
use crate::config::{BitMode, Checksum, SecretKind, StegoConfig};
use crate::error::{CoverlessError, Result};
use crate::payload::{assemble, decode_text, encode_text, split, Secret};
use crate::pipeline::{checksum, cover_stream, map_bits, shuffle_bits, unshuffle_bits};
use crate::raster::Raster;
use crate::secret_image::{decode_image, encode_image, ColorClass, ImageHeader};
use serde::Serialize;

/// Empty keys behave exactly like an absent key
pub fn normalize_key(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.is_empty())
}

/// Kind-specific sizes of an embedded or recovered secret
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SecretDetails {
    Text {
        /// Characters (not bytes)
        length: usize,
    },
    Image {
        original_size: (u16, u16),
        stored_size: (u16, u16),
        color: ColorClass,
    },
}

impl SecretDetails {
    fn of_image(header: &ImageHeader) -> Self {
        Self::Image {
            original_size: (header.original_width, header.original_height),
            stored_size: (header.width, header.height),
            color: header.color,
        }
    }
}

/// Metadata produced alongside the Z-code
#[derive(Debug, Clone, Serialize)]
pub struct EmbedReport {
    pub kind: SecretKind,
    pub details: SecretDetails,
    /// Framed payload length, equal to the Z-code length
    pub payload_bits: usize,
    pub content_bits: usize,
    pub capacity_bits: usize,
    pub tiles_used: usize,
    pub bit_mode: BitMode,
    pub checksum: Checksum,
}

/// Result of [`embed`]
#[derive(Debug, Clone)]
pub struct Embedding {
    pub zcode: Vec<u8>,
    pub capacity: usize,
    pub report: EmbedReport,
}

/// Metadata produced alongside a recovered secret
#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub kind: SecretKind,
    pub type_marker: u8,
    pub details: SecretDetails,
    pub total_bits: usize,
    pub content_bits: usize,
}

/// Result of [`extract`] / [`detect_and_extract`]
#[derive(Debug, Clone)]
pub struct Extraction {
    pub secret: Secret,
    pub report: ExtractReport,
}

/// Embed a secret against an unmodified carrier.
///
/// Pipeline: Content → Shuffle → [Checksum|Marker|Content] → Map with cover bits → Z-code.
/// Fails before producing any Z-code bit if the carrier does not tile or the
/// framed payload exceeds capacity.
pub fn embed(
    carrier: &Raster,
    secret: &Secret,
    key: Option<&str>,
    config: &StegoConfig,
) -> Result<Embedding> {
    let key = normalize_key(key);

    // Step 1: Capacity is fixed by carrier size and mode
    let capacity = capacity(carrier.width(), carrier.height(), config.bit_mode)?;
    let prefix = config.prefix_bits();

    // Step 2: Content bits (images downscale to what is left after the prefix)
    let (content, details) = match secret {
        Secret::Text(text) => (
            encode_text(text),
            SecretDetails::Text {
                length: text.chars().count(),
            },
        ),
        Secret::Image(image) => {
            let encoded = encode_image(image, Some(capacity.saturating_sub(prefix)))?;
            let details = SecretDetails::of_image(&encoded.header);
            (encoded.bits, details)
        }
    };

    let required = prefix + content.len();
    if required > capacity {
        return Err(CoverlessError::CapacityExceeded { required, capacity });
    }

    // Step 3: Checksum binds (key, carrier); recomputed on extraction
    let checksum_bits = match config.checksum {
        Checksum::Sha256 => checksum(key, carrier).to_vec(),
        Checksum::None => Vec::new(),
    };

    // Step 4: Shuffle content only, then frame
    let shuffled = shuffle_bits(&content, key);
    let payload = assemble(&checksum_bits, secret.kind(), &shuffled);

    // Step 5: One Z bit per cover bit, tile-then-position order
    let cover = cover_stream(carrier, key, config.bit_mode, payload.len())?;
    let zcode = map_bits(&payload, &cover.bits);

    tracing::debug!(
        capacity,
        payload_bits = payload.len(),
        tiles_used = cover.tiles_used,
        "embedded secret"
    );

    Ok(Embedding {
        capacity,
        report: EmbedReport {
            kind: secret.kind(),
            details,
            payload_bits: payload.len(),
            content_bits: content.len(),
            capacity_bits: capacity,
            tiles_used: cover.tiles_used,
            bit_mode: config.bit_mode,
            checksum: config.checksum,
        },
        zcode,
    })
}

/// Extract a secret of an expected kind. A type marker naming the other kind
/// is a [`CoverlessError::ContentDecodeFailure`].
pub fn extract(
    carrier: &Raster,
    zcode: &[u8],
    expected: SecretKind,
    key: Option<&str>,
    config: &StegoConfig,
) -> Result<Extraction> {
    let extraction = detect_and_extract(carrier, zcode, key, config)?;
    if extraction.report.kind != expected {
        return Err(CoverlessError::ContentDecodeFailure(format!(
            "type marker says {:?}, expected {:?}",
            extraction.report.kind, expected
        )));
    }
    Ok(extraction)
}

/// Extract a secret, inferring its kind from the type marker.
///
/// Recomputes the cover bits from the carrier, recovers the payload,
/// authenticates the checksum before touching the content, then unshuffles
/// and decodes.
pub fn detect_and_extract(
    carrier: &Raster,
    zcode: &[u8],
    key: Option<&str>,
    config: &StegoConfig,
) -> Result<Extraction> {
    let key = normalize_key(key);

    // Step 1: Size checks before any per-tile work
    let capacity = capacity(carrier.width(), carrier.height(), config.bit_mode)?;
    let prefix = config.prefix_bits();
    if zcode.len() < prefix {
        return Err(CoverlessError::TruncatedZCode {
            required: prefix,
            available: zcode.len(),
        });
    }
    if zcode.len() > capacity {
        return Err(CoverlessError::CapacityExceeded {
            required: zcode.len(),
            capacity,
        });
    }

    // Step 2: Recompute cover bits and invert the mapping
    let cover = cover_stream(carrier, key, config.bit_mode, zcode.len())?;
    let payload = map_bits(zcode, &cover.bits);
    let parsed = split(&payload, config)?;

    // Step 3: Fast reject on checksum mismatch
    if config.checksum == Checksum::Sha256 && parsed.checksum != checksum(key, carrier) {
        tracing::warn!("checksum mismatch: wrong key or wrong carrier");
        return Err(CoverlessError::AuthenticationFailure);
    }

    // Step 4: Unshuffle and decode by type marker
    let content = unshuffle_bits(parsed.content, key);
    let kind = parsed.kind();
    let (secret, details) = match kind {
        SecretKind::Text => {
            let text = decode_text(&content)?;
            let details = SecretDetails::Text {
                length: text.chars().count(),
            };
            (Secret::Text(text), details)
        }
        SecretKind::Image => {
            let (image, header) = decode_image(&content)?;
            (Secret::Image(image), SecretDetails::of_image(&header))
        }
    };

    tracing::debug!(?kind, total_bits = payload.len(), "extracted secret");

    Ok(Extraction {
        secret,
        report: ExtractReport {
            kind,
            type_marker: parsed.marker,
            details,
            total_bits: payload.len(),
            content_bits: content.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn carrier(width: u32, height: u32, salt: u32) -> Raster {
        let samples = (0..width * height)
            .map(|i| ((i ^ salt).wrapping_mul(2654435761) >> 11) as u8)
            .collect();
        Raster::new(width, height, samples).unwrap()
    }

    #[test]
    fn test_text_roundtrip_with_key() {
        let cover = carrier(64, 64, 1);
        let secret = Secret::Text("coverless 隱藏".into());
        let config = StegoConfig::default();

        let embedding = embed(&cover, &secret, Some("alice"), &config).unwrap();
        assert_eq!(embedding.zcode.len(), embedding.report.payload_bits);
        assert_eq!(embedding.capacity, 64 * 21);

        let extraction =
            extract(&cover, &embedding.zcode, SecretKind::Text, Some("alice"), &config).unwrap();
        assert_eq!(extraction.secret.as_text(), Some("coverless 隱藏"));
        assert_eq!(extraction.report.type_marker, 0);
    }

    #[test]
    fn test_text_roundtrip_without_key() {
        let cover = carrier(32, 32, 2);
        let secret = Secret::Text("no key".into());
        let config = StegoConfig::new(BitMode::Full, Checksum::Sha256);
        let embedding = embed(&cover, &secret, None, &config).unwrap();
        let extraction = detect_and_extract(&cover, &embedding.zcode, None, &config).unwrap();
        assert_eq!(extraction.secret.as_text(), Some("no key"));
    }

    #[test]
    fn test_empty_key_is_no_key() {
        let cover = carrier(32, 32, 3);
        let secret = Secret::Text("same".into());
        let config = StegoConfig::default();
        let a = embed(&cover, &secret, Some(""), &config).unwrap();
        let b = embed(&cover, &secret, None, &config).unwrap();
        assert_eq!(a.zcode, b.zcode);
    }

    #[test]
    fn test_embed_is_deterministic() {
        let cover = carrier(32, 32, 4);
        let secret = Secret::Text("repeat".into());
        let config = StegoConfig::default();
        let a = embed(&cover, &secret, Some("k"), &config).unwrap();
        let b = embed(&cover, &secret, Some("k"), &config).unwrap();
        assert_eq!(a.zcode, b.zcode);
    }

    #[test]
    fn test_capacity_exceeded() {
        let cover = carrier(8, 8, 5);
        let secret = Secret::Text("too long for one tile".into());
        match embed(&cover, &secret, Some("k"), &StegoConfig::default()) {
            Err(CoverlessError::CapacityExceeded { required, capacity }) => {
                assert_eq!(required, 9 + 21 * 8);
                assert_eq!(capacity, 21);
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_dimensions_fail_first() {
        let cover = Raster::new(12, 8, vec![0; 96]).unwrap();
        let secret = Secret::Text("x".into());
        assert!(matches!(
            embed(&cover, &secret, None, &StegoConfig::default()),
            Err(CoverlessError::InvalidCarrierDimensions { .. })
        ));
        assert!(matches!(
            detect_and_extract(&cover, &[0; 20], None, &StegoConfig::default()),
            Err(CoverlessError::InvalidCarrierDimensions { .. })
        ));
    }

    #[test]
    fn test_truncated_zcode() {
        let cover = carrier(16, 16, 6);
        match detect_and_extract(&cover, &[1, 0, 1], None, &StegoConfig::default()) {
            Err(CoverlessError::TruncatedZCode { required: 9, available: 3 }) => {}
            other => panic!("expected TruncatedZCode, got {other:?}"),
        }
    }

    #[test]
    fn test_zcode_longer_than_capacity() {
        let cover = carrier(8, 8, 7);
        let result = detect_and_extract(&cover, &[0; 22], None, &StegoConfig::default());
        assert!(matches!(result, Err(CoverlessError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_kind_mismatch() {
        let cover = carrier(32, 32, 8);
        let config = StegoConfig::default();
        let embedding = embed(&cover, &Secret::Text("hi".into()), None, &config).unwrap();
        let result = extract(&cover, &embedding.zcode, SecretKind::Image, None, &config);
        assert!(matches!(result, Err(CoverlessError::ContentDecodeFailure(_))));
    }

    #[test]
    fn test_image_roundtrip_full_mode() {
        let cover = carrier(128, 128, 9);
        let config = StegoConfig::new(BitMode::Full, Checksum::Sha256);
        let secret_img = DynamicImage::ImageRgb8(RgbImage::from_fn(40, 40, |x, y| {
            Rgb([x as u8 * 6, y as u8 * 6, 90])
        }));

        let embedding = embed(&cover, &Secret::Image(secret_img), Some("k"), &config).unwrap();
        assert!(embedding.zcode.len() <= embedding.capacity);

        let extraction = detect_and_extract(&cover, &embedding.zcode, Some("k"), &config).unwrap();
        let SecretDetails::Image {
            original_size,
            stored_size,
            color,
        } = extraction.report.details
        else {
            panic!("expected image details");
        };
        assert_eq!(original_size, (40, 40));
        assert_eq!(color, ColorClass::Rgb);
        // 256 tiles * 168 = 43008 bits; 40x40 RGB needs 38466, fits unscaled
        assert_eq!(stored_size, (40, 40));
        let image = extraction.secret.as_image().unwrap();
        assert_eq!((image.width(), image.height()), (40, 40));
    }

    #[test]
    fn test_checksum_disabled_roundtrip() {
        let cover = carrier(32, 32, 10);
        let config = StegoConfig::new(BitMode::Msb, Checksum::None);
        let embedding = embed(&cover, &Secret::Text("bare".into()), Some("k"), &config).unwrap();
        assert_eq!(embedding.zcode.len(), 1 + 32);
        let extraction = detect_and_extract(&cover, &embedding.zcode, Some("k"), &config).unwrap();
        assert_eq!(extraction.secret.as_text(), Some("bare"));
    }

    #[test]
    fn test_report_serializes() {
        let cover = carrier(32, 32, 11);
        let secret = Secret::Text("json".into());
        let embedding = embed(&cover, &secret, None, &StegoConfig::default()).unwrap();
        let json = serde_json::to_value(&embedding.report).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["details"]["type"], "text");
        assert_eq!(json["details"]["length"], 4);
        assert_eq!(json["bit_mode"], "msb");
    }
}
