use crate::cli::embed::load_carrier;
use crate::config::StegoConfig;
use crate::error::Result;
use crate::payload::Secret;
use crate::stego::{detect_and_extract, ExtractReport};
use crate::zcode::{decode_zcode, decode_zcode_tagged};
use image::ImageFormat;
use std::path::Path;

/// Options for the extract command
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub key: Option<String>,
    pub config: StegoConfig,
    /// Z-code image carries index and size tag
    pub tagged: bool,
}

/// Recover the secret from a carrier and Z-code PNG.
/// Text is written as UTF-8, images as PNG.
pub fn extract_from_zcode(
    carrier_path: &Path,
    zcode_path: &Path,
    output_path: &Path,
    options: &ExtractOptions,
) -> Result<ExtractReport> {
    let carrier = load_carrier(carrier_path)?;
    let zcode_image = image::open(zcode_path)?.to_luma8();
    let zcode = if options.tagged {
        let (bits, tag) = decode_zcode_tagged(&zcode_image)?;
        tracing::debug!(index = tag.index, size = tag.size, "read tagged Z-code");
        bits
    } else {
        decode_zcode(&zcode_image)?
    };

    let extraction = detect_and_extract(&carrier, &zcode, options.key.as_deref(), &options.config)?;

    match &extraction.secret {
        Secret::Text(text) => std::fs::write(output_path, text)?,
        Secret::Image(image) => image.save_with_format(output_path, ImageFormat::Png)?,
    }

    Ok(extraction.report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::embed::{embed_to_zcode, EmbedOptions, SecretSource};
    use crate::config::{BitMode, Checksum, SecretKind};
    use crate::error::CoverlessError;
    use crate::zcode::ZCodeTag;
    use image::{GrayImage, Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_carrier(path: &Path, side: u32) {
        let img =
            GrayImage::from_fn(side, side, |x, y| image::Luma([((x * 7 + y * 13) % 256) as u8]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_extract_text_roundtrip() {
        let dir = tempdir().unwrap();
        let carrier = dir.path().join("carrier.png");
        let zcode = dir.path().join("zcode.png");
        let output = dir.path().join("out.txt");
        write_carrier(&carrier, 64);

        let embed_options = EmbedOptions {
            key: Some("alice".into()),
            ..Default::default()
        };
        let secret = SecretSource::Text("meet at noon".into());
        embed_to_zcode(&carrier, &secret, &zcode, &embed_options).unwrap();

        let options = ExtractOptions {
            key: Some("alice".into()),
            ..Default::default()
        };
        let report = extract_from_zcode(&carrier, &zcode, &output, &options).unwrap();
        assert_eq!(report.kind, SecretKind::Text);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "meet at noon");
    }

    #[test]
    fn test_extract_image_tagged() {
        let dir = tempdir().unwrap();
        let carrier = dir.path().join("carrier.png");
        let secret = dir.path().join("secret.png");
        let zcode = dir.path().join("zcode.png");
        let output = dir.path().join("out.png");
        write_carrier(&carrier, 64);
        RgbImage::from_fn(6, 4, |x, y| Rgb([x as u8 * 40, y as u8 * 60, 7]))
            .save(&secret)
            .unwrap();

        let config = StegoConfig::new(BitMode::Full, Checksum::Sha256);
        let embed_options = EmbedOptions {
            key: Some("k".into()),
            config,
            tag: Some(ZCodeTag { index: 0, size: 64 }),
            report: None,
        };
        let source = SecretSource::Image(secret.clone());
        embed_to_zcode(&carrier, &source, &zcode, &embed_options).unwrap();

        let options = ExtractOptions {
            key: Some("k".into()),
            config,
            tagged: true,
        };
        let report = extract_from_zcode(&carrier, &zcode, &output, &options).unwrap();
        assert_eq!(report.kind, SecretKind::Image);
        assert_eq!(
            image::open(&output).unwrap().to_rgb8(),
            image::open(&secret).unwrap().to_rgb8()
        );
    }

    #[test]
    fn test_extract_wrong_key() {
        let dir = tempdir().unwrap();
        let carrier = dir.path().join("carrier.png");
        let zcode = dir.path().join("zcode.png");
        write_carrier(&carrier, 64);

        let embed_options = EmbedOptions {
            key: Some("alice".into()),
            ..Default::default()
        };
        let secret = SecretSource::Text("secret".into());
        embed_to_zcode(&carrier, &secret, &zcode, &embed_options).unwrap();

        let options = ExtractOptions {
            key: Some("mallory".into()),
            ..Default::default()
        };
        let result = extract_from_zcode(&carrier, &zcode, &dir.path().join("out.txt"), &options);
        assert!(matches!(result, Err(CoverlessError::AuthenticationFailure)));
    }
}
