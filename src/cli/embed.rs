use crate::config::StegoConfig;
use crate::error::Result;
use crate::payload::Secret;
use crate::raster::Raster;
use crate::stego::{embed, EmbedReport};
use crate::zcode::{encode_zcode, encode_zcode_tagged, ZCodeTag};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// Where the secret comes from
#[derive(Debug, Clone)]
pub enum SecretSource {
    Text(String),
    TextFile(PathBuf),
    Image(PathBuf),
}

impl SecretSource {
    pub fn load(&self) -> Result<Secret> {
        Ok(match self {
            Self::Text(text) => Secret::Text(text.clone()),
            Self::TextFile(path) => Secret::Text(std::fs::read_to_string(path)?),
            Self::Image(path) => Secret::Image(image::open(path)?),
        })
    }
}

/// Options for the embed command
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    pub key: Option<String>,
    pub config: StegoConfig,
    /// Write a tagged Z-code carrying index and size tag
    pub tag: Option<ZCodeTag>,
    /// Write the embed report as JSON here
    pub report: Option<PathBuf>,
}

/// Load a carrier image as its grayscale raster
pub fn load_carrier(path: &Path) -> Result<Raster> {
    Ok(Raster::from_image(&image::open(path)?))
}

/// Embed a secret against a carrier and write the Z-code PNG
pub fn embed_to_zcode(
    carrier_path: &Path,
    source: &SecretSource,
    output_path: &Path,
    options: &EmbedOptions,
) -> Result<EmbedReport> {
    let carrier = load_carrier(carrier_path)?;
    let secret = source.load()?;

    let embedding = embed(&carrier, &secret, options.key.as_deref(), &options.config)?;

    let zcode = match options.tag {
        Some(tag) => encode_zcode_tagged(&embedding.zcode, tag)?,
        None => encode_zcode(&embedding.zcode)?,
    };
    zcode.save_with_format(output_path, ImageFormat::Png)?;

    if let Some(report_path) = &options.report {
        std::fs::write(report_path, serde_json::to_string_pretty(&embedding.report)?)?;
    }

    Ok(embedding.report)
}
