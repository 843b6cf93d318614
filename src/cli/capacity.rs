use crate::capacity::{plan, recommended_size, remaining_capacity, CapacityPlan};
use crate::cli::embed::SecretSource;
use crate::config::{StegoConfig, BLOCK_SIZE};
use crate::error::Result;
use std::fmt::Write;
use std::path::PathBuf;

/// Carrier to size: explicit dimensions or an image file
#[derive(Debug, Clone)]
pub enum CarrierSize {
    Dimensions { width: u32, height: u32 },
    Carrier(PathBuf),
}

impl CarrierSize {
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        match self {
            Self::Dimensions { width, height } => Ok((*width, *height)),
            Self::Carrier(path) => Ok(image::image_dimensions(path)?),
        }
    }
}

/// Options for the capacity command
#[derive(Debug, Clone, Default)]
pub struct CapacityOptions {
    pub config: StegoConfig,
    /// Payload bits to plan for
    pub required_bits: Option<usize>,
    /// Secret to plan for, framed with the configured prefix
    pub secret: Option<SecretSource>,
}

/// Describe how much a carrier can hold
pub fn show_capacity(size: &CarrierSize, options: &CapacityOptions) -> Result<String> {
    let (width, height) = size.dimensions()?;
    let mode = options.config.bit_mode;
    let capacity = crate::capacity::capacity(width, height, mode)?;
    let tiles = (width as usize / BLOCK_SIZE) * (height as usize / BLOCK_SIZE);

    let mut output = String::new();
    writeln!(output, "Carrier: {}x{} ({} tiles)", width, height, tiles).ok();
    writeln!(output, "Mode: {:?} ({} bits/tile)", mode, mode.bits_per_unit()).ok();
    writeln!(output, "Capacity: {} bits ({} bytes)", capacity, capacity / 8).ok();

    let plan = match &options.secret {
        Some(source) => {
            let plan = plan(width, height, &source.load()?, &options.config)?;
            if let Some((w, h)) = plan.stored_size {
                writeln!(output, "Secret image stored at: {}x{}", w, h).ok();
            }
            Some(plan)
        }
        None => options.required_bits.map(|payload_bits| CapacityPlan {
            capacity_bits: capacity,
            payload_bits,
            stored_size: None,
        }),
    };

    if let Some(plan) = plan {
        let (pixels, bytes) = remaining_capacity(plan.capacity_bits, plan.payload_bits);
        let side = recommended_size(plan.payload_bits, mode);
        writeln!(output, "Required: {} bits", plan.payload_bits).ok();
        writeln!(output, "Fits: {}", if plan.fits() { "yes" } else { "no" }).ok();
        writeln!(
            output,
            "Remaining: {} bits ({} RGB pixels / {} bytes)",
            plan.headroom_bits(),
            pixels,
            bytes
        )
        .ok();
        writeln!(output, "Recommended carrier: {}x{}", side, side).ok();
    }

    Ok(output)
}
