use crate::config::{BitMode, StegoConfig, BLOCK_SIZE};
use crate::error::Result;
use crate::payload::{encode_text, Secret};
use crate::raster::validate_dimensions;
use crate::secret_image::required_image_bits;
use serde::Serialize;

/// Square carrier sides offered when recommending a size
pub const AVAILABLE_SIZES: [u32; 7] = [64, 128, 256, 512, 1024, 2048, 4096];

/// Embeddable bits: `(w/8) * (h/8) * 21 * bits_per_average`
pub fn capacity(width: u32, height: u32, mode: BitMode) -> Result<usize> {
    validate_dimensions(width, height)?;
    let tiles = (width as usize / BLOCK_SIZE) * (height as usize / BLOCK_SIZE);
    Ok(tiles * mode.bits_per_unit())
}

/// Smallest square side in [`AVAILABLE_SIZES`] whose capacity holds
/// `required_bits`, or the largest side if none does
pub fn recommended_size(required_bits: usize, mode: BitMode) -> u32 {
    AVAILABLE_SIZES
        .iter()
        .copied()
        .find(|&side| (side as usize / BLOCK_SIZE).pow(2) * mode.bits_per_unit() >= required_bits)
        .unwrap_or(AVAILABLE_SIZES[AVAILABLE_SIZES.len() - 1])
}

/// Remaining capacity as (24-bit RGB pixels, bytes)
pub fn remaining_capacity(capacity_bits: usize, used_bits: usize) -> (usize, usize) {
    let remaining = capacity_bits.saturating_sub(used_bits);
    (remaining / 24, remaining / 8)
}

/// How a secret maps onto a carrier size
#[derive(Debug, Clone, Serialize)]
pub struct CapacityPlan {
    pub capacity_bits: usize,
    /// Framed payload bits (prefix + content)
    pub payload_bits: usize,
    /// Stored dimensions for image secrets, after any downscaling
    pub stored_size: Option<(u32, u32)>,
}

impl CapacityPlan {
    pub fn fits(&self) -> bool {
        self.payload_bits <= self.capacity_bits
    }

    pub fn headroom_bits(&self) -> usize {
        self.capacity_bits.saturating_sub(self.payload_bits)
    }
}

/// Plan a secret against a carrier of the given dimensions
pub fn plan(
    width: u32,
    height: u32,
    secret: &Secret,
    config: &StegoConfig,
) -> Result<CapacityPlan> {
    let capacity_bits = capacity(width, height, config.bit_mode)?;
    let prefix = config.prefix_bits();
    let (content_bits, stored_size) = match secret {
        Secret::Text(text) => (encode_text(text).len(), None),
        Secret::Image(image) => {
            let target = capacity_bits.saturating_sub(prefix);
            let (bits, dims) = required_image_bits(image, Some(target));
            (bits, Some(dims))
        }
    };
    Ok(CapacityPlan {
        capacity_bits,
        payload_bits: prefix + content_bits,
        stored_size,
    })
}
