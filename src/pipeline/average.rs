use crate::config::{AVERAGES_PER_UNIT, BLOCK_SIZE, LAYER1_COUNT, LAYER2_COUNT};
use crate::raster::Tile;

/// The 21 hierarchical averages of one tile: Layer 1 (16) ++ Layer 2 (4) ++ Layer 3 (1)
pub type AverageSet = [u8; AVERAGES_PER_UNIT];

/// Side of the Layer 1 grid (4x4 averages of 2x2 sub-blocks)
const LAYER1_SIDE: usize = 4;

/// Integer mean, rounded half up
fn rounded_mean(sum: u32, count: u32) -> u8 {
    ((sum + count / 2) / count) as u8
}

/// Compute the AverageSet of a tile
pub fn hierarchical_averages(tile: &Tile<'_>) -> AverageSet {
    averages_from_block(&tile.bytes())
}

/// Compute the AverageSet of 64 row-major samples.
///
/// Layer 2 groups Layer 1 by spatial quadrant of its 4x4 grid, so quadrant 0
/// averages Layer 1 indices {0, 1, 4, 5}, not {0, 1, 2, 3}.
pub fn averages_from_block(block: &[u8; BLOCK_SIZE * BLOCK_SIZE]) -> AverageSet {
    let mut out = [0u8; AVERAGES_PER_UNIT];

    // Layer 1: 2x2 sub-blocks, row-major over the 4x4 grid
    for r in 0..LAYER1_SIDE {
        for c in 0..LAYER1_SIDE {
            let mut sum = 0u32;
            for dy in 0..2 {
                for dx in 0..2 {
                    sum += block[(2 * r + dy) * BLOCK_SIZE + 2 * c + dx] as u32;
                }
            }
            out[r * LAYER1_SIDE + c] = rounded_mean(sum, 4);
        }
    }

    // Layer 2: quadrants of the Layer 1 grid
    for qr in 0..2 {
        for qc in 0..2 {
            let mut sum = 0u32;
            for dr in 0..2 {
                for dc in 0..2 {
                    sum += out[(2 * qr + dr) * LAYER1_SIDE + 2 * qc + dc] as u32;
                }
            }
            out[LAYER1_COUNT + qr * 2 + qc] = rounded_mean(sum, 4);
        }
    }

    // Layer 3: mean of Layer 2
    let layer2 = &out[LAYER1_COUNT..LAYER1_COUNT + LAYER2_COUNT];
    let sum: u32 = layer2.iter().map(|&v| v as u32).sum();
    out[AVERAGES_PER_UNIT - 1] = rounded_mean(sum, LAYER2_COUNT as u32);

    out
}
