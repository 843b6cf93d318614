use crate::config::BitMode;
use crate::error::Result;
use crate::pipeline::average::{hierarchical_averages, AverageSet};
use crate::pipeline::permute::{derive_q, reorder};
use crate::raster::{Raster, Tile};

/// Read cover bits from reordered averages.
/// `Msb` emits `value >= 128` per average, `Full` emits all 8 bits MSB first.
pub fn cover_bits(averages: &AverageSet, mode: BitMode) -> Vec<u8> {
    match mode {
        BitMode::Msb => averages.iter().map(|&v| v >> 7).collect(),
        BitMode::Full => averages
            .iter()
            .flat_map(|&v| (0..8).rev().map(move |shift| (v >> shift) & 1))
            .collect(),
    }
}

/// Averages → Q → reorder → cover bits for a single tile
pub fn tile_cover_bits(tile: &Tile<'_>, key: Option<&str>, mode: BitMode) -> Vec<u8> {
    let q = derive_q(&tile.bytes(), key);
    let averages = hierarchical_averages(tile);
    cover_bits(&reorder(&averages, &q), mode)
}

/// Cover bits drawn from a carrier, in tile-then-position order
#[derive(Debug, Clone)]
pub struct CoverStream {
    pub bits: Vec<u8>,
    /// Tiles read to produce `bits`
    pub tiles_used: usize,
}

/// Collect exactly `needed` cover bits, stopping at the first tile that
/// completes the count. Tiles past that point are never read. Returns fewer
/// bits only when the carrier runs out; callers check capacity first.
pub fn cover_stream(
    carrier: &Raster,
    key: Option<&str>,
    mode: BitMode,
    needed: usize,
) -> Result<CoverStream> {
    let mut bits = Vec::with_capacity(needed);
    let mut tiles_used = 0;

    for tile in carrier.tiles()? {
        if bits.len() >= needed {
            break;
        }
        bits.extend(tile_cover_bits(&tile, key, mode));
        tiles_used += 1;
    }
    bits.truncate(needed);

    tracing::debug!(needed, tiles_used, tiles = carrier.tile_count(), "collected cover bits");
    Ok(CoverStream { bits, tiles_used })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AVERAGES_PER_UNIT;

    fn sample_averages() -> AverageSet {
        let mut averages = [0u8; AVERAGES_PER_UNIT];
        averages[0] = 128;
        averages[1] = 127;
        averages[2] = 255;
        averages[3] = 0b1010_0101;
        averages
    }

    #[test]
    fn test_msb_mode() {
        let bits = cover_bits(&sample_averages(), BitMode::Msb);
        assert_eq!(bits.len(), 21);
        assert_eq!(&bits[..4], &[1, 0, 1, 1]);
        assert!(bits[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_full_mode() {
        let bits = cover_bits(&sample_averages(), BitMode::Full);
        assert_eq!(bits.len(), 168);
        assert_eq!(&bits[..8], &[1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bits[8..16], &[0, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(&bits[24..32], &[1, 0, 1, 0, 0, 1, 0, 1]);
    }

    fn noisy(width: u32, height: u32) -> Raster {
        let samples = (0..width * height)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        Raster::new(width, height, samples).unwrap()
    }

    #[test]
    fn test_cover_stream_stops_early() {
        let carrier = noisy(32, 32);
        let stream = cover_stream(&carrier, Some("k"), BitMode::Msb, 30).unwrap();
        assert_eq!(stream.bits.len(), 30);
        assert_eq!(stream.tiles_used, 2);
    }

    #[test]
    fn test_cover_stream_matches_tiles() {
        let carrier = noisy(16, 8);
        let stream = cover_stream(&carrier, None, BitMode::Full, 336).unwrap();
        let expected: Vec<u8> = carrier
            .tiles()
            .unwrap()
            .flat_map(|t| tile_cover_bits(&t, None, BitMode::Full))
            .collect();
        assert_eq!(stream.bits, expected);
        assert_eq!(stream.tiles_used, 2);
    }

    #[test]
    fn test_cover_stream_rejects_bad_dimensions() {
        let carrier = Raster::new(10, 8, vec![0; 80]).unwrap();
        assert!(cover_stream(&carrier, None, BitMode::Msb, 1).is_err());
    }
}
