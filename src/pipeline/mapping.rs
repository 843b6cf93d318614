/// `MAPPING_TABLE[m][c]` is the Z bit for message bit `m` and cover bit `c` (XNOR).
/// The table is its own inverse: `recover(combine(m, c), c) == m`.
pub const MAPPING_TABLE: [[u8; 2]; 2] = [[1, 0], [0, 1]];

/// Combine a payload bit with a cover bit into a Z bit
pub fn combine(payload_bit: u8, cover_bit: u8) -> u8 {
    MAPPING_TABLE[(payload_bit & 1) as usize][(cover_bit & 1) as usize]
}

/// Recover the payload bit from a Z bit and the same cover bit
pub fn recover(z_bit: u8, cover_bit: u8) -> u8 {
    combine(z_bit, cover_bit)
}

/// Map a bit sequence against cover bits position by position.
/// Used in both directions; the output has the length of the shorter input.
pub fn map_bits(bits: &[u8], cover: &[u8]) -> Vec<u8> {
    bits.iter().zip(cover).map(|(&b, &c)| combine(b, c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_xnor() {
        assert_eq!(combine(0, 0), 1);
        assert_eq!(combine(0, 1), 0);
        assert_eq!(combine(1, 0), 0);
        assert_eq!(combine(1, 1), 1);
    }

    #[test]
    fn test_involution() {
        for p in 0..2u8 {
            for c in 0..2u8 {
                assert_eq!(recover(combine(p, c), c), p);
            }
        }
    }

    #[test]
    fn test_map_bits_roundtrip() {
        let payload = vec![1, 0, 1, 1, 0, 0, 1];
        let cover = vec![0, 0, 1, 0, 1, 1, 1];
        let z = map_bits(&payload, &cover);
        assert_eq!(z, vec![0, 1, 1, 0, 0, 0, 1]);
        assert_eq!(map_bits(&z, &cover), payload);
    }
}
