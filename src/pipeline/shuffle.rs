use digest::Digest;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha3::Sha3_256;

const SHUFFLE_DOMAIN: &[u8] = b"coverless_shuffle_v1";

/// Shuffle content bits with a permutation derived from the key.
/// KEYED: no key (or no bits) leaves the sequence unchanged.
/// `shuffled[i] = bits[permutation[i]]`
pub fn shuffle_bits(bits: &[u8], key: Option<&str>) -> Vec<u8> {
    match key {
        Some(k) if !bits.is_empty() => {
            let permutation = key_permutation(bits.len(), k);
            permutation.iter().map(|&src| bits[src]).collect()
        }
        _ => bits.to_vec(),
    }
}

/// Exact inverse of [`shuffle_bits`] for the same key
pub fn unshuffle_bits(bits: &[u8], key: Option<&str>) -> Vec<u8> {
    match key {
        Some(k) if !bits.is_empty() => {
            let inverse = invert_permutation(&key_permutation(bits.len(), k));
            inverse.iter().map(|&pos| bits[pos]).collect()
        }
        _ => bits.to_vec(),
    }
}

/// Deterministic permutation of `0..len`, a pure function of (key, len).
///
/// Reverse Fisher-Yates over a ChaCha20 stream seeded from a hash of the key.
/// Draws are `u32` ranges so the permutation is identical on 32- and 64-bit
/// targets; Z-codes depend on it staying fixed.
pub fn key_permutation(len: usize, key: &str) -> Vec<usize> {
    let mut rng = ChaCha20Rng::from_seed(compute_seed(key));
    let mut permutation: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        let j = rng.gen_range(0..=(i as u32)) as usize;
        permutation.swap(i, j);
    }
    permutation
}

/// Rank of each source index in the forward permutation
pub fn invert_permutation(permutation: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0usize; permutation.len()];
    for (new_pos, &old_pos) in permutation.iter().enumerate() {
        inverse[old_pos] = new_pos;
    }
    inverse
}

/// Compute a 32-byte seed from the key
fn compute_seed(key: &str) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(SHUFFLE_DOMAIN);
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}
