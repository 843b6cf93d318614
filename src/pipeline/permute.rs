//! Key-derived permutation (Q) of a tile's averages.
//!
//! Q is seven bytes of SHA3-256 over the key and the tile samples, so it is a
//! pure function of (tile, key): extraction recomputes it from the unmodified
//! carrier and never needs to invert it. The order Q induces (stable argsort,
//! ties broken by position) is applied to each of the three groups of seven
//! averages; the same order is reused verbatim for every round.

use crate::config::{AVERAGES_PER_UNIT, Q_LENGTH, Q_ROUNDS};
use crate::pipeline::average::AverageSet;
use digest::Digest;
use sha3::Sha3_256;

/// Per-tile permutation key
pub type PermutationKey = [u8; Q_LENGTH];

const Q_DOMAIN: &[u8] = b"coverless_q_v1";

/// Derive Q from the tile samples and the optional shared key
pub fn derive_q(tile_bytes: &[u8], key: Option<&str>) -> PermutationKey {
    let mut hasher = Sha3_256::new();
    hasher.update(Q_DOMAIN);
    match key {
        Some(k) => {
            hasher.update([1u8]);
            hasher.update((k.len() as u64).to_le_bytes());
            hasher.update(k.as_bytes());
        }
        None => hasher.update([0u8]),
    }
    hasher.update(tile_bytes);
    let digest = hasher.finalize();

    let mut q = [0u8; Q_LENGTH];
    q.copy_from_slice(&digest[..Q_LENGTH]);
    q
}

/// Position order induced by Q: `order[i]` is the group offset read into slot `i`
pub fn q_order(q: &PermutationKey) -> [usize; Q_LENGTH] {
    let mut order: [usize; Q_LENGTH] = std::array::from_fn(|i| i);
    // sort_by_key is stable, equal Q values keep positional order
    order.sort_by_key(|&i| q[i]);
    order
}

/// Source index for each of the 21 output slots
pub fn reorder_indices(q: &PermutationKey) -> [usize; AVERAGES_PER_UNIT] {
    let order = q_order(q);
    let mut indices = [0usize; AVERAGES_PER_UNIT];
    for round in 0..Q_ROUNDS {
        let base = round * Q_LENGTH;
        for (slot, &offset) in order.iter().enumerate() {
            indices[base + slot] = base + offset;
        }
    }
    indices
}

/// Reorder an AverageSet with Q, one round per group of seven
pub fn reorder(averages: &AverageSet, q: &PermutationKey) -> AverageSet {
    let indices = reorder_indices(q);
    std::array::from_fn(|slot| averages[indices[slot]])
}
