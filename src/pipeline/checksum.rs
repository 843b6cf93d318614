use crate::config::CHECKSUM_BITS;
use crate::raster::Raster;
use digest::Digest;
use sha2::Sha256;

/// Stand-in for the key when none is given
const DEFAULT_KEY: &str = "default";

/// 8-bit fast-reject authenticator binding (key, carrier) to a payload.
///
/// SHA-256 of `"{key}_{feature}"`, where feature is the carrier sample sum
/// mod 2^32; the first digest byte is returned as bits, MSB first. Never
/// stored anywhere: embed and extract both recompute it.
pub fn checksum(key: Option<&str>, carrier: &Raster) -> [u8; CHECKSUM_BITS] {
    let combined = format!("{}_{}", key.unwrap_or(DEFAULT_KEY), carrier.feature());
    let digest = Sha256::digest(combined.as_bytes());
    let first = digest[0];
    std::array::from_fn(|i| (first >> (7 - i)) & 1)
}
