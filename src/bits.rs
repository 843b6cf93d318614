//! Bit sequence helpers. A bit is a `u8` holding 0 or 1; multi-bit values are
//! always laid out most-significant bit first.

/// Unpack bytes into bits, MSB first within each byte
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        push_uint(&mut bits, byte as u64, 8);
    }
    bits
}

/// Pack bits into bytes, MSB first. A trailing partial byte is zero-padded.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | ((bit & 1) << (7 - i)))
        })
        .collect()
}

/// Append the low `width` bits of `value`, MSB first
pub fn push_uint(bits: &mut Vec<u8>, value: u64, width: usize) {
    for shift in (0..width).rev() {
        bits.push(((value >> shift) & 1) as u8);
    }
}

/// Read `bits` as an unsigned big-endian integer
pub fn read_uint(bits: &[u8]) -> u64 {
    bits.iter().fold(0u64, |acc, &bit| (acc << 1) | (bit & 1) as u64)
}
