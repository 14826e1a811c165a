//! crypto/checksum.rs
//! XOR-fold checksum used at both layers of a cell frame.

/// XOR-fold `data` into `width` bytes: byte `i` of the input lands in slot `i % width`.
///
/// A width of 0 yields an empty checksum. Empty input yields `width` zero bytes.
pub fn xor_checksum(data: &[u8], width: usize) -> Vec<u8> {
    let mut out = vec![0u8; width];
    if width == 0 {
        return out;
    }
    for (i, b) in data.iter().enumerate() {
        out[i % width] ^= *b;
    }
    out
}

/// Single-byte XOR-fold.
pub fn checksum_byte(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc ^ b)
}
