//! Key hashing shared by every map entry point.

/// 32-bit FNV offset basis.
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// 32-bit FNV prime.
pub const FNV_PRIME: u32 = 16_777_619;

/// FNV-1a over raw key bytes: XOR each byte in, then multiply.
#[inline]
pub fn hashmap_hash(data: &[u8]) -> u32 {
    let mut result = FNV_OFFSET_BASIS;
    for &byte in data {
        result ^= u32::from(byte);
        result = result.wrapping_mul(FNV_PRIME);
    }
    result
}

/// Slot tag for a hash: its top 8 bits, with 0 reserved for empty slots.
#[inline]
pub fn hashmap_top_hash(hash: u32) -> u8 {
    match (hash >> 24) as u8 {
        0 => 1,
        top => top,
    }
}
