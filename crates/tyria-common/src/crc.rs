//! CRC32C hashing utilities.
//!
//! CRC32C (Castagnoli) guards archive records and the persisted index cache.

/// Compute CRC32C hash of a byte slice.
///
/// Uses hardware acceleration when available (SSE4.2 on x86).
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}
