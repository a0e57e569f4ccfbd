/* src/routes/core/rust/src/fnv.rs */

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Standard FNV-1a 32-bit hash.
pub(crate) fn fnv1a_32(input: &str) -> u32 {
  let mut hash = FNV_OFFSET;
  for byte in input.bytes() {
    hash ^= u32::from(byte);
    hash = hash.wrapping_mul(FNV_PRIME);
  }
  hash
}

/// Relative source path -> 8 hex chars, used to keep generated identifiers unique.
pub(crate) fn path_hash(relative: &str) -> String {
  format!("{:08x}", fnv1a_32(relative))
}
