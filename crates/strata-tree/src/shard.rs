//! Shaping parameters and the name-to-bucket mapping.
//!
//! These values are part of wire-format v1 (together with the encoding
//! itself): any encoder must shard identically for equal contents to hash
//! to equal ids, so none of them is configurable per tree.

use strata_types::tree::MAX_BUCKETS;

/// Maximum direct entries a tree holds before it shards into buckets.
pub const LEAF_LIMIT: usize = 512;

/// Maximum nesting depth of buckets. Levels at this depth stay leaf-shaped
/// regardless of size (the name hash provides one index byte per level).
pub const MAX_SHARD_DEPTH: usize = 8;

/// 64-bit FNV-1a hash of an entry name.
pub fn name_hash(name: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for byte in name.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// The bucket an entry maps to at a given shard depth.
///
/// Byte `depth` of the name hash (most significant first), reduced to the
/// bucket range. Each level consumes a fresh byte so entries colliding at
/// one level spread apart at the next.
pub fn bucket_index(name: &str, depth: usize) -> u8 {
    debug_assert!(depth < MAX_SHARD_DEPTH);
    let shift = 56 - 8 * (depth as u32);
    ((name_hash(name) >> shift) as u8) % MAX_BUCKETS
}
