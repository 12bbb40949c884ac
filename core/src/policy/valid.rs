//! Valid seed range and the stable hash used to derive seeds from text.

use crate::types::Seed;

/// Smallest seed handed out by hashing or random draws.
pub const MIN_SEED: Seed = 1;
/// Largest seed handed out by hashing or random draws.
pub const MAX_SEED: Seed = 900_000_000;

/// Fold any value into `[MIN_SEED, MAX_SEED]`.
pub fn make_valid(value: u64) -> Seed {
    MIN_SEED + value % (MAX_SEED - MIN_SEED + 1)
}

pub fn is_in_valid_range(seed: Seed) -> bool {
    (MIN_SEED..=MAX_SEED).contains(&seed)
}

/// FNV-1a, 64 bit. Stable across platforms and releases,
/// so text-derived seeds reproduce everywhere.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Seed derived from a string.
pub fn seed_from_text(text: &str) -> Seed {
    make_valid(fnv1a64(text.as_bytes()))
}
