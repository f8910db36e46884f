//! # Coordinate Hash
//!
//! Maps integer coordinates plus a base seed to a derived seed.
//!
//! ## Determinism Guarantee
//!
//! Pure integer arithmetic with explicit wrapping. The same inputs produce
//! the same output on every platform, every build, every run.
//!
//! The avalanche is weak (neighbouring coordinates give correlated seeds).
//! Callers feed the result into a real PRNG before drawing values from it.

use crate::constants::HASH_MULTIPLIER;
use crate::coords::SectorCoordinate;

/// Folds `x`, `y`, `z` into `seed`: `acc = acc * 397 ^ axis`, per axis.
#[inline]
#[must_use]
pub const fn coordinate_hash(seed: i32, x: i32, y: i32, z: i32) -> i32 {
    let mut acc = seed;
    acc = acc.wrapping_mul(HASH_MULTIPLIER) ^ x;
    acc = acc.wrapping_mul(HASH_MULTIPLIER) ^ y;
    acc = acc.wrapping_mul(HASH_MULTIPLIER) ^ z;
    acc
}

/// [`coordinate_hash`] over a sector coordinate.
#[inline]
#[must_use]
pub const fn sector_hash(seed: i32, coord: SectorCoordinate) -> i32 {
    coordinate_hash(seed, coord.x, coord.y, coord.z)
}

/// Folds a 64-bit value into 32 bits (`low ^ high`).
///
/// Used for 64-bit seeds and chunk indices before they enter the hash.
#[inline]
#[must_use]
pub const fn fold_i64(value: i64) -> i32 {
    (value ^ (value >> 32)) as i32
}

/// [`coordinate_hash`] over 64-bit indices (chunk keys), each folded first.
#[inline]
#[must_use]
pub const fn hash_i64_triple(seed: i32, x: i64, y: i64, z: i64) -> i32 {
    coordinate_hash(seed, fold_i64(x), fold_i64(y), fold_i64(z))
}
