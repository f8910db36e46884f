//! # World-Scale Constants
//!
//! **CRITICAL:** Changing any of these values changes every generated galaxy.
//! Saved seeds stop reproducing the same universe.

// =============================================================================
// SECTOR GRID
// =============================================================================

/// Edge length of one sector cube, in world units.
pub const SECTOR_SIZE: f64 = 100_000.0;

/// Half of [`SECTOR_SIZE`]; normalized local offsets lie in `[-HALF, HALF)`.
pub const HALF_SECTOR_SIZE: f64 = SECTOR_SIZE / 2.0;

// =============================================================================
// HASHING
// =============================================================================

/// Odd multiplier folded between axes by the coordinate hash.
pub const HASH_MULTIPLIER: i32 = 397;
