//! # SUBSPACE Shared
//!
//! Addressing primitives used by every other SUBSPACE crate.
//!
//! ## Contents
//!
//! - `constants`: sector size and other world-scale constants
//! - `math`: the double-precision `Vec3`
//! - `hash`: the stable coordinate → seed hash
//! - `coords`: sector coordinates and floating-origin positions
//!
//! ## CRITICAL RULE
//!
//! `coordinate_hash` is the only hash allowed in generation code.
//! `std::hash` output is NOT stable across runs and must never seed a generator.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod coords;
pub mod hash;
pub mod math;

pub use constants::{HALF_SECTOR_SIZE, HASH_MULTIPLIER, SECTOR_SIZE};
pub use coords::{FloatingOriginPosition, SectorCoordinate};
pub use hash::{coordinate_hash, fold_i64, hash_i64_triple, sector_hash};
pub use math::Vec3;
