//! # Floating-Origin Coordinates
//!
//! A position is an integer sector index plus a small float offset inside
//! that sector. Float precision then only has to cover one sector, no matter
//! how far from the galactic origin the position is.
//!
//! ## Precision Boundary
//!
//! Converting back to a single world vector (`to_world`, cross-sector
//! `distance_to`, `relative_to`) multiplies the sector index by
//! [`SECTOR_SIZE`]. At extreme sector indices that product loses low bits.
//! Callers tolerate epsilon drift there; it is not a bug.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{HALF_SECTOR_SIZE, SECTOR_SIZE};
use crate::math::Vec3;

/// Integer index of one sector cube.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SectorCoordinate {
    /// X index (in sectors, not world units).
    pub x: i32,
    /// Y index.
    pub y: i32,
    /// Z index.
    pub z: i32,
}

impl SectorCoordinate {
    /// The sector containing the world origin.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Creates a new sector coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate shifted by the given number of sectors.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// Squared Euclidean distance in sector units, computed in `i64`.
    #[inline]
    #[must_use]
    pub const fn distance_squared(self, other: Self) -> i64 {
        let dx = other.x as i64 - self.x as i64;
        let dy = other.y as i64 - self.y as i64;
        let dz = other.z as i64 - self.z as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance in sector units.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// World-space position of this sector's origin corner.
    #[must_use]
    pub fn world_origin(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) * SECTOR_SIZE,
            f64::from(self.y) * SECTOR_SIZE,
            f64::from(self.z) * SECTOR_SIZE,
        )
    }

    /// Offset from `self` to `other` in world units.
    ///
    /// The integer delta is taken first, so only the final multiply rounds.
    #[must_use]
    pub fn delta_to(self, other: Self) -> Vec3 {
        Vec3::new(
            (i64::from(other.x) - i64::from(self.x)) as f64 * SECTOR_SIZE,
            (i64::from(other.y) - i64::from(self.y)) as f64 * SECTOR_SIZE,
            (i64::from(other.z) - i64::from(self.z)) as f64 * SECTOR_SIZE,
        )
    }
}

impl fmt::Display for SectorCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// A position addressed as sector + local offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatingOriginPosition {
    /// The sector this position is expressed in.
    pub sector: SectorCoordinate,
    /// Offset from the sector origin.
    pub local: Vec3,
}

impl FloatingOriginPosition {
    /// Creates a position from raw parts. The result is not normalized.
    #[inline]
    #[must_use]
    pub const fn new(sector: SectorCoordinate, local: Vec3) -> Self {
        Self { sector, local }
    }

    /// The origin corner of `sector`.
    #[inline]
    #[must_use]
    pub const fn from_sector(sector: SectorCoordinate) -> Self {
        Self::new(sector, Vec3::ZERO)
    }

    /// Splits a world vector into sector + local.
    ///
    /// `local` ends up in `[0, SECTOR_SIZE)`; call [`normalize`](Self::normalize)
    /// for the centred form.
    #[must_use]
    pub fn from_world(p: Vec3) -> Self {
        let cell = (p / SECTOR_SIZE).floor();
        let sector = SectorCoordinate::new(cell.x as i32, cell.y as i32, cell.z as i32);
        let local = p - sector.world_origin();
        Self { sector, local }
    }

    /// Reassembles the world vector. Precision boundary at large sector indices.
    #[must_use]
    pub fn to_world(self) -> Vec3 {
        self.sector.world_origin() + self.local
    }

    /// Distance to another position.
    ///
    /// Same sector: plain local distance, no precision loss.
    /// Different sectors: sector delta converted to world units first.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        if self.sector == other.sector {
            return self.local.distance(other.local);
        }
        (self.sector.delta_to(other.sector) + (other.local - self.local)).length()
    }

    /// This position expressed as an offset from `origin`'s corner.
    #[must_use]
    pub fn relative_to(self, origin: SectorCoordinate) -> Vec3 {
        origin.delta_to(self.sector) + self.local
    }

    /// Moves the position by a world-space delta and renormalizes.
    #[must_use]
    pub fn offset_by(self, delta: Vec3) -> Self {
        Self::new(self.sector, self.local + delta).normalize()
    }

    /// Returns the equivalent position whose `local` lies in
    /// `[-SECTOR_SIZE/2, SECTOR_SIZE/2)` on every axis. Idempotent.
    ///
    /// A sector index saturates at the `i32` bounds; the remainder stays in
    /// `local`, so the position is preserved but `is_normalized` is false.
    #[must_use]
    pub fn normalize(self) -> Self {
        let (x, lx) = wrap_axis(self.sector.x, self.local.x);
        let (y, ly) = wrap_axis(self.sector.y, self.local.y);
        let (z, lz) = wrap_axis(self.sector.z, self.local.z);
        Self::new(SectorCoordinate::new(x, y, z), Vec3::new(lx, ly, lz))
    }

    /// Returns true if `local` is already inside the normalized range.
    #[must_use]
    pub fn is_normalized(self) -> bool {
        in_half_range(self.local.x) && in_half_range(self.local.y) && in_half_range(self.local.z)
    }
}

#[inline]
fn in_half_range(v: f64) -> bool {
    (-HALF_SECTOR_SIZE..HALF_SECTOR_SIZE).contains(&v)
}

/// One axis of `normalize`: a single floor-division instead of a shift loop.
fn wrap_axis(sector: i32, local: f64) -> (i32, f64) {
    if in_half_range(local) || !local.is_finite() {
        return (sector, local);
    }

    let shift = ((local + HALF_SECTOR_SIZE) / SECTOR_SIZE).floor();
    let mut sector = i64::from(sector) + shift as i64;
    let mut local = local - shift * SECTOR_SIZE;

    // Rounding can land exactly on an edge of the half-open range.
    if local >= HALF_SECTOR_SIZE {
        local -= SECTOR_SIZE;
        sector += 1;
    } else if local < -HALF_SECTOR_SIZE {
        local += SECTOR_SIZE;
        sector -= 1;
    }

    let clamped = sector.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    local += (sector - clamped) as f64 * SECTOR_SIZE;
    (clamped as i32, local)
}
