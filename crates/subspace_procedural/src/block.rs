//! # Voxel Blocks
//!
//! The plain data record exchanged with content generators and stored in
//! chunks. The core never interprets block layouts; it only buckets blocks
//! by position.

use serde::{Deserialize, Serialize};
use subspace_shared::Vec3;

/// Material tier of a block, lowest to highest tech level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Material {
    /// Tier 1, found everywhere.
    #[default]
    Iron = 0,
    /// Tier 2.
    Titanium = 1,
    /// Tier 3.
    Naonite = 2,
    /// Tier 4.
    Trinium = 3,
    /// Tier 5.
    Xanion = 4,
    /// Tier 6.
    Ogonite = 5,
    /// Tier 7, galactic core only.
    Avorion = 6,
}

/// Physical properties shared by every block of one material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialProperties {
    /// Multiplier on base durability.
    pub durability_multiplier: f32,
    /// Multiplier on base mass.
    pub mass_multiplier: f32,
    /// Tech level (1-7).
    pub tech_level: u8,
    /// Display colour (RGB).
    pub color: [u8; 3],
}

impl Material {
    /// All tiers in ascending order.
    pub const ALL: [Self; 7] = [
        Self::Iron,
        Self::Titanium,
        Self::Naonite,
        Self::Trinium,
        Self::Xanion,
        Self::Ogonite,
        Self::Avorion,
    ];

    /// Lookup table row for this material.
    ///
    /// Columns: durability multiplier, mass multiplier, tech level, colour.
    #[must_use]
    pub const fn properties(self) -> MaterialProperties {
        match self {
            Self::Iron => material_row(1.0, 1.0, 1, [184, 184, 192]),
            Self::Titanium => material_row(1.5, 0.9, 2, [208, 222, 242]),
            Self::Naonite => material_row(2.0, 0.8, 3, [38, 235, 89]),
            Self::Trinium => material_row(2.5, 0.6, 4, [64, 166, 255]),
            Self::Xanion => material_row(3.0, 0.5, 5, [255, 209, 38]),
            Self::Ogonite => material_row(4.0, 0.4, 6, [255, 102, 38]),
            Self::Avorion => material_row(5.0, 0.3, 7, [217, 51, 255]),
        }
    }

    /// Material for a tier index, clamped to the highest tier.
    #[must_use]
    pub const fn from_tier(tier: u8) -> Self {
        match tier {
            0 => Self::Iron,
            1 => Self::Titanium,
            2 => Self::Naonite,
            3 => Self::Trinium,
            4 => Self::Xanion,
            5 => Self::Ogonite,
            _ => Self::Avorion,
        }
    }
}

/// Functional role of a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockKind {
    /// Structural hull.
    #[default]
    Hull = 0,
    /// Heavy armour plating.
    Armor = 1,
    /// Main engine.
    Engine = 2,
    /// Manoeuvring thruster.
    Thruster = 3,
    /// Power generator.
    Generator = 4,
    /// Shield generator.
    ShieldGenerator = 5,
    /// Cargo bay.
    Cargo = 6,
    /// Bare asteroid rock.
    Asteroid = 7,
    /// Mineable ore vein inside an asteroid.
    Ore = 8,
}

impl BlockKind {
    /// Base durability before the material multiplier.
    #[must_use]
    pub const fn base_durability(self) -> f32 {
        match self {
            Self::Armor => 250.0,
            Self::Asteroid | Self::Ore => 150.0,
            Self::Engine | Self::Generator | Self::ShieldGenerator => 80.0,
            Self::Hull | Self::Thruster | Self::Cargo => 100.0,
        }
    }
}

/// A single voxel block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoxelBlock {
    /// World position of the block (chunk membership is derived from this).
    pub position: Vec3,
    /// Extent along each axis.
    pub size: Vec3,
    /// Functional role.
    pub kind: BlockKind,
    /// Material tier.
    pub material: Material,
    /// Remaining durability.
    pub durability: f32,
}

impl VoxelBlock {
    /// Creates a block with full durability for its kind and material.
    #[must_use]
    pub fn new(position: Vec3, size: Vec3, kind: BlockKind, material: Material) -> Self {
        Self {
            position,
            size,
            kind,
            material,
            durability: Self::max_durability_for(kind, material),
        }
    }

    /// Unit-sized iron hull block at `position`.
    #[must_use]
    pub fn hull(position: Vec3) -> Self {
        Self::new(position, Vec3::ONE, BlockKind::Hull, Material::Iron)
    }

    /// Maximum durability for a kind/material pair.
    #[must_use]
    pub fn max_durability_for(kind: BlockKind, material: Material) -> f32 {
        kind.base_durability() * material.properties().durability_multiplier
    }

    /// Mass, scaled by volume and material.
    #[must_use]
    pub fn mass(&self) -> f64 {
        let volume = self.size.x * self.size.y * self.size.z;
        volume * f64::from(self.material.properties().mass_multiplier)
    }

    /// Returns true once durability is used up.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.durability <= 0.0
    }

    /// Applies damage, clamping durability at zero.
    pub fn take_damage(&mut self, damage: f32) {
        self.durability = (self.durability - damage).max(0.0);
    }

    /// Axis-aligned overlap test; `position` is the block centre.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let half_a = self.size * 0.5;
        let half_b = other.size * 0.5;
        let d = self.position - other.position;
        d.x.abs() < half_a.x + half_b.x
            && d.y.abs() < half_a.y + half_b.y
            && d.z.abs() < half_a.z + half_b.z
    }
}

const fn material_row(
    durability_multiplier: f32,
    mass_multiplier: f32,
    tech_level: u8,
    color: [u8; 3],
) -> MaterialProperties {
    MaterialProperties {
        durability_multiplier,
        mass_multiplier,
        tech_level,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_tiers_ascend() {
        for pair in Material::ALL.windows(2) {
            let lo = pair[0].properties();
            let hi = pair[1].properties();
            assert!(hi.tech_level > lo.tech_level);
            assert!(hi.durability_multiplier > lo.durability_multiplier);
        }
        assert_eq!(Material::from_tier(200), Material::Avorion);
    }

    #[test]
    fn test_block_durability_and_damage() {
        let mut block =
            VoxelBlock::new(Vec3::ZERO, Vec3::ONE, BlockKind::Armor, Material::Titanium);
        assert_eq!(block.durability, 375.0);
        block.take_damage(400.0);
        assert!(block.is_destroyed());
        assert_eq!(block.durability, 0.0);
    }

    #[test]
    fn test_intersects() {
        let a = VoxelBlock::hull(Vec3::ZERO);
        let touching = VoxelBlock::hull(Vec3::new(1.0, 0.0, 0.0));
        let overlapping = VoxelBlock::hull(Vec3::new(0.5, 0.5, 0.0));
        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
    }
}
