//! # Content Generators
//!
//! The seam between the world core and whatever builds voxel layouts.
//!
//! The core decides *where* things go ([`plan_chunk`], [`plan_sector`]) and
//! with which seed; a [`ContentGenerator`] turns each placement into blocks.
//! [`ProceduralContent`] is the built-in generator: lumpy rock asteroids and
//! boxy stations, enough to fill a world while real generators are plugged
//! in elsewhere.
//!
//! Generators run on worker threads. They receive everything through their
//! arguments and must not keep per-call state.

use rand::Rng;
use serde::{Deserialize, Serialize};
use subspace_shared::{sector_hash, SectorCoordinate, Vec3, HALF_SECTOR_SIZE};

use crate::block::{BlockKind, Material, VoxelBlock};
use crate::chunk::ChunkKey;
use crate::seed::{seeded_rng, SeedStream, SeededRng};

/// Placement and seed of one asteroid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AsteroidSeed {
    /// Content seed.
    pub seed: i32,
    /// World position of the asteroid centre.
    pub center: Vec3,
    /// Outer radius. No block lies farther than this from `center`.
    pub radius: f64,
    /// Rock material.
    pub material: Material,
    /// Share of blocks that are ore (0-1).
    pub ore_fraction: f32,
}

/// Placement and seed of one station.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    /// Content seed.
    pub seed: i32,
    /// World position of the station centre.
    pub center: Vec3,
    /// Half size of the hull box along each axis.
    pub half_extent: Vec3,
    /// Hull material.
    pub material: Material,
}

/// A generated structure: a set of blocks around a centre.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// World position the structure was built around.
    pub center: Vec3,
    /// Blocks in world coordinates.
    pub blocks: Vec<VoxelBlock>,
}

impl Structure {
    /// Number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total mass.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.blocks.iter().map(VoxelBlock::mass).sum()
    }

    /// Count of blocks of one kind.
    #[must_use]
    pub fn count_kind(&self, kind: BlockKind) -> usize {
        self.blocks.iter().filter(|block| block.kind == kind).count()
    }
}

/// Builds voxel content for placements.
pub trait ContentGenerator: Send + Sync {
    /// Blocks of one asteroid.
    fn generate_asteroid(&self, seed: &AsteroidSeed) -> Vec<VoxelBlock>;

    /// One station.
    fn generate_station(&self, config: &StationConfig) -> Structure;
}

/// Everything placed in one region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionPlan {
    /// Asteroids to build.
    pub asteroids: Vec<AsteroidSeed>,
    /// Stations to build.
    pub stations: Vec<StationConfig>,
}

impl RegionPlan {
    /// Returns true if there is nothing to build.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty() && self.stations.is_empty()
    }

    /// Runs `generator` over every placement and collects the blocks.
    pub fn build(&self, generator: &dyn ContentGenerator) -> Vec<VoxelBlock> {
        let mut blocks = Vec::new();
        for asteroid in &self.asteroids {
            blocks.extend(generator.generate_asteroid(asteroid));
        }
        for station in &self.stations {
            blocks.extend(generator.generate_station(station).blocks);
        }
        blocks
    }
}

/// Chance that a chunk holds an asteroid.
const CHUNK_ASTEROID_CHANCE: f64 = 0.15;
/// Chance that a chunk holds a small station.
const CHUNK_STATION_CHANCE: f64 = 0.02;

/// Placements inside one chunk. Everything fits inside the chunk bounds.
#[must_use]
pub fn plan_chunk(base_seed: i32, key: ChunkKey, chunk_size: f64) -> RegionPlan {
    let seed = key.seed(base_seed);
    let mut rng = seeded_rng(seed, SeedStream::Placement);
    let origin = key.origin(chunk_size);
    let mut plan = RegionPlan::default();

    if rng.gen_bool(CHUNK_ASTEROID_CHANCE) {
        let radius = chunk_size * rng.gen_range(0.08..0.3);
        let center = origin + inset_point(&mut rng, chunk_size, radius);
        plan.asteroids.push(AsteroidSeed {
            seed: rng.gen(),
            center,
            radius,
            material: roll_material(&mut rng),
            ore_fraction: rng.gen_range(0.0..0.2),
        });
    }

    if rng.gen_bool(CHUNK_STATION_CHANCE) {
        let half = chunk_size * rng.gen_range(0.1..0.25);
        let half_extent = Vec3::new(
            half,
            half * rng.gen_range(0.4..1.0),
            half * rng.gen_range(0.6..1.0),
        );
        let center = origin + inset_point(&mut rng, chunk_size, half);
        plan.stations.push(StationConfig {
            seed: rng.gen(),
            center,
            half_extent,
            material: roll_material(&mut rng),
        });
    }

    plan
}

/// Placements for a whole sector, clustered around the sector's star.
#[must_use]
pub fn plan_sector(base_seed: i32, coord: SectorCoordinate) -> RegionPlan {
    let seed = sector_hash(base_seed, coord);
    let mut rng = seeded_rng(seed, SeedStream::Placement);
    let star = coord.world_origin();
    let spread = HALF_SECTOR_SIZE * 0.6;
    let mut plan = RegionPlan::default();

    let fields = rng.gen_range(1..=3);
    for _ in 0..fields {
        let field_center = star + random_offset(&mut rng, spread);
        let count = rng.gen_range(3..=8);
        for _ in 0..count {
            let radius = rng.gen_range(10.0..40.0);
            plan.asteroids.push(AsteroidSeed {
                seed: rng.gen(),
                center: field_center + random_offset(&mut rng, 400.0),
                radius,
                material: roll_material(&mut rng),
                ore_fraction: rng.gen_range(0.05..0.3),
            });
        }
    }

    let stations = rng.gen_range(0..=2);
    for _ in 0..stations {
        let half = rng.gen_range(20.0..60.0);
        plan.stations.push(StationConfig {
            seed: rng.gen(),
            center: star + random_offset(&mut rng, spread),
            half_extent: Vec3::new(half, half * 0.5, half * 0.8),
            material: roll_material(&mut rng),
        });
    }

    plan
}

/// A point in `[margin, size - margin)` per axis.
fn inset_point(rng: &mut SeededRng, size: f64, margin: f64) -> Vec3 {
    let hi = (size - margin).max(margin + f64::EPSILON);
    Vec3::new(
        rng.gen_range(margin..hi),
        rng.gen_range(margin..hi),
        rng.gen_range(margin..hi),
    )
}

fn random_offset(rng: &mut SeededRng, spread: f64) -> Vec3 {
    Vec3::new(
        rng.gen_range(-spread..spread),
        rng.gen_range(-spread..spread),
        rng.gen_range(-spread..spread),
    )
}

/// Low tiers are common, high tiers rare.
fn roll_material(rng: &mut SeededRng) -> Material {
    let a: u8 = rng.gen_range(0..7);
    let b: u8 = rng.gen_range(0..4);
    Material::from_tier(a.min(b))
}

/// Built-in generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProceduralContent {
    /// Edge length of generated blocks.
    pub block_size: f64,
}

impl Default for ProceduralContent {
    fn default() -> Self {
        Self { block_size: 5.0 }
    }
}

impl ProceduralContent {
    /// Generator with a custom block size.
    #[must_use]
    pub const fn with_block_size(block_size: f64) -> Self {
        Self { block_size }
    }

    fn block(&self, position: Vec3, kind: BlockKind, material: Material) -> VoxelBlock {
        VoxelBlock::new(position, Vec3::splat(self.block_size), kind, material)
    }
}

impl ContentGenerator for ProceduralContent {
    /// Ellipsoid of rock with random carving and scattered ore.
    fn generate_asteroid(&self, seed: &AsteroidSeed) -> Vec<VoxelBlock> {
        let mut rng = seeded_rng(seed.seed, SeedStream::Content);
        let bs = self.block_size;
        let radii = Vec3::new(
            seed.radius * rng.gen_range(0.7..=1.0),
            seed.radius * rng.gen_range(0.6..=1.0),
            seed.radius * rng.gen_range(0.7..=1.0),
        );
        let steps = (seed.radius / bs).ceil() as i64;
        let mut blocks = Vec::new();

        for ix in -steps..steps {
            for iy in -steps..steps {
                for iz in -steps..steps {
                    let offset = Vec3::new(
                        (ix as f64 + 0.5) * bs,
                        (iy as f64 + 0.5) * bs,
                        (iz as f64 + 0.5) * bs,
                    );
                    let scaled =
                        Vec3::new(offset.x / radii.x, offset.y / radii.y, offset.z / radii.z);
                    let carve: f64 = rng.gen_range(0.0..0.25);
                    if scaled.length_squared() >= 1.0 - carve {
                        continue;
                    }
                    let kind = if rng.gen::<f32>() < seed.ore_fraction {
                        BlockKind::Ore
                    } else {
                        BlockKind::Asteroid
                    };
                    blocks.push(self.block(seed.center + offset, kind, seed.material));
                }
            }
        }

        if blocks.is_empty() {
            blocks.push(self.block(seed.center, BlockKind::Asteroid, seed.material));
        }
        blocks
    }

    /// Hollow hull box with a generator core and engines on the -Z face.
    fn generate_station(&self, config: &StationConfig) -> Structure {
        let mut rng = seeded_rng(config.seed, SeedStream::Content);
        let bs = self.block_size;
        let steps = |half: f64| ((half / bs).floor() as i64).max(1);
        let (nx, ny, nz) = (
            steps(config.half_extent.x),
            steps(config.half_extent.y),
            steps(config.half_extent.z),
        );
        let mut blocks = Vec::new();

        for ix in -nx..nx {
            for iy in -ny..ny {
                for iz in -nz..nz {
                    let on_shell = ix == -nx
                        || ix == nx - 1
                        || iy == -ny
                        || iy == ny - 1
                        || iz == -nz
                        || iz == nz - 1;
                    if !on_shell {
                        continue;
                    }
                    let offset = Vec3::new(
                        (ix as f64 + 0.5) * bs,
                        (iy as f64 + 0.5) * bs,
                        (iz as f64 + 0.5) * bs,
                    );
                    let kind = if iz == -nz && rng.gen_bool(0.25) {
                        BlockKind::Engine
                    } else if rng.gen_bool(0.1) {
                        BlockKind::Armor
                    } else {
                        BlockKind::Hull
                    };
                    blocks.push(self.block(config.center + offset, kind, config.material));
                }
            }
        }

        // Generator core and cargo around it, inside the hull.
        blocks.push(self.block(
            config.center + Vec3::splat(bs * 0.5),
            BlockKind::Generator,
            config.material,
        ));
        if nx > 1 && ny > 1 && nz > 1 {
            blocks.push(self.block(
                config.center + Vec3::new(-bs * 0.5, bs * 0.5, bs * 0.5),
                BlockKind::ShieldGenerator,
                config.material,
            ));
            blocks.push(self.block(
                config.center + Vec3::new(bs * 0.5, -bs * 0.5, bs * 0.5),
                BlockKind::Cargo,
                config.material,
            ));
        }
        if !blocks.iter().any(|block| block.kind == BlockKind::Engine) {
            blocks.push(self.block(
                config.center + Vec3::new(0.5 * bs, 0.5 * bs, (-(nz as f64) + 0.5) * bs),
                BlockKind::Engine,
                config.material,
            ));
        }

        Structure { center: config.center, blocks }
    }
}
