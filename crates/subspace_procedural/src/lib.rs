//! # SUBSPACE Procedural World
//!
//! Deterministic, streamable universe generation from a single galaxy seed.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same seed and coordinate, same content, every run
//! 2. **Lazy**: star systems and chunks exist only once something asks for them
//! 3. **Bounded**: resident chunks never exceed `max_loaded_chunks`
//! 4. **Non-blocking**: content is built on worker threads, merged on the caller
//!
//! ## Core Components
//!
//! - `Galaxy`: star systems connected by jump gates, BFS path queries
//! - `ChunkCache`: load/unload/LRU-evict chunks of voxel blocks
//! - `WorldManager`: throttled cache maintenance plus the generation pool
//! - `ContentGenerator`: the seam where asteroid/station builders plug in
//!
//! ## Example
//!
//! ```rust,ignore
//! use subspace_procedural::{GalaxySeed, WorldConfig, WorldManager};
//! use subspace_shared::Vec3;
//!
//! let mut world = WorldManager::new(WorldConfig::test(GalaxySeed::new(42)))?;
//!
//! // Player at the origin.
//! world.update(0.016, Vec3::ZERO);
//! world.flush(std::time::Duration::from_secs(5));
//!
//! let home = world.galaxy().get_or_generate_system(Default::default());
//! println!("{} has {} gates", home.name, home.stargates.len());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod block;
pub mod chunk;
pub mod config;
pub mod content;
pub mod error;
pub mod galaxy;
pub mod seed;
pub mod world_manager;

pub use block::{BlockKind, Material, MaterialProperties, VoxelBlock};
pub use chunk::{CacheUpdate, Chunk, ChunkCache, ChunkHandle, ChunkKey, ChunkStats};
pub use config::{ChunkCacheConfig, GalaxyConfig, WorldConfig, WorldManagerConfig};
pub use content::{
    plan_chunk, plan_sector, AsteroidSeed, ContentGenerator, ProceduralContent, RegionPlan,
    StationConfig, Structure,
};
pub use error::{WorldError, WorldResult};
pub use galaxy::{
    BodyKind, CelestialBody, ConnectionGraph, Galaxy, GalaxyNetworkStats, GateId, StarClass,
    StarSystemRecord, Stargate, SystemId, SystemParams, SystemType,
};
pub use seed::{seeded_rng, GalaxySeed, SeedStream, SeededRng};
pub use world_manager::{GenerationOutcome, RegionRequest, WorldManager, WorldStats};
