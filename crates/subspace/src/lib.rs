//! # SUBSPACE
//!
//! The main crate, integrating the world core.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        SUBSPACE WORLD CORE                          │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  ┌─────────────────┐      ┌──────────────────────────────────────┐  │
//! │  │  shared         │      │  procedural                          │  │
//! │  │                 │─────>│                                      │  │
//! │  │  • Vec3 (f64)   │      │  • Galaxy (systems + gates, BFS)     │  │
//! │  │  • Sectors      │      │  • ChunkCache (load/unload/LRU)      │  │
//! │  │  • Floating     │      │  • WorldManager (worker pool)        │  │
//! │  │    origin       │      │  • ContentGenerator seam             │  │
//! │  │  • Coord hash   │      │                                      │  │
//! │  └─────────────────┘      └──────────────────────────────────────┘  │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `walk`: scripted fly-through used by the `world_walk` binary

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod walk;

// Re-export the units
pub use subspace_procedural as procedural;
pub use subspace_shared as shared;

// Re-export commonly used types
pub use subspace_procedural::{
    Galaxy, GalaxyConfig, GalaxySeed, StarSystemRecord, SystemId, WorldConfig, WorldError,
    WorldManager, WorldResult, WorldStats,
};
pub use subspace_shared::{FloatingOriginPosition, SectorCoordinate, Vec3};
pub use walk::{FlightPlan, WalkReport};
