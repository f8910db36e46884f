//! # Galaxy Graph
//!
//! Star systems generated lazily per sector coordinate, connected by jump
//! gates into an undirected graph.
//!
//! ## Structure
//!
//! Two separate structures:
//! - **Record cache**: `SystemId -> StarSystemRecord`, append-only, never
//!   evicted. A `DashMap`, so lookups of existing systems never block.
//! - **Connection graph**: symmetric adjacency behind one `RwLock`. A system
//!   can be in the graph before it has a record (pre-registered edge).
//!
//! ## Concurrency
//!
//! Generating a system takes the graph write lock for the whole
//! check-connect-insert step. Two threads racing on the same coordinate
//! both build a record, but only the first one to take the lock stores it;
//! the other returns the stored copy.
//!
//! ## Degree
//!
//! A system whose adjacency was pre-registered by a neighbour skips its own
//! connection roll, and one that rolled its own connections still accepts
//! edges from systems generated later. The actual degree can therefore
//! differ from the type's connection range.

mod graph;
mod system;

pub use graph::ConnectionGraph;
pub use system::{
    BodyKind, CelestialBody, GateId, StarClass, StarSystemRecord, Stargate, SystemId, SystemParams,
    SystemType,
};

use dashmap::DashMap;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use rand::Rng;
use subspace_shared::SectorCoordinate;

use crate::config::GalaxyConfig;
use crate::seed::{seeded_rng, GalaxySeed, SeedStream};

/// Galaxy-wide statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GalaxyNetworkStats {
    /// Systems with a generated record.
    pub total_systems: usize,
    /// Undirected gate connections, including ones to pre-registered systems.
    pub total_connections: usize,
    /// Mean degree over generated systems.
    pub average_connections_per_system: f64,
}

/// The galaxy: record cache plus connection graph.
pub struct Galaxy {
    /// Settings.
    config: GalaxyConfig,
    /// `config.seed` folded for the coordinate hash.
    base_seed: i32,
    /// Candidate neighbour offsets in lexicographic order.
    candidate_offsets: Vec<(i32, i32, i32)>,
    /// Generated systems.
    systems: DashMap<SystemId, StarSystemRecord>,
    /// Gate connections.
    graph: RwLock<ConnectionGraph>,
}

impl Galaxy {
    /// Creates an empty galaxy with default settings.
    #[must_use]
    pub fn new(seed: GalaxySeed) -> Self {
        Self::with_config(GalaxyConfig::with_seed(seed))
    }

    /// Creates an empty galaxy.
    #[must_use]
    pub fn with_config(config: GalaxyConfig) -> Self {
        let base_seed = config.seed.hash_seed();
        let candidate_offsets = sphere_offsets(config.connection_radius, false);
        Self {
            config,
            base_seed,
            candidate_offsets,
            systems: DashMap::new(),
            graph: RwLock::new(ConnectionGraph::new()),
        }
    }

    /// Galaxy seed.
    #[must_use]
    pub fn seed(&self) -> GalaxySeed {
        self.config.seed
    }

    /// Settings.
    #[must_use]
    pub fn config(&self) -> &GalaxyConfig {
        &self.config
    }

    /// Returns the system at `coord`, generating it on first request.
    pub fn get_or_generate_system(&self, coord: SectorCoordinate) -> StarSystemRecord {
        let id = SystemId::new(coord);
        if let Some(existing) = self.systems.get(&id) {
            return existing.value().clone();
        }

        let mut record = StarSystemRecord::generate(self.base_seed, coord);

        let mut graph = self.graph.write();
        if let Some(existing) = self.systems.get(&id) {
            return existing.value().clone();
        }

        let created = self.generate_connections(&mut graph, &record);
        let ring = self.config.gate_ring_fraction;
        record.stargates = graph
            .neighbors(id)
            .iter()
            .map(|&to| Stargate::build(self.base_seed, id, to, ring))
            .collect();

        for &neighbor in &created {
            if let Some(mut other) = self.systems.get_mut(&neighbor) {
                other.stargates.push(Stargate::build(self.base_seed, neighbor, id, ring));
            }
        }

        self.systems.insert(id, record.clone());
        drop(graph);

        tracing::debug!(
            system = %id,
            name = %record.name,
            kind = ?record.system_type,
            gates = record.stargates.len(),
            "star system generated"
        );
        record
    }

    /// Rolls connections for a freshly generated system.
    ///
    /// Skipped entirely if the system already has an adjacency entry. Returns
    /// the neighbours connected by this call.
    fn generate_connections(
        &self,
        graph: &mut ConnectionGraph,
        record: &StarSystemRecord,
    ) -> Vec<SystemId> {
        let id = record.id;
        if graph.contains(id) {
            return Vec::new();
        }

        let mut rng = seeded_rng(record.seed, SeedStream::Connections);
        let (min, max) = record.system_type.params().connections;
        let target = rng.gen_range(min..=max) as usize;

        let origin = id.coord();
        let mut candidates: Vec<SystemId> = self
            .candidate_offsets
            .iter()
            .map(|&(dx, dy, dz)| SystemId::new(origin.offset(dx, dy, dz)))
            .collect();
        candidates.shuffle(&mut rng);

        graph.ensure(id);
        let mut created = Vec::with_capacity(target);
        for candidate in candidates {
            if created.len() >= target {
                break;
            }
            if graph.connect(id, candidate) {
                created.push(candidate);
            }
        }

        tracing::debug!(system = %id, target, created = created.len(), "connections generated");
        created
    }

    /// The system's record, if generated.
    #[must_use]
    pub fn system(&self, id: SystemId) -> Option<StarSystemRecord> {
        self.systems.get(&id).map(|entry| entry.value().clone())
    }

    /// Returns true if a record exists for `id`.
    #[must_use]
    pub fn contains_system(&self, id: SystemId) -> bool {
        self.systems.contains_key(&id)
    }

    /// Neighbours of `id` in the connection graph (empty if unknown).
    #[must_use]
    pub fn neighbors(&self, id: SystemId) -> Vec<SystemId> {
        self.graph.read().neighbors(id).to_vec()
    }

    /// Generates `id` and all of its neighbours, returning the neighbours.
    pub fn expand_neighbors(&self, id: SystemId) -> Vec<StarSystemRecord> {
        self.get_or_generate_system(id.coord());
        self.neighbors(id)
            .into_iter()
            .map(|neighbor| self.get_or_generate_system(neighbor.coord()))
            .collect()
    }

    /// Generates every system within `radius` sectors (Euclidean) of `center`.
    pub fn generate_region(&self, center: SectorCoordinate, radius: i32) -> Vec<SystemId> {
        sphere_offsets(radius, true)
            .into_iter()
            .map(|(dx, dy, dz)| self.get_or_generate_system(center.offset(dx, dy, dz)).id)
            .collect()
    }

    /// Shortest jump path, both ends included. `None` if unreachable.
    #[must_use]
    pub fn find_path(&self, from: SystemId, to: SystemId) -> Option<Vec<SystemId>> {
        self.graph.read().shortest_path(from, to)
    }

    /// Systems reachable within `max_jumps`, excluding `from`.
    #[must_use]
    pub fn systems_in_range(&self, from: SystemId, max_jumps: u32) -> Vec<SystemId> {
        self.graph.read().within_jumps(from, max_jumps)
    }

    /// Returns true if the connection graph is symmetric.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.graph.read().is_symmetric()
    }

    /// Number of generated systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Network statistics.
    #[must_use]
    pub fn network_stats(&self) -> GalaxyNetworkStats {
        let graph = self.graph.read();
        let total_systems = self.systems.len();
        let degree_sum: usize = self
            .systems
            .iter()
            .map(|entry| graph.neighbors(*entry.key()).len())
            .sum();

        GalaxyNetworkStats {
            total_systems,
            total_connections: graph.edge_count(),
            average_connections_per_system: if total_systems == 0 {
                0.0
            } else {
                degree_sum as f64 / total_systems as f64
            },
        }
    }

    /// Forgets every system and connection.
    pub fn reset(&self) {
        let mut graph = self.graph.write();
        graph.clear();
        self.systems.clear();
        tracing::info!(seed = self.config.seed.value(), "galaxy reset");
    }
}

/// Integer offsets with `dx² + dy² + dz² <= radius²`, lexicographic order.
fn sphere_offsets(radius: i32, include_center: bool) -> Vec<(i32, i32, i32)> {
    let r = radius.max(0);
    let limit = i64::from(r) * i64::from(r);
    let mut offsets = Vec::new();
    for dx in -r..=r {
        for dy in -r..=r {
            for dz in -r..=r {
                let d2 = i64::from(dx * dx) + i64::from(dy * dy) + i64::from(dz * dz);
                if d2 > limit || (d2 == 0 && !include_center) {
                    continue;
                }
                offsets.push((dx, dy, dz));
            }
        }
    }
    offsets
}
