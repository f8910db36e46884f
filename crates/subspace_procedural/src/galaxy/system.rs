//! # Star Systems
//!
//! One star system per sector coordinate. A record is a pure function of the
//! galaxy seed and the coordinate; the only part that depends on generation
//! order is the gate list, which follows the connection graph.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use subspace_shared::{
    coordinate_hash, sector_hash, FloatingOriginPosition, SectorCoordinate, Vec3, HALF_SECTOR_SIZE,
};

use crate::seed::{seeded_rng, SeedStream, SeededRng};

/// Identifies a star system. Derived from its sector coordinate.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SystemId(SectorCoordinate);

impl SystemId {
    /// The system at `coord`.
    #[inline]
    #[must_use]
    pub const fn new(coord: SectorCoordinate) -> Self {
        Self(coord)
    }

    /// The system at `(x, y, z)`.
    #[inline]
    #[must_use]
    pub const fn at(x: i32, y: i32, z: i32) -> Self {
        Self(SectorCoordinate::new(x, y, z))
    }

    /// Sector the system occupies.
    #[inline]
    #[must_use]
    pub const fn coord(self) -> SectorCoordinate {
        self.0
    }
}

impl From<SectorCoordinate> for SystemId {
    fn from(coord: SectorCoordinate) -> Self {
        Self(coord)
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SYS[{},{},{}]", self.0.x, self.0.y, self.0.z)
    }
}

/// Broad classification driving connection count, danger and planets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemType {
    /// Dense, safe hub.
    Core,
    /// Settled, well connected.
    Civilized,
    /// Mining and production.
    Industrial,
    /// Sparse, dangerous border space.
    Frontier,
    /// Barely anything, one gate.
    Empty,
}

/// Generation parameters for one [`SystemType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemParams {
    /// Inclusive connection count range.
    pub connections: (u32, u32),
    /// Inclusive danger range (0-10).
    pub danger: (u8, u8),
    /// Inclusive planet count range.
    pub planets: (u32, u32),
    /// Relative selection weight.
    pub weight: u32,
}

impl SystemType {
    /// All types, in table order.
    pub const ALL: [Self; 5] = [
        Self::Core,
        Self::Civilized,
        Self::Industrial,
        Self::Frontier,
        Self::Empty,
    ];

    /// Lookup table row for this type.
    ///
    /// Columns: connections, danger, planets (inclusive ranges), weight.
    #[must_use]
    pub const fn params(self) -> SystemParams {
        match self {
            Self::Core => params_row((4, 6), (0, 1), (4, 8), 5),
            Self::Civilized => params_row((3, 4), (0, 3), (3, 7), 20),
            Self::Industrial => params_row((2, 4), (2, 5), (2, 6), 25),
            Self::Frontier => params_row((2, 3), (4, 8), (1, 4), 35),
            Self::Empty => params_row((1, 1), (6, 10), (0, 1), 15),
        }
    }

    /// Weighted draw over [`Self::ALL`].
    fn roll(rng: &mut SeededRng) -> Self {
        let total: u32 = Self::ALL.iter().map(|t| t.params().weight).sum();
        let mut pick = rng.gen_range(0..total);
        for ty in Self::ALL {
            let weight = ty.params().weight;
            if pick < weight {
                return ty;
            }
            pick -= weight;
        }
        Self::Empty
    }
}

const fn params_row(
    connections: (u32, u32),
    danger: (u8, u8),
    planets: (u32, u32),
    weight: u32,
) -> SystemParams {
    SystemParams {
        connections,
        danger,
        planets,
        weight,
    }
}

/// Spectral class of a system's star.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarClass {
    /// Blue giant.
    O,
    /// Blue-white.
    B,
    /// White.
    A,
    /// Yellow-white.
    F,
    /// Yellow dwarf.
    G,
    /// Orange dwarf.
    K,
    /// Red dwarf.
    M,
}

impl StarClass {
    const TABLE: [(Self, u32, f64); 7] = [
        (Self::O, 1, 6_000.0),
        (Self::B, 2, 4_000.0),
        (Self::A, 4, 2_500.0),
        (Self::F, 8, 1_800.0),
        (Self::G, 15, 1_500.0),
        (Self::K, 25, 1_100.0),
        (Self::M, 45, 700.0),
    ];

    /// Typical radius in world units.
    #[must_use]
    pub fn radius(self) -> f64 {
        Self::TABLE
            .iter()
            .find(|(class, _, _)| *class == self)
            .map_or(1_000.0, |(_, _, radius)| *radius)
    }

    fn roll(rng: &mut SeededRng) -> Self {
        let total: u32 = Self::TABLE.iter().map(|(_, w, _)| w).sum();
        let mut pick = rng.gen_range(0..total);
        for (class, weight, _) in Self::TABLE {
            if pick < weight {
                return class;
            }
            pick -= weight;
        }
        Self::M
    }
}

/// What a celestial body is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// The system's star.
    Star(StarClass),
    /// Small inner planet.
    RockyPlanet,
    /// Large mid-system planet.
    GasGiant,
    /// Cold outer planet.
    IcePlanet,
    /// Ring of rubble; `radius` is the ring width.
    AsteroidBelt,
}

/// A star, planet or belt inside a system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    /// Kind of body.
    pub kind: BodyKind,
    /// Distance from the star.
    pub orbit_radius: f64,
    /// Body radius in world units.
    pub radius: f64,
    /// Position relative to the star.
    pub local: Vec3,
}

/// Identifies one end of a gate connection (`from` hosts the gate).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateId {
    /// System hosting the gate.
    pub from: SystemId,
    /// System the gate jumps to.
    pub to: SystemId,
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GATE[{}->{}]", self.from, self.to)
    }
}

/// A jump gate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stargate {
    /// Gate identity.
    pub id: GateId,
    /// Where the gate leads.
    pub destination: SystemId,
    /// Position relative to the host star.
    pub local: Vec3,
    /// Locked gates need faction clearance.
    pub locked: bool,
    /// Faction controlling the gate (0 = unclaimed).
    pub controlling_faction: u16,
}

impl Stargate {
    /// Builds the gate `from -> to`.
    ///
    /// The gate sits on a ring of `ring_fraction * SECTOR_SIZE / 2` around
    /// the star, in the direction of the destination. Its metadata depends
    /// only on the two endpoints, so the same gate comes out whether it was
    /// built by its own system or mirrored from the neighbour.
    #[must_use]
    pub fn build(galaxy_seed: i32, from: SystemId, to: SystemId, ring_fraction: f64) -> Self {
        let direction = from.coord().delta_to(to.coord()).normalize_or_zero();
        let local = direction * (HALF_SECTOR_SIZE * ring_fraction);

        let pair_seed = sector_hash(sector_hash(galaxy_seed, from.coord()), to.coord());
        let mut rng = seeded_rng(pair_seed, SeedStream::Gates);
        let locked = rng.gen_bool(0.1);
        let controlling_faction = if rng.gen_bool(0.6) { rng.gen_range(1..=16) } else { 0 };

        Self {
            id: GateId { from, to },
            destination: to,
            local,
            locked,
            controlling_faction,
        }
    }
}

/// Everything known about one star system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarSystemRecord {
    /// System identity.
    pub id: SystemId,
    /// Display name.
    pub name: String,
    /// Coordinate-hash seed of this system.
    pub seed: i32,
    /// Classification.
    pub system_type: SystemType,
    /// Danger level (0-10).
    pub danger_level: u8,
    /// Star first, then planets and belts by orbit.
    pub bodies: Vec<CelestialBody>,
    /// One gate per connection.
    pub stargates: Vec<Stargate>,
    /// Position of the star.
    pub position: FloatingOriginPosition,
}

impl StarSystemRecord {
    /// Generates the record for `coord`, without gates.
    #[must_use]
    pub fn generate(galaxy_seed: i32, coord: SectorCoordinate) -> Self {
        let seed = coordinate_hash(galaxy_seed, coord.x, coord.y, coord.z);
        let mut rng = seeded_rng(seed, SeedStream::SystemRecord);

        let system_type = SystemType::roll(&mut rng);
        let params = system_type.params();
        let danger_level = rng.gen_range(params.danger.0..=params.danger.1);
        let name = system_name(&mut rng);
        let bodies = generate_bodies(&mut rng, params.planets);

        Self {
            id: SystemId::new(coord),
            name,
            seed,
            system_type,
            danger_level,
            bodies,
            stargates: Vec::new(),
            position: FloatingOriginPosition::from_sector(coord),
        }
    }

    /// The star (always the first body).
    #[must_use]
    pub fn star(&self) -> Option<&CelestialBody> {
        self.bodies.first()
    }

    /// Gate leading to `destination`, if any.
    #[must_use]
    pub fn gate_to(&self, destination: SystemId) -> Option<&Stargate> {
        self.stargates.iter().find(|gate| gate.destination == destination)
    }

    /// Systems reachable through this system's gates.
    pub fn destinations(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.stargates.iter().map(|gate| gate.destination)
    }
}

const NAME_HEADS: [&str; 20] = [
    "Al", "Bel", "Cor", "Dra", "Eri", "Fal", "Gor", "Hy", "Ix", "Ka", "Lyr", "Mir", "Nor", "Or",
    "Pra", "Rig", "Sol", "Tau", "Vex", "Zet",
];
const NAME_TAILS: [&str; 10] = ["a", "on", "is", "ar", "ex", "ia", "us", "or", "ane", "ith"];
const NUMERALS: [&str; 6] = ["I", "II", "III", "IV", "V", "VI"];

fn system_name(rng: &mut SeededRng) -> String {
    let head = NAME_HEADS[rng.gen_range(0..NAME_HEADS.len())];
    let tail = NAME_TAILS[rng.gen_range(0..NAME_TAILS.len())];
    if rng.gen_bool(0.4) {
        let numeral = NUMERALS[rng.gen_range(0..NUMERALS.len())];
        format!("{head}{tail} {numeral}")
    } else {
        format!("{head}{tail}")
    }
}

/// Bodies stay inside this fraction of half a sector, inside the gate ring.
const MAX_ORBIT_FRACTION: f64 = 0.8;

fn generate_bodies(rng: &mut SeededRng, planets: (u32, u32)) -> Vec<CelestialBody> {
    let class = StarClass::roll(rng);
    let star_radius = class.radius();
    let mut bodies = vec![CelestialBody {
        kind: BodyKind::Star(class),
        orbit_radius: 0.0,
        radius: star_radius,
        local: Vec3::ZERO,
    }];

    let count = rng.gen_range(planets.0..=planets.1);
    if count == 0 {
        return bodies;
    }

    let max_orbit = HALF_SECTOR_SIZE * MAX_ORBIT_FRACTION;
    let first_orbit = star_radius * 3.0;
    let spacing = (max_orbit - first_orbit) / f64::from(count);

    for i in 0..count {
        let base = first_orbit + spacing * f64::from(i);
        let orbit_radius = base + rng.gen_range(0.0..spacing * 0.5);
        let fraction = orbit_radius / max_orbit;

        let kind = if rng.gen_bool(0.12) {
            BodyKind::AsteroidBelt
        } else if fraction < 0.35 {
            BodyKind::RockyPlanet
        } else if fraction < 0.7 {
            BodyKind::GasGiant
        } else {
            BodyKind::IcePlanet
        };
        let radius = match kind {
            BodyKind::RockyPlanet => rng.gen_range(150.0..450.0),
            BodyKind::GasGiant => rng.gen_range(600.0..1_400.0),
            BodyKind::IcePlanet => rng.gen_range(200.0..600.0),
            BodyKind::AsteroidBelt => rng.gen_range(800.0..2_000.0),
            BodyKind::Star(_) => star_radius,
        };

        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let local = Vec3::new(angle.cos() * orbit_radius, 0.0, angle.sin() * orbit_radius);

        bodies.push(CelestialBody { kind, orbit_radius, radius, local });
    }
    bodies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_id_display() {
        assert_eq!(SystemId::at(1, -2, 3).to_string(), "SYS[1,-2,3]");
        let gate = GateId { from: SystemId::at(0, 0, 0), to: SystemId::at(1, 0, 0) };
        assert_eq!(gate.to_string(), "GATE[SYS[0,0,0]->SYS[1,0,0]]");
    }

    #[test]
    fn test_record_is_deterministic() {
        let coord = SectorCoordinate::new(4, -9, 2);
        let a = StarSystemRecord::generate(7, coord);
        let b = StarSystemRecord::generate(7, coord);
        assert_eq!(a, b);
        assert_eq!(a.seed, coordinate_hash(7, 4, -9, 2));
    }

    #[test]
    fn test_record_respects_type_table() {
        for x in 0..64 {
            let record = StarSystemRecord::generate(99, SectorCoordinate::new(x, 0, 0));
            let params = record.system_type.params();
            assert!(record.danger_level >= params.danger.0);
            assert!(record.danger_level <= params.danger.1);

            let planets = record.bodies.len() as u32 - 1;
            assert!(planets >= params.planets.0 && planets <= params.planets.1);
            assert!(matches!(record.star().map(|b| b.kind), Some(BodyKind::Star(_))));
            assert!(!record.name.is_empty());
        }
    }

    #[test]
    fn test_bodies_stay_inside_gate_ring() {
        for x in 0..32 {
            let record = StarSystemRecord::generate(3, SectorCoordinate::new(x, x, 0));
            for body in &record.bodies {
                assert!(body.orbit_radius < HALF_SECTOR_SIZE * 0.9);
            }
        }
    }

    #[test]
    fn test_gate_is_symmetric_in_placement() {
        let a = SystemId::at(0, 0, 0);
        let b = SystemId::at(2, 1, 0);
        let forward = Stargate::build(5, a, b, 0.9);
        let back = Stargate::build(5, b, a, 0.9);

        assert!((forward.local.length() - HALF_SECTOR_SIZE * 0.9).abs() < 1e-6);
        assert!((forward.local + back.local).length() < 1e-6);
        assert_eq!(forward, Stargate::build(5, a, b, 0.9));
        assert!(forward.controlling_faction <= 16);
    }
}
