//! # Galaxy Network Tests
//!
//! Graph-level guarantees of the jump gate network.

use std::collections::HashSet;

use subspace_procedural::{Galaxy, GalaxyConfig, GalaxySeed, SystemId, SystemType};
use subspace_shared::SectorCoordinate;

/// Test: Seed 7, sector (0,0,0), asked twice.
#[test]
fn test_seed_7_origin_is_stable() {
    let galaxy = Galaxy::new(GalaxySeed::new(7));
    let first = galaxy.get_or_generate_system(SectorCoordinate::ORIGIN);
    let second = galaxy.get_or_generate_system(SectorCoordinate::ORIGIN);

    assert_eq!(first.id, second.id);
    assert_eq!(first.stargates.len(), second.stargates.len());
    assert_eq!(first.id.to_string(), "SYS[0,0,0]");
}

/// Test: Independent galaxies agree on everything.
#[test]
fn test_independent_galaxies_agree() {
    let a = Galaxy::new(GalaxySeed::new(2024));
    let b = Galaxy::new(GalaxySeed::new(2024));

    for x in -3..=3 {
        let coord = SectorCoordinate::new(x, 1, -x);
        let ra = a.get_or_generate_system(coord);
        let rb = b.get_or_generate_system(coord);
        assert_eq!(ra.id, rb.id);
        assert_eq!(ra.system_type, rb.system_type);
        assert_eq!(ra.danger_level, rb.danger_level);
        assert_eq!(ra.stargates, rb.stargates);
        assert_eq!(ra.name, rb.name);
    }
}

/// Test: Different seeds give different galaxies.
#[test]
fn test_seeds_differ() {
    let a = Galaxy::new(GalaxySeed::new(1));
    let b = Galaxy::new(GalaxySeed::new(2));
    let differing = (0..16)
        .filter(|&x| {
            let coord = SectorCoordinate::new(x, 0, 0);
            a.get_or_generate_system(coord).seed != b.get_or_generate_system(coord).seed
        })
        .count();
    assert_eq!(differing, 16);
}

/// Test: Symmetry over a large explored region.
#[test]
fn test_graph_symmetry_over_region() {
    let galaxy = Galaxy::new(GalaxySeed::new(31337));
    let ids = galaxy.generate_region(SectorCoordinate::new(10, -10, 5), 4);
    assert!(ids.len() > 200);
    assert!(galaxy.is_symmetric());

    for id in ids {
        for neighbor in galaxy.neighbors(id) {
            assert!(galaxy.neighbors(neighbor).contains(&id), "{id} -> {neighbor} not mirrored");
        }
    }
}

/// Test: A fully explored region is navigable end to end.
#[test]
fn test_paths_inside_explored_region() {
    let galaxy = Galaxy::new(GalaxySeed::new(42));
    let ids = galaxy.generate_region(SectorCoordinate::ORIGIN, 3);
    let home = SystemId::new(SectorCoordinate::ORIGIN);

    let reachable: HashSet<SystemId> = galaxy.systems_in_range(home, 64).into_iter().collect();
    let mut checked = 0;
    for &target in &ids {
        if !reachable.contains(&target) {
            continue;
        }
        let path = galaxy.find_path(home, target).unwrap();
        assert_eq!(path.first(), Some(&home));
        assert_eq!(path.last(), Some(&target));
        for hop in path.windows(2) {
            assert!(galaxy.neighbors(hop[0]).contains(&hop[1]));
        }
        checked += 1;
    }
    assert!(checked >= 1);
}

/// Test: Islands far apart never connect.
#[test]
fn test_disjoint_islands_have_no_path() {
    let galaxy = Galaxy::new(GalaxySeed::new(5));
    galaxy.generate_region(SectorCoordinate::ORIGIN, 1);
    galaxy.generate_region(SectorCoordinate::new(500, 500, 500), 1);

    let a = SystemId::new(SectorCoordinate::ORIGIN);
    let b = SystemId::at(500, 500, 500);
    assert_eq!(galaxy.find_path(a, b), None);
    assert_eq!(galaxy.find_path(b, b), Some(vec![b]));
}

/// Test: Connection radius bounds every gate.
#[test]
fn test_gates_respect_connection_radius() {
    let config = GalaxyConfig {
        seed: GalaxySeed::new(88),
        connection_radius: 2,
        ..GalaxyConfig::default()
    };
    let galaxy = Galaxy::with_config(config);

    for id in galaxy.generate_region(SectorCoordinate::ORIGIN, 2) {
        let record = galaxy.system(id).unwrap();
        for gate in &record.stargates {
            assert!(id.coord().distance(gate.destination.coord()) <= 2.0);
            assert_eq!(gate.id.from, id);
        }
    }
}

/// Test: Every system type shows up in a big enough sample.
#[test]
fn test_type_distribution() {
    let galaxy = Galaxy::new(GalaxySeed::new(9));
    let seen: HashSet<SystemType> = (0..400)
        .map(|x| galaxy.get_or_generate_system(SectorCoordinate::new(x * 10, 0, 0)).system_type)
        .collect();
    assert_eq!(seen.len(), SystemType::ALL.len());
}
