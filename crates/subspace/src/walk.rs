//! # Scripted Fly-Through
//!
//! Drives a [`WorldManager`] along a straight line of waypoints the way a
//! frame loop would: fixed `dt`, one `update` and one `process_results` per
//! frame. Used by the `world_walk` binary and the cross-crate tests.

use std::time::{Duration, Instant};

use subspace_procedural::{SystemId, WorldManager, WorldResult, WorldStats};
use subspace_shared::{FloatingOriginPosition, SectorCoordinate, Vec3};

/// A straight flight between two world positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightPlan {
    /// Start position.
    pub from: Vec3,
    /// End position.
    pub to: Vec3,
    /// Distance covered per frame.
    pub step: f64,
    /// Simulated frame time in seconds.
    pub dt: f64,
}

impl FlightPlan {
    /// Flight along +X from the origin, 60 fps.
    #[must_use]
    pub fn east(distance: f64, step: f64) -> Self {
        Self {
            from: Vec3::ZERO,
            to: Vec3::new(distance, 0.0, 0.0),
            step,
            dt: 1.0 / 60.0,
        }
    }

    /// Number of frames the flight takes. Always at least one.
    #[must_use]
    pub fn frames(&self) -> usize {
        let distance = self.from.distance(self.to);
        if self.step <= 0.0 || !distance.is_finite() {
            return 1;
        }
        ((distance / self.step).ceil() as usize).max(1)
    }

    /// Position at `frame` (clamped to the end point).
    #[must_use]
    pub fn position_at(&self, frame: usize) -> Vec3 {
        let t = (frame as f64 / self.frames() as f64).min(1.0);
        self.from + (self.to - self.from) * t
    }
}

/// What happened during a walk.
#[derive(Clone, Debug)]
pub struct WalkReport {
    /// Frames simulated.
    pub frames: usize,
    /// Highest loaded chunk count seen after any frame.
    pub peak_loaded: usize,
    /// Where the flight ended, in floating-origin form.
    pub end: FloatingOriginPosition,
    /// Gate route from the start sector's system to the end sector's.
    pub route: Option<Vec<SystemId>>,
    /// Manager counters after the final flush.
    pub stats: WorldStats,
    /// Wall-clock time of the walk.
    pub elapsed: Duration,
}

/// Flies `plan` through `world`, then waits up to `settle` for outstanding
/// generation and charts a gate route between the end-point systems.
///
/// # Errors
///
/// `PipelineClosed` if the manager was shut down before or during the walk.
pub fn walk(
    world: &mut WorldManager,
    plan: &FlightPlan,
    settle: Duration,
) -> WorldResult<WalkReport> {
    let start = Instant::now();
    let frames = plan.frames();
    let mut peak_loaded = 0;

    for frame in 0..=frames {
        world.update(plan.dt, plan.position_at(frame));
        world.process_results();
        peak_loaded = peak_loaded.max(world.cache().loaded_count());
    }

    let start_sector = FloatingOriginPosition::from_world(plan.from).sector;
    let end = FloatingOriginPosition::from_world(plan.to);
    world.generate_sector(end.sector.x, end.sector.y, end.sector.z)?;
    world.flush(settle);

    let route = chart_route(world, start_sector, end.sector);
    let stats = world.stats();
    let elapsed = start.elapsed();

    tracing::info!(
        frames,
        peak_loaded,
        jumps = route.as_ref().map_or(0, |r| r.len().saturating_sub(1)),
        elapsed_ms = elapsed.as_millis(),
        "walk finished"
    );

    Ok(WalkReport {
        frames,
        peak_loaded,
        end,
        route,
        stats,
        elapsed,
    })
}

/// Explores the gate network outward from `from` until `to` is reachable
/// or the frontier exceeds the straight-line distance by a few sectors.
fn chart_route(
    world: &WorldManager,
    from: SectorCoordinate,
    to: SectorCoordinate,
) -> Option<Vec<SystemId>> {
    let galaxy = world.galaxy();
    let start = galaxy.get_or_generate_system(from).id;
    let goal = galaxy.get_or_generate_system(to).id;

    let budget = from.distance(to).ceil() as i32 + 4;
    let mut frontier = vec![start];
    for _ in 0..budget {
        if let Some(path) = galaxy.find_path(start, goal) {
            return Some(path);
        }
        let mut next = Vec::new();
        for id in frontier {
            next.extend(galaxy.expand_neighbors(id).into_iter().map(|r| r.id));
        }
        if next.is_empty() {
            break;
        }
        next.sort_unstable();
        next.dedup();
        frontier = next;
    }
    galaxy.find_path(start, goal)
}
