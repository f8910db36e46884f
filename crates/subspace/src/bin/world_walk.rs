//! # World Walk
//!
//! Headless fly-through of a generated galaxy. Streams chunks along a
//! straight flight, generates the destination sector and charts a gate
//! route back to the start.
//!
//! ```bash
//! cargo run --bin world_walk -- [config.toml] [distance]
//! ```

use std::time::Duration;

use subspace::walk::{walk, FlightPlan};
use subspace::{GalaxyConfig, GalaxySeed, WorldConfig, WorldManager};

const DEFAULT_DISTANCE: f64 = 250_000.0;
const STEP: f64 = 50.0;
const SETTLE: Duration = Duration::from_secs(10);

fn main() {
    let mut args = std::env::args().skip(1);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                SUBSPACE - WORLD WALK                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    // ═══════════════════════════════════════════════════════════════
    // STEP 1: Configuration
    // ═══════════════════════════════════════════════════════════════
    println!("[1/4] Loading configuration...");
    let config = match args.next() {
        Some(path) => match WorldConfig::load(&path) {
            Ok(config) => {
                println!("   ✓ Loaded {path}");
                config
            }
            Err(e) => {
                eprintln!("   ✗ FATAL: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("   ✓ Using defaults (seed 42)");
            WorldConfig {
                galaxy: GalaxyConfig::with_seed(GalaxySeed::new(42)),
                ..WorldConfig::default()
            }
        }
    };
    let distance = match args.next().map(|d| d.parse::<f64>()) {
        None => DEFAULT_DISTANCE,
        Some(Ok(d)) if d.is_finite() && d >= 0.0 => d,
        Some(_) => {
            eprintln!("   ✗ FATAL: distance must be a non-negative number");
            std::process::exit(1);
        }
    };

    // ═══════════════════════════════════════════════════════════════
    // STEP 2: World
    // ═══════════════════════════════════════════════════════════════
    println!("[2/4] Starting world manager...");
    let mut world = match WorldManager::new(config) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            std::process::exit(1);
        }
    };
    println!("   ✓ Seed: {}", world.galaxy().seed().value());
    println!("   ✓ Workers: {}", world.worker_count());
    println!(
        "   ✓ Cache: {} chunks max, load radius {}",
        world.config().chunks.max_loaded_chunks,
        world.config().chunks.load_radius
    );

    // ═══════════════════════════════════════════════════════════════
    // STEP 3: Flight
    // ═══════════════════════════════════════════════════════════════
    let plan = FlightPlan::east(distance, STEP);
    println!("[3/4] Flying {distance} units east ({} frames)...", plan.frames());
    let report = match walk(&mut world, &plan, SETTLE) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            std::process::exit(1);
        }
    };
    println!("   ✓ Arrived at sector {:?}", report.end.sector);
    println!("   ✓ Peak loaded chunks: {}", report.peak_loaded);
    println!("   ✓ Took {:?}", report.elapsed);

    // ═══════════════════════════════════════════════════════════════
    // STEP 4: Report
    // ═══════════════════════════════════════════════════════════════
    println!("[4/4] Statistics");
    let stats = &report.stats;
    println!("   Chunks loaded:        {}", stats.chunks.loaded_chunks);
    println!("   Blocks resident:      {}", stats.chunks.total_blocks);
    println!("   Cache passes:         {}", stats.cache_updates);
    println!("   Requests completed:   {}", stats.completed_requests);
    println!("   Requests cancelled:   {}", stats.cancelled_requests);
    println!("   Requests failed:      {}", stats.failed_requests);
    println!("   Systems generated:    {}", stats.galaxy.total_systems);
    println!("   Gate connections:     {}", stats.galaxy.total_connections);
    println!(
        "   Avg gates per system: {:.2}",
        stats.galaxy.average_connections_per_system
    );

    println!();
    match &report.route {
        Some(route) => {
            println!("Gate route ({} jumps):", route.len().saturating_sub(1));
            for id in route {
                if let Some(system) = world.galaxy().system(*id) {
                    println!(
                        "   {id} {} ({:?}, danger {})",
                        system.name, system.system_type, system.danger_level
                    );
                }
            }
        }
        None => println!("No gate route within the explored network."),
    }

    world.shutdown();
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  WORLD WALK COMPLETE");
    println!("═══════════════════════════════════════════════════════════════");
}
