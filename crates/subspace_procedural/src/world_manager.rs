//! # World Manager
//!
//! Ties the chunk cache, the galaxy and a pool of generation workers
//! together.
//!
//! ## Threading
//!
//! - The owner of the `WorldManager` (the simulation thread) is the only
//!   thread that writes to the chunk cache.
//! - Workers receive [`RegionRequest`]s over a channel, build blocks through
//!   the [`ContentGenerator`] and send them back. They never touch the cache.
//! - [`WorldManager::update`] and [`WorldManager::process_results`] never
//!   block; [`WorldManager::flush`] does, and exists for tests and tools.
//!
//! ## Stale Requests
//!
//! Every chunk request carries a cancellation flag. When the chunk is
//! unloaded or evicted before its result arrives, the flag is set: a worker
//! that has not started the job skips it, and a result that still arrives is
//! dropped. Sector requests are never cancelled.
//!
//! ## Chunk Content
//!
//! Residency and content are tracked apart. A chunk first created by merged
//! sector content is resident but still lacks its own content; the next
//! maintenance pass that finds it in the load sphere queues it like any
//! freshly loaded chunk. What a chunk holds therefore does not depend on
//! the order regions were generated in.
//!
//! ## Failures
//!
//! A panic inside a generator is caught on the worker and reported as a
//! failed result. The request is re-queued up to `max_retries` times, then
//! stays in the failed set.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use subspace_shared::{SectorCoordinate, Vec3};

use crate::block::VoxelBlock;
use crate::chunk::{ChunkCache, ChunkKey, ChunkStats};
use crate::config::WorldConfig;
use crate::content::{plan_chunk, plan_sector, ContentGenerator, ProceduralContent};
use crate::error::{WorldError, WorldResult};
use crate::galaxy::{Galaxy, GalaxyNetworkStats};

/// A region to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionRequest {
    /// Content of one chunk (queued by cache maintenance).
    Chunk(ChunkKey),
    /// Content around a sector's star (queued explicitly).
    Sector(SectorCoordinate),
}

impl fmt::Display for RegionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chunk(key) => write!(f, "chunk [{}, {}, {}]", key.x, key.y, key.z),
            Self::Sector(coord) => write!(f, "sector {coord}"),
        }
    }
}

/// What a worker produced for one request.
#[derive(Debug)]
pub enum GenerationOutcome {
    /// Blocks to merge into the cache.
    Completed(Vec<VoxelBlock>),
    /// The generator panicked.
    Failed(WorldError),
}

/// Aggregate world statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldStats {
    /// Chunk cache.
    pub chunks: ChunkStats,
    /// Galaxy graph.
    pub galaxy: GalaxyNetworkStats,
    /// Requests queued or running.
    pub pending_requests: usize,
    /// Results merged into the cache.
    pub completed_requests: u64,
    /// Failed attempts (each retry counts).
    pub failed_requests: u64,
    /// Chunk requests cancelled as stale.
    pub cancelled_requests: u64,
    /// Cache maintenance passes run.
    pub cache_updates: u64,
}

/// A queued job as seen by a worker.
struct Job {
    id: u64,
    request: RegionRequest,
    cancelled: Arc<AtomicBool>,
}

/// A finished job as seen by the manager.
struct JobResult {
    id: u64,
    outcome: GenerationOutcome,
}

/// Bookkeeping for a request in flight.
struct Pending {
    request: RegionRequest,
    cancelled: Arc<AtomicBool>,
    attempt: u32,
}

/// Read-only inputs shared by all workers.
struct WorkerContext {
    base_seed: i32,
    chunk_size: f64,
    generator: Arc<dyn ContentGenerator>,
}

impl WorkerContext {
    fn generate(&self, request: RegionRequest) -> Vec<VoxelBlock> {
        let plan = match request {
            RegionRequest::Chunk(key) => plan_chunk(self.base_seed, key, self.chunk_size),
            RegionRequest::Sector(coord) => plan_sector(self.base_seed, coord),
        };
        plan.build(self.generator.as_ref())
    }
}

/// Streams the world around a reference position.
pub struct WorldManager {
    /// Validated configuration.
    config: WorldConfig,
    /// Resident chunks.
    cache: ChunkCache,
    /// Star systems and gates.
    galaxy: Galaxy,
    /// Job queue (`None` after shutdown).
    jobs: Option<Sender<Job>>,
    /// Completed jobs.
    results: Receiver<JobResult>,
    /// Worker threads.
    workers: Vec<JoinHandle<()>>,
    /// Requests in flight by id.
    pending: HashMap<u64, Pending>,
    /// Pending chunk request per chunk.
    pending_chunks: HashMap<ChunkKey, u64>,
    /// Requests that exhausted their retries (or are still retrying).
    failed: HashSet<RegionRequest>,
    next_job_id: u64,
    /// Seconds since the last cache maintenance.
    since_update: f64,
    /// Reference position at the last cache maintenance.
    last_reference: Option<Vec3>,
    completed_requests: u64,
    failed_requests: u64,
    cancelled_requests: u64,
    cache_updates: u64,
}

impl WorldManager {
    /// Creates a manager with the built-in content generator.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a bad configuration, `WorkerSpawn` if the pool
    /// cannot be started.
    pub fn new(config: WorldConfig) -> WorldResult<Self> {
        Self::with_generator(config, Arc::new(ProceduralContent::default()))
    }

    /// Creates a manager with a custom content generator.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a bad configuration, `WorkerSpawn` if the pool
    /// cannot be started.
    pub fn with_generator(
        config: WorldConfig,
        generator: Arc<dyn ContentGenerator>,
    ) -> WorldResult<Self> {
        config.validate()?;

        let (job_tx, job_rx) = unbounded::<Job>();
        let (result_tx, result_rx) = unbounded::<JobResult>();
        let context = Arc::new(WorkerContext {
            base_seed: config.galaxy.seed.hash_seed(),
            chunk_size: config.chunks.chunk_size,
            generator,
        });

        let count = config.manager.worker_count();
        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let context = Arc::clone(&context);
            let handle = thread::Builder::new()
                .name(format!("world-gen-{index}"))
                .spawn(move || worker_loop(index, &jobs, &results, &context))
                .map_err(|e| WorldError::WorkerSpawn(e.to_string()))?;
            workers.push(handle);
        }

        tracing::info!(
            workers = count,
            seed = config.galaxy.seed.value(),
            "world generation pool started"
        );

        Ok(Self {
            cache: ChunkCache::new(config.chunks.clone()),
            galaxy: Galaxy::with_config(config.galaxy.clone()),
            config,
            jobs: Some(job_tx),
            results: result_rx,
            workers,
            pending: HashMap::new(),
            pending_chunks: HashMap::new(),
            failed: HashSet::new(),
            next_job_id: 0,
            since_update: 0.0,
            last_reference: None,
            completed_requests: 0,
            failed_requests: 0,
            cancelled_requests: 0,
            cache_updates: 0,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The chunk cache.
    #[must_use]
    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// The galaxy.
    #[must_use]
    pub fn galaxy(&self) -> &Galaxy {
        &self.galaxy
    }

    /// Number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Advances the maintenance timer and, when due, refreshes the cache
    /// around `reference`.
    ///
    /// Maintenance runs on the first call, when `update_interval_secs` has
    /// passed, or when the reference moved more than `movement_threshold`
    /// since the last run. Returns true if it ran.
    pub fn update(&mut self, dt: f64, reference: Vec3) -> bool {
        self.since_update += dt.max(0.0);

        let moved = self.last_reference.map_or(true, |last| {
            last.distance(reference) > self.config.manager.movement_threshold
        });
        if !moved && self.since_update < self.config.manager.update_interval_secs {
            return false;
        }

        self.since_update = 0.0;
        self.last_reference = Some(reference);
        self.cache_updates += 1;

        let changes = self.cache.update(reference);
        for key in changes.removed() {
            self.cancel_chunk(key);
        }

        // Every wanted chunk without its own content gets a request, no
        // matter who created it. A region that ran out of retries is only
        // tried again once it has been unloaded and loaded anew.
        let fresh: HashSet<ChunkKey> = changes.newly_loaded.iter().copied().collect();
        for key in changes.missing_content {
            if !self.cache.contains(key) || self.pending_chunks.contains_key(&key) {
                continue;
            }
            let request = RegionRequest::Chunk(key);
            if self.failed.contains(&request) && !fresh.contains(&key) {
                continue;
            }
            if let Err(e) = self.enqueue(request, 0) {
                tracing::warn!(error = %e, "chunk generation not queued");
                break;
            }
        }
        true
    }

    /// Queues generation of the content around a sector's star, and makes
    /// sure the sector's star system exists.
    ///
    /// A sector already queued is not queued twice.
    ///
    /// # Errors
    ///
    /// `PipelineClosed` after shutdown.
    pub fn generate_sector(&mut self, x: i32, y: i32, z: i32) -> WorldResult<()> {
        let coord = SectorCoordinate::new(x, y, z);
        let request = RegionRequest::Sector(coord);
        if self.pending.values().any(|p| p.request == request) {
            return Ok(());
        }
        self.galaxy.get_or_generate_system(coord);
        self.enqueue(request, 0).map(|_| ())
    }

    fn enqueue(&mut self, request: RegionRequest, attempt: u32) -> WorldResult<u64> {
        let sender = self.jobs.as_ref().ok_or(WorldError::PipelineClosed)?;
        let id = self.next_job_id;
        let cancelled = Arc::new(AtomicBool::new(false));

        sender
            .send(Job {
                id,
                request,
                cancelled: Arc::clone(&cancelled),
            })
            .map_err(|_| WorldError::PipelineClosed)?;

        self.next_job_id += 1;
        self.pending.insert(id, Pending { request, cancelled, attempt });
        if let RegionRequest::Chunk(key) = request {
            self.pending_chunks.insert(key, id);
        }
        tracing::trace!(job = id, %request, attempt, "generation queued");
        Ok(id)
    }

    fn cancel_chunk(&mut self, key: ChunkKey) {
        let Some(id) = self.pending_chunks.remove(&key) else {
            return;
        };
        if let Some(pending) = self.pending.remove(&id) {
            pending.cancelled.store(true, Ordering::Release);
            self.cancelled_requests += 1;
            tracing::trace!(job = id, request = %pending.request, "generation cancelled");
        }
    }

    /// Merges every finished result into the cache without blocking.
    ///
    /// Returns how many results were merged.
    pub fn process_results(&mut self) -> usize {
        let mut merged = 0;
        while let Ok(result) = self.results.try_recv() {
            if self.handle_result(result) {
                merged += 1;
            }
        }
        merged
    }

    fn handle_result(&mut self, result: JobResult) -> bool {
        let Some(pending) = self.pending.remove(&result.id) else {
            tracing::warn!(job = result.id, "discarding stale generation result");
            return false;
        };
        let request = pending.request;
        if let RegionRequest::Chunk(key) = request {
            self.pending_chunks.remove(&key);
        }

        match result.outcome {
            GenerationOutcome::Completed(blocks) => {
                let count = self.cache.add_blocks(blocks);
                if let RegionRequest::Chunk(key) = request {
                    self.cache.mark_generated(key);
                }
                self.completed_requests += 1;
                self.failed.remove(&request);
                tracing::trace!(%request, blocks = count, "generation merged");
                true
            }
            GenerationOutcome::Failed(error) => {
                self.failed_requests += 1;
                self.failed.insert(request);

                if pending.attempt < self.config.manager.max_retries {
                    tracing::warn!(
                        %request,
                        attempt = pending.attempt + 1,
                        %error,
                        "retrying generation"
                    );
                    if let Err(e) = self.enqueue(request, pending.attempt + 1) {
                        tracing::warn!(%request, error = %e, "retry not queued");
                    }
                } else {
                    tracing::error!(%request, %error, "generation failed, giving up");
                }
                false
            }
        }
    }

    /// Blocks until nothing is pending or `timeout` elapses, merging results
    /// as they arrive. Returns how many results were merged.
    pub fn flush(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut merged = self.process_results();

        while !self.pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.results.recv_timeout(remaining) {
                Ok(result) => {
                    if self.handle_result(result) {
                        merged += 1;
                    }
                    merged += self.process_results();
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        merged
    }

    /// Requests queued or running.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Requests whose last attempt failed, in sorted order.
    #[must_use]
    pub fn failed_regions(&self) -> Vec<RegionRequest> {
        let mut failed: Vec<RegionRequest> = self.failed.iter().copied().collect();
        failed.sort_unstable();
        failed
    }

    /// Aggregate statistics.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            chunks: self.cache.stats(),
            galaxy: self.galaxy.network_stats(),
            pending_requests: self.pending.len(),
            completed_requests: self.completed_requests,
            failed_requests: self.failed_requests,
            cancelled_requests: self.cancelled_requests,
            cache_updates: self.cache_updates,
        }
    }

    /// Closes the job queue and joins the workers. Idempotent.
    ///
    /// Requests still pending are dropped.
    pub fn shutdown(&mut self) {
        let Some(jobs) = self.jobs.take() else {
            return;
        };
        drop(jobs);

        for pending in self.pending.values() {
            pending.cancelled.store(true, Ordering::Release);
        }
        self.pending.clear();
        self.pending_chunks.clear();

        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        tracing::info!("world generation pool stopped");
    }
}

impl Drop for WorldManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    index: usize,
    jobs: &Receiver<Job>,
    results: &Sender<JobResult>,
    context: &WorkerContext,
) {
    tracing::debug!(worker = index, "generation worker started");

    while let Ok(job) = jobs.recv() {
        if job.cancelled.load(Ordering::Acquire) {
            continue;
        }

        let attempt = panic::catch_unwind(AssertUnwindSafe(|| context.generate(job.request)));
        let outcome = match attempt {
            Ok(blocks) => GenerationOutcome::Completed(blocks),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    worker = index,
                    request = %job.request,
                    %message,
                    "generator panicked"
                );
                GenerationOutcome::Failed(WorldError::GenerationPanicked {
                    request: job.request.to_string(),
                    message,
                })
            }
        };

        if results.send(JobResult { id: job.id, outcome }).is_err() {
            break;
        }
    }

    tracing::debug!(worker = index, "generation worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AsteroidSeed, StationConfig, Structure};
    use crate::seed::GalaxySeed;

    const WAIT: Duration = Duration::from_secs(20);

    struct Exploding;

    impl ContentGenerator for Exploding {
        fn generate_asteroid(&self, _seed: &AsteroidSeed) -> Vec<VoxelBlock> {
            panic!("asteroid generator exploded");
        }

        fn generate_station(&self, _config: &StationConfig) -> Structure {
            panic!("station generator exploded");
        }
    }

    fn manager(seed: i64) -> WorldManager {
        WorldManager::new(WorldConfig::test(GalaxySeed::new(seed))).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = WorldConfig::test(GalaxySeed::new(1));
        config.chunks.unload_radius = config.chunks.load_radius;
        assert!(matches!(
            WorldManager::new(config),
            Err(WorldError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_update_is_throttled() {
        let mut world = manager(1);
        assert!(world.update(0.0, Vec3::ZERO));
        assert!(!world.update(0.01, Vec3::ZERO));
        assert!(!world.update(0.01, Vec3::new(5.0, 0.0, 0.0)));

        // Moving past the threshold forces a pass.
        assert!(world.update(0.01, Vec3::new(50.0, 0.0, 0.0)));

        // So does the interval.
        assert!(!world.update(0.05, Vec3::new(50.0, 0.0, 0.0)));
        assert!(world.update(0.06, Vec3::new(50.0, 0.0, 0.0)));
        assert_eq!(world.stats().cache_updates, 3);
    }

    #[test]
    fn test_chunks_are_generated_and_merged() {
        let mut world = manager(42);
        world.update(0.0, Vec3::ZERO);
        let queued = world.pending_requests();
        assert_eq!(queued, world.cache().loaded_count());

        world.flush(WAIT);
        let stats = world.stats();
        assert_eq!(stats.pending_requests, 0);
        assert_eq!(stats.completed_requests, queued as u64);
        assert_eq!(stats.failed_requests, 0);
        assert!(world.failed_regions().is_empty());
    }

    #[test]
    fn test_generation_is_reproducible() {
        let run = || {
            let mut world = manager(1234);
            world.update(0.0, Vec3::new(20.0, -30.0, 40.0));
            world.flush(WAIT);
            let mut blocks: Vec<(i64, i64, i64)> = world
                .cache()
                .get_all_blocks()
                .map(|b| {
                    let p = b.position * 1000.0;
                    (p.x as i64, p.y as i64, p.z as i64)
                })
                .collect();
            blocks.sort_unstable();
            blocks
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_stale_chunk_requests_are_cancelled() {
        let mut world = manager(5);
        world.update(0.0, Vec3::ZERO);
        let first_wave = world.pending_requests();
        assert!(first_wave > 0);

        world.update(0.0, Vec3::new(50_000.0, 0.0, 0.0));
        let stats = world.stats();
        assert_eq!(stats.cancelled_requests, first_wave as u64);

        world.flush(WAIT);
        assert!(world.cache().get_chunk_at(Vec3::ZERO).is_none());
        assert_eq!(world.pending_requests(), 0);
    }

    #[test]
    fn test_sector_generation_adds_blocks_and_system() {
        let mut world = manager(77);
        world.generate_sector(0, 0, 0).unwrap();
        world.generate_sector(0, 0, 0).unwrap();
        assert_eq!(world.pending_requests(), 1);

        assert_eq!(world.flush(WAIT), 1);
        assert!(world.cache().stats().total_blocks > 0);
        assert_eq!(world.galaxy().system_count(), 1);
    }

    #[test]
    fn test_sector_content_does_not_suppress_chunk_content() {
        let size = WorldConfig::test(GalaxySeed::new(77)).chunks.chunk_size;

        let mut history = manager(77);
        history.generate_sector(0, 0, 0).unwrap();
        history.flush(WAIT);
        let block = history.cache().get_all_blocks().next().unwrap();
        let key = history.cache().key_for(block.position);
        let sector_blocks = history.cache().chunk(key).unwrap().read().block_count();
        assert!(!history.cache().chunk(key).unwrap().read().is_generated());

        assert!(history.update(0.0, key.center(size)));
        assert!(history.pending_chunks.contains_key(&key));
        history.flush(WAIT);

        let mut visit_only = manager(77);
        visit_only.update(0.0, key.center(size));
        visit_only.flush(WAIT);

        let with_history = history.cache().chunk(key).unwrap();
        let fresh = visit_only.cache().chunk(key).unwrap();
        assert!(with_history.read().is_generated());
        assert!(fresh.read().is_generated());
        assert_eq!(
            with_history.read().block_count(),
            fresh.read().block_count() + sector_blocks
        );
        for block in fresh.read().blocks() {
            assert!(with_history.read().blocks().contains(block));
        }
    }

    #[test]
    fn test_exhausted_chunk_is_not_requeued_in_place() {
        let config = WorldConfig::test(GalaxySeed::new(11));
        let mut world = WorldManager::with_generator(config, Arc::new(Exploding)).unwrap();

        // Find a chunk with content, so its generator panics.
        let size = world.config().chunks.chunk_size;
        let base = world.config().galaxy.seed.hash_seed();
        let key = (0..10_000)
            .map(|x| ChunkKey::new(x * 10, 0, 0))
            .find(|&key| !plan_chunk(base, key, size).is_empty())
            .unwrap();
        let center = key.center(size);

        world.update(0.0, center);
        world.flush(WAIT);
        assert!(world.failed_regions().contains(&RegionRequest::Chunk(key)));

        // Staying put does not hammer the pool with the same region.
        assert!(world.update(1.0, center));
        assert!(!world.pending_chunks.contains_key(&key));
    }

    #[test]
    fn test_worker_panic_marks_region_failed() {
        let config = WorldConfig::test(GalaxySeed::new(3));
        let retries = config.manager.max_retries;
        let mut world = WorldManager::with_generator(config, Arc::new(Exploding)).unwrap();

        world.generate_sector(1, 2, 3).unwrap();
        world.flush(WAIT);

        let stats = world.stats();
        assert_eq!(stats.pending_requests, 0);
        assert_eq!(stats.failed_requests, u64::from(retries) + 1);
        assert_eq!(
            world.failed_regions(),
            vec![RegionRequest::Sector(SectorCoordinate::new(1, 2, 3))]
        );

        // The pool is still alive.
        world.generate_sector(4, 5, 6).unwrap();
        world.flush(WAIT);
        assert_eq!(world.failed_regions().len(), 2);
    }

    #[test]
    fn test_shutdown_closes_pipeline() {
        let mut world = manager(9);
        world.shutdown();
        world.shutdown();
        assert_eq!(world.generate_sector(0, 0, 0), Err(WorldError::PipelineClosed));
        assert!(world.update(0.0, Vec3::ZERO));
        assert_eq!(world.pending_requests(), 0);
    }
}
