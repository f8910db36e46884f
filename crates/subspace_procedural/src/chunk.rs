//! # Chunk Cache
//!
//! Space is bucketed into fixed-size cubic chunks. Only chunks near a
//! reference position stay resident:
//! - Memory is bounded by `max_loaded_chunks`, whatever the player does
//! - A block's chunk is a pure function of its position, never stored twice
//! - Far chunks are unloaded, excess chunks are evicted least-recently-used
//!
//! ## Concurrency
//!
//! The chunk map is a sharded `DashMap`, so lookups from the simulation
//! thread never queue behind inserts from result merging. Each chunk sits
//! behind its own `RwLock`; access times are atomics so that a read only
//! needs the read lock.
//!
//! Iterators snapshot the chunk handles when called and walk the snapshot
//! lazily. No map guard is held while the caller consumes the iterator.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use subspace_shared::{hash_i64_triple, Vec3};

use crate::block::VoxelBlock;
use crate::config::ChunkCacheConfig;

/// Chunk index (in chunks, not world units).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    /// X index.
    pub x: i64,
    /// Y index.
    pub y: i64,
    /// Z index.
    pub z: i64,
}

impl ChunkKey {
    /// Creates a new chunk key.
    #[inline]
    #[must_use]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// The chunk containing `position`: `floor(position / chunk_size)` per axis.
    ///
    /// A position exactly on a boundary belongs to the chunk above it.
    #[inline]
    #[must_use]
    pub fn from_position(position: Vec3, chunk_size: f64) -> Self {
        let cell = (position / chunk_size).floor();
        Self::new(cell.x as i64, cell.y as i64, cell.z as i64)
    }

    /// World position of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub fn origin(self, chunk_size: f64) -> Vec3 {
        Vec3::new(self.x as f64, self.y as f64, self.z as f64) * chunk_size
    }

    /// World position of the chunk's centre.
    #[inline]
    #[must_use]
    pub fn center(self, chunk_size: f64) -> Vec3 {
        self.origin(chunk_size) + Vec3::splat(chunk_size * 0.5)
    }

    /// Deterministic seed for content generated inside this chunk.
    #[inline]
    #[must_use]
    pub const fn seed(self, base: i32) -> i32 {
        hash_i64_triple(base, self.x, self.y, self.z)
    }
}

/// A chunk of voxel blocks.
#[derive(Debug)]
pub struct Chunk {
    /// Chunk position in the grid.
    key: ChunkKey,
    /// Blocks in insertion order (order is not a contract).
    blocks: Vec<VoxelBlock>,
    /// Whether the chunk is part of the resident set.
    loaded: bool,
    /// Content changed since the mesh builder last consumed it.
    dirty: bool,
    /// The chunk's own procedural content has been merged.
    generated: bool,
    /// Cache clock tick of the last successful read.
    last_access: AtomicU64,
}

impl Chunk {
    /// Creates a new, empty, loaded chunk.
    #[must_use]
    pub fn new(key: ChunkKey) -> Self {
        Self {
            key,
            blocks: Vec::new(),
            loaded: true,
            dirty: false,
            generated: false,
            last_access: AtomicU64::new(0),
        }
    }

    /// Chunk position in the grid.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> ChunkKey {
        self.key
    }

    /// Blocks stored in this chunk.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[VoxelBlock] {
        &self.blocks
    }

    /// Mutable access to the blocks. Marks the chunk dirty.
    pub fn blocks_mut(&mut self) -> &mut Vec<VoxelBlock> {
        self.dirty = true;
        &mut self.blocks
    }

    /// Number of blocks.
    #[inline]
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the chunk is resident.
    #[inline]
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the content changed since the last `mark_clean`.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the chunk's own procedural content has been merged.
    ///
    /// Blocks added from elsewhere (sector content, edits) do not count.
    #[inline]
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }

    /// Cache clock tick of the last access.
    #[inline]
    #[must_use]
    pub fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Relaxed)
    }

    /// Appends a block and marks the chunk dirty.
    pub fn add_block(&mut self, block: VoxelBlock) {
        self.blocks.push(block);
        self.dirty = true;
    }

    /// Clears the dirty flag (called after a mesh rebuild).
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn touch(&self, tick: u64) {
        self.last_access.store(tick, Ordering::Relaxed);
    }

    fn unload(&mut self) {
        self.blocks = Vec::new();
        self.loaded = false;
        self.dirty = false;
        self.generated = false;
    }
}

/// Shared handle to a cached chunk.
pub type ChunkHandle = Arc<RwLock<Chunk>>;

/// Cache statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkStats {
    /// Chunks present in the map.
    pub total_chunks: usize,
    /// Chunks flagged loaded.
    pub loaded_chunks: usize,
    /// Loaded chunks waiting for a mesh rebuild.
    pub dirty_chunks: usize,
    /// Blocks across loaded chunks.
    pub total_blocks: usize,
}

/// What one [`ChunkCache::update`] changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheUpdate {
    /// Chunks created or re-loaded by this update.
    pub newly_loaded: Vec<ChunkKey>,
    /// Chunks dropped for being beyond the unload radius.
    pub unloaded: Vec<ChunkKey>,
    /// Chunks dropped to satisfy the loaded-chunk cap.
    pub evicted: Vec<ChunkKey>,
    /// Resident chunks in the load sphere whose own content was never
    /// generated, whoever created them. Sorted.
    pub missing_content: Vec<ChunkKey>,
}

impl CacheUpdate {
    /// Keys removed from the cache, for whatever reason.
    pub fn removed(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.unloaded.iter().chain(self.evicted.iter()).copied()
    }
}

/// Bounded, concurrently readable cache of chunks.
pub struct ChunkCache {
    /// Tuning.
    config: ChunkCacheConfig,
    /// All resident chunks keyed by grid index.
    chunks: DashMap<ChunkKey, ChunkHandle>,
    /// Monotonic access clock (LRU ordering).
    clock: AtomicU64,
}

impl ChunkCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(config: ChunkCacheConfig) -> Self {
        Self {
            config,
            chunks: DashMap::new(),
            clock: AtomicU64::new(0),
        }
    }

    /// Cache tuning.
    #[must_use]
    pub fn config(&self) -> &ChunkCacheConfig {
        &self.config
    }

    /// Key of the chunk containing `position`.
    #[inline]
    #[must_use]
    pub fn key_for(&self, position: Vec3) -> ChunkKey {
        ChunkKey::from_position(position, self.config.chunk_size)
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn center_distance(&self, key: ChunkKey, reference: Vec3) -> f64 {
        key.center(self.config.chunk_size).distance(reference)
    }

    /// Inserts a block into the chunk its position maps to, creating the
    /// chunk if needed, and marks that chunk dirty.
    pub fn add_block(&self, block: VoxelBlock) {
        let key = self.key_for(block.position);
        let handle = self.get_or_create(key);
        let mut chunk = handle.write();
        chunk.loaded = true;
        chunk.add_block(block);
    }

    /// Inserts many blocks. Returns how many were inserted.
    pub fn add_blocks(&self, blocks: impl IntoIterator<Item = VoxelBlock>) -> usize {
        let mut count = 0;
        for block in blocks {
            self.add_block(block);
            count += 1;
        }
        count
    }

    fn get_or_create(&self, key: ChunkKey) -> ChunkHandle {
        if let Some(existing) = self.chunks.get(&key) {
            return Arc::clone(existing.value());
        }
        // Creation is not an access: a chunk only filled by merged content
        // is older than anything the reference has visited.
        let entry = self
            .chunks
            .entry(key)
            .or_insert_with(|| Arc::new(RwLock::new(Chunk::new(key))));
        Arc::clone(entry.value())
    }

    /// Recomputes the resident set around `reference`.
    ///
    /// 1. Every chunk whose centre is within `load_radius` is created or
    ///    marked loaded, and its access time is refreshed.
    /// 2. Loaded chunks beyond `unload_radius` are unloaded.
    /// 3. While the loaded count exceeds `max_loaded_chunks`, chunks are
    ///    evicted: least-recently-accessed first among chunks outside the
    ///    load radius, then farthest-first among the ones just loaded.
    ///
    /// Steps 2 and 3 only reach step-1 chunks when the load sphere alone is
    /// larger than the cap; the cap always wins.
    pub fn update(&self, reference: Vec3) -> CacheUpdate {
        let mut outcome = CacheUpdate::default();
        let size = self.config.chunk_size;
        let load_radius = self.config.load_radius;

        // Step 1: load sphere.
        let center = self.key_for(reference);
        let reach = (load_radius / size).ceil() as i64 + 1;
        let mut wanted: HashSet<ChunkKey> = HashSet::new();
        let tick = self.tick();

        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    let key = ChunkKey::new(center.x + dx, center.y + dy, center.z + dz);
                    if self.center_distance(key, reference) > load_radius {
                        continue;
                    }
                    wanted.insert(key);

                    let created = !self.chunks.contains_key(&key);
                    let handle = self.get_or_create(key);
                    let mut chunk = handle.write();
                    chunk.touch(tick);
                    if created || !chunk.loaded {
                        chunk.loaded = true;
                        outcome.newly_loaded.push(key);
                    }
                }
            }
        }

        // Step 2: unload sphere.
        let unload_radius = self.config.unload_radius;
        let far: Vec<ChunkKey> = self
            .chunks
            .iter()
            .map(|entry| *entry.key())
            .filter(|key| !wanted.contains(key))
            .filter(|&key| self.center_distance(key, reference) > unload_radius)
            .collect();
        for key in far {
            if self.remove(key) {
                outcome.unloaded.push(key);
            }
        }

        // Step 3: cap.
        let max = self.config.max_loaded_chunks;
        let mut loaded = self.loaded_count();
        if loaded > max {
            let mut older: Vec<(u64, ChunkKey)> = self
                .chunks
                .iter()
                .filter(|entry| !wanted.contains(entry.key()))
                .map(|entry| {
                    let chunk = entry.value().read();
                    (chunk.last_access(), *entry.key())
                })
                .collect();
            older.sort_unstable();

            for (_, key) in older {
                if loaded <= max {
                    break;
                }
                if self.remove(key) {
                    outcome.evicted.push(key);
                    loaded -= 1;
                }
            }
        }

        if loaded > max {
            let mut fresh: Vec<(f64, ChunkKey)> = wanted
                .iter()
                .map(|&key| (self.center_distance(key, reference), key))
                .collect();
            fresh.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

            for (_, key) in fresh {
                if loaded <= max {
                    break;
                }
                if self.remove(key) {
                    outcome.evicted.push(key);
                    loaded -= 1;
                }
            }
        }

        outcome.missing_content = wanted
            .iter()
            .filter(|key| {
                self.chunks
                    .get(*key)
                    .is_some_and(|entry| !entry.value().read().is_generated())
            })
            .copied()
            .collect();
        outcome.missing_content.sort_unstable();

        if !outcome.evicted.is_empty() || !outcome.unloaded.is_empty() {
            tracing::debug!(
                loaded = outcome.newly_loaded.len(),
                unloaded = outcome.unloaded.len(),
                evicted = outcome.evicted.len(),
                resident = loaded,
                "chunk cache update"
            );
        } else {
            tracing::trace!(
                loaded = outcome.newly_loaded.len(),
                resident = loaded,
                "chunk cache update"
            );
        }

        outcome
    }

    /// Clears a chunk's blocks, flags it unloaded and drops it from the map.
    fn remove(&self, key: ChunkKey) -> bool {
        match self.chunks.remove(&key) {
            Some((_, handle)) => {
                handle.write().unload();
                true
            }
            None => false,
        }
    }

    /// The loaded chunk containing `position`. Counts as an access.
    #[must_use]
    pub fn get_chunk_at(&self, position: Vec3) -> Option<ChunkHandle> {
        self.get_chunk(self.key_for(position))
    }

    /// The loaded chunk with the given key. Counts as an access.
    #[must_use]
    pub fn get_chunk(&self, key: ChunkKey) -> Option<ChunkHandle> {
        let handle = Arc::clone(self.chunks.get(&key)?.value());
        let tick = self.tick();
        {
            let chunk = handle.read();
            if !chunk.is_loaded() {
                return None;
            }
            chunk.touch(tick);
        }
        Some(handle)
    }

    /// The chunk with the given key, without counting as an access.
    #[must_use]
    pub fn chunk(&self, key: ChunkKey) -> Option<ChunkHandle> {
        self.chunks.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns true if a loaded chunk exists for `key`. Not an access.
    #[must_use]
    pub fn contains(&self, key: ChunkKey) -> bool {
        self.chunks
            .get(&key)
            .is_some_and(|entry| entry.value().read().is_loaded())
    }

    fn snapshot(&self) -> Vec<ChunkHandle> {
        self.chunks.iter().map(|entry| Arc::clone(entry.value())).collect()
    }

    /// Loaded chunks. Each call takes a fresh snapshot.
    pub fn get_loaded_chunks(&self) -> impl Iterator<Item = ChunkHandle> {
        self.snapshot().into_iter().filter(|handle| handle.read().is_loaded())
    }

    /// Every block in every loaded chunk, one chunk at a time.
    pub fn get_all_blocks(&self) -> impl Iterator<Item = VoxelBlock> {
        self.get_loaded_chunks()
            .flat_map(|handle| handle.read().blocks().to_vec())
    }

    /// Loaded chunks with the dirty flag set.
    pub fn get_dirty_chunks(&self) -> impl Iterator<Item = ChunkHandle> {
        self.get_loaded_chunks().filter(|handle| handle.read().is_dirty())
    }

    /// Records that a chunk's own content has been merged. Returns false if
    /// it is not cached.
    pub fn mark_generated(&self, key: ChunkKey) -> bool {
        match self.chunks.get(&key) {
            Some(entry) => {
                entry.value().write().generated = true;
                true
            }
            None => false,
        }
    }

    /// Clears the dirty flag of a chunk. Returns false if it is not cached.
    pub fn mark_clean(&self, key: ChunkKey) -> bool {
        match self.chunks.get(&key) {
            Some(entry) => {
                entry.value().write().mark_clean();
                true
            }
            None => false,
        }
    }

    /// Chunks present in the map.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks flagged loaded.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.chunks
            .iter()
            .filter(|entry| entry.value().read().is_loaded())
            .count()
    }

    /// Aggregate statistics.
    #[must_use]
    pub fn stats(&self) -> ChunkStats {
        let mut stats = ChunkStats {
            total_chunks: self.chunks.len(),
            ..ChunkStats::default()
        };
        for handle in self.snapshot() {
            let chunk = handle.read();
            if chunk.is_loaded() {
                stats.loaded_chunks += 1;
                stats.total_blocks += chunk.block_count();
                if chunk.is_dirty() {
                    stats.dirty_chunks += 1;
                }
            }
        }
        stats
    }

    /// Unloads everything.
    pub fn clear(&self) {
        let keys: Vec<ChunkKey> = self.chunks.iter().map(|entry| *entry.key()).collect();
        for key in keys {
            self.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: f64, load: f64, unload: f64, max: usize) -> ChunkCacheConfig {
        ChunkCacheConfig {
            chunk_size,
            load_radius: load,
            unload_radius: unload,
            max_loaded_chunks: max,
        }
    }

    #[test]
    fn test_chunk_key_from_position() {
        let k = |x: f64| ChunkKey::from_position(Vec3::new(x, 0.0, 0.0), 100.0).x;
        assert_eq!(k(0.0), 0);
        assert_eq!(k(99.999), 0);
        assert_eq!(k(100.0), 1);
        assert_eq!(k(-0.001), -1);
        assert_eq!(k(-100.0), -1);
        assert_eq!(k(-100.001), -2);
    }

    #[test]
    fn test_add_block_and_lookup_same_chunk() {
        let cache = ChunkCache::new(ChunkCacheConfig::test());
        let block = VoxelBlock::hull(Vec3::new(150.0, -20.0, 100.0));
        cache.add_block(block);

        let key = cache.key_for(block.position);
        assert_eq!(key, ChunkKey::new(1, -1, 1));

        let a = cache.get_chunk_at(block.position).unwrap();
        let b = cache.get_chunk(key).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.read().blocks(), &[block]);
        assert!(a.read().is_dirty());
    }

    #[test]
    fn test_boundary_block_resolves_consistently() {
        let cache = ChunkCache::new(ChunkCacheConfig::test());
        let on_edge = VoxelBlock::hull(Vec3::new(200.0, 0.0, 0.0));
        cache.add_block(on_edge);

        let chunk = cache.get_chunk_at(on_edge.position).unwrap();
        assert_eq!(chunk.read().key(), ChunkKey::new(2, 0, 0));
        assert!(cache.get_chunk(ChunkKey::new(1, 0, 0)).is_none());
    }

    #[test]
    fn test_dirty_tracking() {
        let cache = ChunkCache::new(ChunkCacheConfig::test());
        cache.add_block(VoxelBlock::hull(Vec3::new(5.0, 5.0, 5.0)));
        cache.add_block(VoxelBlock::hull(Vec3::new(305.0, 5.0, 5.0)));
        assert_eq!(cache.get_dirty_chunks().count(), 2);

        assert!(cache.mark_clean(ChunkKey::new(0, 0, 0)));
        assert!(!cache.mark_clean(ChunkKey::new(9, 9, 9)));

        let dirty: Vec<ChunkKey> = cache.get_dirty_chunks().map(|c| c.read().key()).collect();
        assert_eq!(dirty, vec![ChunkKey::new(3, 0, 0)]);
    }

    #[test]
    fn test_iterators_are_restartable() {
        let cache = ChunkCache::new(ChunkCacheConfig::test());
        for i in 0..10 {
            cache.add_block(VoxelBlock::hull(Vec3::new(f64::from(i) * 40.0, 0.0, 0.0)));
        }
        assert_eq!(cache.get_all_blocks().count(), 10);
        assert_eq!(cache.get_all_blocks().count(), 10);
        assert_eq!(cache.stats().total_blocks, 10);
    }

    #[test]
    fn test_update_loads_sphere() {
        let cache = ChunkCache::new(config(100.0, 150.0, 300.0, 10_000));
        let outcome = cache.update(Vec3::new(50.0, 50.0, 50.0));

        // Centre chunk + 6 face neighbours + 12 edge neighbours (141.4 <= 150).
        assert_eq!(outcome.newly_loaded.len(), 19);
        assert_eq!(cache.loaded_count(), 19);

        // Same position again loads nothing new.
        let again = cache.update(Vec3::new(50.0, 50.0, 50.0));
        assert!(again.newly_loaded.is_empty());
        assert!(again.unloaded.is_empty());
    }

    #[test]
    fn test_update_unloads_far_chunks() {
        let cache = ChunkCache::new(config(100.0, 150.0, 300.0, 10_000));
        cache.update(Vec3::new(50.0, 50.0, 50.0));
        let handle = cache.get_chunk(ChunkKey::new(0, 0, 0)).unwrap();

        let outcome = cache.update(Vec3::new(10_050.0, 50.0, 50.0));
        assert_eq!(outcome.unloaded.len(), 19);
        assert!(!cache.contains(ChunkKey::new(0, 0, 0)));

        // Detached handles see the unloaded state.
        assert!(!handle.read().is_loaded());
        assert_eq!(handle.read().block_count(), 0);
    }

    #[test]
    fn test_lru_eviction_keeps_recently_read() {
        let cache = ChunkCache::new(config(10.0, 5.0, 100.0, 3));
        for x in 1..=4 {
            cache.add_block(VoxelBlock::hull(Vec3::new(f64::from(x) * 10.0 + 5.0, 5.0, 5.0)));
        }
        // Chunk 1 becomes the most recently used.
        assert!(cache.get_chunk(ChunkKey::new(1, 0, 0)).is_some());

        let outcome = cache.update(Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(outcome.newly_loaded, vec![ChunkKey::new(0, 0, 0)]);
        assert_eq!(outcome.evicted, vec![ChunkKey::new(2, 0, 0), ChunkKey::new(3, 0, 0)]);
        assert!(cache.contains(ChunkKey::new(0, 0, 0)));
        assert!(cache.contains(ChunkKey::new(1, 0, 0)));
        assert!(cache.contains(ChunkKey::new(4, 0, 0)));
        assert_eq!(cache.loaded_count(), 3);
    }

    #[test]
    fn test_lingering_in_a_chunk_keeps_it_fresh() {
        let cache = ChunkCache::new(config(10.0, 5.0, 100.0, 2));
        cache.update(Vec3::new(5.0, 5.0, 5.0));

        cache.add_block(VoxelBlock::hull(Vec3::new(55.0, 5.0, 5.0)));
        assert!(cache.get_chunk(ChunkKey::new(5, 0, 0)).is_some());

        // Staying put refreshes chunk 0 past the read of chunk 5.
        for _ in 0..3 {
            cache.update(Vec3::new(5.0, 5.0, 5.0));
        }
        let home = cache.chunk(ChunkKey::new(0, 0, 0)).unwrap();
        let far = cache.chunk(ChunkKey::new(5, 0, 0)).unwrap();
        assert!(home.read().last_access() > far.read().last_access());

        let outcome = cache.update(Vec3::new(15.0, 5.0, 5.0));
        assert_eq!(outcome.evicted, vec![ChunkKey::new(5, 0, 0)]);
        assert!(cache.contains(ChunkKey::new(0, 0, 0)));
        assert!(cache.contains(ChunkKey::new(1, 0, 0)));
    }

    #[test]
    fn test_unvisited_chunk_evicted_before_previous_home() {
        let cache = ChunkCache::new(config(10.0, 5.0, 100.0, 2));
        for _ in 0..11 {
            cache.update(Vec3::new(5.0, 5.0, 5.0));
        }
        cache.add_block(VoxelBlock::hull(Vec3::new(55.0, 5.0, 5.0)));

        let outcome = cache.update(Vec3::new(15.0, 5.0, 5.0));
        assert_eq!(outcome.evicted, vec![ChunkKey::new(5, 0, 0)]);
        assert!(cache.contains(ChunkKey::new(0, 0, 0)));
    }

    #[test]
    fn test_missing_content_tracks_generation() {
        let cache = ChunkCache::new(config(100.0, 150.0, 300.0, 10_000));
        cache.add_block(VoxelBlock::hull(Vec3::new(50.0, 50.0, 50.0)));

        let first = cache.update(Vec3::new(50.0, 50.0, 50.0));
        // The block's chunk existed already, so it is not newly loaded,
        // but its own content is still missing.
        assert_eq!(first.newly_loaded.len(), 18);
        assert_eq!(first.missing_content.len(), 19);
        assert!(first.missing_content.contains(&ChunkKey::new(0, 0, 0)));

        for key in &first.missing_content {
            assert!(cache.mark_generated(*key));
        }
        assert!(!cache.mark_generated(ChunkKey::new(99, 0, 0)));

        let second = cache.update(Vec3::new(50.0, 50.0, 50.0));
        assert!(second.missing_content.is_empty());
        assert!(cache.chunk(ChunkKey::new(0, 0, 0)).unwrap().read().is_generated());
    }

    #[test]
    fn test_cap_beats_load_sphere() {
        let cache = ChunkCache::new(config(100.0, 500.0, 750.0, 100));
        let outcome = cache.update(Vec3::ZERO);
        assert!(outcome.newly_loaded.len() > 100);
        assert_eq!(cache.loaded_count(), 100);

        // Survivors are the chunks nearest the reference.
        assert!(cache.contains(ChunkKey::new(0, 0, 0)));
        assert!(cache.contains(ChunkKey::new(-1, -1, -1)));
    }

    #[test]
    fn test_clear() {
        let cache = ChunkCache::new(ChunkCacheConfig::test());
        cache.update(Vec3::ZERO);
        assert!(cache.chunk_count() > 0);
        cache.clear();
        assert_eq!(cache.stats(), ChunkStats::default());
    }
}
