//! # World Configuration
//!
//! Loaded once at startup from a TOML file. Every section has defaults, so
//! an empty file is a valid configuration.
//!
//! ```toml
//! [galaxy]
//! seed = 42
//!
//! [chunks]
//! chunk_size = 100.0
//! load_radius = 500.0
//! unload_radius = 750.0
//! max_loaded_chunks = 1024
//!
//! [manager]
//! update_interval_secs = 0.5
//! movement_threshold = 50.0
//! worker_threads = 4
//! max_retries = 2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};
use crate::seed::GalaxySeed;

/// Galaxy generation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    /// Seed of the whole universe.
    pub seed: GalaxySeed,
    /// Candidate neighbours lie within this many sectors (Euclidean).
    pub connection_radius: i32,
    /// Gate distance from the star as a fraction of half a sector.
    pub gate_ring_fraction: f64,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            seed: GalaxySeed::default(),
            connection_radius: 3,
            gate_ring_fraction: 0.9,
        }
    }
}

impl GalaxyConfig {
    /// Default settings with the given seed.
    #[must_use]
    pub fn with_seed(seed: GalaxySeed) -> Self {
        Self { seed, ..Self::default() }
    }
}

/// Chunk cache tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkCacheConfig {
    /// Edge length of a chunk in world units.
    pub chunk_size: f64,
    /// Chunks whose centre is within this distance are loaded.
    pub load_radius: f64,
    /// Loaded chunks whose centre is beyond this distance are unloaded.
    pub unload_radius: f64,
    /// Hard cap on loaded chunks; excess is evicted least-recently-used first.
    pub max_loaded_chunks: usize,
}

impl Default for ChunkCacheConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100.0,
            load_radius: 500.0,
            unload_radius: 750.0,
            max_loaded_chunks: 1024,
        }
    }
}

impl ChunkCacheConfig {
    /// Small radii for unit tests.
    #[must_use]
    pub fn test() -> Self {
        Self {
            chunk_size: 100.0,
            load_radius: 250.0,
            unload_radius: 400.0,
            max_loaded_chunks: 256,
        }
    }

    /// Checks radius ordering and sizes.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::InvalidConfig` describing the first bad value.
    pub fn validate(&self) -> WorldResult<()> {
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(invalid(format!("chunk_size must be positive, got {}", self.chunk_size)));
        }
        if !(self.load_radius.is_finite() && self.load_radius > 0.0) {
            return Err(invalid(format!("load_radius must be positive, got {}", self.load_radius)));
        }
        if !(self.unload_radius.is_finite() && self.load_radius < self.unload_radius) {
            return Err(invalid(format!(
                "load_radius ({}) must be smaller than unload_radius ({})",
                self.load_radius, self.unload_radius
            )));
        }
        if self.max_loaded_chunks == 0 {
            return Err(invalid("max_loaded_chunks must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Orchestrator throttling and worker pool settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldManagerConfig {
    /// Cache maintenance runs at most this often unless the reference moves.
    pub update_interval_secs: f64,
    /// Movement (world units) since the last maintenance that forces a new one.
    pub movement_threshold: f64,
    /// Worker thread count. `None` uses the available parallelism.
    pub worker_threads: Option<usize>,
    /// How often a failed region is re-queued before it stays failed.
    pub max_retries: u32,
}

impl Default for WorldManagerConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 0.5,
            movement_threshold: 50.0,
            worker_threads: None,
            max_retries: 2,
        }
    }
}

impl WorldManagerConfig {
    /// Two workers, short interval - for tests.
    #[must_use]
    pub fn test() -> Self {
        Self {
            update_interval_secs: 0.1,
            movement_threshold: 10.0,
            worker_threads: Some(2),
            max_retries: 1,
        }
    }

    /// Resolved worker count.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        })
    }

    /// Checks throttle and pool settings.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::InvalidConfig` describing the first bad value.
    pub fn validate(&self) -> WorldResult<()> {
        if !(self.update_interval_secs.is_finite() && self.update_interval_secs > 0.0) {
            return Err(invalid(format!(
                "update_interval_secs must be positive, got {}",
                self.update_interval_secs
            )));
        }
        if !(self.movement_threshold.is_finite() && self.movement_threshold > 0.0) {
            return Err(invalid(format!(
                "movement_threshold must be positive, got {}",
                self.movement_threshold
            )));
        }
        if self.worker_threads == Some(0) {
            return Err(invalid("worker_threads must be at least 1".to_string()));
        }
        if self.max_retries > 16 {
            return Err(invalid(format!(
                "max_retries must be at most 16, got {}",
                self.max_retries
            )));
        }
        Ok(())
    }
}

/// Complete world configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Galaxy settings.
    pub galaxy: GalaxyConfig,
    /// Chunk cache settings.
    pub chunks: ChunkCacheConfig,
    /// Orchestrator settings.
    pub manager: WorldManagerConfig,
}

impl WorldConfig {
    /// Test preset with the given seed.
    #[must_use]
    pub fn test(seed: GalaxySeed) -> Self {
        Self {
            galaxy: GalaxyConfig::with_seed(seed),
            chunks: ChunkCacheConfig::test(),
            manager: WorldManagerConfig::test(),
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `ConfigParse` on malformed TOML, `InvalidConfig` on bad values.
    pub fn from_toml_str(text: &str) -> WorldResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| WorldError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `ConfigIo` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> WorldResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| WorldError::ConfigIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::InvalidConfig` describing the first bad value.
    pub fn validate(&self) -> WorldResult<()> {
        if self.galaxy.connection_radius < 1 {
            return Err(invalid(format!(
                "connection_radius must be at least 1, got {}",
                self.galaxy.connection_radius
            )));
        }
        if !(self.galaxy.gate_ring_fraction > 0.0 && self.galaxy.gate_ring_fraction < 1.0) {
            return Err(invalid(format!(
                "gate_ring_fraction must be in (0, 1), got {}",
                self.galaxy.gate_ring_fraction
            )));
        }
        self.chunks.validate()?;
        self.manager.validate()
    }
}

fn invalid(message: String) -> WorldError {
    WorldError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = WorldConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn test_parses_partial_document() {
        let config = WorldConfig::from_toml_str(
            r#"
            [galaxy]
            seed = 42

            [chunks]
            chunk_size = 64.0
            max_loaded_chunks = 300

            [manager]
            worker_threads = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.galaxy.seed, GalaxySeed::new(42));
        assert_eq!(config.chunks.chunk_size, 64.0);
        assert_eq!(config.chunks.load_radius, 500.0);
        assert_eq!(config.chunks.max_loaded_chunks, 300);
        assert_eq!(config.manager.worker_count(), 3);
    }

    #[test]
    fn test_rejects_inverted_radii() {
        let err = WorldConfig::from_toml_str(
            r#"
            [chunks]
            load_radius = 800.0
            unload_radius = 750.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_zero_workers_and_bad_toml() {
        let err = WorldConfig::from_toml_str("[manager]\nworker_threads = 0\n").unwrap_err();
        assert!(matches!(err, WorldError::InvalidConfig(_)));

        let err = WorldConfig::from_toml_str("[chunks\nchunk_size = ").unwrap_err();
        assert!(matches!(err, WorldError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WorldConfig::load("/definitely/not/here/world.toml").unwrap_err();
        assert!(matches!(err, WorldError::ConfigIo { .. }));
    }

    #[test]
    fn test_presets_are_valid() {
        WorldConfig::default().validate().unwrap();
        WorldConfig::test(GalaxySeed::new(1)).validate().unwrap();
    }
}
