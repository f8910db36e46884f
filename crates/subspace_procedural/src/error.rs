//! # World Error Types
//!
//! Graph and cache queries never fail; absence is an `Option`.
//! These errors cover configuration and the generation pipeline only.

use thiserror::Error;

/// Errors raised by configuration loading and the generation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be read.
    #[error("failed to read config {path}: {message}")]
    ConfigIo {
        /// Path that was read.
        path: String,
        /// Underlying I/O error text.
        message: String,
    },

    /// A configuration file is not valid TOML for `WorldConfig`.
    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    /// A background generation job panicked.
    #[error("generation of {request} panicked: {message}")]
    GenerationPanicked {
        /// Human-readable form of the request.
        request: String,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// A generation worker thread could not be started.
    #[error("failed to spawn generation worker: {0}")]
    WorkerSpawn(String),

    /// The worker pool is gone; no more requests can be queued.
    #[error("generation pipeline is closed")]
    PipelineClosed,
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
