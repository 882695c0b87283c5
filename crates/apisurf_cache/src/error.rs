//! Error types for cache operations.

use apisurf_common::InternalError;
use std::path::PathBuf;

/// Errors that can occur while loading, updating or saving the cache.
///
/// Unlike a build cache, the surface cache is the record of truth: a missing
/// or unreadable file is a hard failure, never a silent fresh start.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing the cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The cache file does not exist.
    #[error("cache file {path} does not exist; initialize it first")]
    Missing {
        /// The expected cache path.
        path: PathBuf,
    },

    /// The cache file exists but its contents are not a valid surface record.
    #[error("malformed cache file {path}: {reason}")]
    Malformed {
        /// The cache path.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A serialization error occurred while writing.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A name given for review resolution is not pending review.
    #[error("'{name}' is not pending review")]
    NotPending {
        /// The name that was given.
        name: String,
    },

    /// The cache was loaded for its version only and cannot be saved.
    #[error("cache was loaded for its version only and cannot be saved")]
    VersionOnly,

    /// Export was requested from a cache that still needs review.
    #[error("API surface is not buildable: {}", .reasons.join("; "))]
    NotBuildable {
        /// Why the surface is not buildable.
        reasons: Vec<String>,
    },

    /// Initialization would overwrite an existing cache file.
    #[error("cache file {path} already exists")]
    AlreadyExists {
        /// The existing cache path.
        path: PathBuf,
    },

    /// An internal consistency check failed.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
