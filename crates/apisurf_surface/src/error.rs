//! Error types for surface extraction.
//!
//! Every variant is fatal: extraction stops and no registry is produced, so
//! the persisted cache is never updated from a partial surface.

use apisurf_common::SymbolHash;
use std::path::PathBuf;

/// Errors that abort an extraction run.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// The canonicalizer met a declaration-tree node it has no rendering for.
    #[error("cannot canonicalize {node} at {location}")]
    UnsupportedNode {
        /// What kind of node was met.
        node: &'static str,
        /// Where it was written, as `path:line:col`.
        location: String,
    },

    /// Two distinct symbol names produce the same name hash.
    #[error("symbol hash collision: '{first}' and '{second}' both hash to {hash}")]
    HashCollision {
        /// The shared hash.
        hash: SymbolHash,
        /// The name registered first.
        first: String,
        /// The name that collided with it.
        second: String,
    },

    /// A symbol name was registered twice with different signatures.
    #[error("'{name}' is declared twice with different signatures: `{previous}` and `{current}`")]
    Redeclaration {
        /// The symbol name.
        name: String,
        /// The signature registered first.
        previous: String,
        /// The conflicting signature.
        current: String,
    },

    /// A header produced error diagnostics while parsing.
    #[error("failed to parse {path} ({} error(s))\n{}", .errors.len(), .errors.join(""))]
    Parse {
        /// The SDK-relative header name.
        path: String,
        /// Each error diagnostic, rendered for the terminal.
        errors: Vec<String>,
    },

    /// A header could not be read.
    #[error("failed to read header {path}: {source}")]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
