//! The versioned API surface cache.
//!
//! The cache file is the record of truth for the SDK surface: every header,
//! function and variable ever exported, which of them are retired or awaiting
//! review, and the current [`SdkVersion`](apisurf_common::SdkVersion). A run
//! loads it, [`apply`](VersionedCache::apply)s a fresh extraction, and saves
//! it back only after the whole pass succeeded.

#![warn(missing_docs)]

pub mod cache;
pub mod diff;
pub mod error;
pub mod export;
pub mod resolve;
pub mod row;

pub use cache::VersionedCache;
pub use diff::{CategoryDiff, DiffReport};
pub use error::CacheError;
pub use export::{ExportManifest, ExportedSymbol};
pub use resolve::{Resolution, Selection};
pub use row::{Row, RowKind, RowStatus};
