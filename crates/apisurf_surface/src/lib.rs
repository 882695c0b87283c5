//! API surface extraction for a firmware SDK.
//!
//! Turns parsed public headers into the set of [`ApiEntry`] values the
//! firmware exports: the [`filter`] picks the declarations that are real,
//! separately linked symbols, the [`canonical`] renderer spells their types
//! the way C would, and the [`SymbolRegistry`] keeps the run's entries free of
//! redeclarations and name-hash collisions. [`extract_surface`] drives the
//! whole pass over a list of headers.

#![warn(missing_docs)]

pub mod canonical;
pub mod entry;
pub mod error;
pub mod extract;
pub mod filter;
pub mod registry;

pub use canonical::{Canonicalize, Canonicalizer};
pub use entry::{ApiEntry, EntryKind};
pub use error::SurfaceError;
pub use extract::{extract_surface, Extractor};
pub use filter::{surface_decls, SurfaceDecl};
pub use registry::SymbolRegistry;
