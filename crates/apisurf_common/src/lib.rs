//! Shared foundational types used across the apisurf toolchain.
//!
//! This crate provides interned identifiers for declaration trees, the
//! fixed-width symbol name hash used by the firmware loader, the SDK version
//! pair, and the common internal error type.

#![warn(missing_docs)]

pub mod ident;
pub mod result;
pub mod symbol_hash;
pub mod version;

pub use ident::{Ident, Interner};
pub use result::{InternalError, SurfResult};
pub use symbol_hash::SymbolHash;
pub use version::{ParseVersionError, SdkVersion, VersionBump};
