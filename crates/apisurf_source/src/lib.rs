//! Header file management and span tracking for diagnostics.
//!
//! The [`SourceDb`] owns the text of every header read during an extraction
//! run. [`FileId`] and [`Span`] tie tokens and declarations back to their
//! origin, and [`ResolvedSpan`] turns byte offsets into line/column pairs.

#![warn(missing_docs)]

pub mod source_db;
pub mod source_file;
pub mod span;

pub use source_db::{ResolvedSpan, SourceDb};
pub use source_file::SourceFile;
pub use span::{FileId, Span};
