//! Diagnostics raised while reading public headers.
//!
//! Lexer and parser problems are recorded as structured [`Diagnostic`]s in a
//! [`DiagnosticSink`] instead of aborting on the first one, so a single run
//! reports every broken declaration in a header. [`TerminalRenderer`] formats
//! them rustc-style for the build log.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
