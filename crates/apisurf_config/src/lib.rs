//! Parsing and validation of `apisurf.toml` project configuration files.
//!
//! The configuration names the SDK, the cache file that records its surface,
//! and the public headers whose declarations make up that surface.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use types::*;
