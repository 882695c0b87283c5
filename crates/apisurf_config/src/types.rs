//! Configuration types deserialized from `apisurf.toml`.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The top-level project configuration parsed from `apisurf.toml`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// The SDK whose surface is tracked.
    pub sdk: SdkConfig,
    /// Declaration parser settings.
    #[serde(default)]
    pub parser: ParserConfig,
}

/// The tracked SDK.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SdkConfig {
    /// The SDK name, e.g. a hardware target such as `f7`.
    pub name: String,
    /// Path of the cache file, relative to the project directory.
    pub cache: String,
    /// Directory the header names are relative to, relative to the project
    /// directory.
    #[serde(default = "default_root")]
    pub root: String,
    /// The public headers, in processing order.
    pub headers: Vec<String>,
}

fn default_root() -> String {
    ".".to_string()
}

/// Declaration parser settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// Object-like macros used as declaration decoration, e.g. attribute
    /// wrappers. A listed macro and any parenthesized arguments are skipped.
    #[serde(default)]
    pub ignore_macros: Vec<String>,
}

impl ProjectConfig {
    /// The cache file path for a project rooted at `project_dir`.
    pub fn cache_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.sdk.cache)
    }

    /// The directory header names resolve against.
    pub fn header_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.sdk.root)
    }

    /// The ignored macros as a set.
    pub fn ignore_macros(&self) -> HashSet<String> {
        self.parser.ignore_macros.iter().cloned().collect()
    }
}
