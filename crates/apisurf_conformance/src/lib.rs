//! Conformance test helpers for apisurf.
//!
//! [`SdkProject`] lays out a throwaway SDK on disk (an `apisurf.toml`, a
//! header tree and a cache file) and runs the same extract → diff → save
//! pipeline as `apisurf update`, so integration tests can assert on both the
//! in-memory result and the bytes left on disk.

#![warn(missing_docs)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use apisurf_cache::{CacheError, DiffReport, VersionedCache};
use apisurf_common::SdkVersion;
use apisurf_config::{load_config_from_str, ConfigError, ProjectConfig};
use apisurf_surface::{extract_surface, ApiEntry, Extractor, SurfaceError, SymbolRegistry};
use tempfile::TempDir;

/// Any failure of the update pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Extraction failed.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    /// Loading or saving the cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
    /// The generated configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result of one successful update run.
pub struct UpdateOutcome {
    /// The diff the run applied.
    pub report: DiffReport,
    /// The cache after the run, as saved.
    pub cache: VersionedCache,
}

/// A temporary SDK project on disk.
pub struct SdkProject {
    dir: TempDir,
    headers: Vec<String>,
    ignore_macros: Vec<String>,
}

impl SdkProject {
    /// Creates an empty project with no headers and no cache.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
            headers: Vec::new(),
            ignore_macros: Vec::new(),
        }
    }

    /// The project directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes (or rewrites) a header and lists it in the configuration.
    pub fn write_header(&mut self, name: &str, text: &str) -> &mut Self {
        let path = self.header_root().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create header dir");
        }
        std::fs::write(path, text).expect("write header");
        if !self.headers.iter().any(|h| h == name) {
            self.headers.push(name.to_string());
        }
        self
    }

    /// Drops a header from the configuration.
    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.retain(|h| h != name);
        self
    }

    /// Treats `name` as a decoration macro.
    pub fn ignore_macro(&mut self, name: &str) -> &mut Self {
        self.ignore_macros.push(name.to_string());
        self
    }

    fn header_root(&self) -> PathBuf {
        self.path().join("include")
    }

    /// The configuration for the current header list.
    pub fn config(&self) -> Result<ProjectConfig, ConfigError> {
        let quoted = |items: &[String]| {
            items
                .iter()
                .map(|s| format!("\"{s}\""))
                .collect::<Vec<_>>()
                .join(", ")
        };
        load_config_from_str(&format!(
            r#"
[sdk]
name = "conformance"
cache = "api_symbols.json"
root = "include"
headers = [{headers}]

[parser]
ignore_macros = [{macros}]
"#,
            headers = quoted(&self.headers),
            macros = quoted(&self.ignore_macros),
        ))
    }

    /// The cache file path.
    pub fn cache_path(&self) -> PathBuf {
        self.path().join("api_symbols.json")
    }

    /// Writes an empty cache at `version`.
    pub fn init(&self, version: SdkVersion) -> Result<VersionedCache, CacheError> {
        VersionedCache::create(&self.cache_path(), version, true)
    }

    /// Loads the cache.
    pub fn load(&self) -> Result<VersionedCache, CacheError> {
        VersionedCache::load(&self.cache_path())
    }

    /// The cache file contents, or an empty string if there is none.
    pub fn cache_text(&self) -> String {
        std::fs::read_to_string(self.cache_path()).unwrap_or_default()
    }

    /// Runs `apisurf update`: load, extract, diff, save.
    pub fn update(&self) -> Result<UpdateOutcome, PipelineError> {
        let config = self.config()?;
        let mut cache = self.load()?;
        let registry = extract_surface(
            &config.header_root(self.path()),
            &config.sdk.headers,
            &config.ignore_macros(),
        )?;
        let report = cache.apply(&registry);
        cache.save()?;
        Ok(UpdateOutcome { report, cache })
    }

    /// Runs one update, accepts everything pending, saves and reloads.
    /// Leaves a clean cache for the current headers.
    pub fn settle(&self) -> Result<VersionedCache, PipelineError> {
        let mut outcome = self.update()?;
        outcome.cache.accept(&apisurf_cache::Selection::All)?;
        outcome.cache.save()?;
        Ok(self.load()?)
    }
}

impl Default for SdkProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the surface of in-memory headers, in order.
pub fn extract_sources(sources: &[(&str, &str)]) -> Result<SymbolRegistry, SurfaceError> {
    let mut extractor = Extractor::new(HashSet::new());
    for (name, text) in sources {
        extractor.add_header_source(name, *text)?;
    }
    Ok(extractor.finish())
}

/// Extracts a single header and returns its one function or variable entry.
pub fn single_symbol(text: &str) -> Result<ApiEntry, SurfaceError> {
    let registry = extract_sources(&[("single.h", text)])?;
    let mut symbols = registry
        .functions()
        .iter()
        .chain(registry.variables())
        .cloned();
    match (symbols.next(), symbols.next()) {
        (Some(entry), None) => Ok(entry),
        _ => panic!("expected exactly one symbol in {text:?}"),
    }
}

/// The canonical type of the single `extern` variable declared by `text`.
pub fn variable_type(text: &str) -> Result<String, SurfaceError> {
    match single_symbol(text)? {
        ApiEntry::Variable { ty, .. } => Ok(ty),
        other => panic!("expected a variable, got {other}"),
    }
}
