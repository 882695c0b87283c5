//! Shared pipeline helpers for CLI commands.
//!
//! Project root resolution, configuration loading, and the report lines the
//! commands print about a cache.

use std::path::{Path, PathBuf};

use apisurf_cache::VersionedCache;
use apisurf_config::{ProjectConfig, CONFIG_FILE};

use crate::GlobalArgs;

/// A located project: its directory and parsed configuration.
pub struct Project {
    /// Directory that relative config paths resolve against.
    pub dir: PathBuf,
    /// The parsed `apisurf.toml`.
    pub config: ProjectConfig,
}

impl Project {
    /// The cache file path.
    pub fn cache_path(&self) -> PathBuf {
        self.config.cache_path(&self.dir)
    }
}

/// Walks up from `start` looking for the nearest directory containing `apisurf.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Locates and loads the project from global CLI args.
///
/// If `--config` names a file, that file is loaded and its directory is the
/// project directory; if it names a directory, `apisurf.toml` is loaded from
/// it. Otherwise walks up from the current directory.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let (dir, config) = match global.config {
        Some(ref config_path) => {
            let path = PathBuf::from(config_path);
            if path.is_file() {
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                let config = apisurf_config::load_config_file(&path)?;
                (dir, config)
            } else {
                let config = apisurf_config::load_config(&path)?;
                (path, config)
            }
        }
        None => {
            let dir = find_project_root(&std::env::current_dir()?)?;
            let config = apisurf_config::load_config(&dir)?;
            (dir, config)
        }
    };
    tracing::debug!(dir = %dir.display(), sdk = %config.sdk.name, "loaded project");
    Ok(Project { dir, config })
}

/// Prints every reason the cache is not buildable, one per line.
pub fn print_blockers(cache: &VersionedCache) {
    for reason in cache.blockers() {
        eprintln!("     Blocked {reason}");
    }
}

/// Prints the entries awaiting review with the commands that resolve them.
pub fn print_pending(cache: &VersionedCache) {
    let pending = cache.pending_review();
    if pending.is_empty() {
        return;
    }
    eprintln!("     Pending review ({}):", pending.len());
    for entry in pending {
        eprintln!("       ? {:<8} {entry}", entry.kind().to_string());
    }
    eprintln!("     Resolve with `apisurf accept <NAME>..` or `apisurf disable <NAME>..`");
}

/// Writes an `apisurf.toml` and the given headers under `dir/include`.
#[cfg(test)]
pub(crate) fn write_test_project(dir: &Path, headers: &[(&str, &str)]) {
    let names: Vec<String> = headers.iter().map(|(n, _)| format!("\"{n}\"")).collect();
    std::fs::write(
        dir.join(CONFIG_FILE),
        format!(
            "[sdk]\nname = \"f7\"\ncache = \"api_symbols.json\"\nroot = \"include\"\nheaders = [{}]\n",
            names.join(", ")
        ),
    )
    .unwrap();
    for (name, text) in headers {
        let path = dir.join("include").join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }
}

/// Global args pointing `--config` at `dir`.
#[cfg(test)]
pub(crate) fn test_global(dir: &Path) -> GlobalArgs {
    GlobalArgs {
        quiet: true,
        verbose: false,
        color: false,
        config: Some(dir.display().to_string()),
    }
}
