//! `apisurf version`: print the SDK version for plugin builds.

use apisurf_cache::VersionedCache;

use crate::pipeline::load_project;
use crate::GlobalArgs;

/// Runs the `apisurf version` command. Reads only the version row.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let cache = VersionedCache::load_version_only(&project.cache_path())?;
    println!("{}", cache.version());
    Ok(0)
}
