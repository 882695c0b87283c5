//! `apisurf init`: writes an empty cache file.

use apisurf_cache::VersionedCache;
use apisurf_common::SdkVersion;

use crate::pipeline::load_project;
use crate::GlobalArgs;

/// Runs the `apisurf init` command.
///
/// Creates the configured cache file with no entries at `version`. An
/// existing cache is only replaced with `force`.
pub fn run(
    version: SdkVersion,
    force: bool,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let path = project.cache_path();
    VersionedCache::create(&path, version, force)?;

    if !global.quiet {
        eprintln!(
            "     Created {} for {} at version {version}",
            path.display(),
            project.config.sdk.name
        );
        if version.is_sentinel() {
            eprintln!("        Note version {version} is uninitialized and never buildable");
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{test_global, write_test_project};

    #[test]
    fn creates_cache_once() {
        let dir = tempfile::tempdir().unwrap();
        write_test_project(dir.path(), &[("a.h", "")]);
        let global = test_global(dir.path());

        assert_eq!(run(SdkVersion::new(1, 0), false, &global).unwrap(), 0);
        let cache = VersionedCache::load(&dir.path().join("api_symbols.json")).unwrap();
        assert_eq!(cache.version(), SdkVersion::new(1, 0));

        let err = run(SdkVersion::new(2, 0), false, &global).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(run(SdkVersion::new(2, 0), true, &global).unwrap(), 0);
    }
}
