//! `apisurf status`: report the cache state.

use apisurf_cache::VersionedCache;
use apisurf_surface::EntryKind;

use crate::pipeline::{load_project, print_blockers, print_pending};
use crate::{GlobalArgs, EXIT_NEEDS_REVIEW};

/// Runs the `apisurf status` command.
///
/// Returns exit code 0 if the cache is buildable and [`EXIT_NEEDS_REVIEW`]
/// otherwise.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let cache = VersionedCache::load(&project.cache_path())?;

    if !global.quiet {
        eprintln!(
            "      Status {} version {}",
            project.config.sdk.name,
            cache.version()
        );
        for kind in [EntryKind::Header, EntryKind::Function, EntryKind::Variable] {
            eprintln!(
                "             {:<8} {} enabled, {} known",
                kind.to_string(),
                cache.enabled(kind).len(),
                cache.known(kind).len()
            );
        }
        print_pending(&cache);
        print_blockers(&cache);
        if cache.is_buildable() {
            eprintln!("   Buildable yes");
        }
    }

    if cache.is_buildable() {
        Ok(0)
    } else {
        Ok(EXIT_NEEDS_REVIEW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{test_global, write_test_project};
    use apisurf_common::SdkVersion;

    #[test]
    fn clean_and_uninitialized_caches() {
        let dir = tempfile::tempdir().unwrap();
        write_test_project(dir.path(), &[("a.h", "")]);
        let path = dir.path().join("api_symbols.json");

        VersionedCache::create(&path, SdkVersion::new(3, 1), false).unwrap();
        assert_eq!(run(&test_global(dir.path())).unwrap(), 0);

        VersionedCache::create(&path, SdkVersion::ZERO, true).unwrap();
        assert_eq!(run(&test_global(dir.path())).unwrap(), EXIT_NEEDS_REVIEW);
    }
}
