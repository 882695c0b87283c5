//! `apisurf update`: extract, diff, bump, save.
//!
//! The pipeline:
//!
//! 1. Find the project and load `apisurf.toml`
//! 2. Load the cache (it must exist)
//! 3. Parse every configured header and register its surface
//! 4. Diff the extraction into the cache and bump the version
//! 5. Save, unless `--dry-run`
//!
//! Any failure before step 5 leaves the cache file untouched.

use apisurf_cache::VersionedCache;
use apisurf_surface::extract_surface;

use crate::pipeline::{load_project, print_blockers, print_pending};
use crate::{GlobalArgs, EXIT_NEEDS_REVIEW};

/// Runs the `apisurf update` command.
///
/// Returns exit code 0 if the updated surface is buildable and
/// [`EXIT_NEEDS_REVIEW`] otherwise.
pub fn run(dry_run: bool, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let sdk = &project.config.sdk;
    let mut cache = VersionedCache::load(&project.cache_path())?;

    if !global.quiet {
        eprintln!(
            "   Extracting {} ({} header(s)) at version {}",
            sdk.name,
            sdk.headers.len(),
            cache.version()
        );
    }

    let registry = extract_surface(
        &project.config.header_root(&project.dir),
        &sdk.headers,
        &project.config.ignore_macros(),
    )?;
    let report = cache.apply(&registry);

    if dry_run {
        tracing::info!("dry run, cache not saved");
    } else {
        cache.save()?;
    }

    if !global.quiet {
        eprint!("{report}");
        eprintln!(
            "   Surface {} header(s), {} function(s), {} variable(s){}",
            registry.headers().len(),
            registry.functions().len(),
            registry.variables().len(),
            if dry_run { " (dry run, not saved)" } else { "" }
        );
        print_pending(&cache);
        print_blockers(&cache);
    }

    if cache.is_buildable() {
        Ok(0)
    } else {
        Ok(EXIT_NEEDS_REVIEW)
    }
}
