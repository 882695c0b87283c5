//! `apisurf accept` and `apisurf disable`: resolve pending entries.

use apisurf_cache::{Resolution, Selection, VersionedCache};

use crate::pipeline::{load_project, print_blockers};
use crate::{GlobalArgs, ReviewArgs};

/// Runs `apisurf accept` or `apisurf disable`.
///
/// Resolves the selected entries and saves the cache. Returns exit code 0;
/// naming an entry that is not pending is an error and saves nothing.
pub fn run(
    args: &ReviewArgs,
    resolution: Resolution,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let mut cache = VersionedCache::load(&project.cache_path())?;

    let selection = if args.all {
        Selection::All
    } else {
        Selection::Names(args.names.clone())
    };
    let resolved = cache.resolve(&selection, resolution)?;
    cache.save()?;

    if !global.quiet {
        let verb = match resolution {
            Resolution::Accept => "Accepted",
            Resolution::Disable => "Disabled",
        };
        for entry in &resolved {
            eprintln!("{verb:>12} {:<8} {entry}", entry.kind().to_string());
        }
        if resolved.is_empty() {
            eprintln!("     Nothing pending review");
        }
        let remaining = cache.pending_review().len();
        if remaining > 0 {
            let noun = if remaining == 1 { "entry" } else { "entries" };
            eprintln!("     {remaining} {noun} still pending");
        } else {
            print_blockers(&cache);
        }
    }
    Ok(0)
}
