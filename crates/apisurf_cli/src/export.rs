//! `apisurf export`: the enabled surface for downstream generators.

use apisurf_cache::{ExportManifest, VersionedCache};

use crate::pipeline::load_project;
use crate::{ExportArgs, ExportFormat, GlobalArgs};

/// Runs the `apisurf export` command.
///
/// Refuses to run unless the cache is buildable.
pub fn run(args: &ExportArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let cache = VersionedCache::load(&project.cache_path())?;
    let manifest = ExportManifest::from_cache(&cache)?;

    let text = match args.format {
        ExportFormat::Text => manifest.to_text(),
        ExportFormat::Json => manifest.to_json()? + "\n",
    };

    match args.output {
        Some(ref output) => {
            std::fs::write(output, text)?;
            if !global.quiet {
                eprintln!(
                    "    Exported {} header(s), {} symbol(s) at version {} to {output}",
                    manifest.headers.len(),
                    manifest.symbols.len(),
                    manifest.version
                );
            }
        }
        None => print!("{text}"),
    }
    Ok(0)
}
