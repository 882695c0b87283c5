//! apisurf CLI: tracks the exported API surface of a firmware SDK.
//!
//! `apisurf update` parses the configured public headers, diffs the result
//! against the cache file and bumps the SDK version; `accept`/`disable`
//! resolve entries awaiting review; `export` hands the buildable surface to
//! the SDK packaging and export-table generators.

#![warn(missing_docs)]

mod export;
mod init;
mod pipeline;
mod review;
mod status;
mod update;
mod version;

use std::process;

use apisurf_cache::Resolution;
use apisurf_common::SdkVersion;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code when the surface changed or awaits review.
pub const EXIT_NEEDS_REVIEW: i32 = 2;

/// apisurf: firmware SDK API surface tracker.
#[derive(Parser, Debug)]
#[command(name = "apisurf", version, about = "Firmware SDK API surface tracker")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `apisurf.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty cache file.
    Init {
        /// Initial SDK version. `0.0` marks the cache as uninitialized.
        #[arg(long, default_value = "0.0")]
        version: SdkVersion,

        /// Overwrite an existing cache file.
        #[arg(long)]
        force: bool,
    },
    /// Extract the surface from the headers and update the cache.
    Update {
        /// Report the changes without saving the cache.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the version, pending entries and buildability.
    Status,
    /// Accept pending entries as part of the live surface.
    Accept(ReviewArgs),
    /// Retire pending entries.
    Disable(ReviewArgs),
    /// Write the enabled surface for downstream generators.
    Export(ExportArgs),
    /// Print the SDK version.
    Version,
}

/// Arguments for `apisurf accept` and `apisurf disable`.
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Names of pending entries.
    #[arg(required_unless_present = "all")]
    pub names: Vec<String>,

    /// Resolve every pending entry.
    #[arg(long, conflicts_with = "names")]
    pub all: bool,
}

/// Arguments for `apisurf export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Text)]
    pub format: ExportFormat,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Export output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// One line per header and symbol.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Init { version, force } => init::run(version, force, &global),
        Command::Update { dry_run } => update::run(dry_run, &global),
        Command::Status => status::run(&global),
        Command::Accept(ref args) => review::run(args, Resolution::Accept, &global),
        Command::Disable(ref args) => review::run(args, Resolution::Disable, &global),
        Command::Export(ref args) => export::run(args, &global),
        Command::Version => version::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_tracing(global: &GlobalArgs) {
    let level = log_level(global);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(global.color)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn log_level(global: &GlobalArgs) -> &'static str {
    if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}
