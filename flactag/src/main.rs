//! flactag - batch tag normalizer
//!
//! Walks `<folder>/<album>/*.flac` then `<folder>/<album>/*.dsf` and fixes
//! each track's tags in place. Per-track failures are logged and skipped;
//! only a bad folder, config or log file ends the run with an error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flactag::driver::FormatStats;
use flactag::tags::{MetadsfStore, MetaflacStore};
use flactag::{BatchContext, TagFixer, TagPolicy};
use flactag_common::config::{resolve_config_path, TomlConfig};
use flactag_common::logging::build_dispatch;
use flactag_common::ProcessRunner;
use tracing::{debug, info};

/// Command-line arguments for flactag
#[derive(Parser, Debug)]
#[command(name = "flactag")]
#[command(about = "Normalize FLAC and DSF tags under a folder of albums")]
#[command(version)]
struct Args {
    /// Root folder holding one level of album folders
    #[arg(short, long)]
    folder: PathBuf,

    /// Treat every album as various artists (0 or 1)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    various: u8,

    /// Disc number to add where missing
    #[arg(short = 'n', long, default_value_t = 0)]
    discnumber: u32,

    /// Disc total to add where missing
    #[arg(short, long, default_value_t = 0)]
    disctotal: u32,

    /// Track total to add where missing
    #[arg(short, long, default_value_t = 0)]
    tracktotal: u32,

    /// Swap ARTIST and TITLE (0 or 1)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    swap: u8,

    /// Accepted for compatibility; no backup is made (0 or 1)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    backup: u8,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file, overriding the configured one
    #[arg(short, long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn policy(&self) -> TagPolicy {
        TagPolicy {
            various: self.various == 1,
            disc_number: self.discnumber,
            disc_total: self.disctotal,
            track_total: self.tracktotal,
            swap_artist_title: self.swap == 1,
            backup: self.backup == 1,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let mut config = TomlConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    if let Some(log_file) = &args.log_file {
        config.logging.file = log_file.clone();
    }

    let dispatch = build_dispatch(&config.logging).context("Failed to initialize logging")?;
    tracing::dispatcher::with_default(&dispatch, || run(&args, config_path, config))
}

fn run(args: &Args, config_path: Option<PathBuf>, config: TomlConfig) -> Result<()> {
    info!("Starting flactag {}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => debug!("No config file, using defaults"),
    }
    info!("Folder: {}", args.folder.display());

    let context = BatchContext::new(&args.folder, args.policy());
    debug!(policy = ?context.policy, "Batch policy");

    let vorbis = MetaflacStore::new(ProcessRunner, config.tools.clone());
    let id3 = MetadsfStore::new(ProcessRunner, config.tools.clone());
    let fixer = TagFixer::new(vorbis, id3, config.heuristics);

    let report = fixer
        .run(&context)
        .with_context(|| format!("Cannot process folder {}", args.folder.display()))?;

    log_stats("FLAC", &report.flac);
    log_stats("DSF", &report.dsf);
    info!("Done, {} file(s) failed", report.failed());
    Ok(())
}

fn log_stats(format: &str, stats: &FormatStats) {
    info!(
        "{}: {} scanned, {} rewritten, {} unchanged, {} failed",
        format, stats.scanned, stats.rewritten, stats.unchanged, stats.failed
    );
}
