//! Log sink construction
//!
//! Builds a `tracing` dispatcher with two sinks: an append-mode log file
//! (debug detail by default) and the console (info by default). The
//! dispatcher is returned rather than installed globally; the binary scopes
//! it over the run with `tracing::dispatcher::with_default`, and library
//! code stays free of sink setup.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable overriding the console filter
pub const LOG_ENV_VAR: &str = "FLACTAG_LOG";

/// Timestamp format shared by both sinks
const TIMESTAMP_FORMAT: &str = "%m-%d-%y %H:%M:%S";

/// Local wall-clock timestamp
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// Parse a level name ("debug", "info", ...) into a filter
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| Error::Config(format!("Invalid log level: {}", level)))
}

/// Build the file + console dispatcher described by `config`
pub fn build_dispatch(config: &LoggingConfig) -> Result<Dispatch> {
    let file_level = parse_level(&config.file_level)?;
    let console_level = parse_level(&config.console_level)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .map_err(|e| {
            Error::Config(format!(
                "Cannot open log file {}: {}",
                config.file.display(),
                e
            ))
        })?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(LocalTimestamp)
        .with_filter(file_level);

    let console_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(console_level.into()));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_timer(LocalTimestamp)
        .with_filter(console_filter);

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer);

    Ok(Dispatch::new(subscriber))
}
