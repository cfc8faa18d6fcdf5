//! Configuration loading and config file resolution
//!
//! Everything here has a compiled default, so running without any config
//! file is fine. Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `FLACTAG_CONFIG` environment variable
//! 3. `~/.config/flactag/config.toml`
//! 4. No file: compiled defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FLACTAG_CONFIG";

/// Top-level configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// External tool binaries (optional)
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Tag heuristic constants (optional)
    #[serde(default)]
    pub heuristics: HeuristicsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log file path, opened in append mode
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Level written to the log file (trace, debug, info, warn, error)
    #[serde(default = "default_file_level")]
    pub file_level: String,

    /// Level written to the console
    #[serde(default = "default_console_level")]
    pub console_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            file_level: default_file_level(),
            console_level: default_console_level(),
        }
    }
}

/// Names (or paths) of the external tag-editing binaries
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ToolsConfig {
    /// Vorbis comment reader/writer for FLAC files
    #[serde(default = "default_metaflac")]
    pub metaflac: String,

    /// Legacy ID3 frame remover used on FLAC files carrying ID3 headers
    #[serde(default = "default_id3v2")]
    pub id3v2: String,

    /// ID3 reader/editor for DSF files
    #[serde(default = "default_metadsf")]
    pub metadsf: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            metaflac: default_metaflac(),
            id3v2: default_id3v2(),
            metadsf: default_metadsf(),
        }
    }
}

/// Constants used by the tag correction rules
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HeuristicsConfig {
    /// Vendor string written into CONTACT (FLAC) or TENC (DSF) by the ripping software
    #[serde(default = "default_vendor")]
    pub vendor: String,

    /// Replay gain inserted for vinyl sources
    #[serde(default = "default_replay_gain")]
    pub replay_gain: String,

    /// Comment signature; the current date is appended when stamped
    #[serde(default = "default_signature")]
    pub signature: String,

    /// Comment substrings marking a junk comment to delete
    #[serde(default = "default_junk_markers")]
    pub junk_markers: Vec<String>,

    /// Comment substrings marking an analog (vinyl) source
    #[serde(default = "default_analog_markers")]
    pub analog_markers: Vec<String>,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            vendor: default_vendor(),
            replay_gain: default_replay_gain(),
            signature: default_signature(),
            junk_markers: default_junk_markers(),
            analog_markers: default_analog_markers(),
        }
    }
}

fn default_log_file() -> PathBuf {
    PathBuf::from("/tmp/flactag.log")
}

fn default_file_level() -> String {
    "debug".to_string()
}

fn default_console_level() -> String {
    "info".to_string()
}

fn default_metaflac() -> String {
    "metaflac".to_string()
}

fn default_id3v2() -> String {
    "id3v2".to_string()
}

fn default_metadsf() -> String {
    "metadsf".to_string()
}

fn default_vendor() -> String {
    "VinylStudio".to_string()
}

fn default_replay_gain() -> String {
    "+4.50".to_string()
}

fn default_signature() -> String {
    "Tags normalized by flactag".to_string()
}

fn default_junk_markers() -> Vec<String> {
    ["www.", "WWW.", "http", "HTTP"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_analog_markers() -> Vec<String> {
    [
        "Vinyl",
        "vinyl",
        "VINYL",
        "Digitized",
        "digitized",
        "Digitised",
        "digitised",
        "TEAC",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a file
    ///
    /// `None` yields the compiled defaults. A named file that cannot be read
    /// or parsed is an error: the caller asked for it explicitly.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

/// Resolve which config file to load, if any
///
/// Returns `None` when no source names an existing file.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument (returned even if missing so load() reports it)
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config directory
    user_config_file().filter(|path| path.exists())
}

/// Default per-user config file location
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flactag").join("config.toml"))
}
