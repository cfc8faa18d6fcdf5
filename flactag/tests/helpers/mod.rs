//! Test Helper Utilities
//!
//! Shared utilities for testing flactag

#![allow(dead_code)]

pub mod fake_runner;
pub mod log_capture;

pub use fake_runner::FakeRunner;
pub use log_capture::LogCapture;

use std::fs;
use std::path::{Path, PathBuf};

/// First bytes of a FLAC stream
pub const FLAC_MAGIC: &[u8] = b"fLaC";

/// First bytes of a file carrying a legacy ID3v2 header
pub const ID3_MAGIC: &[u8] = b"ID3\x03\x00";

/// Create `<root>/<relative>` with the given leading bytes
pub fn create_track(root: &Path, relative: &str, header: &[u8]) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, header).unwrap();
    path
}

/// `metaflac --export-tags-to=-` style output
pub fn tag_lines(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
}
