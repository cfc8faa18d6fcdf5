//! Album tree scanner
//!
//! Finds tracks exactly one folder below the root (`<root>/<album>/<track>`),
//! matching the extension case-sensitively. Hidden entries are skipped at
//! both levels. Results are sorted by path.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Album scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Track format, by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFormat {
    Flac,
    Dsf,
}

impl TrackFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TrackFormat::Flac => "flac",
            TrackFormat::Dsf => "dsf",
        }
    }
}

/// Scanner for one root folder
pub struct AlbumScanner {
    root: PathBuf,
}

impl AlbumScanner {
    /// Resolve the root folder; this is the only fatal step of a batch
    pub fn new(root: &Path) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }

        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// All `<album>/<track>.<ext>` files for a format, sorted
    pub fn tracks(&self, format: TrackFormat) -> Vec<PathBuf> {
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .min_depth(1)
            .max_depth(2)
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        let mut tracks = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.depth() == 2
                        && entry.file_type().is_file()
                        && has_extension(entry.path(), format.extension())
                    {
                        tracks.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracks.sort();
        tracing::debug!(
            root = %self.root.display(),
            format = format.extension(),
            count = tracks.len(),
            "Scanned album tree"
        );
        tracks
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension() == Some(OsStr::new(extension))
}
