//! Tag stores: read and rewrite tag blocks through external tools
//!
//! Public API:
//! - [`VorbisStore`] / [`MetaflacStore`]: FLAC Vorbis comments, full replace on write
//! - [`Id3Store`] / [`MetadsfStore`]: DSF ID3 frames, incremental patch on write
//!
//! The traits are the seam between the rule engine and the external
//! binaries; the rules never see a process.

mod cp1252;
pub mod id3;
pub mod vorbis;

pub use id3::{Id3Frames, Id3Patch, Id3Store, MetadsfStore};
pub use vorbis::{MetaflacStore, VorbisComments, VorbisStore, VorbisTagFile};

use flactag_common::{ToolCommand, ToolOutput, ToolRunner};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Tag store errors
#[derive(Debug, Error)]
pub enum TagStoreError {
    /// Audio file does not exist (checked before any tool runs)
    #[error("Audio file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Tool binary could not be started
    #[error("Failed to launch {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Tool ran and exited non-zero
    #[error("{tool} failed (exit code {code:?}): {stderr}")]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Temp tag file could not be written
    #[error("Temp tag file {}: {source}", .path.display())]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error reading the audio file header
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run one tool invocation, turning launch errors and non-zero exits into errors
///
/// Both failure kinds are logged as warnings here; callers only propagate.
pub(crate) fn run_tool<R: ToolRunner>(
    runner: &R,
    command: &ToolCommand,
) -> Result<ToolOutput, TagStoreError> {
    let tool = command.program();
    debug!("{}", command);

    let output = match runner.run(command) {
        Ok(output) => output,
        Err(source) => {
            warn!(tool, error = %source, "Failed to launch tool");
            return Err(TagStoreError::ToolLaunch {
                tool: tool.to_string(),
                source,
            });
        }
    };

    if !output.is_success() {
        let stderr = output.stderr_text();
        warn!(tool, code = ?output.code, stderr = %stderr, "Tool exited with failure");
        return Err(TagStoreError::ToolFailed {
            tool: tool.to_string(),
            code: output.code,
            stderr,
        });
    }

    Ok(output)
}
