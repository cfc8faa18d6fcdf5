//! DSF ID3 frames
//!
//! Read through `metadsf -t`, patched in place with `--remove-tags` /
//! `--add-tag`. Unlike the FLAC store this never rewrites the whole block.

use super::{cp1252, run_tool, TagStoreError};
use flactag_common::config::ToolsConfig;
use flactag_common::process::{ToolCommand, ToolRunner};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Flat frame-id → value mapping, one value per frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3Frames {
    frames: BTreeMap<String, String>,
}

impl Id3Frames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw `metadsf -t` output
    ///
    /// Each line is decoded as Windows-1252; lines that fail to decode, lack
    /// `=`, or carry an empty value are skipped. Frame ids are upper-cased and
    /// lose the first `B'` byte-literal artifact metadsf leaves in front.
    pub fn parse_output(output: &[u8]) -> Self {
        let mut frames = Self::new();
        for raw in output.split(|&b| b == b'\n') {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let Some(line) = cp1252::decode(raw) else {
                continue;
            };
            let Some((id, value)) = line.split_once('=') else {
                continue;
            };
            let id = id.to_uppercase().replacen("B'", "", 1);
            if !value.is_empty() {
                frames.insert(&id, value);
            }
        }
        frames
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.frames.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.frames.contains_key(id)
    }

    pub fn insert(&mut self, id: &str, value: impl Into<String>) {
        self.frames.insert(id.to_string(), value.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.frames.remove(id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Id3Frames {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut frames = Self::new();
        for (id, value) in iter {
            frames.insert(id.as_ref(), value);
        }
        frames
    }
}

/// Incremental edit for one DSF file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3Patch {
    /// Frame ids to delete
    pub remove: Vec<String>,
    /// Single frame to add as `(id, value)`
    pub add: Option<(String, String)>,
}

impl Id3Patch {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_none()
    }

    pub fn remove_frame(&mut self, id: &str) {
        if !self.remove.iter().any(|existing| existing == id) {
            self.remove.push(id.to_string());
        }
    }

    pub fn add_frame(&mut self, id: &str, value: impl Into<String>) {
        self.add = Some((id.to_string(), value.into()));
    }
}

/// Read/patch capability over DSF ID3 frames
pub trait Id3Store {
    fn read(&self, path: &Path) -> Result<Id3Frames, TagStoreError>;

    fn patch(&self, path: &Path, patch: &Id3Patch) -> Result<(), TagStoreError>;
}

/// `metadsf`-backed ID3 store
pub struct MetadsfStore<R> {
    runner: R,
    tools: ToolsConfig,
}

impl<R: ToolRunner> MetadsfStore<R> {
    pub fn new(runner: R, tools: ToolsConfig) -> Self {
        Self { runner, tools }
    }

    /// Editor invocation for `patch`, `None` when there is nothing to do
    pub fn patch_command(&self, path: &Path, patch: &Id3Patch) -> Option<ToolCommand> {
        if patch.is_empty() {
            return None;
        }

        let mut command = ToolCommand::new(&self.tools.metadsf).arg("-eUTF8");
        if !patch.remove.is_empty() {
            command = command.arg(&format!("--remove-tags={}", patch.remove.join(",")));
        }
        if let Some((id, value)) = &patch.add {
            command = command.text(&format!("--add-tag={}={}", id, value));
        }
        Some(command.path(path))
    }
}

impl<R: ToolRunner> Id3Store for MetadsfStore<R> {
    fn read(&self, path: &Path) -> Result<Id3Frames, TagStoreError> {
        if !path.is_file() {
            return Err(TagStoreError::NotFound(path.to_path_buf()));
        }

        let command = ToolCommand::new(&self.tools.metadsf)
            .arg("-t")
            .arg("-eUTF8")
            .path(path);
        let output = run_tool(&self.runner, &command)?;
        let frames = Id3Frames::parse_output(&output.stdout);

        debug!(file = %path.display(), frames = frames.len(), "Read ID3 frames");
        Ok(frames)
    }

    fn patch(&self, path: &Path, patch: &Id3Patch) -> Result<(), TagStoreError> {
        let Some(command) = self.patch_command(path, patch) else {
            return Ok(());
        };

        debug!(file = %path.display(), "Patch DSF tags");
        run_tool(&self.runner, &command).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flactag_common::ToolOutput;

    struct NeverRun;

    impl ToolRunner for NeverRun {
        fn run(&self, command: &ToolCommand) -> std::io::Result<ToolOutput> {
            panic!("unexpected tool call: {}", command);
        }
    }

    fn store() -> MetadsfStore<NeverRun> {
        MetadsfStore::new(NeverRun, ToolsConfig::default())
    }

    #[test]
    fn test_parse_output_strips_artifact_and_uppercases() {
        let frames = Id3Frames::parse_output(b"b'tit2=Song\nTPE1=Jane Doe\r\nTCOP=\xA9 1994\n");
        assert_eq!(frames.get("TIT2"), Some("Song"));
        assert_eq!(frames.get("TPE1"), Some("Jane Doe"));
        assert_eq!(frames.get("TCOP"), Some("© 1994"));
    }

    #[test]
    fn test_parse_output_skips_bad_lines() {
        let frames = Id3Frames::parse_output(b"header line\nTALB=\nTIT1=bad\x81byte\nCOMM=a=b\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames.get("COMM"), Some("a=b"));
    }

    #[test]
    fn test_patch_remove_is_deduplicated() {
        let mut patch = Id3Patch::default();
        assert!(patch.is_empty());
        patch.remove_frame("TENC");
        patch.remove_frame("TENC");
        assert_eq!(patch.remove, vec!["TENC".to_string()]);
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_command_joins_removals_and_appends_addition() {
        let patch = Id3Patch {
            remove: vec!["TENC".to_string(), "TIT1".to_string()],
            add: Some(("TORY".to_string(), "1994".to_string())),
        };
        let command = store()
            .patch_command(Path::new("/music/A/01.dsf"), &patch)
            .unwrap();
        assert_eq!(
            command.command_line(),
            "metadsf -eUTF8 --remove-tags=TENC,TIT1 \"--add-tag=TORY=1994\" \"/music/A/01.dsf\""
        );
        assert_eq!(command.args()[2], "--add-tag=TORY=1994");
    }

    #[test]
    fn test_patch_command_add_only() {
        let mut patch = Id3Patch::default();
        patch.add_frame("TORY", "2001");
        assert_eq!(
            store()
                .patch_command(Path::new("/m/x.dsf"), &patch)
                .map(|command| command.command_line().to_string())
                .as_deref(),
            Some("metadsf -eUTF8 \"--add-tag=TORY=2001\" \"/m/x.dsf\"")
        );
    }

    #[test]
    fn test_empty_patch_runs_nothing() {
        let patch = Id3Patch::default();
        assert_eq!(store().patch_command(Path::new("/m/x.dsf"), &patch), None);
        store().patch(Path::new("/m/x.dsf"), &patch).unwrap();
    }

    #[test]
    fn test_read_missing_file_fails_before_tool() {
        let result = store().read(Path::new("/nonexistent/album/01.dsf"));
        assert!(matches!(result, Err(TagStoreError::NotFound(_))));
    }
}
