//! FLAC Vorbis comment block
//!
//! Read through `metaflac --export-tags-to=-`, written back by importing a
//! canonical `KEY=value` text file that replaces every existing tag.

use super::{run_tool, TagStoreError};
use flactag_common::config::ToolsConfig;
use flactag_common::process::{ToolCommand, ToolRunner};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Multi-valued Vorbis comment mapping
///
/// Keys are stored upper-cased; every stored key holds at least one value.
/// Value order is significant (the first value is the canonical one for
/// single-valued fields such as DATE or COMPILATION).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VorbisComments {
    fields: BTreeMap<String, Vec<String>>,
}

fn normalize_key(key: &str) -> String {
    key.trim().to_uppercase()
}

/// Field name as written by tag editors: ASCII letters, digits, space and `_-./()`
///
/// Narrower than the format allows so that prose such as `Notes: mix=B`
/// inside a multi-line value is not taken for a field.
fn is_field_name(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with(' ')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.' | '/' | '(' | ')'))
}

/// Collapse CR, LF and CRLF into single spaces
fn collapse_line_breaks(value: &str) -> String {
    value.replace("\r\n", " ").replace(&['\r', '\n'][..], " ")
}

impl VorbisComments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `KEY=value` lines as exported by `metaflac`
    ///
    /// A value may span several lines: a line that does not open with a valid
    /// field name and `=` continues the previous value, joined with `\n`.
    /// Continuation lines before any field are dropped.
    pub fn parse(text: &str) -> Self {
        let mut comments = Self::new();
        let mut last_key: Option<String> = None;

        for line in text.lines() {
            match line.split_once('=') {
                Some((key, value)) if is_field_name(key) => {
                    comments.push(key, value);
                    last_key = Some(normalize_key(key));
                }
                _ => {
                    let last_value = last_key
                        .as_ref()
                        .and_then(|key| comments.fields.get_mut(key))
                        .and_then(|values| values.last_mut());
                    if let Some(value) = last_value {
                        value.push('\n');
                        value.push_str(line);
                    }
                }
            }
        }
        comments
    }

    /// All values for `key`, `None` when absent
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.fields.get(&normalize_key(key)).map(Vec::as_slice)
    }

    /// First value for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(&normalize_key(key))
    }

    /// Append one value, creating the key if needed
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.fields
            .entry(normalize_key(key))
            .or_default()
            .push(value.into());
    }

    /// Replace all values for `key`; an empty list removes the key
    pub fn set(&mut self, key: &str, values: Vec<String>) {
        if values.is_empty() {
            self.fields.remove(&normalize_key(key));
        } else {
            self.fields.insert(normalize_key(key), values);
        }
    }

    /// Overwrite the first value of an existing key; false if the key is absent
    pub fn set_first(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self
            .fields
            .get_mut(&normalize_key(key))
            .and_then(|values| values.first_mut())
        {
            Some(first) => {
                *first = value.into();
                true
            }
            None => false,
        }
    }

    /// Remove `key`, returning its values
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.fields.remove(&normalize_key(key))
    }

    /// Keep only the first `len` values of `key`; true if anything was dropped
    pub fn truncate(&mut self, key: &str, len: usize) -> bool {
        match self.fields.get_mut(&normalize_key(key)) {
            Some(values) if values.len() > len && len > 0 => {
                values.truncate(len);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate keys in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Canonical import text: sorted keys, one `KEY=value` line per value
    pub fn to_tag_text(&self) -> String {
        let mut text = String::new();
        for (key, values) in self.iter() {
            for value in values {
                text.push_str(key);
                text.push('=');
                text.push_str(&collapse_line_breaks(value));
                text.push('\n');
            }
        }
        text
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for VorbisComments {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut comments = Self::new();
        for (key, value) in iter {
            comments.push(key.as_ref(), value);
        }
        comments
    }
}

/// One FLAC file's tag state as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VorbisTagFile {
    pub path: PathBuf,
    pub comments: VorbisComments,
    /// File carries legacy ID3 (v2 header or v1 trailer) that must be stripped on rewrite
    pub has_id3: bool,
}

/// Read/replace capability over FLAC Vorbis comments
pub trait VorbisStore {
    fn read(&self, path: &Path) -> Result<VorbisTagFile, TagStoreError>;

    /// Replace the file's whole tag block with `file.comments`
    fn replace(&self, file: &VorbisTagFile) -> Result<(), TagStoreError>;
}

/// `metaflac`-backed Vorbis store
pub struct MetaflacStore<R> {
    runner: R,
    tools: ToolsConfig,
    temp_dir: PathBuf,
}

impl<R: ToolRunner> MetaflacStore<R> {
    /// Store writing its temp tag file into the current directory
    pub fn new(runner: R, tools: ToolsConfig) -> Self {
        Self {
            runner,
            tools,
            temp_dir: PathBuf::from("."),
        }
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// `{pid}.tag`: unique per process, shared by every flush in the run
    pub fn temp_file_path(&self) -> PathBuf {
        self.temp_dir.join(format!("{}.tag", std::process::id()))
    }

    fn delete_id3(&self, path: &Path) -> Result<(), TagStoreError> {
        debug!(file = %path.display(), "Deleting legacy ID3 frames");
        let command = ToolCommand::new(&self.tools.id3v2)
            .arg("--delete-all")
            .path(path);
        run_tool(&self.runner, &command).map(|_| ())
    }

    fn import_tags(&self, file: &VorbisTagFile, temp_path: &Path) -> Result<(), TagStoreError> {
        if temp_path.exists() {
            std::fs::remove_file(temp_path).map_err(|source| TagStoreError::TempFile {
                path: temp_path.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(temp_path, file.comments.to_tag_text()).map_err(|source| {
            TagStoreError::TempFile {
                path: temp_path.to_path_buf(),
                source,
            }
        })?;

        let command = ToolCommand::new(&self.tools.metaflac)
            .arg("--preserve-modtime")
            .arg("--no-utf8-convert")
            .arg("--remove-all-tags")
            .flag_path("--import-tags-from=", temp_path)
            .path(&file.path);
        run_tool(&self.runner, &command).map(|_| ())
    }
}

impl<R: ToolRunner> VorbisStore for MetaflacStore<R> {
    fn read(&self, path: &Path) -> Result<VorbisTagFile, TagStoreError> {
        if !path.is_file() {
            return Err(TagStoreError::NotFound(path.to_path_buf()));
        }

        let command = ToolCommand::new(&self.tools.metaflac)
            .arg("--no-utf8-convert")
            .arg("--export-tags-to=-")
            .path(path);
        let output = run_tool(&self.runner, &command)?;
        let comments = VorbisComments::parse(&String::from_utf8_lossy(&output.stdout));
        let has_id3 = has_legacy_id3(path)?;

        debug!(
            file = %path.display(),
            fields = comments.len(),
            has_id3,
            "Read Vorbis comments"
        );

        Ok(VorbisTagFile {
            path: path.to_path_buf(),
            comments,
            has_id3,
        })
    }

    fn replace(&self, file: &VorbisTagFile) -> Result<(), TagStoreError> {
        debug!(file = %file.path.display(), "Rewrite FLAC tags");

        if file.has_id3 {
            self.delete_id3(&file.path)?;
        }

        let temp_path = self.temp_file_path();
        let result = self.import_tags(file, &temp_path);

        if temp_path.exists() {
            if let Err(e) = std::fs::remove_file(&temp_path) {
                warn!(temp = %temp_path.display(), error = %e, "Failed to remove temp tag file");
            }
        }

        result
    }
}

const ID3V1_TRAILER_LEN: u64 = 128;

/// True when the file carries an ID3v2 header or an ID3v1 trailer
fn has_legacy_id3(path: &Path) -> Result<bool, TagStoreError> {
    let mut magic = [0u8; 3];
    let mut file = File::open(path)?;
    if file.read(&mut magic)? == 3 && &magic == b"ID3" {
        return Ok(true);
    }

    // ID3v1: "TAG" at the start of the last 128 bytes
    if file.metadata()?.len() < ID3V1_TRAILER_LEN {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-(ID3V1_TRAILER_LEN as i64)))?;
    file.read_exact(&mut magic)?;
    Ok(&magic == b"TAG")
}
