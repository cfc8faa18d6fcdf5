//! flactag library interface
//!
//! Normalizes tags in FLAC (Vorbis comments) and DSF (ID3) files laid out
//! as `<root>/<album>/<track>`. Tags are read and rewritten through the
//! `metaflac`, `id3v2` and `metadsf` binaries.

pub mod context;
pub mod driver;
pub mod rules;
pub mod scanner;
pub mod tags;

pub use context::{BatchContext, TagPolicy};
pub use driver::{BatchReport, FileOutcome, FormatStats, TagFixer};
pub use scanner::ScanError;
pub use tags::TagStoreError;
