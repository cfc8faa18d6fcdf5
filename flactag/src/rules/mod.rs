//! Tag correction rules
//!
//! Each format has a fixed, ordered rule list. Rules run against the
//! in-memory tag block, each reporting whether it changed anything; the
//! caller ORs the results and flushes once if any rule fired. Later rules see
//! earlier rules' edits, so the order is part of the behavior.
//!
//! A missing tag never fails a rule, it just means the rule does not apply.

pub mod id3;
pub mod vorbis;

pub use id3::Id3Rules;
pub use vorbis::VorbisRules;

/// Vorbis comment field names used by the rules
pub mod field {
    pub const ALBUM: &str = "ALBUM";
    pub const ALBUMARTIST: &str = "ALBUMARTIST";
    pub const ALBUM_ARTIST_SPACED: &str = "ALBUM ARTIST";
    pub const ARTIST: &str = "ARTIST";
    pub const TITLE: &str = "TITLE";
    pub const CATALOGNUMBER: &str = "CATALOGNUMBER";
    pub const COMMENT: &str = "COMMENT";
    pub const COMMENTS: &str = "COMMENTS";
    pub const COMPILATION: &str = "COMPILATION";
    pub const CONTACT: &str = "CONTACT";
    pub const LOCATION: &str = "LOCATION";
    pub const GROUPING: &str = "GROUPING";
    pub const DATE: &str = "DATE";
    pub const YEAR: &str = "YEAR";
    pub const DISCNUMBER: &str = "DISCNUMBER";
    pub const DISCTOTAL: &str = "DISCTOTAL";
    pub const DISKNUMBER: &str = "DISKNUMBER";
    pub const DISKTOTAL: &str = "DISKTOTAL";
    pub const TRACKTOTAL: &str = "TRACKTOTAL";
    pub const REPLAYGAIN_TRACK_GAIN: &str = "REPLAYGAIN_TRACK_GAIN";
}

/// ID3 frame ids used by the rules
pub mod frame {
    /// Encoded by
    pub const TENC: &str = "TENC";
    /// Content group
    pub const TIT1: &str = "TIT1";
    pub const COMM: &str = "COMM";
    /// Original release year
    pub const TORY: &str = "TORY";
    /// Recording time
    pub const TDRC: &str = "TDRC";
}

/// Zero-pad a number to two digits
pub(crate) fn two_digits(n: i64) -> String {
    format!("{:02}", n)
}
