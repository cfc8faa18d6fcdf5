//! Strict Windows-1252 decoding
//!
//! metadsf prints frame values in the legacy 8-bit encoding even when asked
//! for UTF-8, so its output is decoded byte-by-byte here. The five bytes
//! Windows-1252 leaves undefined fail the decode.

/// Code points for 0x80..=0x9F; `None` marks an undefined byte
const HIGH_CONTROL: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Decode one byte string, `None` if it holds an undefined byte
pub(crate) fn decode(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => HIGH_CONTROL[(b - 0x80) as usize],
            _ => Some(char::from(b)),
        })
        .collect()
}
