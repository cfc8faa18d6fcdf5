//! FLAC Vorbis comment rules

use super::field::*;
use super::two_digits;
use crate::context::TagPolicy;
use crate::tags::VorbisComments;
use chrono::NaiveDate;
use flactag_common::config::HeuristicsConfig;
use tracing::debug;

/// Ordered Vorbis rule set for one run
pub struct VorbisRules<'a> {
    heuristics: &'a HeuristicsConfig,
    policy: TagPolicy,
    today: NaiveDate,
}

impl<'a> VorbisRules<'a> {
    pub fn new(heuristics: &'a HeuristicsConfig, policy: TagPolicy, today: NaiveDate) -> Self {
        Self {
            heuristics,
            policy,
            today,
        }
    }

    /// Run every rule in order; true if the block changed
    pub fn apply(&self, tags: &mut VorbisComments) -> bool {
        let mut changed = false;

        let various = self.is_various(tags);
        changed |= self.bump_vendor_replay_gain(tags);
        changed |= self.normalize_comments(tags);
        changed |= extract_catalog_number(tags);
        changed |= remove_redundant(tags, various);
        if self.policy.swap_artist_title {
            changed |= swap_artist_title(tags);
        }
        if !various {
            changed |= backfill_album_artist(tags);
        }
        changed |= collapse_date(tags);
        changed |= backfill_year(tags);
        changed |= self.stamp_signature(tags);
        changed |= fix_disk_typos(tags);
        changed |= self.inject_totals(tags);

        changed
    }

    /// Various-artists classification for this file
    ///
    /// Caller's flag wins. Otherwise COMPILATION=Y, else the album artist
    /// test below.
    ///
    /// Known oddity, kept on purpose: the album artist counts as "various"
    /// unless its value *starts with* lowercase `various`. The check is a
    /// substring search treated as true whenever the match position is not
    /// zero, and "no match" counts as non-zero. So "Jane Doe" and
    /// "Various Artists" both classify as various; "various artists" does not.
    pub fn is_various(&self, tags: &VorbisComments) -> bool {
        if self.policy.various {
            return true;
        }

        if tags.first(COMPILATION) == Some("Y") {
            return true;
        }

        match tags.first(ALBUMARTIST).or_else(|| tags.first(ALBUM_ARTIST_SPACED)) {
            Some(album_artist) => album_artist.find("various") != Some(0),
            None => false,
        }
    }

    fn bump_vendor_replay_gain(&self, tags: &mut VorbisComments) -> bool {
        if tags.first(CONTACT) != Some(self.heuristics.vendor.as_str()) {
            return false;
        }
        self.insert_replay_gain(tags)
    }

    fn insert_replay_gain(&self, tags: &mut VorbisComments) -> bool {
        if tags.contains(REPLAYGAIN_TRACK_GAIN) {
            return false;
        }
        tags.push(REPLAYGAIN_TRACK_GAIN, self.heuristics.replay_gain.as_str());
        debug!("Adding {} Tag", REPLAYGAIN_TRACK_GAIN);
        true
    }

    /// Drop junk comments; turn analog-source notes into a replay gain bump
    fn normalize_comments(&self, tags: &mut VorbisComments) -> bool {
        let mut changed = false;

        for key in [COMMENTS, COMMENT] {
            let Some(comment) = tags.first(key) else {
                continue;
            };
            let is_junk = contains_any(comment, &self.heuristics.junk_markers);
            let is_analog = !is_junk && contains_any(comment, &self.heuristics.analog_markers);

            if is_junk {
                tags.remove(key);
                debug!("Delete junk {} Tag", key);
                changed = true;
            } else if is_analog {
                self.insert_replay_gain(tags);
                tags.remove(key);
                debug!("Delete analog source {} Tag", key);
                changed = true;
            }
        }

        changed
    }

    /// COMMENT signature with today's date
    ///
    /// A COMMENT containing a line break is dropped first, then a missing
    /// COMMENT gets the signature.
    fn stamp_signature(&self, tags: &mut VorbisComments) -> bool {
        let mut changed = false;

        let multiline = tags
            .get(COMMENT)
            .is_some_and(|values| values.iter().any(|v| v.contains(&['\r', '\n'][..])));
        if multiline {
            tags.remove(COMMENT);
            debug!("Delete multi-line {} Tag", COMMENT);
            changed = true;
        }

        if !tags.contains(COMMENT) {
            let signature = format!(
                "{} {}",
                self.heuristics.signature,
                self.today.format("%Y-%m-%d")
            );
            tags.push(COMMENT, signature);
            debug!("Adding {} Tag", COMMENT);
            changed = true;
        }

        changed
    }

    fn inject_totals(&self, tags: &mut VorbisComments) -> bool {
        if !self.policy.has_total_overrides() {
            return false;
        }

        let mut changed = false;
        for (key, value) in [
            (DISCNUMBER, self.policy.disc_number),
            (DISCTOTAL, self.policy.disc_total),
            (TRACKTOTAL, self.policy.track_total),
        ] {
            if value > 0 && !tags.contains(key) {
                tags.push(key, two_digits(i64::from(value)));
                debug!("Adding {} Tag", key);
                changed = true;
            }
        }
        changed
    }
}

fn contains_any(text: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| !marker.is_empty() && text.contains(marker.as_str()))
}

/// Catalog number from a trailing `[...]` group in the album title
pub fn catalog_from_title(title: &str) -> Option<&str> {
    let inner = title.trim_end().strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let catalog = inner[open + 1..].trim();
    (!catalog.is_empty()).then_some(catalog)
}

fn extract_catalog_number(tags: &mut VorbisComments) -> bool {
    if tags.contains(CATALOGNUMBER) {
        return false;
    }
    let Some(catalog) = tags.first(ALBUM).and_then(catalog_from_title) else {
        return false;
    };
    let catalog = catalog.to_string();
    tags.push(CATALOGNUMBER, catalog);
    debug!("Adding {} Tag", CATALOGNUMBER);
    true
}

fn remove_redundant(tags: &mut VorbisComments, various: bool) -> bool {
    let mut changed = false;

    for redundant in [CONTACT, LOCATION, GROUPING] {
        if tags.remove(redundant).is_some() {
            debug!("Delete {} Tag", redundant);
            changed = true;
        }
    }

    if various {
        for album_artist in [ALBUMARTIST, ALBUM_ARTIST_SPACED] {
            if tags.remove(album_artist).is_some() {
                debug!("Delete {} Tag", album_artist);
                changed = true;
            }
        }
        if tags.first(COMPILATION) != Some("Y") {
            tags.set(COMPILATION, vec!["Y".to_string()]);
            debug!("Adding {} Tag", COMPILATION);
            changed = true;
        }
    }

    changed
}

fn swap_artist_title(tags: &mut VorbisComments) -> bool {
    let (Some(artist), Some(title)) = (tags.first(ARTIST), tags.first(TITLE)) else {
        return false;
    };
    let (artist, title) = (artist.to_string(), title.to_string());
    tags.set_first(ARTIST, title);
    tags.set_first(TITLE, artist);
    debug!("Swap {} and {} Tags", ARTIST, TITLE);
    true
}

fn backfill_album_artist(tags: &mut VorbisComments) -> bool {
    if tags.contains(ALBUMARTIST) || tags.contains(ALBUM_ARTIST_SPACED) {
        return false;
    }
    let Some(artists) = tags.get(ARTIST).map(<[String]>::to_vec) else {
        return false;
    };
    tags.set(ALBUMARTIST, artists);
    debug!("Adding {} Tag", ALBUMARTIST);
    true
}

fn collapse_date(tags: &mut VorbisComments) -> bool {
    let changed = tags.truncate(DATE, 1);
    if changed {
        debug!("Collapse {} Tag", DATE);
    }
    changed
}

fn backfill_year(tags: &mut VorbisComments) -> bool {
    if tags.contains(YEAR) {
        return false;
    }
    let Some(dates) = tags.get(DATE).map(<[String]>::to_vec) else {
        return false;
    };
    tags.set(YEAR, dates);
    debug!("Adding {} Tag", YEAR);
    true
}

/// DISKNUMBER/DISKTOTAL → DISCNUMBER/DISCTOTAL
fn fix_disk_typos(tags: &mut VorbisComments) -> bool {
    let mut changed = false;

    for (misspelled, correct) in [(DISKNUMBER, DISCNUMBER), (DISKTOTAL, DISCTOTAL)] {
        let Some(values) = tags.remove(misspelled) else {
            continue;
        };
        if !tags.contains(correct) {
            let padded = values
                .first()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .map(two_digits)
                .unwrap_or_else(|| "01".to_string());
            tags.push(correct, padded);
            debug!("Adding {} Tag", correct);
        }
        debug!("Delete {} Tag", misspelled);
        changed = true;
    }

    changed
}
