//! Per-run policy supplied on the command line

use std::path::PathBuf;

/// Tag policy applied to every file of a run
///
/// `Copy` so each per-file call gets its own value; nothing is shared
/// between files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagPolicy {
    /// Caller forced the various-artists classification; otherwise it is inferred per file
    pub various: bool,
    pub disc_number: u32,
    pub disc_total: u32,
    pub track_total: u32,
    /// Swap the first ARTIST and TITLE values
    pub swap_artist_title: bool,
    /// Accepted but not acted upon
    pub backup: bool,
}

impl TagPolicy {
    /// Disc/track injection only runs when the overrides sum to something positive
    pub fn has_total_overrides(&self) -> bool {
        u64::from(self.disc_number) + u64::from(self.disc_total) + u64::from(self.track_total) > 0
    }
}

/// Everything one batch invocation needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchContext {
    /// Root folder holding one level of album subfolders
    pub folder: PathBuf,
    pub policy: TagPolicy,
}

impl BatchContext {
    pub fn new(folder: impl Into<PathBuf>, policy: TagPolicy) -> Self {
        Self {
            folder: folder.into(),
            policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_overrides_use_the_sum() {
        assert!(!TagPolicy::default().has_total_overrides());
        let policy = TagPolicy {
            track_total: 12,
            ..TagPolicy::default()
        };
        assert!(policy.has_total_overrides());
    }
}
