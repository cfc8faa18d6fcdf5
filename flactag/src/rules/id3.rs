//! DSF ID3 frame rules
//!
//! Edits go to both the in-memory frames and the patch that will be sent to
//! the editor, so later rules see earlier removals.

use super::frame::*;
use crate::tags::{Id3Frames, Id3Patch};
use flactag_common::config::HeuristicsConfig;
use tracing::debug;

pub struct Id3Rules<'a> {
    heuristics: &'a HeuristicsConfig,
}

impl<'a> Id3Rules<'a> {
    pub fn new(heuristics: &'a HeuristicsConfig) -> Self {
        Self { heuristics }
    }

    /// Run every rule in order; true if the patch is non-empty
    pub fn apply(&self, frames: &mut Id3Frames, patch: &mut Id3Patch) -> bool {
        let mut changed = false;
        changed |= self.remove_vendor_encoder(frames, patch);
        changed |= remove_duplicate_grouping(frames, patch);
        changed |= backfill_original_year(frames, patch);
        changed
    }

    fn remove_vendor_encoder(&self, frames: &mut Id3Frames, patch: &mut Id3Patch) -> bool {
        if frames.get(TENC) != Some(self.heuristics.vendor.as_str()) {
            return false;
        }
        frames.remove(TENC);
        patch.remove_frame(TENC);
        debug!("Delete {} Tag", TENC);
        true
    }
}

/// TIT1 that merely repeats the comment
fn remove_duplicate_grouping(frames: &mut Id3Frames, patch: &mut Id3Patch) -> bool {
    let duplicate = match (frames.get(TIT1), frames.get(COMM)) {
        (Some(grouping), Some(comment)) => grouping == comment,
        _ => false,
    };
    if !duplicate {
        return false;
    }
    frames.remove(TIT1);
    patch.remove_frame(TIT1);
    debug!("Delete {} Tag", TIT1);
    true
}

fn backfill_original_year(frames: &mut Id3Frames, patch: &mut Id3Patch) -> bool {
    if frames.contains(TORY) {
        return false;
    }
    let Some(recorded) = frames.get(TDRC).map(str::to_string) else {
        return false;
    };
    frames.insert(TORY, recorded.as_str());
    patch.add_frame(TORY, recorded);
    debug!("Adding {} Tag", TORY);
    true
}
