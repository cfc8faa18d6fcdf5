//! Batch driver
//!
//! Walks the album tree, FLAC first then DSF, and runs each track through
//! read → rules → flush. A track that fails is logged and counted; only an
//! unusable root folder stops the batch.

use crate::context::{BatchContext, TagPolicy};
use crate::rules::{Id3Rules, VorbisRules};
use crate::scanner::{AlbumScanner, ScanError, TrackFormat};
use crate::tags::{Id3Patch, Id3Store, TagStoreError, VorbisStore};
use chrono::{Local, NaiveDate};
use flactag_common::config::HeuristicsConfig;
use std::path::Path;
use tracing::{debug, info, warn};

/// What happened to one track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// No rule fired; nothing was written
    Unchanged,
    /// Tags were written back once
    Rewritten,
}

/// Per-format counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatStats {
    pub scanned: usize,
    pub rewritten: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl FormatStats {
    fn record(&mut self, result: &Result<FileOutcome, TagStoreError>) {
        self.scanned += 1;
        match result {
            Ok(FileOutcome::Rewritten) => self.rewritten += 1,
            Ok(FileOutcome::Unchanged) => self.unchanged += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Summary of one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub flac: FormatStats,
    pub dsf: FormatStats,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.flac.failed + self.dsf.failed
    }
}

/// Tag fixer bound to a pair of stores
pub struct TagFixer<V, I> {
    vorbis: V,
    id3: I,
    heuristics: HeuristicsConfig,
    today: NaiveDate,
}

impl<V: VorbisStore, I: Id3Store> TagFixer<V, I> {
    pub fn new(vorbis: V, id3: I, heuristics: HeuristicsConfig) -> Self {
        Self {
            vorbis,
            id3,
            heuristics,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the date used in the comment signature
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Normalize one FLAC file, rewriting it at most once
    pub fn fix_flac(&self, path: &Path, policy: TagPolicy) -> Result<FileOutcome, TagStoreError> {
        info!("Processing {}", path.display());

        let mut file = self.vorbis.read(path)?;
        let rules = VorbisRules::new(&self.heuristics, policy, self.today);
        if !rules.apply(&mut file.comments) {
            debug!(file = %path.display(), "No tag changes");
            return Ok(FileOutcome::Unchanged);
        }

        self.vorbis.replace(&file)?;
        Ok(FileOutcome::Rewritten)
    }

    /// Normalize one DSF file with a single incremental patch
    ///
    /// The ID3 rules take no caller policy.
    pub fn fix_dsf(&self, path: &Path) -> Result<FileOutcome, TagStoreError> {
        info!("Processing {}", path.display());

        let mut frames = self.id3.read(path)?;
        let mut patch = Id3Patch::default();
        if !Id3Rules::new(&self.heuristics).apply(&mut frames, &mut patch) {
            debug!(file = %path.display(), "No tag changes");
            return Ok(FileOutcome::Unchanged);
        }

        self.id3.patch(path, &patch)?;
        Ok(FileOutcome::Rewritten)
    }

    /// Process every track under the context's folder
    pub fn run(&self, context: &BatchContext) -> Result<BatchReport, ScanError> {
        let scanner = AlbumScanner::new(&context.folder)?;
        if context.policy.backup {
            debug!("Backup requested; no backup is made");
        }

        let mut report = BatchReport::default();

        for path in scanner.tracks(TrackFormat::Flac) {
            let result = self.fix_flac(&path, context.policy);
            log_failure(&path, &result);
            report.flac.record(&result);
        }

        for path in scanner.tracks(TrackFormat::Dsf) {
            let result = self.fix_dsf(&path);
            log_failure(&path, &result);
            report.dsf.record(&result);
        }

        Ok(report)
    }
}

fn log_failure(path: &Path, result: &Result<FileOutcome, TagStoreError>) {
    if let Err(e) = result {
        warn!(file = %path.display(), error = %e, "Skipping file");
    }
}
