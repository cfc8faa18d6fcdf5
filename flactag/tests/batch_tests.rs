//! Batch driver tests over a real album tree.

mod helpers;

use chrono::NaiveDate;
use flactag::tags::{MetadsfStore, MetaflacStore};
use flactag::{BatchContext, BatchReport, FormatStats, ScanError, TagFixer, TagPolicy};
use flactag_common::config::{HeuristicsConfig, ToolsConfig};
use flactag_common::ToolOutput;
use helpers::{create_track, tag_lines, FakeRunner, LogCapture, FLAC_MAGIC};
use std::path::Path;
use tempfile::TempDir;
use tracing::Level;

fn fixer<'a>(
    runner: &'a FakeRunner,
    scratch: &Path,
) -> TagFixer<MetaflacStore<&'a FakeRunner>, MetadsfStore<&'a FakeRunner>> {
    TagFixer::new(
        MetaflacStore::new(runner, ToolsConfig::default()).with_temp_dir(scratch),
        MetadsfStore::new(runner, ToolsConfig::default()),
        HeuristicsConfig::default(),
    )
    .with_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
}

fn settled_tags() -> ToolOutput {
    ToolOutput::success(tag_lines(&[
        ("TITLE", "Song"),
        ("COMMENT", "Tags normalized by flactag 2023-01-01"),
    ]))
}

#[test]
fn test_flac_then_dsf_in_path_order() {
    let music = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let root = music.path();
    let b_flac = create_track(root, "B/01.flac", FLAC_MAGIC);
    let a_dsf = create_track(root, "A/02.dsf", b"DSD ");
    let a_flac2 = create_track(root, "A/02.flac", FLAC_MAGIC);
    let a_flac1 = create_track(root, "A/01.flac", FLAC_MAGIC);
    create_track(root, "top.flac", FLAC_MAGIC);
    create_track(root, "A/cover.jpg", b"\xFF\xD8");

    let runner = FakeRunner::new()
        .respond("--export-tags-to=-", settled_tags())
        .respond(" -t -eUTF8 ", ToolOutput::success(Vec::new()));

    let report = fixer(&runner, scratch.path())
        .run(&BatchContext::new(root, TagPolicy::default()))
        .unwrap();

    let reads: Vec<String> = runner
        .calls()
        .into_iter()
        .filter(|c| c.contains("--export-tags-to=-") || c.contains(" -t -eUTF8 "))
        .collect();
    let expected: Vec<String> = [&a_flac1, &a_flac2, &b_flac, &a_dsf]
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    assert_eq!(reads.len(), expected.len());
    for (call, path) in reads.iter().zip(&expected) {
        assert!(call.ends_with(&format!("\"{}\"", path)), "{} vs {}", call, path);
    }

    assert_eq!(
        report.flac,
        FormatStats {
            scanned: 3,
            rewritten: 0,
            unchanged: 3,
            failed: 0,
        }
    );
    assert_eq!(report.dsf.scanned, 1);
    assert_eq!(report.dsf.unchanged, 1);
}

#[test]
fn test_failed_track_does_not_stop_batch() {
    let music = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let root = music.path();
    let bad = create_track(root, "A/01.flac", FLAC_MAGIC);
    create_track(root, "A/02.flac", FLAC_MAGIC);
    create_track(root, "A/03.flac", FLAC_MAGIC);

    let runner = FakeRunner::new()
        .respond(
            &format!("--export-tags-to=- \"{}\"", bad.display()),
            ToolOutput::failure(1, "not a FLAC file"),
        )
        .respond("--export-tags-to=-", ToolOutput::success(Vec::new()));
    let capture = LogCapture::new();

    let report = tracing::dispatcher::with_default(&capture.dispatch(), || {
        fixer(&runner, scratch.path()).run(&BatchContext::new(root, TagPolicy::default()))
    })
    .unwrap();

    assert_eq!(report.flac.scanned, 3);
    assert_eq!(report.flac.failed, 1);
    assert_eq!(report.flac.rewritten, 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(runner.imported().len(), 2);

    let skipped: Vec<_> = capture
        .at_level(Level::WARN)
        .into_iter()
        .filter(|r| r.message == "Skipping file")
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].file.as_deref(), Some(bad.display().to_string().as_str()));
}

#[test]
fn test_various_flag_applies_to_every_track() {
    let music = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let root = music.path();
    create_track(root, "Hits/01.flac", FLAC_MAGIC);
    create_track(root, "Hits/02.flac", FLAC_MAGIC);

    let runner = FakeRunner::new().respond(
        "--export-tags-to=-",
        ToolOutput::success(tag_lines(&[
            ("ARTIST", "Jane Doe"),
            ("ALBUMARTIST", "various artists"),
        ])),
    );
    let policy = TagPolicy {
        various: true,
        ..TagPolicy::default()
    };

    let report = fixer(&runner, scratch.path())
        .run(&BatchContext::new(root, policy))
        .unwrap();

    assert_eq!(report.flac.rewritten, 2);
    for imported in runner.imported() {
        assert_eq!(
            imported,
            tag_lines(&[
                ("ARTIST", "Jane Doe"),
                ("COMMENT", "Tags normalized by flactag 2024-03-09"),
                ("COMPILATION", "Y"),
            ])
        );
    }
}

#[test]
fn test_root_that_is_a_file_is_fatal() {
    let music = TempDir::new().unwrap();
    let file = create_track(music.path(), "A/01.flac", FLAC_MAGIC);
    let runner = FakeRunner::new();

    let result = fixer(&runner, music.path()).run(&BatchContext::new(&file, TagPolicy::default()));

    assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_empty_root_reports_nothing() {
    let music = TempDir::new().unwrap();
    let runner = FakeRunner::new();

    let report = fixer(&runner, music.path())
        .run(&BatchContext::new(music.path(), TagPolicy::default()))
        .unwrap();

    assert_eq!(report, BatchReport::default());
}
