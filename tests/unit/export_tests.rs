/*!
 * Tests for audiobook export metadata and failure handling
 */

use bookvox::audio::AudioBuffer;
use bookvox::export::{export_audiobook, render_chapter_metadata};
use bookvox::pipeline::assembler::ChapterMarker;

use crate::common;

fn marker(title: &str, start_ms: u64, end_ms: u64) -> ChapterMarker {
    ChapterMarker {
        title: title.to_string(),
        start_ms,
        end_ms,
    }
}

/// Test the rendered ffmetadata chapter file
#[test]
fn test_render_chapter_metadata_withTwoChapters_shouldRenderStanzas() {
    let markers = vec![
        marker("Chapter One", 0, 5000),
        marker("Chapter Two", 5000, 8200),
    ];
    let rendered = render_chapter_metadata(&markers);

    let expected = ";FFMETADATA1\n\
        [CHAPTER]\nTIMEBASE=1/1\nSTART=0\nEND=5\ntitle=Chapter One\n\n\
        [CHAPTER]\nTIMEBASE=1/1\nSTART=5\nEND=8\ntitle=Chapter Two\n\n";
    assert_eq!(rendered, expected);
}

/// Test that offsets are truncated to integer seconds
#[test]
fn test_render_chapter_metadata_withSubSecondOffsets_shouldTruncate() {
    let markers = vec![marker("Intro", 999, 61999)];
    let rendered = render_chapter_metadata(&markers);

    assert!(rendered.contains("START=0\n"));
    assert!(rendered.contains("END=61\n"));
}

/// Test escaping of characters the ffmetadata format treats specially
#[test]
fn test_render_chapter_metadata_withSpecialCharacters_shouldEscapeTitle() {
    let markers = vec![marker("Q=A; #1", 0, 1000)];
    let rendered = render_chapter_metadata(&markers);

    assert!(rendered.contains(r"title=Q\=A\; \#1"));
}

/// Test that rendering no markers yields only the header
#[test]
fn test_render_chapter_metadata_withNoMarkers_shouldRenderHeaderOnly() {
    assert_eq!(render_chapter_metadata(&[]), ";FFMETADATA1\n");
}

/// Test that export fails cleanly on an unwritable waveform
#[tokio::test]
async fn test_export_audiobook_withFormatlessWaveform_shouldFailWithoutOutput() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output_path = temp_dir.path().join("book.m4b");

    let markers = vec![marker("Only", 0, 1000)];
    let result = export_audiobook(&AudioBuffer::empty(), &markers, &output_path).await;

    assert!(result.is_err());
    // No partial output and no stray intermediates in the output directory
    assert!(!output_path.exists());
    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}
