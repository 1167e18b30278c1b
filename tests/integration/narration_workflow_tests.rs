/*!
 * End-to-end narration pipeline tests against scripted providers
 */

use std::sync::Arc;

use bookvox::app_controller::Controller;
use bookvox::chapter_source::ChapterBatch;
use bookvox::pipeline::assembler::Narrator;
use bookvox::providers::mock::{ScriptedRecognizer, ScriptedSynthesizer};

use crate::common;

/// Test the full narration pipeline over a loaded batch file
#[tokio::test]
async fn test_narration_withBatchFile_shouldProduceContiguousTimeline() {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();
    let batch_path = common::create_test_batch(&dir_path, "book.json").unwrap();
    let batch = ChapterBatch::load_from_file(&batch_path).unwrap();

    let synthesizer = ScriptedSynthesizer::new();
    let recognizer = ScriptedRecognizer::echoing(&synthesizer);
    let config = common::fast_pipeline_config();
    let narrator = Narrator::new(&synthesizer, &recognizer, &config);

    let narration = narrator.narrate(&batch.chapters, None).await.unwrap();

    // One marker per chapter, contiguous from zero
    assert_eq!(narration.markers.len(), 2);
    assert_eq!(narration.markers[0].start_ms, 0);
    assert_eq!(narration.markers[0].end_ms, narration.markers[1].start_ms);
    assert_eq!(
        narration.markers.last().unwrap().end_ms,
        narration.waveform.duration_ms()
    );

    // Every chunk was accepted on the first try with perfect transcription
    assert_eq!(narration.stats.chunks_total, narration.stats.chunks_accepted_first_try);
    assert_eq!(narration.stats.chunks_fallback, 0);
}

/// Test that the controller skips existing audiobooks without force
#[tokio::test]
async fn test_controller_run_withExistingOutput_shouldSkip() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();
    let batch_path = common::create_test_batch(&dir_path, "book.json").unwrap();

    // Pre-existing audiobook next to the batch
    let output_path = dir_path.join("book.m4b");
    std::fs::write(&output_path, b"existing audiobook").unwrap();

    let synthesizer = Arc::new(ScriptedSynthesizer::new());
    let recognizer = Arc::new(ScriptedRecognizer::echoing(&synthesizer));
    let controller =
        Controller::with_providers(common::fast_config(), synthesizer.clone(), recognizer);

    controller
        .run(batch_path, dir_path.clone(), false)
        .await
        .unwrap();

    // Nothing was synthesized and the existing file is untouched
    assert_eq!(synthesizer.calls(), 0);
    assert_eq!(std::fs::read(&output_path).unwrap(), b"existing audiobook");
}

/// Test that a batch with no narratable content exports nothing
#[tokio::test]
async fn test_controller_run_withAllBlankChapters_shouldExportNothing() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();
    let batch_path = common::create_test_file(
        &dir_path,
        "blank.json",
        r#"[{"chapter_title": "Blank", "chapter_content": ["", "  "]}]"#,
    )
    .unwrap();

    let synthesizer = Arc::new(ScriptedSynthesizer::new());
    let recognizer = Arc::new(ScriptedRecognizer::echoing(&synthesizer));
    let controller =
        Controller::with_providers(common::fast_config(), synthesizer.clone(), recognizer);

    controller
        .run(batch_path, dir_path.clone(), false)
        .await
        .unwrap();

    assert_eq!(synthesizer.calls(), 0);
    assert!(!dir_path.join("blank.m4b").exists());
}

/// Test that folder processing continues past broken batch files
#[tokio::test]
async fn test_controller_run_folder_withBrokenBatch_shouldContinue() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();
    common::create_test_file(&dir_path, "broken.json", "{ not json").unwrap();
    common::create_test_file(
        &dir_path,
        "blank.json",
        r#"[{"chapter_title": "Blank", "chapter_content": [""]}]"#,
    )
    .unwrap();

    let synthesizer = Arc::new(ScriptedSynthesizer::new());
    let recognizer = Arc::new(ScriptedRecognizer::echoing(&synthesizer));
    let controller =
        Controller::with_providers(common::fast_config(), synthesizer, recognizer);

    // The broken file is logged and skipped; the scan itself succeeds
    controller.run_folder(dir_path, None, false).await.unwrap();
}

/// Test the segmentation-only dry run
#[tokio::test]
async fn test_controller_plan_withBatchFile_shouldNotSynthesize() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();
    let batch_path = common::create_test_batch(&dir_path, "book.json").unwrap();

    let synthesizer = Arc::new(ScriptedSynthesizer::new());
    let recognizer = Arc::new(ScriptedRecognizer::echoing(&synthesizer));
    let controller =
        Controller::with_providers(common::fast_config(), synthesizer.clone(), recognizer);

    controller.plan(&batch_path).unwrap();

    assert_eq!(synthesizer.calls(), 0);
}
