/*!
 * Tests for chapter narration and timeline assembly
 */

use bookvox::app_config::PipelineConfig;
use bookvox::pipeline::assembler::{ChapterMarker, Narrator, plan_chapters};
use bookvox::providers::mock::{ScriptedRecognizer, ScriptedSynthesis, ScriptedSynthesizer};

use crate::common::{self, chapter};

/// Test contiguous chapter markers over two chapters of known durations
#[tokio::test]
async fn test_narrate_withTwoChapters_shouldRecordContiguousMarkers() {
    let synthesizer = ScriptedSynthesizer::new();
    synthesizer.push_outcome(ScriptedSynthesis::Succeed { duration_ms: 5000 });
    synthesizer.push_outcome(ScriptedSynthesis::Succeed { duration_ms: 3200 });
    let recognizer = ScriptedRecognizer::echoing(&synthesizer);
    let config = common::fast_pipeline_config();
    let narrator = Narrator::new(&synthesizer, &recognizer, &config);

    let chapters = vec![
        chapter("Chapter One", &["Short text."]),
        chapter("Chapter Two", &["More text."]),
    ];
    let narration = narrator.narrate(&chapters, None).await.unwrap();

    assert_eq!(
        narration.markers,
        vec![
            ChapterMarker {
                title: "Chapter One".to_string(),
                start_ms: 0,
                end_ms: 5000,
            },
            ChapterMarker {
                title: "Chapter Two".to_string(),
                start_ms: 5000,
                end_ms: 8200,
            },
        ]
    );
    assert_eq!(narration.waveform.duration_ms(), 8200);
}

/// Test that blank chapters produce no marker and no audio
#[tokio::test]
async fn test_narrate_withBlankChapter_shouldSkipIt() {
    let synthesizer = ScriptedSynthesizer::new();
    let recognizer = ScriptedRecognizer::echoing(&synthesizer);
    let config = common::fast_pipeline_config();
    let narrator = Narrator::new(&synthesizer, &recognizer, &config);

    let chapters = vec![
        chapter("First", &["Some narration."]),
        chapter("Blank", &["", "  "]),
        chapter("Last", &["Closing words."]),
    ];
    let narration = narrator.narrate(&chapters, None).await.unwrap();

    assert_eq!(narration.markers.len(), 2);
    assert_eq!(narration.markers[0].title, "First");
    assert_eq!(narration.markers[1].title, "Last");
    assert_eq!(narration.markers[0].end_ms, narration.markers[1].start_ms);
    assert_eq!(narration.stats.chapters_narrated, 2);
    assert_eq!(narration.stats.chapters_skipped, 1);
    // The blank chapter contributed no audio
    assert_eq!(narration.waveform.duration_ms(), 2000);
}

/// Test that a multi-chunk chapter concatenates its chunk audio in order
#[tokio::test]
async fn test_narrate_withMultiChunkChapter_shouldConcatenateAudio() {
    let synthesizer = ScriptedSynthesizer::new();
    let recognizer = ScriptedRecognizer::echoing(&synthesizer);
    let config = PipelineConfig {
        max_chunk_chars: 20,
        retry_backoff_ms: 0,
        ..PipelineConfig::default()
    };
    let narrator = Narrator::new(&synthesizer, &recognizer, &config);

    let chapters = vec![chapter("Split", &["First part here. Second part here."])];
    let narration = narrator.narrate(&chapters, None).await.unwrap();

    assert_eq!(narration.stats.chunks_total, 2);
    assert_eq!(narration.markers.len(), 1);
    assert_eq!(narration.markers[0].start_ms, 0);
    assert_eq!(narration.markers[0].end_ms, 2000);
    assert_eq!(narration.waveform.duration_ms(), 2000);
}

/// Test run statistics for retried and fallback chunks
#[tokio::test]
async fn test_narrate_withMixedQuality_shouldCountStats() {
    let synthesizer = ScriptedSynthesizer::new();
    // Chunk 1: garbage then good; chunk 2 (second chapter): garbage throughout
    let recognizer = ScriptedRecognizer::with_transcripts(vec![
        "zzz zzz".to_string(),
        "Some narration.".to_string(),
        "zzz zzz".to_string(),
        "zzz zzz".to_string(),
        "zzz zzz".to_string(),
    ]);
    let config = common::fast_pipeline_config();
    let narrator = Narrator::new(&synthesizer, &recognizer, &config);

    let chapters = vec![
        chapter("Good", &["Some narration."]),
        chapter("Stubborn", &["Closing words."]),
    ];
    let narration = narrator.narrate(&chapters, None).await.unwrap();

    assert_eq!(narration.stats.chunks_total, 2);
    assert_eq!(narration.stats.chunks_accepted_first_try, 0);
    assert_eq!(narration.stats.chunks_retried, 2);
    assert_eq!(narration.stats.chunks_fallback, 1);
    // The fallback chunk's audio is still part of the waveform
    assert_eq!(narration.markers.len(), 2);
    assert_eq!(narration.waveform.duration_ms(), 2000);
}

/// Test the segmentation pre-pass
#[test]
fn test_plan_chapters_withMixedContent_shouldSkipBlankAndBound() {
    let chapters = vec![
        chapter("One", &["It was a dark night.", "The wind howled outside."]),
        chapter("Empty", &["   "]),
        chapter("Two", &["Morning came at last."]),
    ];
    let plans = plan_chapters(&chapters, 30);

    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].title, "One");
    assert_eq!(plans[1].title, "Two");
    for plan in &plans {
        assert!(!plan.chunks.is_empty());
        for chunk in &plan.chunks {
            assert!(chunk.len() <= 30);
        }
    }
}
