/*!
 * Tests for the per-chunk synthesis-verification loop
 */

use bookvox::pipeline::verification::ChunkNarrator;
use bookvox::providers::mock::{ScriptedRecognizer, ScriptedSynthesis, ScriptedSynthesizer};

use crate::common;

/// Test that a perfect transcription is accepted on the first attempt
#[tokio::test]
async fn test_narrate_chunk_withPerfectTranscription_shouldAcceptFirstAttempt() {
    let synthesizer = ScriptedSynthesizer::new();
    let recognizer = ScriptedRecognizer::echoing(&synthesizer);
    let config = common::fast_pipeline_config();
    let narrator = ChunkNarrator::new(&synthesizer, &recognizer, &config);

    let (audio, outcome) = narrator.narrate_chunk("The wind howled outside.").await.unwrap();

    assert!(outcome.accepted);
    assert_eq!(outcome.attempts, 1);
    assert!((outcome.similarity - 1.0).abs() < f32::EPSILON);
    assert_eq!(outcome.transcript, "The wind howled outside.");
    assert_eq!(synthesizer.calls(), 1);
    assert_eq!(audio.duration_ms(), 1000);
}

/// Test that an acceptable score stops the loop even with retries remaining
#[tokio::test]
async fn test_narrate_chunk_withQueuedTranscripts_shouldStopAtFirstAcceptable() {
    let synthesizer = ScriptedSynthesizer::new();
    let recognizer =
        ScriptedRecognizer::with_transcripts(vec!["Morning came at last.".to_string()]);
    let config = common::fast_pipeline_config();
    let narrator = ChunkNarrator::new(&synthesizer, &recognizer, &config);

    let (_, outcome) = narrator.narrate_chunk("Morning came at last.").await.unwrap();

    assert!(outcome.accepted);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(synthesizer.calls(), 1);
    assert_eq!(recognizer.calls(), 1);
}

/// Test bounded retries and fallback audio when quality never recovers
#[tokio::test]
async fn test_narrate_chunk_withPersistentGarbage_shouldExhaustAndKeepFallback() {
    let synthesizer = ScriptedSynthesizer::new();
    let recognizer = ScriptedRecognizer::with_transcripts(vec![
        "zzz zzz zzz".to_string(),
        "zzz zzz zzz".to_string(),
        "zzz zzz zzz".to_string(),
    ]);
    let config = common::fast_pipeline_config();
    let narrator = ChunkNarrator::new(&synthesizer, &recognizer, &config);

    let (audio, outcome) = narrator.narrate_chunk("The wind howled outside.").await.unwrap();

    assert!(!outcome.accepted);
    assert_eq!(outcome.attempts, 3);
    assert!(outcome.similarity < 0.85);
    // Exactly max_attempts synthesis invocations, no more
    assert_eq!(synthesizer.calls(), 3);
    // The last attempt's audio is retained rather than dropping the chunk
    assert_eq!(audio.duration_ms(), 1000);
}

/// Test recovery from an engine failure on a later attempt
#[tokio::test]
async fn test_narrate_chunk_withEngineFailureThenSuccess_shouldRetryAndAccept() {
    let synthesizer = ScriptedSynthesizer::new();
    synthesizer.push_outcome(ScriptedSynthesis::Fail);
    synthesizer.push_outcome(ScriptedSynthesis::Succeed { duration_ms: 500 });
    let recognizer = ScriptedRecognizer::echoing(&synthesizer);
    let config = common::fast_pipeline_config();
    let narrator = ChunkNarrator::new(&synthesizer, &recognizer, &config);

    let (audio, outcome) = narrator.narrate_chunk("Morning came at last.").await.unwrap();

    assert!(outcome.accepted);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(synthesizer.calls(), 2);
    assert_eq!(audio.duration_ms(), 500);
}

/// Test that a below-threshold attempt followed by a good one is accepted
#[tokio::test]
async fn test_narrate_chunk_withGarbageThenGood_shouldAcceptSecondAttempt() {
    let synthesizer = ScriptedSynthesizer::new();
    let recognizer = ScriptedRecognizer::with_transcripts(vec![
        "zzz zzz zzz".to_string(),
        "The wind howled outside.".to_string(),
    ]);
    let config = common::fast_pipeline_config();
    let narrator = ChunkNarrator::new(&synthesizer, &recognizer, &config);

    let (_, outcome) = narrator.narrate_chunk("The wind howled outside.").await.unwrap();

    assert!(outcome.accepted);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(synthesizer.calls(), 2);
}

/// Test that the loop errors when no attempt produced audio at all
#[tokio::test]
async fn test_narrate_chunk_withAllEngineFailures_shouldReturnError() {
    let synthesizer = ScriptedSynthesizer::new();
    synthesizer.push_outcome(ScriptedSynthesis::Fail);
    synthesizer.push_outcome(ScriptedSynthesis::Fail);
    synthesizer.push_outcome(ScriptedSynthesis::Fail);
    let recognizer = ScriptedRecognizer::echoing(&synthesizer);
    let config = common::fast_pipeline_config();
    let narrator = ChunkNarrator::new(&synthesizer, &recognizer, &config);

    let result = narrator.narrate_chunk("The wind howled outside.").await;

    assert!(result.is_err());
    // The attempt budget still bounds the number of engine calls
    assert_eq!(synthesizer.calls(), 3);
}

/// Test that the per-attempt artifact is removed on every exit path
#[tokio::test]
async fn test_narrate_chunk_onAnyOutcome_shouldRemoveTemporaryArtifact() {
    // Accepted path
    let synthesizer = ScriptedSynthesizer::new();
    let recognizer = ScriptedRecognizer::echoing(&synthesizer);
    let config = common::fast_pipeline_config();
    let narrator = ChunkNarrator::new(&synthesizer, &recognizer, &config);
    narrator.narrate_chunk("Morning came at last.").await.unwrap();
    let artifact = synthesizer.tracker().lock().last_artifact.clone().unwrap();
    assert!(!artifact.exists(), "artifact left behind after acceptance");

    // Fallback path
    let synthesizer = ScriptedSynthesizer::new();
    let recognizer = ScriptedRecognizer::with_transcripts(vec![
        "zzz".to_string(),
        "zzz".to_string(),
        "zzz".to_string(),
    ]);
    let narrator = ChunkNarrator::new(&synthesizer, &recognizer, &config);
    narrator.narrate_chunk("Morning came at last.").await.unwrap();
    let artifact = synthesizer.tracker().lock().last_artifact.clone().unwrap();
    assert!(!artifact.exists(), "artifact left behind after fallback");

    // Error path
    let synthesizer = ScriptedSynthesizer::new();
    for _ in 0..3 {
        synthesizer.push_outcome(ScriptedSynthesis::Fail);
    }
    let recognizer = ScriptedRecognizer::echoing(&synthesizer);
    let narrator = ChunkNarrator::new(&synthesizer, &recognizer, &config);
    narrator.narrate_chunk("Morning came at last.").await.unwrap_err();
    let artifact = synthesizer.tracker().lock().last_artifact.clone().unwrap();
    assert!(!artifact.exists(), "artifact left behind after engine failure");
}
