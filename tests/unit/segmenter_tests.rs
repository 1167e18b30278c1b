/*!
 * Tests for bounded-length text segmentation
 */

use bookvox::pipeline::segmenter::segment_text;

/// Test the sentence-to-word fallback on a tight limit
#[test]
fn test_segment_text_withTightLimit_shouldFallThroughTiers() {
    let chunks = segment_text("Hello world. This is a test.", 15);
    assert_eq!(chunks, vec!["Hello world.", "This is a", "test."]);
}

/// Test that empty and whitespace-only input yields no chunks
#[test]
fn test_segment_text_withBlankInput_shouldYieldNothing() {
    assert!(segment_text("", 250).is_empty());
    assert!(segment_text("   \n\t  ", 250).is_empty());
}

/// Test greedy sentence packing under a generous limit
#[test]
fn test_segment_text_withGenerousLimit_shouldPackSentences() {
    let chunks = segment_text("Hello world. This is a test.", 250);
    assert_eq!(chunks, vec!["Hello world. This is a test."]);
}

/// Test that packing flushes when the next sentence would overflow
#[test]
fn test_segment_text_withPackingOverflow_shouldStartNewChunk() {
    let chunks = segment_text("Aaaa. Bbbb. Cccc.", 12);
    assert_eq!(chunks, vec!["Aaaa. Bbbb.", "Cccc."]);
}

/// Test clause splitting of an over-long sentence
#[test]
fn test_segment_text_withLongSentence_shouldSplitAtClauses() {
    let chunks = segment_text("one two, three four, five six.", 15);
    assert_eq!(chunks, vec!["one two,", "three four,", "five six."]);
}

/// Test that clause chunks keep their position relative to packed sentences
#[test]
fn test_segment_text_withMixedSentences_shouldPreserveOrder() {
    let chunks = segment_text("Hi. one two, three four, five six. Bye.", 15);
    assert_eq!(
        chunks,
        vec!["Hi.", "one two,", "three four,", "five six.", "Bye."]
    );
}

/// Test that a single word over the limit is emitted unsplit
#[test]
fn test_segment_text_withOversizedWord_shouldEmitUnsplit() {
    let word = "Pneumonoultramicroscopicsilicovolcanoconiosis";
    let chunks = segment_text(word, 10);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0], format!("{}.", word));
}

/// Test the length bound over a paragraph of repeated sentences
#[test]
fn test_segment_text_withParagraph_shouldRespectBound() {
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(10);
    let max_len = 40;
    let chunks = segment_text(&text, max_len);

    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(
            chunk.len() <= max_len || !chunk.contains(' '),
            "chunk over the limit is not a single word: {:?}",
            chunk
        );
        assert!(!chunk.trim().is_empty());
    }
}

/// Test that no word is dropped or reordered by segmentation
#[test]
fn test_segment_text_withParagraph_shouldPreserveWordSequence() {
    let text = "It was a dark night. The wind howled, the shutters banged, and nobody slept. Morning came at last.";
    let chunks = segment_text(text, 30);

    let original_words: Vec<&str> = text.split_whitespace().collect();
    let joined = chunks.join(" ");
    let chunk_words: Vec<&str> = joined.split_whitespace().collect();
    assert_eq!(chunk_words, original_words);
}

/// Test that a missing sentence terminator still produces a chunk
#[test]
fn test_segment_text_withoutTerminator_shouldAppendOne() {
    let chunks = segment_text("hello there friend", 250);
    assert_eq!(chunks, vec!["hello there friend."]);
}
