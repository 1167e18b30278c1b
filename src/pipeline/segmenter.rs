/*!
 * Bounded-length text segmentation.
 *
 * Chapter text is cut into chunks small enough for a single synthesis call.
 * Splitting prefers sentence boundaries, falls back to clause boundaries for
 * over-long sentences, and finally packs individual words. A chunk may only
 * exceed the limit when it consists of a single unsplittable word.
 */

use log::debug;

/// Character that terminates a sentence.
const SENTENCE_TERMINATOR: char = '.';

/// Character that separates clauses within a sentence.
const CLAUSE_SEPARATOR: char = ',';

/// Split `text` into ordered chunks of at most `max_len` characters.
///
/// Consecutive sentences are greedily packed into a chunk; a sentence that
/// cannot meet the limit on its own is split at clause separators, and any
/// clause still over the limit is packed word by word. Empty or
/// whitespace-only input yields no chunks.
pub fn segment_text(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    if text.trim().is_empty() {
        return chunks;
    }

    let mut buffer = String::new();
    for sentence in split_sentences(text) {
        if !fits(&buffer, &sentence, max_len) {
            if buffer.is_empty() {
                // The sentence cannot meet the limit even alone; descend to
                // the clause tier. The buffer is flushed first so emitted
                // chunks keep the original text order.
                split_clauses(&sentence, max_len, &mut chunks);
                continue;
            }
            chunks.push(std::mem::take(&mut buffer));
            if !fits(&buffer, &sentence, max_len) {
                split_clauses(&sentence, max_len, &mut chunks);
                continue;
            }
        }
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(&sentence);
    }
    if !buffer.is_empty() {
        chunks.push(buffer);
    }

    // Finishing pass: word-pack anything still over the limit, so the bound
    // holds globally no matter which tier produced the chunk.
    let mut finished = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.len() > max_len {
            pack_words(&chunk, max_len, &mut finished);
        } else {
            finished.push(chunk);
        }
    }
    finished
}

/// Whether `next` may join `buffer` within the limit.
///
/// The joining space is counted on both sides of the comparison, including
/// against an empty buffer; a span for which even that fails must descend a
/// tier.
fn fits(buffer: &str, next: &str, max_len: usize) -> bool {
    buffer.len() + next.len() + 1 < max_len
}

/// Split text at sentence terminators, re-appending the terminator to each
/// non-empty sentence.
fn split_sentences(text: &str) -> Vec<String> {
    text.split(SENTENCE_TERMINATOR)
        .filter_map(|piece| {
            let trimmed = piece.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(format!("{}{}", trimmed, SENTENCE_TERMINATOR))
            }
        })
        .collect()
}

/// Split an over-long sentence at clause separators.
///
/// Clauses are emitted as independent chunks rather than re-packed; only
/// parts actually followed by a separator get it re-suffixed, so no
/// punctuation is invented. Clauses that still miss the limit fall through
/// to word packing.
fn split_clauses(sentence: &str, max_len: usize, out: &mut Vec<String>) {
    let parts: Vec<&str> = sentence.split(CLAUSE_SEPARATOR).collect();
    let last_index = parts.len() - 1;

    for (index, part) in parts.iter().enumerate() {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let clause = if index < last_index {
            format!("{}{}", trimmed, CLAUSE_SEPARATOR)
        } else {
            trimmed.to_string()
        };

        if fits("", &clause, max_len) {
            out.push(clause);
        } else {
            pack_words(&clause, max_len, out);
        }
    }
}

/// Greedily pack whitespace-separated words into chunks within the limit.
///
/// A single word that cannot meet the limit is emitted unsplit; this is the
/// only case in which an emitted chunk may exceed `max_len`.
fn pack_words(text: &str, max_len: usize, out: &mut Vec<String>) {
    let mut buffer = String::new();
    for word in text.split_whitespace() {
        if fits(&buffer, word, max_len) {
            if !buffer.is_empty() {
                buffer.push(' ');
            }
            buffer.push_str(word);
            continue;
        }

        if !buffer.is_empty() {
            out.push(std::mem::take(&mut buffer));
        }
        if fits(&buffer, word, max_len) {
            buffer.push_str(word);
        } else {
            if word.len() > max_len {
                debug!(
                    "Word of {} chars exceeds the {} char chunk limit, emitting unsplit",
                    word.len(),
                    max_len
                );
            }
            out.push(word.to_string());
        }
    }
    if !buffer.is_empty() {
        out.push(buffer);
    }
}
