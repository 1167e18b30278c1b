/*!
 * The chunked synthesis-with-verification pipeline.
 *
 * This module contains the core of bookvox:
 * - `segmenter`: bounded-length text segmentation along sentence, clause
 *   and word boundaries
 * - `similarity`: normalized text similarity scoring used as the quality gate
 * - `verification`: the per-chunk synthesize/transcribe/compare retry loop
 * - `assembler`: per-chapter narration and timeline bookkeeping over the
 *   full audiobook waveform
 */

pub mod assembler;
pub mod segmenter;
pub mod similarity;
pub mod verification;

// Re-export the pipeline surface for easier usage
pub use assembler::{ChapterMarker, ChapterPlan, Narration, NarrationStats, Narrator, plan_chapters};
pub use segmenter::segment_text;
pub use similarity::{normalize, similarity};
pub use verification::{ChunkNarrator, VerificationOutcome};
