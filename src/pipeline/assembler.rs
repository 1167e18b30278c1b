/*!
 * Chapter narration and timeline assembly.
 *
 * Chapters are narrated strictly in document order, chunks strictly in
 * segmentation order. Accepted (or fallback) chunk audio is concatenated
 * into chapter audio, chapters are appended to the single full-waveform
 * accumulator, and each chapter's start/end offsets in that waveform are
 * recorded for container-level chapter markers.
 */

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::{debug, info, warn};

use crate::app_config::PipelineConfig;
use crate::audio::AudioBuffer;
use crate::chapter_source::ChapterRecord;
use crate::pipeline::segmenter::segment_text;
use crate::pipeline::verification::ChunkNarrator;
use crate::providers::{SpeechRecognizer, SpeechSynthesizer};

/// One chapter's position in the assembled waveform, in milliseconds.
///
/// Markers are contiguous: each chapter starts exactly where the previous
/// one ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMarker {
    /// Chapter title, used for the container chapter entry
    pub title: String,
    /// Offset of the chapter's first sample in the full waveform
    pub start_ms: u64,
    /// Offset one past the chapter's last sample
    pub end_ms: u64,
}

/// A chapter's segmentation, computed before any synthesis starts.
#[derive(Debug, Clone)]
pub struct ChapterPlan {
    /// Chapter title
    pub title: String,
    /// Ordered chunk texts for the chapter
    pub chunks: Vec<String>,
}

/// Counters describing how a narration run went.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrationStats {
    /// Chapters that produced audio
    pub chapters_narrated: usize,
    /// Chapters skipped for having no content
    pub chapters_skipped: usize,
    /// Total chunks synthesized
    pub chunks_total: usize,
    /// Chunks accepted on their first attempt
    pub chunks_accepted_first_try: usize,
    /// Chunks that needed more than one attempt
    pub chunks_retried: usize,
    /// Chunks kept as below-threshold fallback audio
    pub chunks_fallback: usize,
}

impl NarrationStats {
    /// Human-readable one-line summary for the end-of-run log.
    pub fn summary(&self) -> String {
        format!(
            "{} chapters narrated ({} skipped), {} chunks: {} first-try, {} retried, {} fallback",
            self.chapters_narrated,
            self.chapters_skipped,
            self.chunks_total,
            self.chunks_accepted_first_try,
            self.chunks_retried,
            self.chunks_fallback
        )
    }
}

/// The assembled audiobook: full waveform, chapter markers and run stats.
#[derive(Debug)]
pub struct Narration {
    /// Concatenation of all chapter audio in document order
    pub waveform: AudioBuffer,
    /// One marker per narrated chapter, contiguous over the waveform
    pub markers: Vec<ChapterMarker>,
    /// Counters for the run
    pub stats: NarrationStats,
}

/// Segment every chapter up front, skipping chapters with no content.
///
/// Running this before synthesis both sizes the progress display and keeps
/// the narration loop free of segmentation concerns.
pub fn plan_chapters(chapters: &[ChapterRecord], max_chunk_chars: usize) -> Vec<ChapterPlan> {
    chapters
        .iter()
        .filter_map(|chapter| {
            let text = chapter.joined_text();
            if text.is_empty() {
                debug!("Skipping chapter '{}': no narratable content", chapter.title);
                return None;
            }
            Some(ChapterPlan {
                title: chapter.title.clone(),
                chunks: segment_text(&text, max_chunk_chars),
            })
        })
        .collect()
}

/// Narrates a chapter batch into a single waveform with chapter markers.
pub struct Narrator<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    recognizer: &'a dyn SpeechRecognizer,
    config: &'a PipelineConfig,
}

impl<'a> Narrator<'a> {
    /// Create a narrator borrowing the collaborators for the run.
    pub fn new(
        synthesizer: &'a dyn SpeechSynthesizer,
        recognizer: &'a dyn SpeechRecognizer,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            synthesizer,
            recognizer,
            config,
        }
    }

    /// Narrate all chapters in order, returning the assembled waveform,
    /// contiguous chapter markers, and run statistics.
    ///
    /// `progress` is advanced once per chunk when provided.
    pub async fn narrate(
        &self,
        chapters: &[ChapterRecord],
        progress: Option<&ProgressBar>,
    ) -> Result<Narration> {
        let plans = plan_chapters(chapters, self.config.max_chunk_chars);

        let mut stats = NarrationStats {
            chapters_skipped: chapters.len() - plans.len(),
            ..NarrationStats::default()
        };

        let chunk_narrator = ChunkNarrator::new(self.synthesizer, self.recognizer, self.config);
        let mut waveform = AudioBuffer::empty();
        let mut markers = Vec::with_capacity(plans.len());

        for plan in &plans {
            if let Some(bar) = progress {
                bar.set_message(plan.title.clone());
            }

            let start_ms = waveform.duration_ms();
            let mut chapter_audio = AudioBuffer::empty();

            for (index, chunk) in plan.chunks.iter().enumerate() {
                let (audio, outcome) = chunk_narrator
                    .narrate_chunk(chunk)
                    .await
                    .with_context(|| {
                        format!("chapter '{}': chunk {} failed", plan.title, index)
                    })?;

                stats.chunks_total += 1;
                if outcome.accepted && outcome.attempts == 1 {
                    stats.chunks_accepted_first_try += 1;
                }
                if outcome.attempts > 1 {
                    stats.chunks_retried += 1;
                }
                if !outcome.accepted {
                    stats.chunks_fallback += 1;
                    warn!(
                        "Chapter '{}': chunk {} below threshold after {} attempts (similarity {:.2}), keeping fallback audio",
                        plan.title, index, outcome.attempts, outcome.similarity
                    );
                } else {
                    debug!(
                        "Chapter '{}': chunk {} accepted (similarity {:.2}, attempt {})",
                        plan.title, index, outcome.similarity, outcome.attempts
                    );
                }

                chapter_audio.append(&audio).with_context(|| {
                    format!("chapter '{}': chunk {} audio format mismatch", plan.title, index)
                })?;

                if let Some(bar) = progress {
                    bar.inc(1);
                }
            }

            waveform
                .append(&chapter_audio)
                .with_context(|| format!("chapter '{}': audio format mismatch", plan.title))?;
            let end_ms = waveform.duration_ms();

            markers.push(ChapterMarker {
                title: plan.title.clone(),
                start_ms,
                end_ms,
            });
            stats.chapters_narrated += 1;

            info!(
                "Chapter '{}' narrated: {} chunks, {} ms",
                plan.title,
                plan.chunks.len(),
                end_ms - start_ms
            );
        }

        Ok(Narration {
            waveform,
            markers,
            stats,
        })
    }
}
