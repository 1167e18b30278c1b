/*!
 * The per-chunk synthesis-verification loop.
 *
 * Each chunk is synthesized into a temporary WAV artifact, transcribed back
 * to text, and scored against the source chunk. Attempts below the
 * acceptance threshold are retried up to a bounded budget; when the budget
 * is exhausted the last attempt's audio is kept as a fallback rather than
 * dropping the chunk. Every attempt's artifact is removed no matter how the
 * attempt ends.
 */

use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use crate::app_config::PipelineConfig;
use crate::audio::AudioBuffer;
use crate::errors::ProviderError;
use crate::pipeline::similarity::similarity;
use crate::providers::{SpeechRecognizer, SpeechSynthesizer};

/// Result of verifying one chunk, reported alongside the audio that was kept.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    /// Whether the kept audio met the acceptance threshold
    pub accepted: bool,

    /// Similarity between the chunk text and the kept audio's transcript
    pub similarity: f32,

    /// Transcript of the kept audio
    pub transcript: String,

    /// Number of synthesis attempts performed
    pub attempts: u32,
}

/// One synthesis attempt that produced decodable audio.
struct AttemptResult {
    audio: AudioBuffer,
    transcript: String,
    similarity: f32,
}

/// Drives the synthesize/transcribe/compare loop for individual chunks.
pub struct ChunkNarrator<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    recognizer: &'a dyn SpeechRecognizer,
    config: &'a PipelineConfig,
}

impl<'a> ChunkNarrator<'a> {
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

    /// Synthesize one chunk, verifying quality and retrying within the
    /// attempt budget.
    ///
    /// Returns the kept audio and the verification outcome. `accepted` is
    /// false when the budget ran out and the last attempt's audio was kept
    /// as a fallback. An error is returned only when no attempt produced
    /// decodable audio at all.
    pub async fn narrate_chunk(
        &self,
        text: &str,
    ) -> Result<(AudioBuffer, VerificationOutcome), ProviderError> {
        let mut fallback: Option<AttemptResult> = None;
        let mut attempt = 0u32;

        while attempt < self.config.max_attempts {
            match self.attempt_once(text).await {
                Ok(result) => {
                    if result.similarity >= self.config.similarity_threshold {
                        let outcome = VerificationOutcome {
                            accepted: true,
                            similarity: result.similarity,
                            transcript: result.transcript,
                            attempts: attempt + 1,
                        };
                        return Ok((result.audio, outcome));
                    }
                    debug!(
                        "Attempt {} below threshold (similarity {:.2} < {:.2})",
                        attempt + 1,
                        result.similarity,
                        self.config.similarity_threshold
                    );
                    fallback = Some(result);
                }
                Err(e) => {
                    warn!("Synthesis attempt {} failed: {}", attempt + 1, e);
                }
            }

            attempt += 1;
            if attempt < self.config.max_attempts {
                self.backoff(attempt).await;
            }
        }

        match fallback {
            Some(result) => {
                let outcome = VerificationOutcome {
                    accepted: false,
                    similarity: result.similarity,
                    transcript: result.transcript,
                    attempts: attempt,
                };
                Ok((result.audio, outcome))
            }
            None => Err(ProviderError::SynthesisFailed(format!(
                "no usable audio after {} attempts",
                attempt
            ))),
        }
    }

    /// Run a single attempt: synthesize into a scoped temporary artifact,
    /// decode it, transcribe it, and score the transcript.
    ///
    /// The artifact is deleted when the handle drops, on success and on
    /// every error path alike.
    async fn attempt_once(&self, text: &str) -> Result<AttemptResult, ProviderError> {
        let artifact = tempfile::Builder::new()
            .prefix("bookvox-chunk-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| {
                ProviderError::SynthesisFailed(format!("failed to create temporary artifact: {}", e))
            })?;

        self.synthesizer.synthesize(text, artifact.path()).await?;

        let audio = AudioBuffer::read_wav(artifact.path())
            .map_err(|e| ProviderError::SynthesisFailed(e.to_string()))?;

        let transcript = self.recognizer.transcribe(artifact.path()).await?;
        let score = similarity(text, &transcript);

        Ok(AttemptResult {
            audio,
            transcript,
            similarity: score,
        })
    }

    /// Sleep before the next attempt: base backoff doubled per retry, with
    /// jitter so repeated failures don't fire in lockstep.
    async fn backoff(&self, attempt: u32) {
        let base = self.config.retry_backoff_ms;
        if base == 0 {
            return;
        }
        let exponent = attempt.saturating_sub(1).min(6);
        let delay = base.saturating_mul(1u64 << exponent);
        let jitter = rand::rng().random_range(0..=delay / 4);
        tokio::time::sleep(Duration::from_millis(delay + jitter)).await;
    }
}
