/*!
 * Scripted provider implementations for testing.
 *
 * These providers avoid external engines entirely: the synthesizer writes
 * silent WAV artifacts according to a script of outcomes, and the recognizer
 * replays scripted transcripts or echoes the last synthesized text. Both
 * record their calls so tests can assert on attempt counts.
 */

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::audio::AudioBuffer;
use crate::errors::ProviderError;
use crate::providers::{SpeechRecognizer, SpeechSynthesizer};

/// Records provider calls so tests can assert no more happened than allowed
#[derive(Debug, Default)]
pub struct CallTracker {
    /// Number of synthesize calls made
    pub synthesize_calls: usize,
    /// Number of transcribe calls made
    pub transcribe_calls: usize,
    /// Text of the most recent synthesize call
    pub last_text: Option<String>,
    /// Artifact path of the most recent synthesize call
    pub last_artifact: Option<std::path::PathBuf>,
}

/// Outcome of one scripted synthesis attempt
#[derive(Debug, Clone, Copy)]
pub enum ScriptedSynthesis {
    /// Write a silent WAV artifact of the given duration
    Succeed {
        /// Duration of the artifact in milliseconds
        duration_ms: u64,
    },
    /// Signal an engine failure
    Fail,
}

/// Mock synthesizer producing silent WAV artifacts per script
#[derive(Debug)]
pub struct ScriptedSynthesizer {
    /// Outcomes consumed in order; an empty script means success
    script: Mutex<VecDeque<ScriptedSynthesis>>,
    /// Duration used when the script is exhausted
    default_duration_ms: u64,
    /// Sample rate of produced artifacts
    sample_rate: u32,
    /// Shared call tracker
    tracker: Arc<Mutex<CallTracker>>,
}

impl ScriptedSynthesizer {
    /// Create a mock synthesizer that always succeeds with one-second chunks.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_duration_ms: 1000,
            sample_rate: 22050,
            tracker: Arc::new(Mutex::new(CallTracker::default())),
        }
    }

    /// Set the artifact duration used once the script is exhausted.
    pub fn with_chunk_duration_ms(mut self, duration_ms: u64) -> Self {
        self.default_duration_ms = duration_ms;
        self
    }

    /// Queue an outcome for the next synthesize call.
    pub fn push_outcome(&self, outcome: ScriptedSynthesis) {
        self.script.lock().push_back(outcome);
    }

    /// Get the shared call tracker.
    pub fn tracker(&self) -> Arc<Mutex<CallTracker>> {
        self.tracker.clone()
    }

    /// Number of synthesize calls made so far.
    pub fn calls(&self) -> usize {
        self.tracker.lock().synthesize_calls
    }
}

impl Default for ScriptedSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), ProviderError> {
        {
            let mut tracker = self.tracker.lock();
            tracker.synthesize_calls += 1;
            tracker.last_text = Some(text.to_string());
            tracker.last_artifact = Some(output.to_path_buf());
        }

        let outcome = self
            .script
            .lock()
            .pop_front()
            .unwrap_or(ScriptedSynthesis::Succeed {
                duration_ms: self.default_duration_ms,
            });

        match outcome {
            ScriptedSynthesis::Succeed { duration_ms } => {
                AudioBuffer::silence(duration_ms, self.sample_rate, 1)
                    .write_wav(output)
                    .map_err(|e| ProviderError::SynthesisFailed(e.to_string()))
            }
            ScriptedSynthesis::Fail => Err(ProviderError::SynthesisFailed(
                "scripted engine failure".to_string(),
            )),
        }
    }

    async fn test_availability(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted-synthesizer"
    }
}

/// Mock recognizer replaying scripted transcripts
///
/// When the transcript queue is empty, an echoing recognizer returns the
/// last text the paired synthesizer saw (a perfect transcription); a
/// non-echoing one returns an empty transcript.
#[derive(Debug)]
pub struct ScriptedRecognizer {
    /// Transcripts consumed in order
    transcripts: Mutex<VecDeque<String>>,
    /// Tracker shared with the paired synthesizer when echoing
    tracker: Arc<Mutex<CallTracker>>,
    /// Whether to echo the last synthesized text when the queue is empty
    echo: bool,
}

impl ScriptedRecognizer {
    /// Create a recognizer that echoes the paired synthesizer's input,
    /// simulating perfect synthesis and transcription.
    pub fn echoing(synthesizer: &ScriptedSynthesizer) -> Self {
        Self {
            transcripts: Mutex::new(VecDeque::new()),
            tracker: synthesizer.tracker(),
            echo: true,
        }
    }

    /// Create a recognizer replaying the given transcripts in order.
    pub fn with_transcripts(transcripts: Vec<String>) -> Self {
        Self {
            transcripts: Mutex::new(transcripts.into()),
            tracker: Arc::new(Mutex::new(CallTracker::default())),
            echo: false,
        }
    }

    /// Queue a transcript for the next transcribe call.
    pub fn push_transcript(&self, transcript: impl Into<String>) {
        self.transcripts.lock().push_back(transcript.into());
    }

    /// Number of transcribe calls made so far.
    pub fn calls(&self) -> usize {
        self.tracker.lock().transcribe_calls
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn transcribe(&self, _audio: &Path) -> Result<String, ProviderError> {
        self.tracker.lock().transcribe_calls += 1;

        if let Some(transcript) = self.transcripts.lock().pop_front() {
            return Ok(transcript);
        }

        if self.echo {
            return Ok(self.tracker.lock().last_text.clone().unwrap_or_default());
        }

        Ok(String::new())
    }

    async fn test_availability(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted-recognizer"
    }
}
