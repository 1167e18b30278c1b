/*!
 * whisper.cpp CLI recognition client.
 *
 * Runs the whisper.cpp command-line binary against a WAV artifact and reads
 * the transcript from stdout.
 */

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use log::error;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::errors::ProviderError;
use crate::providers::SpeechRecognizer;

/// Non-speech annotations whisper.cpp emits, like `[MUSIC]` or `(applause)`
static ANNOTATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").unwrap());

/// Client for a local whisper.cpp process
#[derive(Debug)]
pub struct WhisperCliRecognizer {
    /// whisper.cpp binary to invoke
    binary: String,
    /// Path to the GGML model file
    model: String,
    /// Spoken language hint (ISO 639-1)
    language: String,
    /// Per-call time budget in seconds
    timeout_secs: u64,
}

impl WhisperCliRecognizer {
    /// Create a new whisper.cpp client.
    pub fn new(
        binary: impl Into<String>,
        model: impl Into<String>,
        language: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            language: language.into(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperCliRecognizer {
    async fn transcribe(&self, audio: &Path) -> Result<String, ProviderError> {
        let transcribe_future = Command::new(&self.binary)
            .arg("-m")
            .arg(&self.model)
            .arg("-f")
            .arg(audio)
            .arg("--language")
            .arg(&self.language)
            .arg("--no-timestamps")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let result = tokio::select! {
            result = transcribe_future => {
                result.map_err(|e| ProviderError::EngineSpawn(format!("{}: {}", self.binary, e)))?
            },
            _ = tokio::time::sleep(std::time::Duration::from_secs(self.timeout_secs)) => {
                return Err(ProviderError::Timeout(self.timeout_secs));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            error!("Transcription failed: {}", stderr.trim());
            return Err(ProviderError::TranscriptionFailed(
                stderr.lines().last().unwrap_or("unknown engine error").to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&result.stdout);
        let despeckled = ANNOTATION_PATTERN.replace_all(&stdout, " ");
        let transcript = despeckled
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(transcript)
    }

    async fn test_availability(&self) -> Result<(), ProviderError> {
        let output = Command::new(&self.binary)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| ProviderError::EngineSpawn(format!("{}: {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(ProviderError::EngineSpawn(format!(
                "{} is not runnable",
                self.binary
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "whisper-cli"
    }
}
