/*!
 * Piper TTS engine client.
 *
 * Piper is a local neural TTS engine driven over stdin: the text to speak is
 * written to the process, which renders a WAV file at the requested path.
 */

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use log::error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::errors::ProviderError;
use crate::providers::SpeechSynthesizer;

/// Client for a local Piper TTS process
#[derive(Debug)]
pub struct PiperSynthesizer {
    /// Piper binary to invoke
    binary: String,
    /// Path to the voice model (.onnx)
    model: String,
    /// Speaker id for multi-speaker models, empty for single-speaker ones
    speaker: String,
    /// Per-call time budget in seconds
    timeout_secs: u64,
}

impl PiperSynthesizer {
    /// Create a new Piper client.
    pub fn new(
        binary: impl Into<String>,
        model: impl Into<String>,
        speaker: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            speaker: speaker.into(),
            timeout_secs,
        }
    }

    fn build_command(&self, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(output);
        if !self.speaker.is_empty() {
            command.arg("--speaker").arg(&self.speaker);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl SpeechSynthesizer for PiperSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), ProviderError> {
        let mut child = self
            .build_command(output)
            .spawn()
            .map_err(|e| ProviderError::EngineSpawn(format!("{}: {}", self.binary, e)))?;

        {
            let stdin = child.stdin.as_mut().ok_or_else(|| {
                ProviderError::EngineSpawn(format!("{}: stdin not captured", self.binary))
            })?;
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| ProviderError::SynthesisFailed(format!("failed to write text: {}", e)))?;
        }
        // Close stdin so piper sees end of input
        drop(child.stdin.take());

        let wait_future = child.wait_with_output();
        let result = tokio::select! {
            result = wait_future => {
                result.map_err(|e| ProviderError::SynthesisFailed(e.to_string()))?
            },
            _ = tokio::time::sleep(std::time::Duration::from_secs(self.timeout_secs)) => {
                return Err(ProviderError::Timeout(self.timeout_secs));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            error!("Piper synthesis failed: {}", stderr.trim());
            return Err(ProviderError::SynthesisFailed(
                stderr.lines().last().unwrap_or("unknown engine error").to_string(),
            ));
        }

        if !output.exists() {
            return Err(ProviderError::SynthesisFailed(format!(
                "engine exited successfully but wrote no artifact: {:?}",
                output
            )));
        }

        Ok(())
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
        "piper"
    }
}
