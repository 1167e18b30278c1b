/*!
 * Speech provider implementations.
 *
 * This module contains the collaborator interfaces the pipeline drives and
 * their client implementations:
 * - Piper: local TTS engine process
 * - whisper.cpp CLI: local speech recognition process
 * - OpenAI-compatible API: hosted speech synthesis and transcription
 * - Mock: scripted providers for tests and benchmarks
 */

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::app_config::{Config, EngineConfig, SynthesisEngine, TranscriptionEngine};
use crate::errors::ProviderError;

/// Common trait for speech synthesis engines
///
/// A synthesizer turns a chunk of text into a WAV artifact at the requested
/// path. Failure is signaled distinctly from producing low-quality but valid
/// audio; quality is judged downstream by the verification loop.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Synthesize `text` into a WAV file at `output`.
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), ProviderError>;

    /// Test that the engine is reachable and usable.
    async fn test_availability(&self) -> Result<(), ProviderError>;

    /// Short engine name for diagnostics.
    fn name(&self) -> &str;
}

/// Common trait for speech recognition engines
///
/// A recognizer turns a WAV artifact back into text. It is expected to
/// return *some* text under normal operation; errors indicate the engine
/// itself failed, not that the audio was unintelligible.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync + Debug {
    /// Transcribe the WAV file at `audio` to text.
    async fn transcribe(&self, audio: &Path) -> Result<String, ProviderError>;

    /// Test that the engine is reachable and usable.
    async fn test_availability(&self) -> Result<(), ProviderError>;

    /// Short engine name for diagnostics.
    fn name(&self) -> &str;
}

pub mod mock;
pub mod openai;
pub mod piper;
pub mod whisper_cli;

/// Build the synthesizer selected by the configuration.
///
/// Called once per process by the batch controller, which owns the instance
/// and injects it by reference into the pipeline.
pub fn create_synthesizer(config: &Config) -> Result<Arc<dyn SpeechSynthesizer>> {
    let engine_config = config
        .synthesis
        .get_active_engine_config()
        .cloned()
        .unwrap_or_else(|| EngineConfig::for_synthesis(config.synthesis.engine.clone()));

    match config.synthesis.engine {
        SynthesisEngine::Piper => Ok(Arc::new(piper::PiperSynthesizer::new(
            config.synthesis.get_binary(),
            config.synthesis.get_model(),
            config.synthesis.get_voice(),
            engine_config.timeout_secs,
        ))),
        SynthesisEngine::OpenAI => Ok(Arc::new(openai::OpenAiSynthesizer::new(
            config.synthesis.get_api_key(),
            config.synthesis.get_endpoint(),
            config.synthesis.get_model(),
            config.synthesis.get_voice(),
        ))),
    }
}

/// Build the recognizer selected by the configuration.
pub fn create_recognizer(config: &Config) -> Result<Arc<dyn SpeechRecognizer>> {
    let engine_config = config
        .transcription
        .get_active_engine_config()
        .cloned()
        .unwrap_or_else(|| EngineConfig::for_transcription(config.transcription.engine.clone()));

    match config.transcription.engine {
        TranscriptionEngine::WhisperCli => Ok(Arc::new(whisper_cli::WhisperCliRecognizer::new(
            config.transcription.get_binary(),
            config.transcription.get_model(),
            config.language.clone(),
            engine_config.timeout_secs,
        ))),
        TranscriptionEngine::OpenAI => Ok(Arc::new(openai::OpenAiTranscriber::new(
            config.transcription.get_api_key(),
            config.transcription.get_endpoint(),
            config.transcription.get_model(),
            config.language.clone(),
        ))),
    }
}
