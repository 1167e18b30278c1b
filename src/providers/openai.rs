/*!
 * OpenAI-compatible speech API clients.
 *
 * Covers hosted (or self-hosted OpenAI-compatible) speech synthesis via
 * `/v1/audio/speech` and transcription via `/v1/audio/transcriptions`.
 */

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use log::error;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{SpeechRecognizer, SpeechSynthesizer};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Speech synthesis request body
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    /// The model to use
    model: &'a str,

    /// Text to synthesize
    input: &'a str,

    /// Voice name
    voice: &'a str,

    /// Audio container for the response; the pipeline consumes WAV
    response_format: &'a str,
}

/// Transcription response body
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    /// The transcribed text
    text: String,
}

fn api_url(endpoint: &str, path: &str) -> String {
    let base = if endpoint.is_empty() {
        DEFAULT_ENDPOINT
    } else {
        endpoint
    };
    format!("{}/{}", base.trim_end_matches('/'), path)
}

async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    error!("Speech API error ({}): {}", status, message);
    ProviderError::ApiError {
        status_code: status.as_u16(),
        message,
    }
}

/// Client for an OpenAI-compatible speech synthesis endpoint
#[derive(Debug)]
pub struct OpenAiSynthesizer {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to the public API)
    endpoint: String,
    /// Model name
    model: String,
    /// Voice name
    voice: String,
}

impl OpenAiSynthesizer {
    /// Create a new synthesis client.
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            voice: voice.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), ProviderError> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: "wav",
        };

        let response = self
            .client
            .post(api_url(&self.endpoint, "audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let audio: Bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        tokio::fs::write(output, &audio)
            .await
            .map_err(|e| ProviderError::SynthesisFailed(format!("failed to write artifact: {}", e)))?;

        Ok(())
    }

    async fn test_availability(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(api_url(&self.endpoint, "models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "openai-speech"
    }
}

/// Client for an OpenAI-compatible transcription endpoint
#[derive(Debug)]
pub struct OpenAiTranscriber {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to the public API)
    endpoint: String,
    /// Model name
    model: String,
    /// Spoken language hint (ISO 639-1)
    language: String,
}

impl OpenAiTranscriber {
    /// Create a new transcription client.
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            language: language.into(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for OpenAiTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, ProviderError> {
        let payload = tokio::fs::read(audio)
            .await
            .map_err(|e| ProviderError::TranscriptionFailed(format!("failed to read artifact: {}", e)))?;

        let part = Part::bytes(payload)
            .file_name("chunk.wav")
            .mime_str("audio/wav")
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let response = self
            .client
            .post(api_url(&self.endpoint, "audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let transcription = response
            .json::<TranscriptionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(transcription.text)
    }

    async fn test_availability(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(api_url(&self.endpoint, "models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "openai-transcribe"
    }
}
