/*!
 * Error types for the bookvox application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when driving speech providers
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when launching an external engine process fails
    #[error("Failed to launch engine process: {0}")]
    EngineSpawn(String),

    /// Error when the synthesis engine reports failure for an attempt
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Error when transcription of a synthesized artifact fails
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error when an engine call exceeds its time budget
    #[error("Engine call timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors that can occur when decoding or assembling audio
#[derive(Error, Debug)]
pub enum AudioError {
    /// Error reading or decoding a WAV artifact
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// Error writing a WAV artifact
    #[error("Failed to encode audio: {0}")]
    Encode(String),

    /// Error appending audio with a different sample format
    #[error("Audio format mismatch: expected {expected_rate} Hz / {expected_channels} ch, got {actual_rate} Hz / {actual_channels} ch")]
    FormatMismatch {
        expected_rate: u32,
        expected_channels: u16,
        actual_rate: u32,
        actual_channels: u16,
    },
}

/// Errors that can occur during audiobook export
#[derive(Error, Debug)]
pub enum ExportError {
    /// Error encoding the waveform to the intermediate container
    #[error("Audio encoding failed: {0}")]
    Encode(String),

    /// Error muxing audio and chapter metadata into the final container
    #[error("Container mux failed: {0}")]
    Mux(String),

    /// Error from a file operation during export
    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from audio handling during export
    #[error("Export audio error: {0}")]
    Audio(#[from] AudioError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a speech provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from audio handling
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Error from audiobook export
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
