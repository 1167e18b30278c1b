/*!
 * # bookvox - verified text-to-speech audiobook narration
 *
 * A Rust library for converting extracted book chapters into chapterized
 * audiobook files using neural TTS with transcription-based verification.
 *
 * ## Features
 *
 * - Segment chapter text into bounded synthesis chunks along sentence,
 *   clause and word boundaries
 * - Verify every synthesized chunk by transcribing it back to text and
 *   scoring similarity against the source
 * - Bounded retries with best-effort fallback audio for stubborn chunks
 * - Millisecond-accurate chapter markers over the assembled waveform
 * - Chaptered m4b export via ffmpeg with guaranteed temp-file cleanup
 * - Batch processing of chapter batch directories
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `chapter_source`: Chapter batch loading and handling
 * - `audio`: PCM buffers and WAV artifact I/O
 * - `pipeline`: The synthesis-verification pipeline:
 *   - `pipeline::segmenter`: Bounded-length text segmentation
 *   - `pipeline::similarity`: Normalized similarity scoring
 *   - `pipeline::verification`: The per-chunk synthesize/verify retry loop
 *   - `pipeline::assembler`: Chapter narration and timeline assembly
 * - `export`: Audiobook container export through ffmpeg
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for speech engines:
 *   - `providers::piper`: Local Piper TTS process
 *   - `providers::whisper_cli`: Local whisper.cpp transcription process
 *   - `providers::openai`: OpenAI-compatible speech and transcription APIs
 *   - `providers::mock`: Scripted providers for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod chapter_source;
pub mod errors;
pub mod export;
pub mod file_utils;
pub mod pipeline;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use audio::AudioBuffer;
pub use chapter_source::{ChapterBatch, ChapterRecord};
pub use errors::{AppError, AudioError, ExportError, ProviderError};
pub use pipeline::{ChapterMarker, Narration, NarrationStats, Narrator, VerificationOutcome};
